//! Exposure command - sample coastal sites below a sea-level rise.

use colored::Colorize;
use tidegauge::{ExposureSummary, default_sites};

pub fn run(rise: f64, json_output: bool) -> Result<(), Box<dyn std::error::Error>> {
    let summary = ExposureSummary::new(&default_sites(), rise);

    if json_output {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} {:.1} m",
        "Sea-level rise:".cyan().bold(),
        summary.rise_m
    );
    println!();
    println!("  {:12} {:>9} {:>9} {:>8}  Status", "Site", "Lat", "Lon", "Elev(m)");
    for exposure in &summary.sites {
        let status = if exposure.inundated {
            "inundated".red()
        } else {
            "safe".green()
        };
        println!(
            "  {:12} {:>9.4} {:>9.4} {:>8.1}  {}",
            exposure.site.name,
            exposure.site.lat,
            exposure.site.lon,
            exposure.site.elevation_m,
            status
        );
    }
    println!();
    println!(
        "{} of {} sites at or below the threshold",
        summary.inundated.to_string().white().bold(),
        summary.total
    );

    Ok(())
}
