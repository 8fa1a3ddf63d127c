//! API request handlers.

mod exposure;
mod series;

pub use exposure::*;
pub use series::*;
