//! Axum application setup.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

use super::handlers;
use super::state::AppState;

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    // Dashboards are served from other origins
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/series/synthetic", get(handlers::get_synthetic))
        .route("/series/infer", post(handlers::infer_upload))
        .route("/series/remote", get(handlers::get_remote))
        .route("/exposure", get(handlers::get_exposure));

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = std::net::SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, "server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tidegauge::remote::FetchConfig;
    use tidegauge::{LoaderConfig, SeriesLoader, StaticSource};
    use tower::ServiceExt;

    const URL: &str = "https://fixture.example/gmsl.csv";

    fn test_router() -> Router {
        let source = StaticSource::new().with_body(URL, "year,gmsl\n1993,0\n1994,3.2\n");
        let loader = SeriesLoader::with_config(LoaderConfig {
            fetch: FetchConfig {
                urls: vec![URL.to_string()],
                ..FetchConfig::default()
            },
            ..LoaderConfig::default()
        })
        .with_remote(source);
        create_router(AppState::new(loader))
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = test_router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_synthetic_default() {
        let (status, json) = send(get("/api/series/synthetic")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["origin"], "synthetic");
        assert_eq!(json["degraded"], false);
        assert_eq!(json["table"].as_array().unwrap().len(), 126);
        assert_eq!(json["table"][92]["value"], 161.0);
    }

    #[tokio::test]
    async fn test_synthetic_invalid_params() {
        let (status, json) = send(get("/api/series/synthetic?start=2000&breakpoint=1990")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "tidegauge_error");
    }

    #[tokio::test]
    async fn test_synthetic_overflowing_rates() {
        let uri = "/api/series/synthetic?rate_before=-1e308&rate_after=1e308";
        let (status, json) = send(get(uri)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "tidegauge_error");
    }

    #[tokio::test]
    async fn test_infer_upload() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/series/infer?name=levels.csv")
            .body(Body::from("연도,연평균(cm)\n2001,5.0\n2002,5.5\n"))
            .unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["origin"], "uploaded");
        assert_eq!(json["table"][0]["value"], 50.0);
        assert_eq!(json["mapping"]["measurement"], "연평균(cm)");
        assert_eq!(json["source"]["origin"], "levels.csv");
    }

    #[tokio::test]
    async fn test_infer_unusable_upload_degrades() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/series/infer")
            .body(Body::from("name,note\na,x\n"))
            .unwrap();
        let (status, json) = send(request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["origin"], "synthetic");
        assert_eq!(json["degraded"], true);
    }

    #[tokio::test]
    async fn test_infer_empty_body() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/series/infer")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_remote() {
        let (status, json) = send(get("/api/series/remote")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["origin"], "remote");
        assert_eq!(json["table"][1]["value"], 3.2);
    }

    #[tokio::test]
    async fn test_exposure() {
        let (status, json) = send(get("/api/exposure?rise=2.0")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["inundated"], 3);
        assert_eq!(json["total"], 5);

        let (_, json) = send(get("/api/exposure?rise=9")).await;
        assert_eq!(json["rise_m"], 5.0);
        assert_eq!(json["inundated"], 5);
    }
}
