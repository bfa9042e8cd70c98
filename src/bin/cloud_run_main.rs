use anyhow::{Context, Result};
use beltscraper::{
    config::Settings,
    pipeline::Pipeline,
    store::{ChampionStore, Namespace, SqliteStore},
};
use std::{convert::Infallible, env, sync::Arc};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};
use warp::{http::StatusCode, hyper::body::Bytes, reply::Reply, Filter};

async fn health_check() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({
        "status": "healthy",
        "service": "boxing-standings-etl"
    })))
}

async fn run_pipeline<S>(
    pipeline: Arc<Pipeline<S>>,
    trigger: Bytes,
) -> Result<impl Reply, Infallible>
where
    S: ChampionStore + 'static,
{
    info!(trigger_bytes = trigger.len(), "pipeline triggered");
    let (message, status) = pipeline.handle_trigger(trigger).await;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    Ok(warp::reply::with_status(message, status))
}

fn routes<S>(
    pipeline: Arc<Pipeline<S>>,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone
where
    S: ChampionStore + 'static,
{
    let health = warp::path("health")
        .and(warp::get())
        .and_then(health_check);

    let run = warp::path("run")
        .and(warp::post())
        .and(warp::any().map(move || Arc::clone(&pipeline)))
        .and(warp::body::bytes())
        .and_then(run_pipeline);

    health.or(run)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(log_level.parse().unwrap_or(Level::INFO.into())),
        )
        .init();

    info!("Starting boxing standings ETL service");

    let settings = Settings::from_env()?;
    let store = SqliteStore::open(&settings.store_uri, Namespace::default())
        .context("opening document store")?;
    let pipeline = Arc::new(Pipeline::from_settings(&settings, store)?);

    // Get port from environment or default to 8080 (Cloud Run default)
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    info!("Server starting on port {}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Run endpoint: POST http://localhost:{}/run", port);

    warp::serve(routes(pipeline)).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use beltscraper::{fetch::Fetcher, normalize::Normalizer, pipeline::NO_DATA_MESSAGE};
    use std::time::Duration;

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_route_reports_pipeline_status() {
        // Source page with no championship tables.
        let page = warp::path("page").map(|| warp::reply::html("<p>nothing here</p>"));
        let (addr, server) = warp::serve(page).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let fetcher =
            Fetcher::new(&format!("http://{}/page", addr), Duration::from_secs(5)).unwrap();
        let store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        let pipeline = Arc::new(Pipeline::new(
            fetcher,
            Normalizer::default(),
            store,
            Duration::from_secs(10),
        ));

        let resp = warp::test::request()
            .method("POST")
            .path("/run")
            .body("{}")
            .reply(&routes(pipeline))
            .await;
        assert_eq!(resp.status(), 500);
        assert_eq!(resp.body(), NO_DATA_MESSAGE.as_bytes());
    }

    #[tokio::test]
    async fn test_health_route() {
        let store = SqliteStore::open_in_memory(Namespace::default()).unwrap();
        let fetcher = Fetcher::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        let pipeline = Arc::new(Pipeline::new(
            fetcher,
            Normalizer::default(),
            store,
            Duration::from_secs(1),
        ));
        let resp = warp::test::request()
            .method("GET")
            .path("/health")
            .reply(&routes(pipeline))
            .await;
        assert_eq!(resp.status(), 200);
    }
}
