#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    server::config::load_feature_flags();
    server::health::record_start_time();

    let flags = server::config::feature_flags();
    if flags.telemetry {
        server::telemetry::init_telemetry();
    }

    let pool = server::db::create_pool();
    server::db::run_migrations(&pool).await;

    if flags.s3 {
        server::storage::S3ObjectStore::from_env()
            .ensure_bucket()
            .await;
    }

    let router = server::openapi::api_router(pool);

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {addr}: {e}"));

    eprintln!("Deedflow listening on {addr}");
    axum::serve(listener, router)
        .await
        .expect("Server exited with error");
}
