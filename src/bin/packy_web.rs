//! Web-server entry point: serves the YAML-to-JSON convert form.

use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = packy::config::load().unwrap_or_else(|e| {
        eprintln!("configuration error: {e}");
        std::process::exit(1);
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("cannot bind {}: {e}", config.server.bind_addr);
            std::process::exit(1);
        });

    info!("serving convert form on http://{}", config.server.bind_addr);
    axum::serve(listener, packy::web::router())
        .await
        .unwrap_or_else(|e| {
            eprintln!("server error: {e}");
            std::process::exit(1);
        });
}
