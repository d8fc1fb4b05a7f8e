use std::net::SocketAddr;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use slotswap_engine::SwapEngine;
use slotswap_server::{create_router, AppState, Config};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Optional: SLOTSWAP_LISTEN_ADDR (default: 0.0.0.0:3000)");
            eprintln!("Optional: SLOTSWAP_WRITE_LIMIT, SLOTSWAP_READ_LIMIT, SLOTSWAP_REGISTER_LIMIT");
            eprintln!("Optional: SLOTSWAP_RATE_WINDOW_SECS (default: 1)");
            std::process::exit(1);
        }
    };

    tracing::info!("Starting SlotSwap server");
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!(
        "Rate limits: {} writes / {} reads per {:?}",
        config.write_limit,
        config.read_limit,
        config.rate_window
    );

    let state = AppState::new(SwapEngine::in_memory(), &config);

    // Periodically forget idle callers
    {
        let state = state.clone();
        let period = config.rate_window * 10;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period.max(Duration::from_secs(1)));
            loop {
                ticker.tick().await;
                state.cleanup_limiters();
            }
        });
    }

    let app = create_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = match tokio::net::TcpListener::bind(&config.listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to bind to {}: {}", config.listen_addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server running at http://{}", config.listen_addr);

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}
