use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ai_or_real::{
    auth::HostAuthority, catalog::RoundCatalog, config::AppConfig, engine, state::GameSession, ws,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_or_real=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting AI or Real...");

    let config = AppConfig::from_env();

    let catalog = match &config.rounds_file {
        Some(path) => match RoundCatalog::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                tracing::error!("Cannot start without rounds: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            tracing::warn!("ROUNDS_FILE not set, using built-in demo rounds");
            RoundCatalog::builtin()
        }
    };

    let hosts = HostAuthority::new(config.host_password.clone());
    let game_config = config.game.clone();

    // All game state lives inside the game loop task
    let game = engine::spawn_game_loop(move |events| {
        GameSession::new(game_config, catalog, hosts, events)
    });

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(game);

    tracing::info!("Listening on http://{}", config.bind_addr);

    let listener = match tokio::net::TcpListener::bind(config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
