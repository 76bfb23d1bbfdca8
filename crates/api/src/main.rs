use api::{build_app, init_domain_services};
use config::{ApiConfig, LoggingConfig};

#[tokio::main]
async fn main() {
    // Pick up provider keys from a local .env during development
    let _ = dotenvy::dotenv();

    // Load configuration first to get logging settings
    let config = ApiConfig::load_or_env().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Application cannot start without a valid configuration.");
        std::process::exit(1);
    });

    init_tracing(&config.logging);

    let domain_services = init_domain_services(&config).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to initialize services");
        std::process::exit(1);
    });

    let app = build_app(domain_services, &config);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "Failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %bind_address, "Server started successfully");
    tracing::info!("API Endpoints:");
    tracing::info!("  - POST /api/chat (Search augmented chat stream)");
    tracing::info!("  - GET /health (Health check)");
    tracing::info!("  - GET /api-docs/openapi.json (OpenAPI document)");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

fn init_tracing(logging_config: &LoggingConfig) {
    // Build the filter string from the logging configuration
    let mut filter = logging_config.level.clone();

    for (module, level) in &logging_config.modules {
        filter.push_str(&format!(",{}={}", module, level));
    }

    // Initialize tracing based on the format specified in config
    match logging_config.format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .compact()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .pretty()
                .with_env_filter(filter)
                .init();
        }
    }
}
