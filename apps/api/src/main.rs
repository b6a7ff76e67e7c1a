use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{error, info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use availability_cell::{AvailabilityState, BookingConfig};
use shared_config::AppConfig;
use shared_database::PlatformDbClient;
use web_booking_cell::{run_pending_booking_processor, WebBookingState};

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting booking platform API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    let booking = match BookingConfig::from_app_config(&config) {
        Ok(booking) => booking,
        Err(e) => {
            error!("Invalid booking configuration: {}", e);
            std::process::exit(1);
        }
    };

    let redis_url = config
        .redis_url
        .clone()
        .unwrap_or_else(|| "redis://localhost:6379".to_string());
    let redis = deadpool_redis::Config::from_url(redis_url)
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .unwrap();

    let db = Arc::new(PlatformDbClient::new(&config));

    // Trusted consumer for the public web booking flow
    tokio::spawn(run_pending_booking_processor(redis.clone(), config.clone()));

    let availability_state = AvailabilityState {
        db,
        redis: redis.clone(),
        booking,
    };
    let web_state = WebBookingState {
        redis,
        config: config.clone(),
    };

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the application router
    let app = router::create_router(availability_state, web_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
