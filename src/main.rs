use dotenvy::dotenv;
use warden::router::init_router;
use warden::state::init_app_state;
use warden_config::ServerConfig;
use warden_observability::{init_metrics, init_tracing, metrics_app};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let state = match init_app_state().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialise application state");
            std::process::exit(1);
        }
    };
    let backend = state.store.backend_name();

    let mut app = init_router(state);
    if let Some(handle) = init_metrics() {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, address = %address, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(address = %address, store = backend, "🚀 Server running");
    tracing::info!("📚 Swagger UI available at http://{}/swagger-ui", address);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
