use habit_tracker::{
    clock::SystemClock,
    gateway::Gateway,
    models::AppData,
    router,
    scheduler::{LogNotifier, Scheduler},
    AppState, Config, HabitStore,
};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let data = if config.seed_samples {
        AppData::with_sample_habits()
    } else {
        AppData::default()
    };

    let store = HabitStore::new(data, Arc::new(SystemClock));
    let gateway = Gateway::new(config.gateway.clone());
    if !gateway.is_configured() {
        warn!("OPENAI_API_KEY is not set; recommendations will report a configuration error");
    }
    let notifier = Arc::new(LogNotifier::new(config.notification_permission));
    let scheduler = Scheduler::new(store.clone(), notifier, config.reminder_interval);

    let state = AppState::new(store, gateway, scheduler);
    state.scheduler.start().await;

    let app = router(state.clone());
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.scheduler.shutdown();
    info!("timers stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
}
