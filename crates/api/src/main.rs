use anyhow::Result;
use std::time::Duration;
use tracing::info;

use signage_console_api::{
    app::{create_app, AppState},
    config::Config,
    jobs::{ActivityRecorder, AnnouncementScheduleJob, JobScheduler},
    middleware::{init_metrics, logging::init_logging},
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;
    init_metrics()?;

    info!("Starting Signage Console v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.socket_addr()?;
    let sweep_secs = config.announcements.schedule_sweep_secs;
    let state = AppState::new(config);

    let mut scheduler = JobScheduler::new();
    let recorder =
        ActivityRecorder::subscribe(state.directory.clone(), state.activity.clone()).await;
    let shutdown = scheduler.shutdown_signal();
    scheduler.spawn_task("activity_recorder", recorder.run(shutdown));
    scheduler.register(AnnouncementScheduleJob::new(
        state.announcements.clone(),
        state.activity.clone(),
        sweep_secs,
    ));
    scheduler.start();

    let app = create_app(state);

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    scheduler.wait_for_shutdown(SHUTDOWN_TIMEOUT).await;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
