use photo_journal::{
    AppState, Config, Journal,
    clock::SystemClock,
    reminder::{LogNotifier, ReminderScheduler},
    router,
    storage::{EntryStore, FileStore},
};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let backend = FileStore::open(&config.data_path, config.storage_quota)?;
    let journal = Arc::new(Journal::new(
        EntryStore::new(backend),
        Arc::new(SystemClock),
        config.resize,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = ReminderScheduler::new(
        Arc::clone(&journal),
        Arc::new(LogNotifier::new(config.notifications)),
        config.reminder_hour,
    );
    let reminders = tokio::spawn(scheduler.run(config.reminder_interval, shutdown_rx));

    let app = router(AppState::new(journal, config.upload_limit));
    let addr = config.addr();

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Err(err) = reminders.await {
        error!("reminder task failed: {err}");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
