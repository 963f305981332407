//! NetGuard: host-level outbound domain filter on NFQUEUE.

mod bootstrap;
mod di;

use clap::Parser;
use netguard_infrastructure::packet::{PacketListener, QueueConfig};
use netguard_jobs::BlocklistSyncJob;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "netguard")]
#[command(version)]
#[command(about = "Host-level network filter with AI-assisted blocklisting")]
struct Cli {
    /// Path to config.yaml (overrides the search order)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref()).await?;
    bootstrap::init_logging(&config);

    let pool = bootstrap::init_database(&config.database).await?;

    let services = di::Services::build(&config, pool).await?;
    info!("Engine initialized successfully");

    let shutdown = CancellationToken::new();

    Arc::new(
        BlocklistSyncJob::new(Arc::clone(&services.refresh) as _)
            .with_interval(config.app.update_interval_hours * 3600)
            .with_cancellation(shutdown.clone()),
    )
    .start()
    .await;

    let queue_cfg = QueueConfig {
        queue_num: config.network.queue_num,
        max_queue_len: config.network.queue_size,
    };

    let listener = PacketListener::new(Arc::clone(&services.engine));
    let listener_shutdown = shutdown.clone();
    let mut listener_task = tokio::spawn(async move {
        listener.start(listener_shutdown, queue_cfg).await
    });

    info!("NetGuard is running. Press CTRL+C to stop.");

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping listener");
        }
        result = &mut listener_task => {
            // Bind failures land here before any signal arrives.
            match result {
                Ok(Err(e)) => {
                    error!(error = %e, "Listener stopped with error");
                    return Err(e.into());
                }
                Ok(Ok(())) => info!("Listener stopped"),
                Err(e) => return Err(e.into()),
            }
        }
    }

    shutdown.cancel();

    // Give in-flight callbacks and transactions a moment to settle.
    tokio::time::sleep(Duration::from_secs(1)).await;
    info!("Exiting");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("sigterm handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
