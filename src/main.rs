use accel_sender::{
    AccelReading, BtPlatform, LinkConfig, LinkState, LogSink, RfcommConfig, RfcommConnector,
    SensorLink, StatusSink, TargetDescriptor,
};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let sink: Arc<dyn StatusSink> = Arc::new(LogSink);

    let platform = match BtPlatform::initialize().await {
        Ok(platform) => platform,
        Err(e) => {
            sink.error(&e.to_string());
            return Err(e.into());
        }
    };
    info!("Bluetooth adapter ready: {}", platform.adapter_name());

    let target = pick_target(&platform).await?;
    info!("streaming to {}", target);

    let link = SensorLink::new(
        Box::new(RfcommConnector::new(RfcommConfig::default())),
        sink,
        LinkConfig::default(),
    );
    link.connect(target);

    // Stand-in for the sensor collaborator: synthetic readings at 20 Hz.
    // Samples produced before the link is up are dropped, not queued.
    let sampler_link = link.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(50));
        let start = Instant::now();
        loop {
            ticker.tick().await;
            let t = start.elapsed().as_secs_f32();
            sampler_link.on_sample(&AccelReading::new(t.sin(), (0.5 * t).cos(), 9.81));
        }
    });

    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    info!("shutting down");
    link.close();

    let mut states = link.state_changes();
    let closed = timeout(
        Duration::from_secs(5),
        states.wait_for(|s| matches!(s, LinkState::Closed | LinkState::Idle)),
    )
    .await;
    if closed.is_err() {
        warn!("link did not close in time");
    }
    Ok(())
}

/// Use the address given on the command line, or fall back to the first
/// paired device.
async fn pick_target(platform: &BtPlatform) -> Result<TargetDescriptor> {
    let paired = platform.paired_targets().await?;
    for known in &paired {
        info!("paired device: {}", known);
    }

    if let Some(arg) = std::env::args().nth(1) {
        let address = arg
            .parse()
            .with_context(|| format!("invalid Bluetooth address: {arg}"))?;
        let name = paired
            .iter()
            .find(|t| t.address == address)
            .and_then(|t| t.name.clone());
        return Ok(TargetDescriptor { address, name });
    }

    paired
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("no paired devices; pass a target address"))
}
