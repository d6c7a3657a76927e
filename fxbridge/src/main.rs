use fxbridge::{
    clock::LiveClock,
    config::{SessionConfig, SystemConfig},
    error::FxBridgeError,
    logging::{init_json_logging, init_logging},
    notify::notifier,
    shutdown::AsyncShutdown,
    system::System,
};
use fxbridge_execution::RandomSlippage;
use fxbridge_integration::transport::TlsTcpConnector;
use std::{sync::Arc, time::Duration};
use tracing::{error, info};

/// Set to any value to emit JSON logs.
const LOG_JSON_ENV: &str = "FXBRIDGE_LOG_JSON";

#[tokio::main]
async fn main() {
    if std::env::var_os(LOG_JSON_ENV).is_some() {
        init_json_logging();
    } else {
        init_logging();
    }

    if let Err(error) = run().await {
        error!(%error, "fxbridge failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), FxBridgeError> {
    let path = SystemConfig::path(std::env::args());
    info!(path = %path.display(), "loading config");
    let config = SystemConfig::load(&path)?;

    let connect_timeout = config.timing.connect_timeout();
    let system = System::spawn(
        &config,
        connector(&config.quote, connect_timeout)?,
        connector(&config.trade, connect_timeout)?,
        RandomSlippage::from_os_rng(),
        notifier(config.telegram.as_ref()),
        Arc::new(LiveClock),
    )?;

    tokio::signal::ctrl_c().await?;
    info!("received interrupt, shutting down");

    system.shutdown().await?;
    Ok(())
}

fn connector(
    session: &SessionConfig,
    connect_timeout: Duration,
) -> Result<TlsTcpConnector, FxBridgeError> {
    TlsTcpConnector::new(session.host.as_str(), session.port, connect_timeout).map_err(Into::into)
}
