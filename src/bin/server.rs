use anyhow::Context;
use maritime_relay::api::create_api_server;
use maritime_relay::metrics::{install_recorder, start_metrics_server};
use maritime_relay::{logging, MessageRelayBuilder, RelayConfig};

fn load_config() -> anyhow::Result<RelayConfig> {
    let config = match std::env::var("MMS_CONFIG") {
        Ok(path) => RelayConfig::from_file(&path)
            .with_context(|| format!("Failed to load config from {path}"))?,
        Err(_) => RelayConfig::default(),
    };

    let config = config.apply_env()?;
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    logging::init(config.log_format)?;

    match config.metrics_addr {
        Some(addr) => start_metrics_server(addr).await?,
        None => {
            install_recorder()?;
        }
    }

    let listen_addr = config.listen_addr;
    tracing::info!(
        %listen_addr,
        delivery_delay_ms = config.delivery_delay_ms,
        success_rate = config.success_rate,
        "Starting maritime message relay"
    );

    let relay = MessageRelayBuilder::new().config(config).build_shared();
    let app = create_api_server(relay.clone());

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("Failed to bind {listen_addr}"))?;
    tracing::info!("Relay listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    relay.shutdown();
    tracing::info!("{}", relay.stats());
    tracing::info!("{}", relay.tracker().stats());
    Ok(())
}
