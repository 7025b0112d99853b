use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use video_social_service::{BackendService, Config, DispatchProxy, ServiceContext, VideoBackend};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing();

    info!("Starting video-social-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        backends = config.app.backend_instances,
        delivery = config.service.delivery.as_str(),
        "configuration loaded"
    );

    // All instances share one context so the proxy does not partition data
    let ctx = Arc::new(ServiceContext::new(&config.service));
    let backends: Vec<Arc<dyn VideoBackend>> = (0..config.app.backend_instances)
        .map(|_| Arc::new(BackendService::new(ctx.clone())) as Arc<dyn VideoBackend>)
        .collect();
    let proxy = DispatchProxy::new(backends).context("Failed to build dispatch proxy")?;

    info!(instances = proxy.size(), "video-social-service ready");

    shutdown_signal().await;

    info!(
        videos = ctx.content.len().await,
        connections = ctx.hub.total_connections().await,
        "video-social-service shutting down"
    );
    Ok(())
}
