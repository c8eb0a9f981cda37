use std::sync::Arc;

use color_eyre::Result;
use tokio::sync::watch;
use tracing::{error, info, warn};

use vrcwatch::adapters::{
    DiscordSink, FileCredentialsProvider, LogSink, ReqwestHttpClient, TerminalPrompt,
};
use vrcwatch::api::ApiClient;
use vrcwatch::auth::SessionManager;
use vrcwatch::config::{LoginCredentials, TrackedUsers, WatchConfig};
use vrcwatch::monitor::{ChangeDetector, Notifier, StatusMonitor};
use vrcwatch::presence::PresenceClient;
use vrcwatch::traits::{HttpClient, NotificationSink};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = WatchConfig::from_env()?;
    let login = match LoginCredentials::from_env() {
        Ok(login) => login,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Please set VRCHAT_USERNAME and VRCHAT_PASSWORD environment variables.");
            std::process::exit(1);
        }
    };

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let api = Arc::new(
        ApiClient::with_base_url(http.clone(), config.api_base_url.clone())
            .with_user_agent(config.user_agent.clone()),
    );
    let store = FileCredentialsProvider::with_store(config.session_store()?);
    let session = Arc::new(SessionManager::new(api.clone(), Arc::new(store)));

    // Authentication must succeed before monitoring starts
    if let Err(e) = session
        .authenticate(&login.username, &login.password, &TerminalPrompt)
        .await
    {
        error!("Authentication failed [{}]: {}", e.error_code(), e);
        eprintln!("Error: {}", e.user_message());
        std::process::exit(1);
    }

    let tracked = TrackedUsers::load(&config.users_path);
    if tracked.users.is_empty() {
        warn!("No users to track in {}", config.users_path.display());
    }

    let sink: Arc<dyn NotificationSink> = match config.discord() {
        Some((token, channel)) => Arc::new(DiscordSink::new(http.clone(), token, channel)),
        None => {
            warn!("DISCORD_BOT_TOKEN or DISCORD_CHANNEL_ID not set, notifications go to the log only");
            Arc::new(LogSink)
        }
    };

    let presence = PresenceClient::new(api, config.retry);
    let detector = ChangeDetector::new(tracked.favorites)
        .with_mention(config.mention_user_id.clone())
        .with_report_interval(config.report_interval);
    let mut monitor = StatusMonitor::new(tracked.users, presence, detector, Notifier::new(sink))
        .with_session(session)
        .with_poll_interval(config.poll_interval);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, stopping");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => {
                error!("Failed to listen for Ctrl-C: {}", e);
                // Keep the sender alive so the monitor keeps running.
                std::future::pending::<()>().await;
            }
        }
    });

    monitor.start(shutdown_rx).await;
    Ok(())
}
