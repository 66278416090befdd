use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use boardfund::adapters::events::{spawn_failure_logger, WebhookDispatcher};
use boardfund::adapters::http::{app_router, AdminAppState, WebhookAppState};
use boardfund::adapters::paypal::{
    CredentialCache, FileCertificateCache, PaypalClient, PaypalSubscriptions, TokenClient,
};
use boardfund::adapters::{InMemoryDonationStore, PostgresDonationStore};
use boardfund::application::{
    DeactivateFundHandler, EndSubscriptionHandler, RecordSubscriptionPaymentHandler,
    VerifyWebhookHandler,
};
use boardfund::config::AppConfig;
use boardfund::ports::DonationStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    info!(environment = ?config.server.environment, "Starting boardfund");

    // Donation storage
    let store: Arc<dyn DonationStore> = match &config.database {
        Some(database) => {
            info!("Connecting to database...");
            let pool = database.pool_options().connect(&database.url).await.map_err(|e| {
                error!("Failed to connect to database: {}", e);
                e
            })?;
            if database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                info!("Database migrations applied");
            }
            Arc::new(PostgresDonationStore::new(pool))
        }
        None => {
            warn!("No database configured; donations are kept in memory");
            Arc::new(InMemoryDonationStore::new())
        }
    };

    // PayPal REST
    let api_config = config.paypal.api_config();
    let http_client = api_config.http_client()?;
    let credentials = Arc::new(CredentialCache::new(Arc::new(TokenClient::new(
        api_config.clone(),
        http_client.clone(),
    ))));
    let paypal = Arc::new(PaypalClient::new(
        api_config.base_url(),
        http_client.clone(),
        credentials,
    ));
    let subscriptions = Arc::new(PaypalSubscriptions::new(paypal));

    // Webhook verification
    tokio::fs::create_dir_all(&config.paypal.cert_cache_dir).await?;
    let certificates = FileCertificateCache::new(
        http_client,
        &config.paypal.cert_cache_dir,
        &config.paypal.cert_cache_key,
    )
    .with_allowed_hosts(config.paypal.allowed_cert_hosts_list());
    let verifier = VerifyWebhookHandler::new(Arc::new(certificates), &config.paypal.webhook_id)
        .with_checksum_format(config.paypal.checksum_format);

    // Event dispatch
    let (mut dispatcher, failures) = WebhookDispatcher::new(config.server.handler_concurrency);
    dispatcher.register(Arc::new(RecordSubscriptionPaymentHandler::new(store.clone())));
    dispatcher.register(Arc::new(EndSubscriptionHandler::new(store.clone())));
    spawn_failure_logger(failures);

    let deactivate = DeactivateFundHandler::new(store, subscriptions)
        .with_provider_timeout(config.paypal.cancel_timeout());

    let app = app_router(
        WebhookAppState::new(Arc::new(verifier), Arc::new(dispatcher))
            .with_body_limit(config.server.max_body_bytes),
        AdminAppState::new(Arc::new(deactivate), config.admin.token.clone()),
    );

    let addr = config.server.socket_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.server.log_level.clone().into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.is_production() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
