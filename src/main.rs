use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::timeout::TimeoutLayer;
use tracing::{error, info};

use lingoleap::adapters::http::{api_router, FlashCardAppState, ReconciliationAppState};
use lingoleap::adapters::postgres::{
    CourseEnrollmentStrategy, PostgresFlashCardReviewRepository, PostgresPaymentRepository,
    PostgresWebhookQueueRepository, TeacherPackageActivationStrategy,
};
use lingoleap::adapters::{PayOsClient, WebhookSweeper};
use lingoleap::application::handlers::flashcard::{
    GetMasterySummaryHandler, ListDueCardsHandler, RecordReviewHandler,
};
use lingoleap::application::handlers::reconciliation::{
    ConfirmReturnUrlHandler, EnqueueWebhookHandler, ListDeadLettersHandler, PaymentSettlement,
    ProcessWebhookEntryHandler, SweepWebhookQueueHandler,
};
use lingoleap::config::AppConfig;
use lingoleap::ports::PostPaymentStrategyRegistry;
use lingoleap::telemetry;

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;
    config.validate().context("validating configuration")?;

    telemetry::init_telemetry(&config.server.log_level, config.server.json_logs())
        .context("initialising tracing")?;

    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await
        .context("connecting to PostgreSQL")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("running migrations")?;
        info!("Database migrations applied");
    }

    let payments = Arc::new(PostgresPaymentRepository::new(pool.clone()));
    let queue = Arc::new(PostgresWebhookQueueRepository::new(pool.clone()));
    let reviews = Arc::new(PostgresFlashCardReviewRepository::new(pool.clone()));

    let registry = PostPaymentStrategyRegistry::new()
        .register(Arc::new(CourseEnrollmentStrategy::new(pool.clone())))
        .register(Arc::new(TeacherPackageActivationStrategy::new(pool.clone())));
    let settlement = Arc::new(PaymentSettlement::new(payments.clone(), Arc::new(registry)));
    let gateway = Arc::new(PayOsClient::new(config.payment.client_config()));

    let webhook = &config.webhook;
    let processor = Arc::new(ProcessWebhookEntryHandler::new(
        queue.clone(),
        settlement.clone(),
        config.payment.signature_verifier(),
        webhook.backoff(),
        webhook.signature_failure_policy,
    )
    .with_claim_lease(webhook.claim_lease()));
    let sweep = Arc::new(SweepWebhookQueueHandler::new(
        queue.clone(),
        processor.clone(),
        webhook.batch_size,
    ));

    let reconciliation = ReconciliationAppState {
        enqueue: Arc::new(EnqueueWebhookHandler::new(queue.clone(), webhook.max_retries)),
        processor,
        return_confirmation: Arc::new(ConfirmReturnUrlHandler::new(
            payments,
            gateway,
            settlement,
        )),
        dead_letters: Arc::new(ListDeadLettersHandler::new(queue)),
    };

    let policy = config.spaced_repetition.scheduling_policy();
    let flashcards = FlashCardAppState {
        record_review: Arc::new(RecordReviewHandler::new(reviews.clone(), policy)),
        mastery_summary: Arc::new(GetMasterySummaryHandler::new(reviews.clone(), policy)),
        due_cards: Arc::new(ListDueCardsHandler::new(reviews)),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = WebhookSweeper::new(sweep, webhook.sweep_interval());
    let sweeper_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    let addr = config.server.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!(%addr, environment = ?config.server.environment, "Lingoleap listening");

    let app = api_router(reconciliation, flashcards)
        .layer(TimeoutLayer::new(config.server.request_timeout()));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_task.await {
        error!(error = %e, "Webhook sweeper task panicked");
    }

    info!("Shutdown complete");
    Ok(())
}
