use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use laverie_leads::config::AppConfig;
use laverie_leads::error::AppError;
use laverie_leads::intake::{
    EmailRecipient, FileJournal, LeadIntakeService, NotificationDispatcher, PushoverGateway,
    SmtpMailer, SubmissionThrottle,
};
use laverie_leads::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let journal = Arc::new(FileJournal::create(&config.journal_dir)?);
    let mailer = Arc::new(SmtpMailer::from_config(&config.smtp)?);
    let push = config
        .push
        .as_ref()
        .map(|credentials| Arc::new(PushoverGateway::new(credentials)));
    let recipients: Vec<EmailRecipient> = config
        .smtp
        .recipients
        .iter()
        .map(EmailRecipient::bare)
        .collect();

    let dispatcher =
        NotificationDispatcher::new(mailer, push, recipients, config.send_timeout);
    let throttle = SubmissionThrottle::new(config.rate_limit.clone());
    let service = Arc::new(LeadIntakeService::new(throttle, journal, dispatcher));

    let app = with_intake_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead capture service ready");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
