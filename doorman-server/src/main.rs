//! doorman-server

use anyhow::Result;
use doorman_server::{
    app_state::AppStateBuilder,
    middleware::request_id::MakeRequestUlid,
    router,
    settings::Settings,
    setups::prod::{EmailVerificationCodeSender, ProdSetup},
    store::data_api::DataApiClient,
};
use http::{header, HeaderName};
use std::{io, net::SocketAddr, time::Duration};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, sensitive_headers::SetSensitiveHeadersLayer,
    timeout::TimeoutLayer, trace::TraceLayer, ServiceBuilderExt,
};
use tracing::info;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::{prelude::*, EnvFilter};

/// Request identifier field.
const REQUEST_ID: &str = "request_id";

#[tokio::main]
async fn main() -> Result<()> {
    let (stdout_writer, _stdout_guard) = tracing_appender::non_blocking(io::stdout());
    setup_tracing(stdout_writer)?;

    let settings = Settings::load(None)?;

    info!(
        subject = "app_settings",
        category = "init",
        environment = %settings.server.environment,
        "starting doorman-server",
    );

    serve_app(settings).await
}

async fn serve_app(settings: Settings) -> Result<()> {
    let req_id = HeaderName::from_static(REQUEST_ID);

    let store = DataApiClient::new(&settings.database);
    let app_state = AppStateBuilder::<ProdSetup>::default()
        .with_user_store(store.clone())
        .with_registry(store)
        .with_verification_code_sender(EmailVerificationCodeSender::new(settings.mailgun.clone()))
        .finalize()?;

    let router = router::setup_app_router(app_state)
        // Set and propagate "request_id" (as a ulid) per request.
        .layer(
            ServiceBuilder::new()
                .set_request_id(req_id.clone(), MakeRequestUlid)
                .propagate_request_id(req_id),
        )
        .layer(TraceLayer::new_for_http())
        // Applies the `tower_http::timeout::Timeout` middleware which
        // applies a timeout to requests.
        .layer(TimeoutLayer::new(Duration::from_millis(
            settings.server.timeout_ms,
        )))
        // Catches runtime panics and converts them into
        // `500 Internal Server` responses.
        .layer(CatchPanicLayer::new())
        // Mark headers as sensitive on both requests and responses.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION]));

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.server.port));
    info!("doorman-server listening on {addr}");

    axum::Server::bind(&addr)
        .serve(router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
}

fn setup_tracing(writer: NonBlocking) -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer))
        .try_init()?;

    Ok(())
}
