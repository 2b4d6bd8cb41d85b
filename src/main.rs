use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use spotlight_server::config::AppConfig;
use spotlight_server::database::client::{Database, DbConfig};
use spotlight_server::middleware::error::AppResult;
use spotlight_server::middleware::mw_ctx;
use spotlight_server::{init, jobs};

#[tokio::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spotlight_server=debug,tower_http=info".into()),
        )
        .init();

    let _sentry_guard = config.sentry_project_link.as_ref().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let db = Database::connect(DbConfig {
        url: &config.db_url,
        database: &config.db_database,
        namespace: &config.db_namespace,
        username: config.db_username.as_deref(),
        password: config.db_password.as_deref(),
    })
    .await;

    db.run_migrations().await?;
    init::run_migrations(&db).await?;

    let ctx_state = mw_ctx::create_ctx_state(db, &config);

    let _settlement_job = jobs::contest_settlement::run(
        ctx_state.clone(),
        Duration::from_secs(config.settlement_sweep_secs),
    )
    .await;

    let routes_all = init::main_router(&ctx_state);

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080));
    tracing::info!("->> LISTENING on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    axum::serve(listener, routes_all.into_make_service())
        .await
        .unwrap();

    Ok(())
}
