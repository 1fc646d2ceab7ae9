use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use salon_api::app::{
    build_auth_service, build_cleanup_service, create_app, AppState, Repositories,
};
use salon_api::middleware::cors::create_cors;
use salon_infra::database::DatabasePool;
use salon_infra::sms::{create_sms_service, SmsSenderAdapter};
use salon_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_ansi(config.logging.ansi)
        .init();

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    tracing::info!(
        environment = ?config.environment,
        version = env!("CARGO_PKG_VERSION"),
        "Starting salon auth API"
    );

    let (repositories, database) = if config.database.in_memory {
        tracing::warn!("DATABASE_IN_MEMORY is set; auth state will not survive a restart");
        (Repositories::in_memory(), None)
    } else {
        let database = DatabasePool::new(&config.database)
            .await
            .context("Failed to connect to MySQL")?;
        if config.database.run_migrations {
            database
                .run_migrations()
                .await
                .context("Failed to run database migrations")?;
        }
        (Repositories::mysql(&database), Some(database))
    };

    let sms_service = create_sms_service(&config.sms, config.environment.is_production())
        .context("Failed to configure SMS provider")?;
    let sms_sender = SmsSenderAdapter::new(sms_service);
    tracing::info!(provider = sms_sender.provider_name(), "SMS provider ready");

    let auth = Arc::new(build_auth_service(&config, &repositories, Arc::new(sms_sender)));
    Arc::new(build_cleanup_service(&config, &repositories)).start_background_task();

    let state = web::Data::new(AppState {
        auth,
        environment: config.environment,
        database: database.clone(),
    });

    let bind_address = config.server.bind_address();
    tracing::info!(address = %bind_address, "Server listening");

    let cors_config = config.cors.clone();
    let environment = config.environment;
    let mut server = HttpServer::new(move || {
        create_app(state.clone())
            .wrap(create_cors(&cors_config, environment))
            .wrap(TracingLogger::default())
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await?;

    if let Some(database) = database {
        database.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}
