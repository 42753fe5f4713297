use std::time::Duration;

use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use birimza_auth_types::identity::TokenSecret;
use birimza_core::config::Config;
use birimza_core::tracing::init_tracing;
use birimza_portal::config::PortalConfig;
use birimza_portal::infra::delivery::Delivery;
use birimza_portal::infra::password::Argon2Hasher;
use birimza_portal::router::build_router;
use birimza_portal::state::AppState;
use birimza_portal::usecase::outbox::RelayOutboxUseCase;
use birimza_portal::usecase::staff::EnsureAdminUseCase;
use birimza_portal_migration::Migrator;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = PortalConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    if config.run_migrations {
        Migrator::up(&db, None)
            .await
            .expect("failed to apply migrations");
    }

    let state = AppState {
        db,
        jwt_secret: TokenSecret::new(config.jwt_secret.as_str()),
        cookie: config.cookie_settings(),
        token_ttl_secs: config.token_ttl_secs,
        hasher: Argon2Hasher::default(),
    };

    match &config.admin_password {
        Some(password) => {
            let bootstrap = EnsureAdminUseCase {
                staff: state.staff_repo(),
                hasher: state.hasher.clone(),
            };
            bootstrap
                .execute(&config.admin_username, password)
                .await
                .expect("failed to bootstrap admin account");
        }
        None => warn!("ADMIN_PASSWORD not set, skipping admin bootstrap"),
    }

    let relay = RelayOutboxUseCase {
        outbox: state.outbox_repo(),
        hook: Delivery::from_webhook_url(config.sms_webhook_url.clone()),
    };
    tokio::spawn(relay.run(Duration::from_secs(config.outbox_poll_interval_secs.max(1))));

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.portal_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("portal service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
