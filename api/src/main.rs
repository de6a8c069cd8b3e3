use std::sync::Arc;

use actix_web::{web, HttpServer};
use dotenvy::dotenv;
use log::{error, info, warn};

use sb_api::app::create_app;
use sb_api::state::AppState;
use sb_api::workers::spawn_workers;
use sb_core::repositories::{BlacklistRepository, SettingsRepository};
use sb_core::services::resilience::{restore_on_startup, HealthMonitor};
use sb_core::settings::{SettingsHandle, SettingsSnapshot};
use sb_core::stores::BlacklistStore;
use sb_infra::cache::{RedisClient, RedisStore};
use sb_infra::database::mysql::{
    MySqlAuditLogRepository, MySqlBlacklistRepository, MySqlPendingSmsRepository,
    MySqlPowerDownRepository, MySqlSettingsRepository,
};
use sb_infra::database::DatabasePool;
use sb_infra::sync::HttpSyncBackend;
use sb_shared::config::AppConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting SMS Bridge API server");

    let config = AppConfig::from_env();
    let bind_address = config.server.bind_address();

    // Durable store first: settings and the blacklist live there
    let db_pool = DatabasePool::new(config.database.clone())
        .await
        .unwrap_or_else(|e| {
            error!("Could not connect to the durable store: {}", e);
            std::process::exit(1);
        });
    let pool = db_pool.get_pool().clone();

    let redis_client = RedisClient::new(config.cache.clone())
        .await
        .unwrap_or_else(|e| {
            error!("Could not connect to the fast store: {}", e);
            std::process::exit(1);
        });
    let store = Arc::new(RedisStore::new(redis_client));

    let audit_repo = Arc::new(MySqlAuditLogRepository::new(pool.clone()));
    let power_down_repo = Arc::new(MySqlPowerDownRepository::new(pool.clone()));
    let pending_repo = Arc::new(MySqlPendingSmsRepository::new(pool.clone()));
    let blacklist_repo = MySqlBlacklistRepository::new(pool.clone());
    let settings_repo = MySqlSettingsRepository::new(pool.clone());

    // Active settings row, or defaults plus environment overrides
    let snapshot = match settings_repo.load_active().await {
        Ok(Some(snapshot)) => {
            info!("Loaded settings version {}", snapshot.version);
            snapshot
        }
        Ok(None) => {
            warn!("No active settings row; using defaults with environment overrides");
            bootstrap_settings()
        }
        Err(e) => {
            error!("Could not load settings: {}", e);
            std::process::exit(1);
        }
    };
    let monitor = Arc::new(HealthMonitor::new(
        snapshot.probe_failure_threshold,
        snapshot.probe_recovery_threshold,
    ));
    let settings = Arc::new(SettingsHandle::new(snapshot));

    // Replay any power-down records left over from a previous outage
    match restore_on_startup(store.as_ref(), power_down_repo.as_ref()).await {
        Ok(0) => {}
        Ok(restored) => info!("Restored {} fast-store keys from power-down records", restored),
        Err(e) => warn!("Startup restore failed, records kept for recovery: {}", e),
    }

    // The durable blacklist table is authoritative; rebuild the fast-store
    // set from it on every startup
    match blacklist_repo.all_mobiles().await {
        Ok(mobiles) => {
            let count = mobiles.len();
            if let Err(e) = store.replace_blacklist(&mobiles).await {
                warn!("Could not mirror blacklist into the fast store: {}", e);
            } else {
                info!("Mirrored {} blacklisted mobiles into the fast store", count);
            }
        }
        Err(e) => warn!("Could not load the blacklist table: {}", e),
    }

    let backend = Arc::new(HttpSyncBackend::new(settings.clone()).unwrap_or_else(|e| {
        error!("Could not build the sync backend client: {}", e);
        std::process::exit(1);
    }));

    let state = web::Data::new(AppState::new(
        store,
        backend,
        audit_repo,
        power_down_repo,
        pending_repo,
        Arc::new(db_pool),
        settings,
        monitor,
    ));

    spawn_workers(&state);

    info!("Server binding to {}", bind_address);
    let app_state = state.clone();
    HttpServer::new(move || create_app(app_state.clone()))
        .bind(&bind_address)?
        .run()
        .await
}

/// Defaults with environment overrides, used until an administrator
/// publishes a settings row
fn bootstrap_settings() -> SettingsSnapshot {
    let mut snapshot = SettingsSnapshot::default();
    if let Ok(secret) = std::env::var("HMAC_SECRET") {
        snapshot.hmac_secret = secret;
    }
    if let Ok(receiver) = std::env::var("SMS_RECEIVER_NUMBER") {
        snapshot.sms_receiver_number = receiver;
    }
    if let Ok(url) = std::env::var("SYNC_URL") {
        snapshot.sync_url = url;
    }
    if let Ok(url) = std::env::var("RECOVERY_URL") {
        snapshot.recovery_url = url;
    }
    snapshot
}
