use draft_engine::{
    config::{database, draft},
    core::{engine::DraftEngine, pool::PoolFilter},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();

    // 3. Load draft defaults and the optional pool to seed
    let config = draft::load_default_config()
        .inspect_err(|e| error!("Failed to load draft configuration: {}", e))?;
    info!(
        total_points = config.draft.total_points,
        total_rounds = config.draft.total_rounds,
        style = %config.draft.style,
        "Loaded draft configuration"
    );

    // 4. Connect and create the schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    let engine = DraftEngine::new(db, config.draft.clone());

    // 5. Seed the configured season's pool
    if let Some(season_id) = config.season_id {
        let inserted = engine.seed_pool(season_id, &config.pool).await?;
        let available = engine
            .available_entities(season_id, &PoolFilter::default())
            .await?;
        let active = engine.get_active_session(season_id).await?;
        info!(
            season_id,
            inserted,
            available = available.len(),
            active_session = active.map(|s| s.id),
            "Draft pool ready"
        );
    } else {
        info!("No season_id configured, skipping pool seeding");
    }

    Ok(())
}
