use library_circulation::{
    adapters::{
        memory::{CatalogSeed, InMemoryCirculationStore},
        postgres::PostgresCirculationStore,
    },
    api::{handlers::AppState, router::create_router},
    application::circulation::ServiceDependencies,
    config::AppConfig,
    ports::CirculationStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 設定に応じてストアを構築する
///
/// `DATABASE_URL`があればPostgreSQL（マイグレーション実行済み）、なければインメモリ。
/// シードファイルが指定されていれば、どちらのストアにも投入する。
async fn build_store(config: &AppConfig) -> Result<Arc<dyn CirculationStore>, BoxError> {
    let seed = config
        .seed_path
        .as_deref()
        .map(CatalogSeed::load)
        .transpose()?;

    let Some(database_url) = config.database_url.as_deref() else {
        tracing::info!("DATABASE_URL not set, using in-memory store");
        let store = match seed {
            Some(seed) => InMemoryCirculationStore::with_seed(seed),
            None => InMemoryCirculationStore::new(),
        };
        return Ok(Arc::new(store));
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    let store = PostgresCirculationStore::new(pool);
    if let Some(seed) = seed {
        for book in &seed.books {
            store.save_book(book).await?;
        }
        for member in &seed.members {
            store.save_member(member).await?;
        }
        tracing::info!(
            books = seed.books.len(),
            members = seed.members.len(),
            "Seed data loaded"
        );
    }

    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_circulation=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        history = config.circulation.history.as_str(),
        "Loan history policy"
    );

    let store = build_store(&config).await?;
    let service_deps = ServiceDependencies::new(store, config.circulation);
    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
