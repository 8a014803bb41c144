use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use clubhouse::{
    AppState,
    cache::{AppCache, MemoryCache, RedisCache},
    config::Config,
    database::PgAccessRepository,
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'clubhouse';").await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    // 设置缓存，未配置 Redis 时退回进程内缓存
    let cache = match &config.redis_url {
        Some(url) => {
            let redis_client =
                redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            tracing::info!("Using Redis cache");
            AppCache::Redis(RedisCache::new(
                Arc::new(redis_client),
                config.cache_namespace.clone(),
            ))
        }
        None => {
            tracing::warn!("REDIS_URL not set, membership cache is local to this process");
            AppCache::Memory(MemoryCache::new())
        }
    };

    // 设置应用状态
    let state = AppState {
        repo: PgAccessRepository::new(pool),
        config: Arc::new(config),
        cache,
    };
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );

    let router = routes::router(state).layer(TraceLayer::new_for_http());

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 启动服务器
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        router,
    )
    .await
    .expect("Failed to start server");
}
