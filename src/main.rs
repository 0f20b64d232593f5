use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use gathering_backend::{
    AppState,
    config::Config,
    middleware::{RateLimiter, log_errors, rate_limit},
    routes,
};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::broadcast;
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

    // 加载配置，缺少必填环境变量时直接退出
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'gathering_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");

    // 执行迁移
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Redis 只负责限流计数
    let redis_client =
        redis::Client::open(config.redis_url.clone()).expect("Failed to create Redis client");

    // participants 插入事件的广播通道，WebSocket 订阅端从这里收
    let (events, _) = broadcast::channel(256);

    let state = AppState {
        pool,
        config: config.clone(),
        http: reqwest::Client::new(),
        events,
    };

    let rate_limiter = Arc::new(RateLimiter::new(redis_client, config.clone()));

    let api_routes = Router::new()
        // 聚会路由
        .route(
            "/gatherings/create",
            post(routes::gathering::create_gathering),
        )
        .route(
            "/gatherings/by-short-id",
            get(routes::gathering::find_by_short_id),
        )
        .route("/gatherings/join", post(routes::gathering::join_gathering))
        .route(
            "/gatherings/common-dates",
            get(routes::gathering::common_dates),
        )
        .route(
            "/gatherings/recommendations",
            get(routes::recommendation::recommendations),
        )
        .route("/gatherings/subscribe", get(routes::realtime::subscribe))
        // 地点搜索代理
        .route("/places/search", get(routes::place::search_places))
        // 前端启动配置
        .route("/app-config", get(routes::bootstrap::client_config));

    let router = Router::new().nest(&config.api_base_uri.clone(), api_routes);

    // 日志中间件与限流中间件
    let router = router.layer(axum::middleware::from_fn(log_errors)).layer(
        axum::middleware::from_fn_with_state(rate_limiter, rate_limit),
    );

    // 开发模式下放开 CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
