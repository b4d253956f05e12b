use axum::routing::get;
use log::info;
use std::{
    env,
    net::{Ipv6Addr, SocketAddr},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

mod admin;
mod auth;
mod context;
mod docs;
mod errors;
mod events;
mod posters;
mod schemas;
mod serialized;
mod societies;

pub mod logging;

pub use context::{Hub, ServerContext};

/// The default port the server will listen on.
pub const DEFAULT_PORT: u16 = 9070;

pub type Router = axum::Router<ServerContext>;

/// Starts the campushub server
pub async fn run_server(context: ServerContext) {
    let port = env::var("CAMPUSHUB_SERVER_PORT")
        .map(|x| x.parse::<u16>().expect("Port must be a number"))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = (Ipv6Addr::UNSPECIFIED, port).into();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let poster_root = context.posters.root().to_path_buf();

    let version_one_router = Router::new()
        .nest("/auth", auth::router())
        .nest("/events", events::router())
        .nest("/societies", societies::router())
        .nest("/admin", admin::router())
        .nest("/posters", posters::router())
        .route("/registrations", get(events::my_registrations));

    let root_router = Router::new()
        .nest("/v1", version_one_router)
        .route("/api.json", get(docs::docs))
        .nest_service("/posters", ServeDir::new(poster_root))
        .layer(cors)
        .with_state(context);

    let listener = TcpListener::bind(&addr).await.expect("listens on address");

    info!("Listening on {addr}");

    axum::serve(listener, root_router.into_make_service())
        .await
        .expect("server runs");
}
