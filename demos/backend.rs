//! Stand-in customer backend for manual runs against the proxy.
//!
//! Answers every path with a greeting, the way the real customer site would
//! answer from behind the proxy.

use axum::{routing::any, Router};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    let app = Router::new()
        .route("/", any(greet))
        .route("/{*path}", any(greet));

    let addr = SocketAddr::from(([127, 0, 0, 1], 8081));
    println!("Demo customer backend listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn greet() -> &'static str {
    "Hello, have a nice day!\n"
}
