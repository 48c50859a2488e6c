use std::env;

use blockfall::api::{resolve_addr, router};
use blockfall::store::ScoreStore;

#[tokio::main]
async fn main() {
    let store = ScoreStore::from_env();
    println!("score store at {}", store.path().display());

    let app = router(store);
    let addr = resolve_addr(|k| env::var(k).ok());
    println!("score service listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind score service");

    axum::serve(listener, app)
        .await
        .expect("serve score service");
}
