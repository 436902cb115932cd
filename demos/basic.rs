//! Facebook-login style flow with a shared session across subdomains
//!
//! Point several hostnames under one domain at this server (for example
//! `www.localtest.me` and `app.localtest.me`, which resolve to 127.0.0.1)
//! and watch the OAuth state follow the visitor between them.

use salvo::prelude::*;
use salvo_shared_session::{
    AppClient, MemoryStore, PersistentStorage, SessionConfig, SessionDepotExt, SessionHandler,
    SharedSessionClient, SharedSessionConfig,
};
use serde_json::json;
use uuid::Uuid;

const APP_ID: &str = "12345";
const APP_SECRET: &str = "your-app-secret";

fn shared_client(
    req: &Request,
    depot: &Depot,
) -> SharedSessionClient<AppClient, salvo_shared_session::SessionStorage> {
    let storage = depot
        .session_storage()
        .expect("Session not found")
        .with_namespace(&format!("fb_{}", APP_ID));
    let cookies = depot.response_cookies().expect("Cookies not found");
    let client = AppClient::from_request(APP_ID, APP_SECRET, req).with_base_domain("localtest.me");

    SharedSessionClient::bootstrap(client, storage, cookies, SharedSessionConfig::default())
}

#[handler]
async fn index(req: &mut Request, depot: &mut Depot) -> String {
    let shared = shared_client(req, depot);
    let token = shared.get_persistent_data_or("access_token", json!(null));

    format!(
        "Shared session: {} ({:?})\nState: {:?}\nAccess token: {}",
        shared.shared_session_id(),
        shared.outcome(),
        shared.state(),
        token
    )
}

#[handler]
async fn login(req: &mut Request, depot: &mut Depot) -> String {
    let mut shared = shared_client(req, depot);
    let state = Uuid::new_v4().simple().to_string();
    shared.set_persistent_data("state", json!(state));

    format!("Redirect to the dialog with state={}", state)
}

#[handler]
async fn callback(req: &mut Request, depot: &mut Depot) -> String {
    let mut shared = shared_client(req, depot);
    let returned = req.query::<String>("state").unwrap_or_default();

    if shared.state() != Some(returned.as_str()) {
        return "CSRF state mismatch".to_string();
    }
    shared
        .set_persistent_data("code", json!(req.query::<String>("code")))
        .set_persistent_data("access_token", json!("token-from-code"))
        .clear_persistent_data("state");

    "Logged in".to_string()
}

#[handler]
async fn logout(req: &mut Request, depot: &mut Depot) -> &'static str {
    shared_client(req, depot).clear_all_persistent_data();
    "Logged out"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = SessionConfig::new("your-super-secret-key-change-in-production")
        .with_max_age(3600)
        .with_cookie_domain("localtest.me");

    let router = Router::new()
        .hoop(SessionHandler::new(MemoryStore::new(), config))
        .get(index)
        .push(Router::with_path("login").get(login))
        .push(Router::with_path("callback").get(callback))
        .push(Router::with_path("logout").get(logout));

    let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
    println!("Server running at http://www.localtest.me:5800");
    println!("  GET /          - Show shared session");
    println!("  GET /login     - Start login, persist state");
    println!("  GET /callback?state=..&code=.. - Finish login");
    println!("  GET /logout    - Clear OAuth data and the shared cookie");

    Server::new(acceptor).serve(router).await;
}
