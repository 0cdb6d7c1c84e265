use cryptorelay::{app, auth::password::hash_password, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // `cryptorelay hash-password <plain>` prints a value for AUTH_PASSWORD_HASH.
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let [cmd, plain] = args.as_slice() {
        if cmd == "hash-password" {
            println!("{}", hash_password(plain)?);
            return Ok(());
        }
    }

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "cryptorelay=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let (app_state, db) = AppState::init().await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    app::serve(app::build_app(app_state)).await
}
