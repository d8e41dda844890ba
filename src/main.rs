mod db;
mod imagegen;
mod llm;
mod localization;
mod mailer;
mod pricing;
mod rate_limit;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()
        .expect("invalid PORT");

    let pool = db::init_pool(&database_url)
        .await
        .expect("database init failed");

    // Outbound integrations are all optional: a missing config disables the
    // feature instead of blocking startup.
    let llm = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "LLM client initialized");
            Some(Arc::new(client) as Arc<dyn llm::LlmChat>)
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured — copywriting disabled");
            None
        }
    };
    let imagegen = match imagegen::OpenAiImageClient::from_env() {
        Ok(client) => Some(Arc::new(client) as Arc<dyn imagegen::ImageGen>),
        Err(e) => {
            tracing::warn!(error = %e, "image generation not configured — venue images disabled");
            None
        }
    };
    let mailer = match mailer::ResendMailer::from_env() {
        Ok(client) => Some(Arc::new(client) as Arc<dyn mailer::Mailer>),
        Err(_) => {
            tracing::warn!("mailer not configured — outbound email disabled");
            None
        }
    };

    let state = state::AppState::new(pool, llm, imagegen, mailer);

    // Background worker: notification outbox + time-driven booking state.
    let _worker = services::notify::spawn_outbox_worker(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "party2book listening");
    axum::serve(listener, app).await.expect("server failed");
}
