//! Webhook shell: an axum server receiving Telegram updates.
//!
//! `POST /api/telegram` takes the raw update JSON and feeds it into the
//! dispatcher; `GET /` answers a static status payload for platform health
//! checks.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::routing::get;
use axum::Json;
use serde_json::json;
use teloxide::prelude::*;
use teloxide::types::AllowedUpdate;
use teloxide::update_listeners::{webhooks, UpdateListener};
use url::Url;

/// Path the webhook is registered under.
pub const WEBHOOK_PATH: &str = "/api/telegram";

/// Updates the bot subscribes to. `ChatMember` has to be requested
/// explicitly; Telegram does not deliver it by default.
pub fn allowed_updates() -> Vec<AllowedUpdate> {
    vec![AllowedUpdate::Message, AllowedUpdate::ChatMember]
}

/// GET /, static status payload.
async fn index() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Telegram bot is running." }))
}

/// Builds the webhook update listener and starts the HTTP server.
///
/// The webhook is registered with Telegram explicitly instead of through
/// teloxide's own setup, because the setup call cannot request chat_member
/// updates. The teloxide router answers 200 for dispatched updates and 500
/// when an update cannot be handed to the dispatcher.
pub async fn webhook_listener(
    bot: Bot,
    base_url: &str,
    port: u16,
) -> anyhow::Result<impl UpdateListener<Err = Infallible>> {
    let url: Url = format!("{}{}", base_url.trim_end_matches('/'), WEBHOOK_PATH).parse()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let (listener, stop_flag, router) = webhooks::axum_no_setup(webhooks::Options::new(addr, url.clone()));
    let router = router.route("/", get(index));

    bot.set_webhook(url.clone())
        .allowed_updates(allowed_updates())
        .drop_pending_updates(true)
        .await?;
    log::info!("Webhook set to {}", url);

    let tcp = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Webhook server listening on {}", addr);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp, router).with_graceful_shutdown(stop_flag).await {
            log::error!("Webhook server error: {}", e);
        }
    });

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_reports_static_status() {
        let Json(body) = index().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Telegram bot is running.");
    }

    #[test]
    fn webhook_url_joins_cleanly() {
        let url: Url = format!("{}{}", "https://bot.example.com/".trim_end_matches('/'), WEBHOOK_PATH)
            .parse()
            .unwrap();
        assert_eq!(url.as_str(), "https://bot.example.com/api/telegram");
    }
}
