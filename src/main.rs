use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;

use rosterbot::appwrite::Databases;
use rosterbot::cli::{Cli, Commands};
use rosterbot::config::Config;
use rosterbot::maintenance;
use rosterbot::sheets::{self, SheetsClient};
use rosterbot::storage::MemberStore;
use rosterbot::telegram::{create_bot, schema, setup_bot_commands, webhook, HandlerDeps};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    pretty_env_logger::init();

    // Load environment variables from .env if present
    let _ = dotenv();

    match cli.command {
        Some(Commands::Run { webhook }) => run_bot(webhook).await,
        Some(Commands::FetchSheet {
            spreadsheet,
            range,
            out,
            info,
        }) => run_fetch_sheet(&spreadsheet, &range, out.as_deref(), info).await,
        Some(Commands::CheckCollection) => {
            let config = Config::from_env()?;
            maintenance::check_collection(&config).await
        }
        Some(Commands::InitCollection) => {
            let config = Config::from_env()?;
            maintenance::init_collection(&config).await
        }
        Some(Commands::VerifyMembers) => {
            let config = Config::from_env()?;
            maintenance::verify_members(&config).await
        }
        None => {
            // No command specified - default to running the bot
            log::info!("No command specified, running bot in long polling mode");
            run_bot(false).await
        }
    }
}

/// Run the Telegram bot
async fn run_bot(use_webhook: bool) -> Result<()> {
    let config = Config::from_env()?;
    log::info!("Configuration loaded");

    let bot = create_bot(&config.telegram_bot_token)?;

    let bot_info = bot.get_me().await?;
    let bot_username = bot_info.username.clone();
    log::info!("Bot username: {:?}, bot ID: {}", bot_username, bot_info.id);

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let databases = Databases::new(
        &config.appwrite_endpoint,
        &config.appwrite_project_id,
        &config.appwrite_api_key,
    );
    let store = Arc::new(MemberStore::new(
        databases,
        &config.appwrite_database_id,
        &config.appwrite_collection_id,
    ));
    log::info!("Member store initialized");

    let deps = HandlerDeps::new(Arc::clone(&store), bot_username);
    let handler = schema(deps);

    let error_handler = LoggingErrorHandler::with_custom_text("An error from the update listener");

    if use_webhook {
        let Some(base) = config.webhook_base.clone() else {
            return Err(anyhow::anyhow!("VERCEL_URL must be set for webhook mode"));
        };

        log::info!("Starting bot in webhook mode behind {}", base);
        let listener = webhook::webhook_listener(bot.clone(), &base, config.port).await?;
        let bot_cleanup = bot.clone();

        Dispatcher::builder(bot, handler)
            .dependencies(DependencyMap::new())
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(listener, error_handler)
            .await;

        log::info!("Shutting down, removing webhook");
        if let Err(e) = bot_cleanup.delete_webhook().await {
            log::warn!("Failed to delete webhook: {}", e);
        }
    } else {
        log::info!("Starting bot with long polling...");
        let listener = Polling::builder(bot.clone())
            .allowed_updates(webhook::allowed_updates())
            .drop_pending_updates()
            .build();

        Dispatcher::builder(bot, handler)
            .dependencies(DependencyMap::new())
            .enable_ctrlc_handler()
            .build()
            .dispatch_with_listener(listener, error_handler)
            .await;
    }

    Ok(())
}

/// Run the standalone Google Sheets fetcher
async fn run_fetch_sheet(spreadsheet: &str, range: &str, out: Option<&str>, info: bool) -> Result<()> {
    println!("Google Sheets Data Fetcher");
    println!("Target spreadsheet: {spreadsheet}");

    let client = SheetsClient::from_credential_search().await?;

    if info {
        let meta = client.spreadsheet_meta(spreadsheet).await?;
        println!();
        println!("Spreadsheet title: {}", meta.title());
        println!("Available sheets:");
        for (title, sheet_id) in meta.sheets() {
            println!("  - {title} (ID: {sheet_id})");
        }
    }

    let result = client.values_get(spreadsheet, range).await?;
    if result.values.is_empty() {
        println!("No data found in the sheet.");
        return Ok(());
    }

    println!();
    println!("Fetched {} rows from range {}", result.values.len(), result.range);
    sheets::display_rows(&result.values, 10);

    if let Some(path) = out {
        sheets::save_rows(&result.values, path)?;
        println!("Data saved to {path}");
    }

    Ok(())
}
