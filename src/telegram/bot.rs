//! Bot initialization and command definitions.

use std::time::Duration;

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

/// Timeout for Bot API calls. Long polling keeps a request open for up to
/// 30 seconds, so the client timeout has to sit above that.
const API_TIMEOUT: Duration = Duration::from_secs(60);

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Copy, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "store every visible group member in the database")]
    FetchMembers,
    #[command(description = "show member statistics for this group")]
    Stats,
    #[command(description = "verify yourself for wishlist submission")]
    Verify,
}

/// Creates a Bot instance from the validated configuration.
pub fn create_bot(token: &str) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(API_TIMEOUT).build()?;
    Ok(Bot::with_client(token, client))
}

/// Registers the command list shown in the Telegram UI.
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}
