//! Dispatcher schema: routes updates to the member handlers.

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::ChatMemberUpdated;

use super::bot::Command;
use super::commands::{handle_fetch_members, handle_stats, handle_verify};
use super::members::{handle_chat_member_update, handle_group_message, is_capturable_group_message};
use super::types::{HandlerDeps, HandlerError};

/// Creates the dispatcher handler tree.
///
/// The same schema serves long-polling and webhook mode.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_members = deps.clone();
    let deps_commands = deps.clone();
    let deps_messages = deps;

    dptree::entry()
        .branch(chat_member_handler(deps_members))
        // Command handler must run before the passive message capture
        .branch(command_handler(deps_commands))
        .branch(group_message_handler(deps_messages))
}

/// Handler for membership change notifications (joins, leaves, promotions).
fn chat_member_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_chat_member().endpoint(move |update: ChatMemberUpdated| {
        let deps = deps.clone();
        async move {
            if let Err(e) = handle_chat_member_update(&update, &deps).await {
                // Passive path: one bad event must not take down the loop.
                log::error!(
                    "Error handling chat member update for user {} in chat {}: {}",
                    update.new_chat_member.user.id,
                    update.chat.id,
                    e,
                );
            }
            Ok(())
        }
    })
}

/// Handler for bot commands (/fetch_members, /stats, /verify)
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command {:?} from chat {}", cmd, msg.chat.id);

                let result = match cmd {
                    Command::FetchMembers => handle_fetch_members(&bot, &msg, &deps).await,
                    Command::Stats => handle_stats(&bot, &msg).await,
                    Command::Verify => handle_verify(&bot, &msg, &deps).await,
                };

                if let Err(e) = result {
                    log::error!("Command {:?} failed in chat {}: {}", cmd, msg.chat.id, e);
                    let _ = bot
                        .send_message(msg.chat.id, "❌ Something went wrong. Please try again or contact an admin.")
                        .await;
                }
                Ok(())
            }
        },
    ))
}

/// Handler for plain group messages (passive member capture).
fn group_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| is_capturable_group_message(&msg))
        .endpoint(move |msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_group_message(&msg, &deps).await {
                    log::error!("Error capturing member from message in chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}
