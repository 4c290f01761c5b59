//! Command handlers: /fetch_members, /stats, /verify.

use indoc::formatdoc;
use teloxide::prelude::*;
use teloxide::types::Chat;

use crate::storage::record::member_status;
use crate::storage::{MemberRecord, VerifyOutcome};

use super::types::{HandlerDeps, HandlerError};

const GROUP_ONLY_REPLY: &str = "This command can only be used in groups!";

fn is_group_chat(chat: &Chat) -> bool {
    chat.is_group() || chat.is_supergroup()
}

/// True when a membership status grants admin privileges.
fn is_admin_status(status: &str) -> bool {
    matches!(status, "creator" | "administrator")
}

/// Summary reply for a completed member fetch.
fn fetch_summary(stored: usize, total: u32) -> String {
    formatdoc! {"
        ✅ Member fetch complete!

        📊 Statistics:
        • Stored administrators: {stored}
        • Total group members: {total}
        • Regular members: {regular}

        Regular members cannot be listed through the Bot API. They are captured automatically when they join, leave, change status or post in the group.",
        regular = i64::from(total) - stored as i64,
    }
}

/// Reply for /stats.
fn stats_summary(title: &str, chat_id: ChatId, total: &str) -> String {
    formatdoc! {"
        📈 Member statistics

        👥 Group: {title}
        • Chat ID: {chat_id}
        • Total members: {total}

        💾 Members are captured when they join or leave, change status, post a message or use bot commands."
    }
}

/// `/fetch_members`: store every administrator of the group.
///
/// Regular members are not enumerable through the Bot API, so this command
/// stores the subset the API does expose: the administrator list. Everyone
/// else is captured passively over time.
pub async fn handle_fetch_members(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat = &msg.chat;
    if !is_group_chat(chat) {
        bot.send_message(chat.id, GROUP_ONLY_REPLY).await?;
        return Ok(());
    }

    // Best effort: refuse non-admins when the lookup works, proceed when the
    // lookup itself fails.
    if let Some(user) = msg.from.as_ref() {
        match bot.get_chat_member(chat.id, user.id).await {
            Ok(member) => {
                if !is_admin_status(member_status(&member.kind)) {
                    bot.send_message(chat.id, "Only group administrators can use this command!")
                        .await?;
                    return Ok(());
                }
            }
            Err(e) => log::warn!("Could not check admin status for user {}: {}", user.id, e),
        }
    }

    bot.send_message(chat.id, "Fetching all group members... This may take a moment.")
        .await?;

    let stored = fetch_group_admins(bot, chat, deps).await?;

    match bot.get_chat_member_count(chat.id).await {
        Ok(total) => {
            bot.send_message(chat.id, fetch_summary(stored, total)).await?;
        }
        Err(e) => {
            log::warn!("Could not get member count for chat {}: {}", chat.id, e);
            bot.send_message(
                chat.id,
                format!("✅ Successfully stored {stored} administrators! Regular members will be captured as they interact."),
            )
            .await?;
        }
    }

    Ok(())
}

/// Enumerate and store the chat administrators, skipping other bots.
///
/// A store failure for one administrator is logged and does not stop the
/// enumeration.
async fn fetch_group_admins(bot: &Bot, chat: &Chat, deps: &HandlerDeps) -> Result<usize, HandlerError> {
    let admins = bot.get_chat_administrators(chat.id).await?;
    log::info!("Found {} administrators in chat {}", admins.len(), chat.id);

    let mut stored = 0;
    for admin in &admins {
        let user = &admin.user;
        if user.is_bot && user.username.as_deref() != deps.bot_username.as_deref() {
            continue;
        }

        let status = member_status(&admin.kind);
        let record = MemberRecord::from_admin(user, status, chat);
        match deps.store.upsert(&record).await {
            Ok(()) => {
                stored += 1;
                log::info!(
                    "Stored admin {} (@{}) with status {}",
                    user.first_name,
                    user.username.as_deref().unwrap_or(""),
                    status,
                );
            }
            Err(e) => log::error!("Failed to store admin {} in chat {}: {}", record.user_id, chat.id, e),
        }
    }

    Ok(stored)
}

/// `/stats`: read-only member statistics for the group.
///
/// Reports the live count from Telegram; the stored collection is not
/// queried here.
pub async fn handle_stats(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    let chat = &msg.chat;
    if !is_group_chat(chat) {
        bot.send_message(chat.id, GROUP_ONLY_REPLY).await?;
        return Ok(());
    }

    let total = match bot.get_chat_member_count(chat.id).await {
        Ok(count) => count.to_string(),
        Err(e) => {
            log::warn!("Could not get member count for chat {}: {}", chat.id, e);
            "Unknown".to_string()
        }
    };

    bot.send_message(chat.id, stats_summary(chat.title().unwrap_or_default(), chat.id, &total))
        .await?;
    Ok(())
}

/// `/verify`: flag the invoking user as wishlist-verified.
///
/// A known user gets a two-field patch; an unknown user gets a full record
/// created with the flag already set, so the flag is never written in two
/// steps.
pub async fn handle_verify(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat = &msg.chat;
    if !is_group_chat(chat) {
        bot.send_message(chat.id, "This command can only be used in the main group.")
            .await?;
        return Ok(());
    }
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    let fallback = MemberRecord::verified(user, chat);
    match deps.store.verify_user(&fallback).await? {
        VerifyOutcome::Updated => {
            log::info!(
                "Verified user {} (@{}) for wishlist",
                user.first_name,
                user.username.as_deref().unwrap_or(""),
            );
            bot.send_message(
                chat.id,
                format!(
                    "✅ {}, you are now verified! You can now submit your wishlist on the website.",
                    user.first_name
                ),
            )
            .await?;
        }
        VerifyOutcome::Created => {
            log::info!("User {} was not stored yet; created a verified record", fallback.user_id);
            bot.send_message(
                chat.id,
                format!(
                    "✅ {}, you have been successfully verified! You can now submit your wishlist.",
                    user.first_name
                ),
            )
            .await?;
        }
    }

    Ok(())
}
