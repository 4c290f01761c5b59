//! Passive member capture: membership changes and group messages.

use teloxide::prelude::*;
use teloxide::types::ChatMemberUpdated;

use crate::appwrite::AppwriteError;
use crate::storage::MemberRecord;

use super::types::HandlerDeps;

/// Store a membership change notification.
///
/// Every transition goes through unfiltered: joins, leaves, promotions and
/// service-generated changes all land in the same trail.
pub async fn handle_chat_member_update(update: &ChatMemberUpdated, deps: &HandlerDeps) -> Result<(), AppwriteError> {
    let user = &update.new_chat_member.user;
    let record = MemberRecord::from_chat_member_update(update);
    log::info!(
        "Chat member update: user {} (id {}) status changed from {} to {} in chat {}",
        user.username.as_deref().unwrap_or(&user.first_name),
        record.user_id,
        record.old_status,
        record.new_status,
        update.chat.title().unwrap_or(&record.chat_id),
    );

    deps.store.upsert(&record).await
}

/// True for messages worth capturing: plain text in a group or supergroup,
/// written by a human, and not a command.
pub fn is_capturable_group_message(msg: &Message) -> bool {
    let from_human = msg.from.as_ref().map(|u| !u.is_bot).unwrap_or(false);
    let in_group = msg.chat.is_group() || msg.chat.is_supergroup();
    let plain_text = msg.text().map(|t| !t.starts_with('/')).unwrap_or(false);
    from_human && in_group && plain_text
}

/// Capture member data from a group message.
///
/// Backfills members the bot never saw join: the bot may have been added
/// after them, and regular members cannot be enumerated through the Bot API.
pub async fn handle_group_message(msg: &Message, deps: &HandlerDeps) -> Result<(), AppwriteError> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    log::info!(
        "Capturing member data from message: {} (@{}) in {}",
        user.first_name,
        user.username.as_deref().unwrap_or(""),
        msg.chat.title().unwrap_or_default(),
    );

    let record = MemberRecord::from_message(user, &msg.chat);
    deps.store.upsert(&record).await
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn message(chat_type: &str, from_bot: bool, text: Option<&str>) -> Message {
        let chat_id: i64 = if chat_type == "private" { 42 } else { -1001 };
        let mut body = json!({
            "message_id": 1,
            "date": 1700000000,
            "chat": { "id": chat_id, "type": chat_type },
            "from": { "id": 7, "is_bot": from_bot, "first_name": "Ada" }
        });
        if chat_type != "private" {
            body["chat"]["title"] = Value::from("Test Group");
        }
        match text {
            Some(text) => body["text"] = Value::from(text),
            // No text: make it a photo message so it still deserializes
            None => {
                body["photo"] = json!([{
                    "file_id": "f1", "file_unique_id": "u1", "width": 1, "height": 1
                }]);
            }
        }
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn captures_plain_text_in_groups() {
        assert!(is_capturable_group_message(&message("supergroup", false, Some("hello"))));
        assert!(is_capturable_group_message(&message("group", false, Some("hello"))));
    }

    #[test]
    fn ignores_private_chats() {
        assert!(!is_capturable_group_message(&message("private", false, Some("hello"))));
    }

    #[test]
    fn ignores_bot_senders() {
        assert!(!is_capturable_group_message(&message("supergroup", true, Some("hello"))));
    }

    #[test]
    fn ignores_commands_and_non_text() {
        assert!(!is_capturable_group_message(&message("supergroup", false, Some("/stats"))));
        assert!(!is_capturable_group_message(&message("supergroup", false, None)));
    }
}
