//! The member record written to the collection.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use teloxide::types::{Chat, ChatMemberKind, ChatMemberUpdated, User};

/// Derives the document id for a user.
///
/// The id is a pure function of the Telegram user id, which makes every
/// write keyed: a second write for the same user always lands on the same
/// document instead of creating a duplicate.
pub fn document_id(user_id: i64) -> String {
    format!("user_{user_id}")
}

/// Membership status string as stored in the collection.
///
/// Values follow the Bot API vocabulary (`member`, `administrator`,
/// `creator`, `restricted`, `left`, `kicked`).
pub fn member_status(kind: &ChatMemberKind) -> &'static str {
    if kind.is_owner() {
        "creator"
    } else if kind.is_administrator() {
        "administrator"
    } else if kind.is_restricted() {
        "restricted"
    } else if kind.is_left() {
        "left"
    } else if kind.is_banned() {
        "kicked"
    } else if kind.is_member() {
        "member"
    } else {
        "unknown"
    }
}

/// Chat type string as stored in the collection.
pub fn chat_type(chat: &Chat) -> &'static str {
    if chat.is_private() {
        "private"
    } else if chat.is_group() {
        "group"
    } else if chat.is_supergroup() {
        "supergroup"
    } else {
        "channel"
    }
}

fn user_id_of(user: &User) -> i64 {
    i64::try_from(user.id.0).unwrap_or(0)
}

/// A member row as written to the collection.
///
/// Every write supplies the full field set. The store does not guarantee
/// attribute defaults on update, so optional Telegram fields are coerced to
/// empty strings instead of being left unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemberRecord {
    pub user_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_bot: bool,
    pub language_code: String,
    pub status: String,
    pub joined_at: String,
    pub phone_number: String,
    pub chat_id: String,
    pub chat_title: String,
    pub chat_type: String,
    pub old_status: String,
    pub new_status: String,
    pub updated_at: String,
    pub is_wishlist_verified: bool,
}

impl Default for MemberRecord {
    fn default() -> Self {
        Self {
            user_id: 0,
            username: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_bot: false,
            language_code: String::new(),
            status: "unknown".to_string(),
            joined_at: String::new(),
            phone_number: String::new(),
            chat_id: String::new(),
            chat_title: String::new(),
            chat_type: String::new(),
            old_status: "unknown".to_string(),
            new_status: "unknown".to_string(),
            updated_at: String::new(),
            is_wishlist_verified: false,
        }
    }
}

impl MemberRecord {
    fn build(user: &User, chat_id: String, chat_title: &str, chat_type: &str, status: &str, old_status: &str) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            user_id: user_id_of(user),
            username: user.username.clone().unwrap_or_default(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone().unwrap_or_default(),
            is_bot: user.is_bot,
            language_code: user.language_code.clone().unwrap_or_default(),
            status: status.to_string(),
            joined_at: now.clone(),
            phone_number: String::new(),
            chat_id,
            chat_title: chat_title.to_string(),
            chat_type: chat_type.to_string(),
            old_status: old_status.to_string(),
            new_status: status.to_string(),
            updated_at: now,
            is_wishlist_verified: false,
        }
    }

    /// Build a record from a membership change notification.
    pub fn from_chat_member_update(update: &ChatMemberUpdated) -> Self {
        let old_status = member_status(&update.old_chat_member.kind);
        let new_status = member_status(&update.new_chat_member.kind);
        Self::build(
            &update.new_chat_member.user,
            update.chat.id.to_string(),
            update.chat.title().unwrap_or_default(),
            chat_type(&update.chat),
            new_status,
            old_status,
        )
    }

    /// Build a record from a captured group message.
    ///
    /// Status is forced to `member`: whoever posts in the group is at least a
    /// member, even if the bot never saw them join.
    pub fn from_message(user: &User, chat: &Chat) -> Self {
        Self::build(
            user,
            chat.id.to_string(),
            chat.title().unwrap_or_default(),
            chat_type(chat),
            "member",
            "unknown",
        )
    }

    /// Build a record for an administrator returned by the enumeration call.
    pub fn from_admin(user: &User, status: &str, chat: &Chat) -> Self {
        Self::build(
            user,
            chat.id.to_string(),
            chat.title().unwrap_or_default(),
            chat_type(chat),
            status,
            "unknown",
        )
    }

    /// Record created directly by the verification flow; the verified flag is
    /// set before the record ever reaches the store.
    pub fn verified(user: &User, chat: &Chat) -> Self {
        let mut record = Self::from_message(user, chat);
        record.is_wishlist_verified = true;
        record
    }
}
