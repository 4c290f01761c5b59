//! Live smoke test against the real Telegram API.
//!
//! Ignored by default. Needs TELEGRAM_BOT_TOKEN and TELEGRAM_GROUP_ID set
//! (the bot must be a member of that group).
//!
//! Run with: cargo test --test live_group_test -- --ignored

use teloxide::prelude::*;

#[tokio::test]
#[ignore = "requires TELEGRAM_BOT_TOKEN and TELEGRAM_GROUP_ID"]
async fn fetches_group_administrators() {
    let _ = dotenvy::dotenv();

    let token = std::env::var("TELEGRAM_BOT_TOKEN").expect("TELEGRAM_BOT_TOKEN not set");
    let group_id: i64 = std::env::var("TELEGRAM_GROUP_ID")
        .expect("TELEGRAM_GROUP_ID not set")
        .parse()
        .expect("TELEGRAM_GROUP_ID must be a numeric chat id");

    let bot = Bot::new(token);

    let me = bot.get_me().await.expect("get_me failed");
    println!("Connected as @{}", me.username.as_deref().unwrap_or("?"));

    let admins = bot
        .get_chat_administrators(ChatId(group_id))
        .await
        .expect("get_chat_administrators failed");
    assert!(!admins.is_empty(), "a group always has at least one administrator");

    for admin in &admins {
        println!("admin: {} (id {})", admin.user.first_name, admin.user.id);
    }

    let count = bot
        .get_chat_member_count(ChatId(group_id))
        .await
        .expect("get_chat_member_count failed");
    assert!(count as usize >= admins.len());
}
