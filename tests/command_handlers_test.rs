//! Integration tests for the real command handlers with a mocked Telegram
//! API and a mocked Appwrite store.
//!
//! Run with: cargo test --test command_handlers_test

use std::sync::Arc;

use serde_json::{json, Value};
use teloxide::prelude::*;
use teloxide::types::Message;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rosterbot::appwrite::Databases;
use rosterbot::storage::MemberStore;
use rosterbot::telegram::commands::{handle_fetch_members, handle_stats};
use rosterbot::telegram::HandlerDeps;

const DB: &str = "main";
const COLL: &str = "members";

/// Bot pointed at the mock Telegram API.
fn mock_bot(telegram: &MockServer) -> Bot {
    Bot::new("1234567:TESTTOKEN").set_api_url(telegram.uri().parse().unwrap())
}

fn deps_for(appwrite: &MockServer) -> HandlerDeps {
    let db = Databases::new(&format!("{}/v1", appwrite.uri()), "proj", "key");
    let store = Arc::new(MemberStore::new(db, DB, COLL));
    HandlerDeps::new(store, Some("test_bot".to_string()))
}

fn group_command_message(text: &str, from_id: u64) -> Message {
    serde_json::from_value(json!({
        "message_id": 1,
        "date": 1735992000,
        "chat": { "id": -1001234, "type": "supergroup", "title": "Test Group" },
        "from": { "id": from_id, "is_bot": false, "first_name": "Ada", "username": "ada" },
        "text": text
    }))
    .unwrap()
}

fn private_command_message(text: &str) -> Message {
    serde_json::from_value(json!({
        "message_id": 1,
        "date": 1735992000,
        "chat": { "id": 42, "type": "private", "first_name": "Ada" },
        "from": { "id": 42, "is_bot": false, "first_name": "Ada", "username": "ada" },
        "text": text
    }))
    .unwrap()
}

fn sent_message_body(text: &str) -> Value {
    json!({
        "ok": true,
        "result": {
            "message_id": 99,
            "from": { "id": 987, "is_bot": true, "first_name": "RosterBot", "username": "test_bot" },
            "chat": { "id": -1001234, "type": "supergroup", "title": "Test Group" },
            "date": 1735992000,
            "text": text
        }
    })
}

async fn mock_send_message(telegram: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex("/bot[^/]+/[sS]endMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sent_message_body("ok")))
        .mount(telegram)
        .await;
}

fn admin_entry(id: u64, is_bot: bool, username: &str, status: &str) -> Value {
    let mut entry = json!({
        "user": { "id": id, "is_bot": is_bot, "first_name": username, "username": username },
        "status": status,
        "is_anonymous": false
    });
    if status == "administrator" {
        for key in [
            "can_be_edited",
            "can_manage_chat",
            "can_change_info",
            "can_delete_messages",
            "can_invite_users",
            "can_restrict_members",
            "can_pin_messages",
            "can_promote_members",
            "can_manage_video_chats",
            "can_post_stories",
            "can_edit_stories",
            "can_delete_stories",
        ] {
            entry[key] = Value::from(key != "can_be_edited");
        }
    }
    entry
}

#[tokio::test]
async fn fetch_members_in_private_chat_rejects_and_writes_nothing() {
    let telegram = MockServer::start().await;
    let appwrite = MockServer::start().await;
    mock_send_message(&telegram).await;

    let bot = mock_bot(&telegram);
    let deps = deps_for(&appwrite);
    let msg = private_command_message("/fetch_members");

    handle_fetch_members(&bot, &msg, &deps).await.unwrap();

    // One rejection reply, not a single call to the store.
    let telegram_requests = telegram.received_requests().await.unwrap();
    assert_eq!(telegram_requests.len(), 1);
    let reply: Value = serde_json::from_slice(&telegram_requests[0].body).unwrap();
    assert_eq!(reply["text"], json!("This command can only be used in groups!"));

    assert!(appwrite.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn stats_in_private_chat_rejects() {
    let telegram = MockServer::start().await;
    mock_send_message(&telegram).await;

    let bot = mock_bot(&telegram);
    let msg = private_command_message("/stats");

    handle_stats(&bot, &msg).await.unwrap();

    let telegram_requests = telegram.received_requests().await.unwrap();
    assert_eq!(telegram_requests.len(), 1);
}

// /stats is read-only by construction: the handler has no store access at
// all, so the "never queries the collection" property holds by signature.
#[tokio::test]
async fn stats_reports_live_count() {
    let telegram = MockServer::start().await;
    mock_send_message(&telegram).await;

    Mock::given(method("POST"))
        .and(path_regex("/bot[^/]+/[gG]etChatMemberCount"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": 120 })))
        .expect(1)
        .mount(&telegram)
        .await;

    let bot = mock_bot(&telegram);
    let msg = group_command_message("/stats", 42);

    handle_stats(&bot, &msg).await.unwrap();

    let telegram_requests = telegram.received_requests().await.unwrap();
    let reply: Value = telegram_requests
        .iter()
        .filter(|r| r.url.path().ends_with("endMessage"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .next()
        .unwrap();
    let text = reply["text"].as_str().unwrap();
    assert!(text.contains("Total members: 120"), "unexpected reply: {text}");
}

#[tokio::test]
async fn fetch_members_stores_admins_and_skips_other_bots() {
    let telegram = MockServer::start().await;
    let appwrite = MockServer::start().await;
    mock_send_message(&telegram).await;

    // Invoker is the group creator.
    Mock::given(method("POST"))
        .and(path_regex("/bot[^/]+/[gG]etChatMember$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": admin_entry(42, false, "ada", "creator")
        })))
        .mount(&telegram)
        .await;

    // One human creator, one human administrator, one foreign bot admin.
    Mock::given(method("POST"))
        .and(path_regex("/bot[^/]+/[gG]etChatAdministrators"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": [
                admin_entry(42, false, "ada", "creator"),
                admin_entry(43, false, "grace", "administrator"),
                admin_entry(900, true, "other_bot", "administrator"),
            ]
        })))
        .expect(1)
        .mount(&telegram)
        .await;

    Mock::given(method("POST"))
        .and(path_regex("/bot[^/]+/[gG]etChatMemberCount"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": 25 })))
        .mount(&telegram)
        .await;

    // Store: both human admins exist already, so updates succeed.
    Mock::given(method("PATCH"))
        .and(path_regex(format!("/v1/databases/{DB}/collections/{COLL}/documents/user_.*")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "$id": "user_x" })))
        .expect(2)
        .mount(&appwrite)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/databases/{DB}/collections/{COLL}/documents")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "$id": "user_x" })))
        .expect(0)
        .mount(&appwrite)
        .await;

    let bot = mock_bot(&telegram);
    let deps = deps_for(&appwrite);
    let msg = group_command_message("/fetch_members", 42);

    handle_fetch_members(&bot, &msg, &deps).await.unwrap();

    // Exactly the two human admins were written; the foreign bot was skipped.
    let writes: Vec<String> = appwrite
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(writes.len(), 2);
    assert!(writes.iter().any(|p| p.ends_with("user_42")));
    assert!(writes.iter().any(|p| p.ends_with("user_43")));
}

#[tokio::test]
async fn fetch_members_refuses_non_admin_invokers() {
    let telegram = MockServer::start().await;
    let appwrite = MockServer::start().await;
    mock_send_message(&telegram).await;

    Mock::given(method("POST"))
        .and(path_regex("/bot[^/]+/[gG]etChatMember$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "result": admin_entry(42, false, "ada", "member")
        })))
        .expect(1)
        .mount(&telegram)
        .await;

    let bot = mock_bot(&telegram);
    let deps = deps_for(&appwrite);
    let msg = group_command_message("/fetch_members", 42);

    handle_fetch_members(&bot, &msg, &deps).await.unwrap();

    let replies: Vec<Value> = telegram
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().ends_with("endMessage"))
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect();
    assert_eq!(replies.len(), 1);
    assert_eq!(
        replies[0]["text"],
        json!("Only group administrators can use this command!")
    );
    assert!(appwrite.received_requests().await.unwrap().is_empty());
}
