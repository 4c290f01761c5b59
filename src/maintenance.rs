//! One-off maintenance commands for the Appwrite collection.
//!
//! These are operational tools, not part of the bot runtime: they print
//! human-readable reports to stdout and exit.

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;

use crate::appwrite::Databases;
use crate::config::Config;
use crate::storage::{MemberDocument, MemberStore};

#[derive(Debug, Clone, Copy)]
enum AttrKind {
    String { size: u32 },
    Boolean,
    Integer,
}

impl AttrKind {
    fn type_name(self) -> &'static str {
        match self {
            AttrKind::String { .. } => "string",
            AttrKind::Boolean => "boolean",
            AttrKind::Integer => "integer",
        }
    }
}

/// The attribute schema the bot expects on the member collection.
const MEMBER_SCHEMA: [(&str, AttrKind); 16] = [
    ("user_id", AttrKind::Integer),
    ("username", AttrKind::String { size: 255 }),
    ("first_name", AttrKind::String { size: 255 }),
    ("last_name", AttrKind::String { size: 255 }),
    ("is_bot", AttrKind::Boolean),
    ("language_code", AttrKind::String { size: 50 }),
    ("status", AttrKind::String { size: 50 }),
    ("joined_at", AttrKind::String { size: 50 }),
    ("phone_number", AttrKind::String { size: 50 }),
    ("chat_id", AttrKind::String { size: 255 }),
    ("chat_title", AttrKind::String { size: 255 }),
    ("chat_type", AttrKind::String { size: 50 }),
    ("old_status", AttrKind::String { size: 50 }),
    ("new_status", AttrKind::String { size: 50 }),
    ("updated_at", AttrKind::String { size: 50 }),
    ("is_wishlist_verified", AttrKind::Boolean),
];

fn databases(config: &Config) -> Databases {
    Databases::new(
        &config.appwrite_endpoint,
        &config.appwrite_project_id,
        &config.appwrite_api_key,
    )
}

/// Inspect the collection and report which member attributes are missing.
pub async fn check_collection(config: &Config) -> Result<()> {
    let db = databases(config);

    println!("Checking collection attributes...");
    println!("Database ID: {}", config.appwrite_database_id);
    println!("Collection ID: {}", config.appwrite_collection_id);

    let collection = db
        .get_collection(&config.appwrite_database_id, &config.appwrite_collection_id)
        .await?;

    println!();
    println!("Collection name: {}", collection.name);
    println!("Collection ID: {}", collection.id);
    println!("Total attributes: {}", collection.attributes.len());
    println!();
    println!("Existing attributes:");
    for attr in &collection.attributes {
        println!("  - {} ({}) - required: {}", attr.key, attr.kind, attr.required);
    }

    let existing: HashSet<&str> = collection.attributes.iter().map(|a| a.key.as_str()).collect();
    let missing: Vec<(&str, AttrKind)> = MEMBER_SCHEMA
        .iter()
        .filter(|(key, _)| !existing.contains(key))
        .copied()
        .collect();

    if missing.is_empty() {
        println!();
        println!("✅ All required attributes are present!");
    } else {
        println!();
        println!("❌ Missing attributes:");
        for (key, kind) in missing {
            println!("  - {} ({})", key, kind.type_name());
        }
        println!();
        println!("Run `rosterbot init-collection` to create them.");
    }

    Ok(())
}

/// Create every member-schema attribute on the collection.
///
/// An attribute that already exists (HTTP 409) is reported and skipped;
/// other per-attribute failures are reported and the run continues.
pub async fn init_collection(config: &Config) -> Result<()> {
    let db = databases(config);
    let database_id = &config.appwrite_database_id;
    let collection_id = &config.appwrite_collection_id;

    println!("Adding member schema attributes to collection {collection_id}...");

    for (key, kind) in MEMBER_SCHEMA {
        let result = match kind {
            AttrKind::String { size } => {
                db.create_string_attribute(database_id, collection_id, key, size, false, Some(""))
                    .await
            }
            AttrKind::Boolean => {
                db.create_boolean_attribute(database_id, collection_id, key, false, Some(false))
                    .await
            }
            AttrKind::Integer => db.create_integer_attribute(database_id, collection_id, key, false).await,
        };

        match result {
            Ok(()) => println!("✅ Added attribute {key} ({})", kind.type_name()),
            Err(e) if e.is_conflict() => println!("⚠️  Attribute {key} already exists"),
            Err(e) => println!("❌ Error adding attribute {key}: {e}"),
        }
    }

    println!();
    println!("Note: it may take a few moments for new attributes to become available.");
    Ok(())
}

fn print_member(index: usize, doc: &MemberDocument) {
    let record = &doc.record;
    println!("{}. User ID: {}", index, record.user_id);
    println!("   Name: {} {}", record.first_name, record.last_name);
    if record.username.is_empty() {
        println!("   Username: (not set)");
    } else {
        println!("   Username: @{}", record.username);
    }
    println!("   Status: {}", record.status);
    println!("   Chat: {} ({})", record.chat_title, record.chat_id);
    println!("   Is Bot: {}", record.is_bot);
    println!("   Updated: {}", record.updated_at);
    println!("   Document ID: {}", doc.id);
    println!("{}", "-".repeat(50));
}

/// List the stored documents and print a per-status summary.
pub async fn verify_members(config: &Config) -> Result<()> {
    let store = MemberStore::new(
        databases(config),
        &config.appwrite_database_id,
        &config.appwrite_collection_id,
    );

    println!("Fetching stored telegram members...");
    println!("Database ID: {}", config.appwrite_database_id);
    println!("Collection ID: {}", config.appwrite_collection_id);
    println!();

    let result = store.list_all().await?;

    println!("✅ Found {} total documents", result.total);
    println!("📄 Showing {} documents:", result.documents.len());
    println!();
    for (i, doc) in result.documents.iter().enumerate() {
        print_member(i + 1, doc);
    }

    let mut by_status: BTreeMap<&str, usize> = BTreeMap::new();
    for doc in &result.documents {
        *by_status.entry(doc.record.status.as_str()).or_default() += 1;
    }

    println!();
    println!("📊 Summary:");
    println!("   Total members: {}", result.total);
    println!("   By status:");
    for (status, count) in by_status {
        println!("     - {status}: {count}");
    }

    Ok(())
}
