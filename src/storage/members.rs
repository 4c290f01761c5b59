//! Appwrite-backed member store.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::appwrite::{AppwriteError, Databases, DocumentList, Lookup};

use super::record::{document_id, MemberRecord};

/// A stored member document: the record plus its server-side id.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(flatten)]
    pub record: MemberRecord,
}

/// Patch body for the verification flow.
///
/// Only the two mutated fields are serialized, so every other attribute of
/// the stored document stays byte-identical.
#[derive(Debug, Serialize)]
struct VerificationPatch {
    is_wishlist_verified: bool,
    updated_at: String,
}

/// Outcome of the verification flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The user was already known; only the flag was patched.
    Updated,
    /// The user was unknown; a full verified record was created.
    Created,
}

/// Keyed write access to the member collection.
///
/// All writes are addressed by `document_id(user_id)`, so concurrent writes
/// for the same user land on the same document (last write wins) and no
/// existence check is needed before writing.
pub struct MemberStore {
    db: Databases,
    database_id: String,
    collection_id: String,
}

impl MemberStore {
    pub fn new(db: Databases, database_id: &str, collection_id: &str) -> Self {
        Self {
            db,
            database_id: database_id.to_string(),
            collection_id: collection_id.to_string(),
        }
    }

    /// Write a member record, creating the document when it does not exist.
    ///
    /// The update is attempted first; a `NotFound` from the store switches to
    /// a create at the same id. Exactly one write reaches the store on the
    /// happy path, and any error other than the recoverable `NotFound`
    /// propagates to the caller untouched.
    pub async fn upsert(&self, record: &MemberRecord) -> Result<(), AppwriteError> {
        let id = document_id(record.user_id);
        match self
            .db
            .update_document::<Value>(&self.database_id, &self.collection_id, &id, record)
            .await
        {
            Ok(_) => {
                log::info!("Updated member document for user {} in chat {}", record.user_id, record.chat_id);
                Ok(())
            }
            Err(AppwriteError::NotFound { .. }) => {
                self.db
                    .create_document::<Value>(&self.database_id, &self.collection_id, &id, record)
                    .await?;
                log::info!(
                    "Created new member document for user {} in chat {}",
                    record.user_id,
                    record.chat_id
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Look up the stored document for a user.
    pub async fn lookup(&self, user_id: i64) -> Result<Lookup<MemberDocument>, AppwriteError> {
        self.db
            .get_document(&self.database_id, &self.collection_id, &document_id(user_id))
            .await
    }

    /// Verification flow: patch the flag when the user is known, create a
    /// full verified record when not.
    ///
    /// The create bypasses `upsert` so the flag is set atomically on creation
    /// and is never observable as false.
    pub async fn verify_user(&self, fallback: &MemberRecord) -> Result<VerifyOutcome, AppwriteError> {
        debug_assert!(fallback.is_wishlist_verified);
        match self.lookup(fallback.user_id).await? {
            Lookup::Found(_) => {
                let patch = VerificationPatch {
                    is_wishlist_verified: true,
                    updated_at: Utc::now().to_rfc3339(),
                };
                self.db
                    .update_document::<Value>(
                        &self.database_id,
                        &self.collection_id,
                        &document_id(fallback.user_id),
                        &patch,
                    )
                    .await?;
                Ok(VerifyOutcome::Updated)
            }
            Lookup::NotFound => {
                self.db
                    .create_document::<Value>(
                        &self.database_id,
                        &self.collection_id,
                        &document_id(fallback.user_id),
                        fallback,
                    )
                    .await?;
                Ok(VerifyOutcome::Created)
            }
        }
    }

    /// Full listing, used by the `verify-members` maintenance command.
    pub async fn list_all(&self) -> Result<DocumentList<MemberDocument>, AppwriteError> {
        self.db.list_documents(&self.database_id, &self.collection_id).await
    }
}
