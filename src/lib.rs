//! Rosterbot - Telegram group roster bot backed by an Appwrite collection
//!
//! The bot mirrors group membership into a document collection: membership
//! changes and group messages are captured passively, administrators can be
//! enumerated on demand, and members can flag themselves as verified for the
//! wishlist flow on the website.
//!
//! # Module Structure
//!
//! - `appwrite`: minimal REST client for the Appwrite Databases service
//! - `storage`: member record model and the Appwrite-backed store
//! - `telegram`: bot integration, dispatcher schema and handlers
//! - `sheets`: standalone Google Sheets fetcher
//! - `maintenance`: one-off collection inspection and schema commands

pub mod appwrite;
pub mod cli;
pub mod config;
pub mod maintenance;
pub mod sheets;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use appwrite::{AppwriteError, Databases, Lookup};
pub use config::{Config, ConfigError};
pub use storage::{MemberRecord, MemberStore};
pub use telegram::{create_bot, schema, HandlerDeps};
