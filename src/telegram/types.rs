//! Handler dependencies shared across the dispatcher tree.

use std::sync::Arc;

use crate::storage::MemberStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers.
///
/// Constructed once at startup and cloned into each handler closure; no
/// handler reads ambient globals.
#[derive(Clone)]
pub struct HandlerDeps {
    pub store: Arc<MemberStore>,
    pub bot_username: Option<String>,
}

impl HandlerDeps {
    pub fn new(store: Arc<MemberStore>, bot_username: Option<String>) -> Self {
        Self { store, bot_username }
    }
}
