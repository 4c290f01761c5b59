//! Minimal client for the Appwrite Databases REST API.
//!
//! Only the endpoints this project consumes are modeled: document CRUD for
//! the member collection plus the attribute-management calls used by the
//! maintenance commands. Authentication is the server-side API key scheme;
//! every request carries the project id and key headers.

mod client;
mod error;

pub use client::{Collection, CollectionAttribute, Databases, DocumentList, Lookup};
pub use error::AppwriteError;
