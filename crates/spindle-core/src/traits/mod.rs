//! Core traits for the ingestion pipeline
//!
//! This module defines the abstract interfaces that all collaborator
//! implementations must follow.
//!
//! - [`SessionResolver`]: Resolve a session token to an identity and role
//! - [`BrowserDriver`] / [`BrowserSession`]: Scoped headless browser automation
//! - [`TokenIssuer`]: Client-credentials exchange with the catalog
//! - [`CatalogClient`]: Album and artist lookups against the catalog
//! - [`ReleaseStore`]: Idempotent persistence keyed on canonical URL

pub mod browser;
pub mod catalog_client;
pub mod release_store;
pub mod session;

pub use browser::{BrowserDriver, BrowserSession, PageSnapshot};
pub use catalog_client::{ArtistSummary, CatalogClient, TokenIssuer};
pub use release_store::{ReleaseStore, StoredRelease, UpsertOutcome};
pub use session::{Identity, Role, SessionResolver};
