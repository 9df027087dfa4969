// # spindle-core
//
// Core library for the album-discovery ingestion pipeline.
//
// ## Architecture Overview
//
// This library owns the batch logic; every external system is reached
// through a trait implemented in a sibling crate:
// - **SessionResolver**: Resolves a caller's session token to an identity and role
// - **BrowserDriver**: Opens scoped headless browser sessions on the discussion board
// - **TokenIssuer**: Exchanges catalog client credentials for a bearer token
// - **CatalogClient**: Fetches album resources from the music catalog
// - **ReleaseStore**: Idempotent persistence of normalized releases
// - **IngestEngine**: Orchestrates guard → extract → token → per-link resolve/normalize/write
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Batch logic is separate from collaborator implementations
// 2. **Scoped Resources**: Browser sessions and bearer tokens live for one batch only
// 3. **Partial Success**: A failing link never aborts its siblings
// 4. **Library-First**: The daemon is a thin HTTP layer over this crate
// 5. **Idempotency**: Releases are keyed on their canonical external URL

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod guard;
pub mod normalize;
pub mod release;
pub mod resolve;
pub mod store;
pub mod traits;

// Re-export core types for convenience
pub use catalog::{BearerToken, RawAlbum, RawArtist};
pub use config::{BoardConfig, CatalogConfig, EngineConfig, IngestConfig, StoreConfig};
pub use engine::{BatchResult, BatchStage, IngestEngine, IngestEvent};
pub use error::{Error, ErrorCategory, Result};
pub use guard::AccessGuard;
pub use release::{AlbumRecord, ArtistRef, Credit, CreditRole, TrackRecord};
pub use store::MemoryReleaseStore;
pub use traits::{
    BrowserDriver, BrowserSession, CatalogClient, Identity, ReleaseStore, Role, SessionResolver,
    TokenIssuer,
};
