//! # goldcheck core
//!
//! Contract checks over a corpus of golden JSON fixtures. Every fixture must
//! be stored in canonical form, conform to the schema its filename selects,
//! and carry no run-specific artifacts in its string content.
//!
//! ## Architecture
//!
//! ```text
//! discovery    ← goldens/**/*.json, sorted by relative path
//!     │
//! canonical    ← raw bytes == sorted-key, compact, ASCII-escaped form + "\n"
//!     │
//! schema       ← filename stem → SchemaId → compiled draft-7 validator
//!     │
//! scanner      ← string leaves, classified unless allowlisted by field name
//!     │
//! report       ← per-fixture results in discovery order, exit code
//! ```

pub mod allowlist;
pub mod canonical;
pub mod classify;
pub mod discovery;
pub mod error;
pub mod report;
pub mod scanner;
pub mod schema;
pub mod verify;
pub mod violation;

pub use allowlist::{Allowlist, AllowlistError};
pub use canonical::{CanonicalCheck, canonical_bytes, check_canonical};
pub use classify::{ValueKind, classify};
pub use discovery::discover_goldens;
pub use error::ContractsError;
pub use report::{FixtureReport, RunReport};
pub use scanner::scan_document;
pub use schema::{SchemaId, SchemaRegistry};
pub use verify::{ContractsLayout, verify_contracts};
pub use violation::{Violation, ViolationKind};
