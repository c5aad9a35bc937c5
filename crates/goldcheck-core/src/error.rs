//! Fatal errors that abort a verification run before any fixture is judged.

use crate::allowlist::AllowlistError;

/// Conditions under which a run cannot produce a meaningful report.
///
/// These are distinct from [`crate::Violation`]s: a violation is a finding
/// about one fixture, an error means the contracts tree itself is unusable.
#[derive(Debug, thiserror::Error)]
pub enum ContractsError {
    /// The contracts root is absent or not a directory.
    #[error("contracts root is not a directory: {path}")]
    RootNotDirectory { path: String },

    /// A directory below the contracts root could not be enumerated.
    #[error("failed to traverse {path}: {source}")]
    Traverse {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Allowlist(#[from] AllowlistError),
}

pub(crate) fn display_path(path: &std::path::Path) -> String {
    path.display().to_string()
}
