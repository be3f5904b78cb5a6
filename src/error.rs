use std::path::PathBuf;

/// Conditions that stop a sync run before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("capture folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("no documents found in the catalog for site '{site}'; ingest the site first")]
    EmptyCatalog { site: String },

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}
