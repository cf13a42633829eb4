use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Contract violations between the caller and the edit tree.
///
/// These indicate a desynchronized tree (a UI holding a stale index or a
/// path the schema does not define), never bad user input. Missing or
/// unreadable stored data is not an error: it loads as empty content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("Invalid field path: '{0}'")]
    InvalidPath(String),

    #[error("Field path '{path}' does not name a list in schema '{schema}'")]
    NotAList { path: String, schema: String },

    #[error("Field path '{path}' does not name a scalar in schema '{schema}'")]
    NotAScalar { path: String, schema: String },

    #[error("No tree node at '{path}' for language '{language}'")]
    MissingNode { path: String, language: String },

    #[error("Index {index} out of range for '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
}

/// Non-success HTTP status returned by the content API.
///
/// Kept as a typed error so retry predicates can inspect the status instead
/// of parsing messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Content API error ({status}): {body}")]
pub struct ApiStatusError {
    pub status: u16,
    pub body: String,
}

impl ApiStatusError {
    /// 429 and 5xx are transient; other statuses will fail again.
    pub fn is_retryable(&self) -> bool {
        self.status == 429 || self.status >= 500
    }
}

/// A page that could not be fetched. No session is opened; `user_message`
/// is the localized notice to show the editor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to load page '{slug}': {detail}")]
pub struct LoadError {
    pub slug: String,
    pub detail: String,
    pub user_message: String,
}

/// A failed save. The edit tree is untouched; `user_message` is the localized
/// notice to show the editor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to save page '{slug}': {detail}")]
pub struct SaveError {
    pub slug: String,
    pub detail: String,
    pub user_message: String,
}
