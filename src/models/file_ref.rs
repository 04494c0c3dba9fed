use serde::{Deserialize, Serialize};

/// Metadata for a stored upload. The bytes themselves live in the file store;
/// only the stored name, the name the uploader gave, and the derived access
/// path are carried around.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileRef {
    pub stored_name: String,
    pub original_name: String,
    pub url: String,
}
