use serde::{Deserialize, Serialize};

/// The persisted record for one calendar date. The date itself is the store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// JPEG payload as a `data:image/jpeg;base64,...` URI.
    pub photo: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub date: String,
    pub photo: String,
    pub note: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodayResponse {
    pub date: String,
    pub uploaded: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub date: String,
    pub message: String,
    pub entry: JournalEntry,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub date: String,
    pub removed: bool,
    pub reopened_today: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
