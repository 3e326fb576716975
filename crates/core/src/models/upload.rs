use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Body of the presign call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignRequest {
    pub filename: String,
    pub content_type: String,
    pub restaurant_id: String,
}

/// Short-lived upload authorization issued by the API.
///
/// The file is POSTed straight to `upload_url` with `fields` as form
/// fields; afterwards `public_url` is what the offer stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUpload {
    pub upload_url: String,

    /// Form fields to send before the file, in the order the server listed them
    #[serde(default)]
    pub fields: IndexMap<String, String>,

    pub public_url: String,
}
