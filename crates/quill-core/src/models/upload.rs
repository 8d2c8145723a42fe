use serde::{Deserialize, Serialize};

/// Success body returned by the upload endpoint.
///
/// Only `fileUrl` is required; the remaining fields echo file metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    pub file_url: String,
    #[serde(default)]
    pub file_type: Option<String>,
}

/// Error body returned by the upload endpoint with a non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_success_body() {
        let body = r#"{
            "success": true,
            "fileName": "0b6f.png",
            "originalName": "cat.png",
            "fileUrl": "/uploads/0b6f.png",
            "fileType": "image/png"
        }"#;
        let parsed: UploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.file_url, "/uploads/0b6f.png");
        assert_eq!(parsed.original_name.as_deref(), Some("cat.png"));
    }

    #[test]
    fn file_url_is_the_only_required_field() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"fileUrl":"https://cdn/x.bin"}"#).unwrap();
        assert_eq!(parsed.file_url, "https://cdn/x.bin");
        assert!(parsed.success.is_none());

        assert!(serde_json::from_str::<UploadResponse>(r#"{"success":true}"#).is_err());
    }
}
