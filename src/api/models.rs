use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub term: Option<String>,
}

impl GenerateRequest {
    /// The trimmed term, `None` when missing or blank.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub text: String,
    pub image_url: String,
}
