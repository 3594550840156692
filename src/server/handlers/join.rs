use crate::{
    metrics,
    text_join::{self, JoinOptions, Preset, TextStats},
};
use axum::Json;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    #[serde(default)]
    pub text: String,
    pub preset: Option<Preset>,
    pub delimiter: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub result: String,
    pub stats: TextStats,
}

impl JoinRequest {
    /// Preset options (comma by default) with explicit fields taking precedence.
    fn options(&self) -> JoinOptions {
        let mut options = self.preset.map(Preset::options).unwrap_or_default();
        if let Some(delimiter) = &self.delimiter {
            options.delimiter = delimiter.clone();
        }
        if let Some(prefix) = &self.prefix {
            options.prefix = prefix.clone();
        }
        if let Some(suffix) = &self.suffix {
            options.suffix = suffix.clone();
        }
        options
    }
}

/// Join the non-blank lines of the posted text
pub async fn join_text(Json(request): Json<JoinRequest>) -> Json<JoinResponse> {
    let result = text_join::join_lines(&request.text, &request.options());
    metrics::record_request("join", 200);

    Json(JoinResponse {
        result,
        stats: TextStats::of(&request.text),
    })
}
