//! Comment document models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stored shape of `markets/{venue}/details/info/comments/{comment}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDocument {
    #[serde(default)]
    pub text: Option<String>,
    /// Null for comments written without a signed-in user
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
    #[serde(default = "anonymous")]
    pub anonymous: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn anonymous() -> bool {
    true
}

/// Stored shape of `users/{user}/comments/{comment}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCommentDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Value>,
}
