use serde::{Deserialize, Serialize};

/// Body posted to the result-collection endpoint and echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub name: String,
    pub repo_url: String,
    pub result: Vec<Option<String>>, // decrypted_text in id order, null if not decrypted yet
}
