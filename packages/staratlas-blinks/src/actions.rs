//! Solana Actions request/response types.

use serde::{Deserialize, Serialize};

pub const ACTION_TYPE: &str = "action";

/// Descriptor returned by GET and by the `findOrders` stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionGetResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub icon: String,
    pub description: String,
    pub label: String,
    pub links: ActionLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLinks {
    pub actions: Vec<LinkedAction>,
}

/// A follow-up action the client can invoke by POSTing to `href`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedAction {
    pub label: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ActionParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub label: String,
    pub required: bool,
}

/// POST body. `account` is the buyer's wallet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionPostRequest {
    #[serde(default)]
    pub account: Option<String>,
}

/// Unsigned transaction for the wallet to sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPostResponse {
    /// Base64 of the bincode-serialized transaction.
    pub transaction: String,
    pub message: String,
}

/// Query string of the action route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionQuery {
    #[serde(rename = "nftName")]
    pub nft_name: Option<String>,
    pub action: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// `/actions.json` rules file.
#[derive(Debug, Clone, Serialize)]
pub struct ActionsJson {
    pub rules: Vec<ActionRule>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRule {
    pub path_pattern: String,
    pub api_path: String,
}

impl ActionsJson {
    pub fn for_prefix(prefix: &str) -> Self {
        let pattern = format!("{}/**", prefix.trim_end_matches('/'));
        Self {
            rules: vec![ActionRule {
                path_pattern: pattern.clone(),
                api_path: pattern,
            }],
        }
    }
}
