use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::{load_json, save_json};

/// Contents of `auth.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clickup_api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tinyurl_api_token: Option<String>,
    /// Keys written by other tools; carried through untouched.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Credentials {
    pub fn load(path: &Path) -> Self {
        load_json(path)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        save_json(path, self)
    }

    pub fn clickup_token(&self) -> Option<&str> {
        non_empty(self.clickup_api_token.as_deref())
    }

    pub fn tinyurl_token(&self) -> Option<&str> {
        non_empty(self.tinyurl_api_token.as_deref())
    }

    /// Apply new token values. Blank inputs leave the stored value alone.
    pub fn merge(&mut self, clickup: &str, tinyurl: &str) {
        let clickup = clickup.trim();
        if !clickup.is_empty() {
            self.clickup_api_token = Some(clickup.to_string());
        }
        let tinyurl = tinyurl.trim();
        if !tinyurl.is_empty() {
            self.tinyurl_api_token = Some(tinyurl.to_string());
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
