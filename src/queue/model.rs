//! Response shapes of the `aws sqs` CLI in `--output json` mode

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// `aws sqs list-queues`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListQueuesResponse {
    #[serde(default)]
    pub queue_urls: Vec<String>,
}

/// `aws sqs get-queue-attributes --attribute-names All`
///
/// The CLI reports every attribute value as a string; numbers and booleans
/// are accepted as well.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetQueueAttributesResponse {
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl GetQueueAttributesResponse {
    pub fn get_u32(&self, key: &str) -> Option<u32> {
        match self.attributes.get(key)? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => Some(s.trim().eq_ignore_ascii_case("true")),
            _ => None,
        }
    }
}

/// `aws sqs list-queue-tags`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListQueueTagsResponse {
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
}

impl ListQueueTagsResponse {
    pub fn into_tags(self) -> BTreeMap<String, String> {
        self.tags.unwrap_or_default()
    }
}

/// Decode CLI stdout; empty output means an empty response
pub fn decode<T: DeserializeOwned + Default>(stdout: &[u8]) -> Result<T> {
    let text = String::from_utf8_lossy(stdout);

    if text.trim().is_empty() {
        return Ok(T::default());
    }

    serde_json::from_str(&text).context("Failed to decode aws CLI JSON output")
}
