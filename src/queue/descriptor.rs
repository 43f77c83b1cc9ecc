use url::Url;

use crate::error::SyncError;

/// A discovered queue and the identifiers derived from its URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDescriptor {
    /// Queue URL exactly as listed by the provider
    pub url: String,
    /// Last path segment of the URL
    pub name: String,
    /// Terraform-safe form of `name`
    pub safe_id: String,
    /// First path segment of the URL
    pub account_id: String,
}

impl QueueDescriptor {
    pub fn from_url(raw: &str) -> Result<Self, SyncError> {
        let segments = queue_path_segments(raw)
            .ok_or_else(|| SyncError::InvalidQueueUrl(raw.to_string()))?;

        let account_id = segments[0].clone();
        let name = segments[segments.len() - 1].clone();

        Ok(Self {
            url: raw.to_string(),
            safe_id: safe_identifier(&name),
            name,
            account_id,
        })
    }

    /// Name of the module call, e.g. `sqs_orders_fifo`
    pub fn module_name(&self) -> String {
        format!("sqs_{}", self.safe_id)
    }

    /// Terraform address the queue is imported into
    pub fn import_address(&self) -> String {
        format!("module.{}.aws_sqs_queue.this", self.module_name())
    }

    /// Provider-native import ID, rebuilt from region, account and name
    pub fn import_id(&self, region: &str, endpoint_domain: &str) -> String {
        format!(
            "https://sqs.{}.{}/{}/{}",
            region, endpoint_domain, self.account_id, self.name
        )
    }
}

/// Whether a listed value looks like a queue URL: http(s) with account and name segments
pub fn is_queue_url(raw: &str) -> bool {
    queue_path_segments(raw).is_some()
}

fn queue_path_segments(raw: &str) -> Option<Vec<String>> {
    let parsed = Url::parse(raw.trim()).ok()?;

    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return None;
    }

    parsed.host_str()?;

    let segments: Vec<String> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();

    if segments.len() < 2 {
        return None;
    }

    Some(segments)
}

/// Lowercase the name and replace everything outside `[a-z0-9_]` with `_`
pub fn safe_identifier(name: &str) -> String {
    name.chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
