use anyhow::Result;
use std::collections::HashSet;

use super::aws_cli::AwsCli;
use super::descriptor::{is_queue_url, QueueDescriptor};
use crate::error::SyncError;
use crate::traits::Output;

/// List the queues in the configured region.
///
/// Returns URLs in listed order with malformed entries and duplicates removed.
/// A failing list command is reported and then treated like an empty listing.
pub fn discover_queue_urls(aws: &AwsCli, output: &dyn Output) -> Result<Vec<String>> {
    let listed = match aws.list_queues() {
        Ok(response) => response.queue_urls,
        Err(e) => {
            output.error(&format!("{:#}", e));
            Vec::new()
        }
    };

    let mut seen = HashSet::new();
    let urls: Vec<String> = listed
        .into_iter()
        .map(|url| url.trim().to_string())
        .filter(|url| is_queue_url(url))
        .filter(|url| seen.insert(url.clone()))
        .collect();

    if urls.is_empty() {
        return Err(SyncError::NoQueuesFound {
            region: aws.region().to_string(),
        }
        .into());
    }

    Ok(urls)
}

/// Build descriptors, letting a later queue replace an earlier one with the same safe ID
pub fn build_descriptors(urls: &[String], output: &dyn Output) -> Result<Vec<QueueDescriptor>> {
    let mut queues: Vec<QueueDescriptor> = Vec::with_capacity(urls.len());

    for url in urls {
        let queue = QueueDescriptor::from_url(url)?;

        if let Some(existing) = queues.iter_mut().find(|q| q.safe_id == queue.safe_id) {
            output.warning(&format!(
                "Queues '{}' and '{}' both map to module '{}'; keeping '{}'",
                existing.name,
                queue.name,
                queue.module_name(),
                queue.name
            ));
            *existing = queue;
        } else {
            queues.push(queue);
        }
    }

    Ok(queues)
}
