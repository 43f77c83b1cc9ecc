use serde::Serialize;
use std::collections::BTreeMap;

use super::aws_cli::AwsCli;
use super::model::GetQueueAttributesResponse;

pub const DEFAULT_VISIBILITY_TIMEOUT_SECONDS: u32 = 30;
pub const DEFAULT_MESSAGE_RETENTION_SECONDS: u32 = 345_600;
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 262_144;
pub const DEFAULT_DELAY_SECONDS: u32 = 0;
pub const DEFAULT_RECEIVE_WAIT_TIME_SECONDS: u32 = 0;

/// Tags keyed by name; ordered so rendering is deterministic
pub type TagMap = BTreeMap<String, String>;

/// Scalar queue settings carried into the module call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueAttributes {
    pub visibility_timeout_seconds: u32,
    pub message_retention_seconds: u32,
    pub max_message_size: u32,
    pub delay_seconds: u32,
    pub receive_wait_time_seconds: u32,
    pub fifo_queue: bool,
}

impl Default for QueueAttributes {
    fn default() -> Self {
        Self {
            visibility_timeout_seconds: DEFAULT_VISIBILITY_TIMEOUT_SECONDS,
            message_retention_seconds: DEFAULT_MESSAGE_RETENTION_SECONDS,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            delay_seconds: DEFAULT_DELAY_SECONDS,
            receive_wait_time_seconds: DEFAULT_RECEIVE_WAIT_TIME_SECONDS,
            fifo_queue: false,
        }
    }
}

impl QueueAttributes {
    /// Absent or unparsable values keep their defaults
    pub fn from_response(response: &GetQueueAttributesResponse) -> Self {
        let defaults = Self::default();

        Self {
            visibility_timeout_seconds: response
                .get_u32("VisibilityTimeout")
                .unwrap_or(defaults.visibility_timeout_seconds),
            message_retention_seconds: response
                .get_u32("MessageRetentionPeriod")
                .unwrap_or(defaults.message_retention_seconds),
            max_message_size: response
                .get_u32("MaximumMessageSize")
                .unwrap_or(defaults.max_message_size),
            delay_seconds: response
                .get_u32("DelaySeconds")
                .unwrap_or(defaults.delay_seconds),
            receive_wait_time_seconds: response
                .get_u32("ReceiveMessageWaitTimeSeconds")
                .unwrap_or(defaults.receive_wait_time_seconds),
            fifo_queue: response.get_bool("FifoQueue").unwrap_or(defaults.fifo_queue),
        }
    }
}

/// Everything rendered for one queue besides its identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueConfig {
    pub attributes: QueueAttributes,
    pub tags: TagMap,
}

/// Fetch attributes and tags for one queue.
///
/// Failures of either call are swallowed: the queue still gets a block, built
/// from defaults and an empty tag map.
pub fn describe_queue(aws: &AwsCli, queue_url: &str) -> QueueConfig {
    let attributes = aws
        .get_queue_attributes(queue_url)
        .map(|response| QueueAttributes::from_response(&response))
        .unwrap_or_default();

    let tags = aws
        .list_queue_tags(queue_url)
        .map(|response| response.into_tags())
        .unwrap_or_default();

    QueueConfig { attributes, tags }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigFile, Overrides, Settings};
    use crate::context::Context;
    use crate::queue::model::decode;
    use crate::test_helpers::{attributes_json, tags_json};
    use crate::traits::{MockCommandExecutor, MockCommandResult, MockFileSystem, MockOutput};
    use std::path::Path;
    use std::sync::Arc;

    const URL: &str = "https://sqs.us-east-1.amazonaws.com/123456789012/orders";

    fn run(outputs: Vec<MockCommandResult>) -> QueueConfig {
        let ctx = Context::test_with(
            Arc::new(MockFileSystem::new()),
            Arc::new(MockOutput::new()),
            Arc::new(MockCommandExecutor::with_outputs(outputs)),
        );
        let settings =
            Settings::resolve(Path::new("/work"), ConfigFile::default(), Overrides::default())
                .unwrap();
        describe_queue(&AwsCli::new(&ctx, &settings), URL)
    }

    #[test]
    fn test_defaults() {
        let attributes = QueueAttributes::default();
        assert_eq!(attributes.visibility_timeout_seconds, 30);
        assert_eq!(attributes.message_retention_seconds, 345600);
        assert_eq!(attributes.max_message_size, 262144);
        assert_eq!(attributes.delay_seconds, 0);
        assert_eq!(attributes.receive_wait_time_seconds, 0);
        assert!(!attributes.fifo_queue);
    }

    #[test]
    fn test_missing_visibility_timeout_defaults_to_30() {
        let response: GetQueueAttributesResponse =
            decode(br#"{"Attributes": {"DelaySeconds": "10"}}"#).unwrap();
        let attributes = QueueAttributes::from_response(&response);

        assert_eq!(attributes.visibility_timeout_seconds, 30);
        assert_eq!(attributes.delay_seconds, 10);
        assert_eq!(attributes.message_retention_seconds, 345600);
    }

    #[test]
    fn test_full_attribute_set() {
        let response: GetQueueAttributesResponse =
            decode(attributes_json(120, 86400, 1024, 5, 20, true).as_bytes()).unwrap();
        let attributes = QueueAttributes::from_response(&response);

        assert_eq!(
            attributes,
            QueueAttributes {
                visibility_timeout_seconds: 120,
                message_retention_seconds: 86400,
                max_message_size: 1024,
                delay_seconds: 5,
                receive_wait_time_seconds: 20,
                fifo_queue: true,
            }
        );
    }

    #[test]
    fn test_describe_queue() {
        let config = run(vec![
            MockCommandResult::ok(
                "aws sqs get-queue-attributes",
                attributes_json(60, 345600, 262144, 0, 10, false),
            ),
            MockCommandResult::ok(
                "aws sqs list-queue-tags",
                tags_json(&[("team", "core"), ("env", "prod")]),
            ),
        ]);

        assert_eq!(config.attributes.visibility_timeout_seconds, 60);
        assert_eq!(config.attributes.receive_wait_time_seconds, 10);
        assert_eq!(config.tags.len(), 2);
        assert_eq!(config.tags.get("env").map(String::as_str), Some("prod"));
    }

    #[test]
    fn test_describe_queue_failures_fall_back_silently() {
        let config = run(vec![
            MockCommandResult::failed("aws sqs get-queue-attributes", 255, "AccessDenied"),
            MockCommandResult::ok("aws sqs list-queue-tags", "{ not json"),
        ]);

        assert_eq!(config, QueueConfig::default());
    }
}
