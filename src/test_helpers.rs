//! Test helpers for canned aws CLI responses and mock contexts
//!
//! The JSON builders mirror what `aws sqs ... --output json` prints, so tests
//! can script a whole discovery run against `MockCommandExecutor`.

#![cfg(test)]

use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{ConfigFile, Overrides, Settings};
use crate::context::Context;
use crate::traits::{MockCommandExecutor, MockCommandResult, MockFileSystem, MockOutput};

pub const ACCOUNT_ID: &str = "123456789012";
pub const REGION: &str = "us-east-1";
pub const ROOT_DIR: &str = "/work";

/// URL of a queue in the test account and region
pub fn queue_url(name: &str) -> String {
    format!("https://sqs.{}.amazonaws.com/{}/{}", REGION, ACCOUNT_ID, name)
}

/// Body of `aws sqs list-queues`
pub fn list_queues_json(names: &[&str]) -> String {
    let urls: Vec<String> = names.iter().map(|n| queue_url(n)).collect();
    json!({ "QueueUrls": urls }).to_string()
}

/// Body of `aws sqs get-queue-attributes`, values stringified like the real CLI
pub fn attributes_json(
    visibility_timeout: u32,
    retention: u32,
    max_size: u32,
    delay: u32,
    wait_time: u32,
    fifo: bool,
) -> String {
    let mut attributes = json!({
        "VisibilityTimeout": visibility_timeout.to_string(),
        "MessageRetentionPeriod": retention.to_string(),
        "MaximumMessageSize": max_size.to_string(),
        "DelaySeconds": delay.to_string(),
        "ReceiveMessageWaitTimeSeconds": wait_time.to_string(),
        "ApproximateNumberOfMessages": "0",
        "QueueArn": format!("arn:aws:sqs:{}:{}:queue", REGION, ACCOUNT_ID),
    });

    if fifo {
        attributes["FifoQueue"] = json!("true");
        attributes["ContentBasedDeduplication"] = json!("false");
    }

    json!({ "Attributes": attributes }).to_string()
}

/// Body of `aws sqs list-queue-tags`
pub fn tags_json(tags: &[(&str, &str)]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = tags
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    json!({ "Tags": map }).to_string()
}

/// Mock responses for describing one queue
pub fn describe_responses(name: &str, attributes: String, tags: String) -> Vec<MockCommandResult> {
    let url = queue_url(name);
    vec![
        MockCommandResult::ok(
            format!("aws sqs get-queue-attributes --queue-url {} ", url),
            attributes,
        ),
        MockCommandResult::ok(format!("aws sqs list-queue-tags --queue-url {} ", url), tags),
    ]
}

/// A mock context plus handles to its mocks for assertions
pub struct TestHarness {
    pub ctx: Context,
    pub fs: Arc<MockFileSystem>,
    pub output: Arc<MockOutput>,
    pub executor: Arc<MockCommandExecutor>,
}

impl TestHarness {
    pub fn new(fs: MockFileSystem, responses: Vec<MockCommandResult>) -> Self {
        let fs = Arc::new(fs);
        let output = Arc::new(MockOutput::new());
        let executor = Arc::new(MockCommandExecutor::with_outputs(responses));

        let ctx = Context::test_with(fs.clone(), output.clone(), executor.clone());

        Self {
            ctx,
            fs,
            output,
            executor,
        }
    }

    pub fn settings(&self) -> Settings {
        Settings::resolve(
            &PathBuf::from(ROOT_DIR),
            ConfigFile::default(),
            Overrides::default(),
        )
        .unwrap()
    }

    pub fn file(&self, relative: &str) -> Option<String> {
        self.fs
            .get_file_contents(&PathBuf::from(ROOT_DIR).join(relative))
    }
}
