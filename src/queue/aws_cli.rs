use anyhow::Result;
use std::process::Output;

use super::model::{
    decode, GetQueueAttributesResponse, ListQueueTagsResponse, ListQueuesResponse,
};
use crate::config::Settings;
use crate::context::Context;
use crate::error::SyncError;
use crate::traits::command::command_line;

/// Thin wrapper over the `aws sqs` subcommands used during discovery
pub struct AwsCli<'a> {
    ctx: &'a Context,
    settings: &'a Settings,
}

impl<'a> AwsCli<'a> {
    pub fn new(ctx: &'a Context, settings: &'a Settings) -> Self {
        Self { ctx, settings }
    }

    pub fn region(&self) -> &str {
        &self.settings.region
    }

    pub fn list_queues(&self) -> Result<ListQueuesResponse> {
        let mut extra = Vec::new();
        if let Some(prefix) = &self.settings.queue_name_prefix {
            extra.push("--queue-name-prefix");
            extra.push(prefix.as_str());
        }

        let output = self.run_checked("list-queues", &extra)?;
        decode(&output.stdout)
    }

    pub fn get_queue_attributes(&self, queue_url: &str) -> Result<GetQueueAttributesResponse> {
        let output = self.run_checked(
            "get-queue-attributes",
            &["--queue-url", queue_url, "--attribute-names", "All"],
        )?;
        decode(&output.stdout)
    }

    pub fn list_queue_tags(&self, queue_url: &str) -> Result<ListQueueTagsResponse> {
        let output = self.run_checked("list-queue-tags", &["--queue-url", queue_url])?;
        decode(&output.stdout)
    }

    fn run_checked(&self, operation: &str, extra: &[&str]) -> Result<Output> {
        let args = self.sqs_args(operation, extra);
        let output =
            self.ctx
                .command
                .execute(&self.settings.aws_bin, &args, &self.settings.root_dir)?;

        if !output.status.success() {
            return Err(SyncError::command_failed(
                command_line(&self.settings.aws_bin, &args[..2]),
                &output,
            )
            .into());
        }

        Ok(output)
    }

    fn sqs_args<'b>(&'b self, operation: &'b str, extra: &[&'b str]) -> Vec<&'b str> {
        let mut args = vec!["sqs", operation];
        args.extend_from_slice(extra);
        args.extend(["--region", self.settings.region.as_str(), "--output", "json"]);

        if let Some(profile) = &self.settings.profile {
            args.extend(["--profile", profile.as_str()]);
        }

        args
    }
}
