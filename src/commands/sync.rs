use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::config::Settings;
use crate::context::Context;
use crate::error::SyncError;
use crate::executor::{Executor, TerraformExecutor};
use crate::queue::{build_descriptors, describe_queue, discover_queue_urls, AwsCli, QueueDescriptor};
use crate::template::{QueueBlock, TemplateRenderer};
use crate::workspace::{replace_managed, write_module, ManagedRegion, RegionKind};

/// Output declarations owned by this tool start with this prefix
pub const OUTPUT_PREFIX: &str = "sqs_";

/// One module call per queue
pub const MODULE_CALLS_REGION: ManagedRegion<'static> = ManagedRegion {
    label: "module calls",
    kind: RegionKind::Truncate,
};

/// Two outputs per queue
pub const OUTPUTS_REGION: ManagedRegion<'static> = ManagedRegion {
    label: "outputs",
    kind: RegionKind::NamedBlocks {
        prefix: OUTPUT_PREFIX,
    },
};

/// Per-run switches
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Print what would be generated; write nothing and import nothing
    pub dry_run: bool,
    /// Write files but skip terraform init/import
    pub skip_import: bool,
    /// Timestamp stamped into the managed-region markers
    pub generated_at: DateTime<Utc>,
}

/// What a run did, for the caller and for tests
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SyncReport {
    /// Module names rendered, in enumeration order
    pub modules: Vec<String>,
    /// Module names imported successfully
    pub imported: Vec<String>,
    /// Module names whose import failed, with the exit code if any
    pub failed: Vec<(String, Option<i32>)>,
}

/// Rendered text for every discovered queue
struct GeneratedBlocks {
    module_calls: String,
    outputs: String,
}

/// Handles the sync pipeline: module, discovery, regeneration, import
pub struct SyncCommand;

impl SyncCommand {
    pub fn execute(ctx: &Context, settings: &Settings, options: &SyncOptions) -> Result<SyncReport> {
        let renderer = TemplateRenderer::new()?;

        ctx.output.section("SQS → Terraform");
        ctx.output.key_value("Region", &settings.region);
        ctx.output
            .key_value("Module", &settings.module_dir_path().display().to_string());
        if let Some(prefix) = &settings.queue_name_prefix {
            ctx.output.key_value("Queue prefix", prefix);
        }

        // Module first: it does not depend on discovery
        if options.dry_run {
            ctx.output.dimmed(&format!(
                "Dry run: module files would be written to {}",
                settings.module_dir_path().display()
            ));
        } else {
            let written = write_module(ctx, &renderer, &settings.module_dir_path())?;
            ctx.output
                .success(&format!("Wrote {} module files", written.len()));
        }

        let aws = AwsCli::new(ctx, settings);
        let urls = discover_queue_urls(&aws, ctx.output.as_ref())?;
        let queues = build_descriptors(&urls, ctx.output.as_ref())?;
        ctx.output
            .info(&format!("Found {} queue(s) in {}", queues.len(), settings.region));

        let generated = Self::generate_blocks(ctx, &aws, &renderer, &queues, settings)?;

        let mut report = SyncReport {
            modules: queues.iter().map(|q| q.module_name()).collect(),
            ..Default::default()
        };

        if options.dry_run {
            ctx.output.section("Module calls");
            ctx.output.dimmed(&generated.module_calls);
            ctx.output.section("Outputs");
            ctx.output.dimmed(&generated.outputs);
            ctx.output.info(&format!(
                "Dry run: {} module call(s) rendered; no files written, nothing imported",
                report.modules.len()
            ));
            return Ok(report);
        }

        Self::write_managed(
            ctx,
            &settings.module_calls_path(),
            &MODULE_CALLS_REGION,
            &generated.module_calls,
            options,
        )?;
        Self::write_managed(
            ctx,
            &settings.outputs_path(),
            &OUTPUTS_REGION,
            &generated.outputs,
            options,
        )?;

        if options.skip_import {
            ctx.output.info("Skipping terraform import");
            return Ok(report);
        }

        Self::import_all(ctx, settings, &queues, &mut report)?;

        Ok(report)
    }

    /// Describe and render each queue in enumeration order
    fn generate_blocks(
        ctx: &Context,
        aws: &AwsCli,
        renderer: &TemplateRenderer,
        queues: &[QueueDescriptor],
        settings: &Settings,
    ) -> Result<GeneratedBlocks> {
        let source = settings.module_source();
        let mut module_calls = Vec::with_capacity(queues.len());
        let mut outputs = Vec::with_capacity(queues.len());

        for queue in queues {
            let config = describe_queue(aws, &queue.url);
            let block = QueueBlock::new(queue, &config, &source);

            module_calls.push(renderer.render_module_call(&block)?);
            outputs.push(renderer.render_outputs(&block)?);

            let kind = if config.attributes.fifo_queue {
                "fifo"
            } else {
                "standard"
            };
            ctx.output.key_value(
                &queue.name,
                &format!("{} ({}, {} tags)", block.module_name, kind, config.tags.len()),
            );
        }

        Ok(GeneratedBlocks {
            module_calls: module_calls.join("\n"),
            outputs: outputs.join("\n"),
        })
    }

    fn write_managed(
        ctx: &Context,
        path: &Path,
        region: &ManagedRegion,
        body: &str,
        options: &SyncOptions,
    ) -> Result<()> {
        let existing = ctx.fs.read_or_empty(path)?;
        let updated = replace_managed(&existing, region, body, &options.generated_at);
        ctx.fs.write(path, &updated)?;
        ctx.output.success(&format!("Updated {}", path.display()));
        Ok(())
    }

    /// Init once, then import each queue independently
    fn import_all(
        ctx: &Context,
        settings: &Settings,
        queues: &[QueueDescriptor],
        report: &mut SyncReport,
    ) -> Result<()> {
        let terraform = TerraformExecutor::new(ctx, &settings.terraform_bin, &settings.root_dir);

        if !terraform.check_installed()? {
            anyhow::bail!(
                "{} is not installed or not available in PATH",
                terraform.get_name()
            );
        }

        ctx.output
            .section(&format!("Importing into {} state", terraform.get_name()));

        let init = terraform.init()?;
        if !init.status.success() {
            return Err(SyncError::command_failed(
                format!("{} init", settings.terraform_bin),
                &init,
            )
            .into());
        }

        for queue in queues {
            let address = queue.import_address();
            let id = queue.import_id(&settings.region, &settings.endpoint_domain);

            match terraform.import(&address, &id) {
                Ok(output) if output.status.success() => {
                    ctx.output.success(&format!("Imported {}", address));
                    report.imported.push(queue.module_name());
                }
                Ok(output) => {
                    let code = output.status.code();
                    ctx.output.error(&format!(
                        "Import of {} failed (exit code {})",
                        address,
                        code.map(|c| c.to_string())
                            .unwrap_or_else(|| "unknown".to_string())
                    ));
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    if !stderr.trim().is_empty() {
                        ctx.output.dimmed(stderr.trim());
                    }
                    report.failed.push((queue.module_name(), code));
                }
                Err(e) => {
                    ctx.output
                        .error(&format!("Import of {} failed: {:#}", address, e));
                    report.failed.push((queue.module_name(), None));
                }
            }
        }

        ctx.output.blank();
        if report.failed.is_empty() {
            ctx.output
                .success(&format!("Imported {} queue(s)", report.imported.len()));
        } else {
            ctx.output.warning(&format!(
                "Imported {} queue(s), {} failed",
                report.imported.len(),
                report.failed.len()
            ));
        }

        Ok(())
    }
}
