mod commands;
mod config;
mod context;
mod error;
mod executor;
mod output;
mod queue;
mod template;
mod traits;
mod workspace;

#[cfg(test)]
mod test_helpers;

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use commands::{SyncCommand, SyncOptions};
use config::{ConfigFile, Overrides, Settings};
use context::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sqs-tf")]
#[command(about = "Discover SQS queues, regenerate their Terraform module calls and import them", long_about = None)]
#[command(version)]
struct Cli {
    /// AWS region to scan (defaults to the config file, then us-east-1)
    #[arg(env = "SQS_TF_REGION")]
    region: Option<String>,

    /// Root module directory (defaults to current directory)
    #[arg(short = 'C', long, default_value = ".")]
    dir: PathBuf,

    /// Config file (defaults to <DIR>/.sqs-tf.yaml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// AWS CLI profile
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Only queues whose name starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// aws executable
    #[arg(long, env = "SQS_TF_AWS_BIN")]
    aws_bin: Option<String>,

    /// terraform or tofu executable
    #[arg(long, env = "SQS_TF_TERRAFORM_BIN")]
    terraform_bin: Option<String>,

    /// Write the generated files but skip terraform init/import
    #[arg(long)]
    skip_import: bool,

    /// Print what would be generated; write nothing and import nothing
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new();

    let file = ConfigFile::load(ctx.fs.as_ref(), &cli.dir, cli.config.as_deref())?;
    let settings = Settings::resolve(
        &cli.dir,
        file,
        Overrides {
            region: cli.region,
            profile: cli.profile,
            queue_name_prefix: cli.prefix,
            aws_bin: cli.aws_bin,
            terraform_bin: cli.terraform_bin,
        },
    )?;

    let options = SyncOptions {
        dry_run: cli.dry_run,
        skip_import: cli.skip_import,
        generated_at: Utc::now(),
    };

    SyncCommand::execute(&ctx, &settings, &options)?;

    Ok(())
}
