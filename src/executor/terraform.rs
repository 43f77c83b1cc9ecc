use super::executor::Executor;
use anyhow::{Context as _, Result};
use std::path::Path;
use std::process::Output;

use crate::context::Context;

/// Terraform-compatible executor; `binary` may be `terraform` or `tofu`
pub struct TerraformExecutor<'a> {
    ctx: &'a Context,
    binary: &'a str,
    working_dir: &'a Path,
}

impl<'a> TerraformExecutor<'a> {
    pub fn new(ctx: &'a Context, binary: &'a str, working_dir: &'a Path) -> Self {
        Self {
            ctx,
            binary,
            working_dir,
        }
    }

    fn run(&self, args: &[&str]) -> Result<Output> {
        self.ctx
            .command
            .execute(self.binary, args, self.working_dir)
            .with_context(|| format!("Failed to execute {} {}", self.binary, args[0]))
    }
}

impl Executor for TerraformExecutor<'_> {
    fn check_installed(&self) -> Result<bool> {
        match self.ctx.command.execute(self.binary, &["version"], self.working_dir) {
            Ok(output) => Ok(output.status.success()),
            // Command not found or failed to execute
            Err(_) => Ok(false),
        }
    }

    fn init(&self) -> Result<Output> {
        self.run(&["init", "-input=false", "-no-color"])
    }

    fn import(&self, address: &str, id: &str) -> Result<Output> {
        self.run(&["import", "-input=false", "-no-color", address, id])
    }

    fn get_name(&self) -> &str {
        Path::new(self.binary)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.binary)
    }
}
