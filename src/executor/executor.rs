use anyhow::Result;
use std::process::Output;

/// Trait for Infrastructure as Code executors (Terraform, OpenTofu)
pub trait Executor {
    /// Check if the executor is installed and available
    /// Runs the version command to verify
    fn check_installed(&self) -> Result<bool>;

    /// Initialize the root module (downloads providers, links local modules)
    fn init(&self) -> Result<Output>;

    /// Import an existing resource into state at the given address
    fn import(&self, address: &str, id: &str) -> Result<Output>;

    /// Get the name of this executor (e.g., "terraform", "tofu")
    fn get_name(&self) -> &str;
}
