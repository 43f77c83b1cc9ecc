#[allow(clippy::module_inception)]
pub mod executor;
pub mod terraform;

pub use executor::Executor;
pub use terraform::TerraformExecutor;
