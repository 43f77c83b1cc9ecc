pub mod attributes;
pub mod aws_cli;
pub mod descriptor;
pub mod discovery;
pub mod model;

pub use attributes::{describe_queue, QueueAttributes, QueueConfig};
pub use aws_cli::AwsCli;
pub use descriptor::QueueDescriptor;
pub use discovery::{build_descriptors, discover_queue_urls};
