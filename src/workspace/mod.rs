pub mod managed_region;
pub mod module_writer;

pub use managed_region::{replace_managed, ManagedRegion, RegionKind};
pub use module_writer::write_module;
