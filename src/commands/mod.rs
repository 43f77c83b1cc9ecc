pub mod sync;

pub use sync::{SyncCommand, SyncOptions};
