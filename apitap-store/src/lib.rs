pub mod cleaner;
pub mod memory;
pub mod retention;
pub mod store;

pub use cleaner::Cleaner;
pub use memory::MemoryStore;
pub use retention::RetentionTask;
pub use store::{ListCriteria, LogEntryStore, Page};
