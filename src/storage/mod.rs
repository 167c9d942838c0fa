//! Persistence backends for the progress document.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileProgressBackend;
pub use memory::MemoryProgressBackend;
pub use traits::ProgressBackend;
