pub mod document;
pub mod history;
pub mod memory;
pub mod store;

// Re-export main components
pub use document::*;
pub use history::*;
pub use memory::*;
pub use store::*;
