pub mod errors;
pub mod room;
pub mod session;

// Re-export all types
pub use errors::*;
pub use room::*;
pub use session::*;
