pub mod lifecycle;
pub mod session;
pub mod stats;
pub mod text;
pub mod view;

// Re-export main components
pub use lifecycle::*;
pub use session::*;
pub use stats::*;
pub use text::*;
pub use view::*;
