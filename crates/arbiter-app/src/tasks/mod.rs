pub mod channels;
pub mod heap;
pub mod holders;

#[cfg(feature = "demo")]
pub mod demo;

// Re-exports
pub use channels::*;
#[cfg(feature = "demo")]
pub use demo::*;
pub use heap::*;
pub use holders::*;
