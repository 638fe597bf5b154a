//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Wall clock time
//! - Jump input edge detection
//! - Key-value storage (LocalStorage on web, in-memory elsewhere)

pub mod input;
pub mod storage;
pub mod time;

pub use input::JumpButton;
pub use storage::{KeyValueStore, MemoryStorage};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
pub use time::now_ms;
