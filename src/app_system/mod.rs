//! System orchestration, startup, and shutdown logic.

pub mod clock;
pub mod config;
pub mod order_system;
pub mod seed;
pub mod tracing;

pub use clock::*;
pub use config::*;
pub use order_system::*;
pub use seed::*;
pub use self::tracing::*;
