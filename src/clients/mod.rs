//! Typed clients: the only way the rest of the system talks to the actors.

#[macro_use]
mod macros;
pub mod order_client;
pub mod product_client;
pub mod report_client;

pub use order_client::*;
pub use product_client::*;
pub use report_client::*;
