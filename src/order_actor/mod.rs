//! Order-specific domain logic: the append-only order entity and the assembler
//! that turns a placement request into priced, aggregated lines.

pub mod assembler;
pub mod entity;
pub mod error;

pub use assembler::*;
pub use error::*;
