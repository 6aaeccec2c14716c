pub mod order;
pub mod product;
pub mod report;

pub use order::*;
pub use product::*;
pub use report::*;
