#![forbid(unsafe_code)]

#[macro_use]
pub mod prelude;

pub mod cast;
pub mod ctx;
pub mod parser;
pub mod repr;
pub mod traits;
pub mod walk;
