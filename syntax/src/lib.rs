#[macro_use]
mod macros;
mod parse;
pub use parse::{parse_edit, parse_value, Error};
pub mod ast;
