//! `/proc` based metrics source.

pub mod parser;
mod source;

pub use parser::ParseError;
pub use source::ProcfsSource;
