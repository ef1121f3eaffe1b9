pub mod codegen;
pub mod parse;
pub mod types;
