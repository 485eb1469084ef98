pub mod config;
pub mod error;
pub mod interpret;
pub mod logger;
pub mod lower;
pub mod parse;
pub mod target;
pub mod validate;
pub mod wasm;
