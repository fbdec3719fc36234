pub mod builtins;
pub mod cache;
pub mod engine;
pub mod hover;
pub mod parse;
pub mod reader;
pub mod resolve;
pub mod symbol;
pub mod table;
pub mod util;
