//! Input readers - parse source code into the syntax tree.

pub mod javascript;

pub use javascript::{JAVASCRIPT_READER, JavaScriptReader, ends_with_semicolon, read_javascript};
