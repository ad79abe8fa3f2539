//! `volley-sbl` implements SBL, the small templating language that
//! drives [volley](https://github.com/harehare/volley): templates mix
//! plain text with tags such as `{1:100}`, `{8-32}` or `{a.com,b.com}`
//! that expand into a fresh value on every round, so one template
//! describes an endless stream of request lines.
//!
//! ## Examples
//!
//! ```rs
//! use volley_sbl::Interpreter;
//!
//! let mut interpreter = Interpreter::new();
//! interpreter.load("/items/{1:3}?page={:9}", "url").unwrap();
//! interpreter.ready().unwrap();
//!
//! let output = interpreter.execute().unwrap();
//! assert_eq!(
//!     output.get("url").map(String::as_str),
//!     Some("/items/1?page=0")
//! );
//! ```
mod ast;
mod encode;
mod error;
mod generator;
mod interpreter;
mod lexer;
mod parser;
mod runtime;
mod shlex;
mod syntax;
mod topo;
mod value;

pub use ast::{Arg, AttrValue, Attrs, Node};
pub use encode::Encoding;
pub use error::SblError;
pub use generator::{Rand, RandText, Seq, Step, Ticker};
pub use interpreter::Interpreter;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use runtime::Runtime;
pub use syntax::{classify, full_id};
pub use topo::{Edge, topological_sort};
pub use value::Value;
