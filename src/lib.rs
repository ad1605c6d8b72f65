//! EQL – a small query language for selecting blockchain entities.
//!
//! A query names the fields to return, the entity they come from, optional
//! filters, the chains to search and optionally a file to dump results into:
//!
//! ```text
//! GET hash, value FROM tx WHERE value > 1000000 ON eth, arb >> out.json
//! ```
//!
//! The crate does not execute queries. It provides the two pieces an editor
//! needs while a query is being typed:
//! * [`parser::parse_query`] – a tolerant parser turning a possibly incomplete
//!   string into a [`parser::ParsedQuery`], and on request validating it into
//!   a [`parser::QueryError`] with a character span for highlighting.
//! * [`autocomplete::autocomplete`] – the list of next-token suggestions for the
//!   text typed so far, assuming the cursor sits at the end.
//!
//! Both are pure functions of their input and the static tables in
//! [`schema`], and can be called from any thread without coordination.
//!
//! ## Modules
//! * [`schema`] – Keywords, entities with their fields and filters, chains.
//! * [`lexer`] – The tokenizer feeding the parser.
//! * [`parser`] – Query parsing and validation.
//! * [`autocomplete`] – Suggestions keyed on the last keyword typed.
//! * [`interface`] – A [`interface::Session`] holding editor state derived from the above.
//! * [`server`] – JSON over HTTP access to parsing and suggestions.
//! * [`settings`] – Settings for the `eql` binary.
//!
//! ## Quick Start
//! ```
//! use eql::autocomplete::{autocomplete, Suggestion};
//! let suggestions = autocomplete("GET balance, non").unwrap();
//! assert_eq!(suggestions, vec![Suggestion::PlainToken("nonce")]);
//! ```

pub mod autocomplete;
pub mod error;
pub mod interface;
pub mod lexer;
pub mod parser;
pub mod schema;
pub mod server;
pub mod settings;

pub use error::{EqlError, Result};
