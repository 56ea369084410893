//! # Subject Placeholder Engine
//!
//! Three steps turn a campaign subject like `Hello [NAME?friend], news for [CITY!]`
//! into a per-recipient subject:
//!
//! 1. `parser::parse_subject` runs once per campaign and builds the token table
//!    from the subject and the attribute directory.
//! 2. `resolver::resolve_for_recipient` runs once per recipient and produces a copy of the
//!    table carrying that recipient's values.
//! 3. `rewriter::rewrite_subject` applies a bound table to the subject text.
//!
//! The campaign's own table is never written to after step 1.

pub mod parser;
pub mod resolver;
pub mod rewriter;

pub use parser::parse_subject;
pub use resolver::resolve_for_recipient;
pub use rewriter::rewrite_subject;
