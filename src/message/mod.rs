//! Protocol lines: the tokenizer, the untyped [`RawMessage`] and IRCv3 tags.

mod raw;
pub mod tags;
mod tokenizer;

pub use self::raw::{RawMessage, MAX_PARAMS};
pub use self::tokenizer::ParsedLine;
