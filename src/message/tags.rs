//! IRCv3 message tags.
//!
//! The tokenizer keeps the tag token verbatim in [`RawMessage::tag`]; this
//! module splits it into `key[=value]` pairs and handles value escaping.
//!
//! [`RawMessage::tag`]: super::RawMessage::tag

use std::fmt::{Result as FmtResult, Write};

/// Write a tag value in its escaped wire form.
pub fn escape_tag_value(f: &mut dyn Write, value: &str) -> FmtResult {
    for c in value.chars() {
        match c {
            ';' => f.write_str("\\:")?,
            ' ' => f.write_str("\\s")?,
            '\\' => f.write_str("\\\\")?,
            '\r' => f.write_str("\\r")?,
            '\n' => f.write_str("\\n")?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

/// Reverses [`escape_tag_value`].
///
/// Unknown escapes drop the backslash; a lone trailing backslash is removed.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

/// Iterator over the `key[=value]` pairs of a raw tag token.
///
/// Values are unescaped. A key with no `=` or an empty value yields `None`.
#[derive(Clone, Debug)]
pub struct Tags<'a> {
    inner: std::str::Split<'a, char>,
}

impl<'a> Tags<'a> {
    /// Splits a raw tag token (without the leading `@`).
    pub fn new(raw: &'a str) -> Self {
        Tags {
            inner: raw.split(';'),
        }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = (&'a str, Option<String>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let item = self.inner.next()?;
            if item.is_empty() {
                continue;
            }
            return Some(match item.split_once('=') {
                Some((key, "")) => (key, None),
                Some((key, value)) => (key, Some(unescape_tag_value(value))),
                None => (item, None),
            });
        }
    }
}

/// Builds a raw tag token from key/value pairs, escaping the values.
pub fn format_tags<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let mut out = String::new();
    for (i, (key, value)) in pairs.into_iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        out.push_str(key);
        if let Some(value) = value {
            out.push('=');
            // Writing into a String cannot fail.
            let _ = escape_tag_value(&mut out, value);
        }
    }
    out
}
