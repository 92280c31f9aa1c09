//! Line tokenizer.
//!
//! Splits one protocol line into its tag, prefix, command and parameter
//! tokens. Every token is a slice of the input; nothing is copied until the
//! caller turns the [`ParsedLine`] into an owned [`RawMessage`].
//!
//! ```text
//! ['@' tags SP] [':' prefix SP] command (SP parameter)* (SP ':' trailing)?
//! ```

use nom::{
    bytes::complete::{take_till, take_till1, take_while},
    character::complete::char,
    combinator::opt,
    sequence::{preceded, terminated},
    IResult,
};

use crate::error::MessageParseError;

use super::raw::{RawMessage, MAX_PARAMS};

/// Skip a run of spaces.
fn spaces(input: &str) -> IResult<&str, &str> {
    take_while(|c| c == ' ')(input)
}

/// IRCv3 tag token, without the leading `@`. Kept verbatim.
fn tags(input: &str) -> IResult<&str, &str> {
    preceded(char('@'), take_till(|c| c == ' '))(input)
}

/// Prefix token, without the leading `:`.
fn prefix(input: &str) -> IResult<&str, &str> {
    preceded(char(':'), take_till(|c| c == ' '))(input)
}

/// A space-terminated word.
fn word(input: &str) -> IResult<&str, &str> {
    take_till1(|c| c == ' ')(input)
}

/// `[@tags SP+] [:prefix SP+] command`
fn head(input: &str) -> IResult<&str, (Option<&str>, Option<&str>, &str)> {
    let (input, _) = spaces(input)?;
    let (input, tags) = opt(terminated(tags, spaces))(input)?;
    let (input, prefix) = opt(terminated(prefix, spaces))(input)?;
    let (input, command) = word(input)?;
    Ok((input, (tags, prefix, command)))
}

/// A tokenized line with borrowed string slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    /// Raw tags string (without the leading `@`), if present.
    pub tags: Option<&'a str>,
    /// Raw prefix string (without the leading `:`), if present.
    pub prefix: Option<&'a str>,
    /// The command or reply code.
    pub command: &'a str,
    /// Parameters, the trailing one last.
    pub params: Vec<&'a str>,
}

impl<'a> ParsedLine<'a> {
    /// Tokenize one line.
    ///
    /// A trailing CR/LF is ignored. No character-class validation happens
    /// here; see [`RawMessage::serialize`] for that.
    pub fn parse(input: &'a str) -> Result<Self, MessageParseError> {
        let line = input.trim_end_matches(['\r', '\n']);
        if line.bytes().all(|b| b == b' ') {
            return Err(MessageParseError::EmptyMessage);
        }

        let (mut rest, (tags, prefix, command)) = match head(line) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
                return Err(MessageParseError::MissingCommand {
                    position: line.len() - e.input.len(),
                })
            }
            Err(nom::Err::Incomplete(_)) => {
                return Err(MessageParseError::MissingCommand {
                    position: line.len(),
                })
            }
        };

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }

            // The last slot takes the rest of the line whatever it looks like.
            if params.len() == MAX_PARAMS - 1 {
                params.push(rest.strip_prefix(':').unwrap_or(rest));
                break;
            }

            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing);
                break;
            }

            let end = rest.find(' ').unwrap_or(rest.len());
            params.push(&rest[..end]);
            rest = &rest[end..];
        }

        Ok(ParsedLine {
            tags,
            prefix,
            command,
            params,
        })
    }

    /// Copies the tokens into an owned [`RawMessage`].
    pub fn to_owned_message(&self) -> RawMessage {
        RawMessage {
            tag: self.tags.map(str::to_owned),
            prefix: self.prefix.map(str::to_owned),
            command: self.command.to_owned(),
            params: self.params.iter().map(|p| (*p).to_owned()).collect(),
        }
    }
}

impl From<ParsedLine<'_>> for RawMessage {
    fn from(line: ParsedLine<'_>) -> Self {
        line.to_owned_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_command() {
        let msg = ParsedLine::parse("PING").unwrap();
        assert_eq!(msg.command, "PING");
        assert!(msg.tags.is_none());
        assert!(msg.prefix.is_none());
        assert!(msg.params.is_empty());
    }

    #[test]
    fn test_parse_command_with_params() {
        let msg = ParsedLine::parse("PRIVMSG #chan :hello world").unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#chan", "hello world"]);
    }

    #[test]
    fn test_parse_with_prefix() {
        let msg = ParsedLine::parse(":nick!user@host PRIVMSG #channel :Hello").unwrap();
        assert_eq!(msg.prefix, Some("nick!user@host"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#channel", "Hello"]);
    }

    #[test]
    fn test_parse_with_tags() {
        let msg = ParsedLine::parse("@time=2023-01-01T00:00:00Z :nick PRIVMSG #ch :Hi").unwrap();
        assert_eq!(msg.tags, Some("time=2023-01-01T00:00:00Z"));
        assert_eq!(msg.prefix, Some("nick"));
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.params, vec!["#ch", "Hi"]);
    }

    #[test]
    fn test_parse_tags_without_prefix() {
        let msg = ParsedLine::parse("@a=b;c PING :x").unwrap();
        assert_eq!(msg.tags, Some("a=b;c"));
        assert!(msg.prefix.is_none());
        assert_eq!(msg.command, "PING");
    }

    #[test]
    fn test_parse_strips_crlf() {
        let msg = ParsedLine::parse("PING :server\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["server"]);
    }

    #[test]
    fn test_parse_multiple_params() {
        let msg = ParsedLine::parse("USER guest 0 * :Real Name").unwrap();
        assert_eq!(msg.params, vec!["guest", "0", "*", "Real Name"]);
    }

    #[test]
    fn test_parse_numeric_reply() {
        let msg = ParsedLine::parse(":server 001 nick :Welcome").unwrap();
        assert_eq!(msg.prefix, Some("server"));
        assert_eq!(msg.command, "001");
        assert_eq!(msg.params, vec!["nick", "Welcome"]);
    }

    #[test]
    fn test_parse_empty_trailing() {
        let msg = ParsedLine::parse("foo bar baz :").unwrap();
        assert_eq!(msg.command, "foo");
        assert_eq!(msg.params, vec!["bar", "baz", ""]);
    }

    #[test]
    fn test_trailing_keeps_colons_and_spaces() {
        let msg = ParsedLine::parse("PRIVMSG #c :  a :b: c ").unwrap();
        assert_eq!(msg.params, vec!["#c", "  a :b: c "]);
    }

    #[test]
    fn test_collapses_repeated_spaces() {
        let msg = ParsedLine::parse("  :srv   NOTICE    *   :hi  there").unwrap();
        assert_eq!(msg.prefix, Some("srv"));
        assert_eq!(msg.command, "NOTICE");
        assert_eq!(msg.params, vec!["*", "hi  there"]);
    }

    #[test]
    fn test_trailing_spaces_add_no_params() {
        let msg = ParsedLine::parse("JOIN #a   ").unwrap();
        assert_eq!(msg.params, vec!["#a"]);
    }

    #[test]
    fn test_colon_inside_middle_param_is_literal() {
        let msg = ParsedLine::parse("MODE #c +k a:b").unwrap();
        assert_eq!(msg.params, vec!["#c", "+k", "a:b"]);
    }

    #[test]
    fn test_fifteenth_param_absorbs_rest() {
        let line = "CMD 1 2 3 4 5 6 7 8 9 10 11 12 13 14 15 16 17";
        let msg = ParsedLine::parse(line).unwrap();
        assert_eq!(msg.params.len(), MAX_PARAMS);
        assert_eq!(msg.params[13], "14");
        assert_eq!(msg.params[14], "15 16 17");
    }

    #[test]
    fn test_fifteenth_param_drops_colon() {
        let line = "CMD 1 2 3 4 5 6 7 8 9 10 11 12 13 14 :last one";
        let msg = ParsedLine::parse(line).unwrap();
        assert_eq!(msg.params.len(), MAX_PARAMS);
        assert_eq!(msg.params[14], "last one");
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(ParsedLine::parse(""), Err(MessageParseError::EmptyMessage));
        assert_eq!(ParsedLine::parse("   "), Err(MessageParseError::EmptyMessage));
        assert_eq!(ParsedLine::parse("\r\n"), Err(MessageParseError::EmptyMessage));
    }

    #[test]
    fn test_missing_command() {
        assert_eq!(
            ParsedLine::parse(":prefix.only"),
            Err(MessageParseError::MissingCommand { position: 12 })
        );
        assert_eq!(
            ParsedLine::parse("@tag=1 :prefix   "),
            Err(MessageParseError::MissingCommand { position: 17 })
        );
    }

    #[test]
    fn test_idempotent() {
        let line = "@id=1 :n!u@h PRIVMSG #c,#d :some text";
        assert_eq!(ParsedLine::parse(line), ParsedLine::parse(line));
    }
}
