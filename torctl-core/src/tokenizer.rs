//! Line-level tokenizing: reply prefixes, leading tokens, and argument lists.

use std::collections::BTreeMap;

use crate::error::ReplyParseError;
use crate::status::StatusCode;

/// Separator between the leading token of a line and the rest of it.
pub const SPACE: char = ' ';

/// Split `line` at the first `separator`.
///
/// Without a separator the whole line is the token and the remainder is
/// empty.
pub fn read_until_separator(line: &str, separator: char) -> (&str, &str) {
    line.split_once(separator).unwrap_or((line, ""))
}

/// The character following a line's status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `' '`: last line of the reply.
    Final,
    /// `'-'`: more lines follow.
    Continuation,
    /// `'+'`: a raw data block follows, terminated by a lone `.`.
    DataBlock,
}

impl Marker {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ' ' => Some(Self::Final),
            '-' => Some(Self::Continuation),
            '+' => Some(Self::DataBlock),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Self::Final => ' ',
            Self::Continuation => '-',
            Self::DataBlock => '+',
        }
    }
}

/// Split a raw reply line into status code, marker and the text after them.
pub fn parse_line_prefix(line: &str) -> Result<(StatusCode, Marker, &str), ReplyParseError> {
    let bytes = line.as_bytes();
    if bytes.len() < 4 {
        return Err(ReplyParseError::LineTooShort {
            line: line.to_string(),
        });
    }
    if !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(ReplyParseError::InvalidStatusCode {
            line: line.to_string(),
        });
    }
    let code = bytes[..3]
        .iter()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));

    // The first three bytes are ASCII, so index 3 is a char boundary.
    let mut rest = line[3..].chars();
    let raw_marker = rest.next().unwrap_or_default();
    let marker = Marker::from_char(raw_marker).ok_or_else(|| ReplyParseError::InvalidMarker {
        marker: raw_marker,
        line: line.to_string(),
    })?;

    Ok((StatusCode::from_u16(code), marker, rest.as_str()))
}

/// Split a space-separated argument list, honouring double-quoted strings.
///
/// Quotes are removed and `\"`, `\\` escapes inside them are resolved, so
/// `SUMMARY="Done here"` yields `SUMMARY=Done here`. An unterminated quote
/// runs to the end of the input.
pub fn split_arguments(text: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut has_token = false;
    let mut in_quotes = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                }
            }
            ' ' if !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            other => {
                current.push(other);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }
    args
}

/// Arguments split into positional values and `KEY=VALUE` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordArgs {
    pub positional: Vec<String>,
    pub keywords: BTreeMap<String, String>,
}

impl KeywordArgs {
    /// Parse the remainder of a line (see [`split_arguments`]).
    pub fn parse(text: &str) -> Self {
        Self::from_arguments(split_arguments(text))
    }

    pub fn from_arguments(args: impl IntoIterator<Item = String>) -> Self {
        let mut parsed = Self::default();
        for arg in args {
            match arg.split_once('=') {
                Some((key, value)) if is_keyword(key) => {
                    parsed.keywords.insert(key.to_string(), value.to_string());
                }
                _ => parsed.positional.push(arg),
            }
        }
        parsed
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.keywords.get(key).map(String::as_str)
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// Remove and return a keyword, leaving the rest for "extra" maps.
    pub fn take(&mut self, key: &str) -> Option<String> {
        self.keywords.remove(key)
    }
}

fn is_keyword(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_splits_once() {
        assert_eq!(read_until_separator("CIRC 1 BUILT", SPACE), ("CIRC", "1 BUILT"));
        assert_eq!(read_until_separator("OK", SPACE), ("OK", ""));
        assert_eq!(read_until_separator("", SPACE), ("", ""));
        assert_eq!(read_until_separator("a b ", SPACE), ("a", "b "));
    }

    #[test]
    fn prefix_recognizes_markers() {
        let (code, marker, rest) = parse_line_prefix("250-version=0.4.8").unwrap();
        assert_eq!(code, StatusCode::Ok);
        assert_eq!(marker, Marker::Continuation);
        assert_eq!(rest, "version=0.4.8");

        let (_, marker, rest) = parse_line_prefix("250+config-text=").unwrap();
        assert_eq!(marker, Marker::DataBlock);
        assert_eq!(rest, "config-text=");

        let (code, marker, rest) = parse_line_prefix("650 ").unwrap();
        assert_eq!(code, StatusCode::AsyncEventNotify);
        assert_eq!(marker, Marker::Final);
        assert_eq!(rest, "");
    }

    #[test]
    fn prefix_rejects_bad_lines() {
        assert!(matches!(
            parse_line_prefix("25"),
            Err(ReplyParseError::LineTooShort { .. })
        ));
        assert!(matches!(
            parse_line_prefix("2x0 OK"),
            Err(ReplyParseError::InvalidStatusCode { .. })
        ));
        assert!(matches!(
            parse_line_prefix("250*OK"),
            Err(ReplyParseError::InvalidMarker { marker: '*', .. })
        ));
    }

    #[test]
    fn arguments_respect_quotes() {
        let args = split_arguments(r#"NOTICE BOOTSTRAP PROGRESS=100 SUMMARY="Done \"now\"""#);
        assert_eq!(
            args,
            vec!["NOTICE", "BOOTSTRAP", "PROGRESS=100", r#"SUMMARY=Done "now""#]
        );
        assert!(split_arguments("   ").is_empty());
        assert_eq!(split_arguments(r#"A="""#), vec!["A="]);
    }

    #[test]
    fn keyword_args_leave_server_specs_positional() {
        let args = KeywordArgs::parse("7 BUILT $AAAA~relay,$BBBB=named PURPOSE=GENERAL");
        assert_eq!(args.positional(0), Some("7"));
        assert_eq!(args.positional(2), Some("$AAAA~relay,$BBBB=named"));
        assert_eq!(args.get("PURPOSE"), Some("GENERAL"));
        assert_eq!(args.get("MISSING"), None);
    }
}
