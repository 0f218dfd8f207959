//! Property sources.
//!
//! This module provides the flat key/value model of a single configuration
//! file, together with a parser for the standard property-file syntax:
//!
//! - blank lines and lines starting with `#` or `!` are ignored;
//! - a key is separated from its value by the first unescaped `=`, `:` or
//!   whitespace character;
//! - lines end at `\n`, `\r\n` or a lone `\r`;
//! - a line ending in an odd number of backslashes continues on the next
//!   line, whose leading whitespace is dropped;
//! - `\t`, `\n`, `\r`, `\f` and `\uXXXX` escapes are decoded (a UTF-16
//!   surrogate pair written as two `\u` escapes is one character), and any
//!   other escaped character stands for itself.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::Chars;

use serde::Serialize;
use tracing::debug;

use crate::error::ConfigError;

/// A parsed set of properties.
///
/// Keys are unique. Iteration order is the sorted key order, independent of
/// the order the keys appeared in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse property-file text.
    ///
    /// # Arguments
    ///
    /// * `input` - The file contents.
    ///
    /// # Returns
    ///
    /// The parsed properties, or a `ConfigError::Syntax` naming the line of a
    /// malformed escape. When a key repeats, the last occurrence wins.
    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        let mut properties = Self::new();
        let mut lines = split_lines(input).enumerate();

        while let Some((index, raw)) = lines.next() {
            let line_no = index + 1;
            let trimmed = raw.trim_start_matches(is_blank);
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                continue;
            }

            let mut logical = trimmed.to_string();
            while continues(&logical) {
                logical.pop();
                match lines.next() {
                    Some((_, next)) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical, line_no)?;
            properties.entries.insert(key, value);
        }

        Ok(properties)
    }

    /// Read and parse a property file.
    ///
    /// Files are expected to be UTF-8; anything else is decoded as
    /// ISO-8859-1, the traditional encoding of property files.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)?;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                debug!(path = %path.display(), "Property file is not UTF-8, decoding as ISO-8859-1");
                err.into_bytes().into_iter().map(char::from).collect()
            }
        };
        Self::parse(&content)
    }

    /// Get the value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over the entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Properties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    origin: Option<PathBuf>,
    properties: Properties,
}

impl ConfigSource {
    /// Create a source for properties parsed from `origin`.
    pub fn new(origin: impl Into<PathBuf>, properties: Properties) -> Self {
        Self {
            origin: Some(origin.into()),
            properties,
        }
    }

    /// Create a source that was not read from a file.
    pub fn in_memory(properties: Properties) -> Self {
        Self {
            origin: None,
            properties,
        }
    }

    /// The file this source was parsed from, if any.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// The parsed properties.
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{000C}')
}

fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str, line_no: usize) -> Result<(String, String), ConfigError> {
    let mut key_end = line.len();
    let mut value_start = line.len();
    let mut chars = line.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '=' | ':' => {
                key_end = i;
                value_start = i + 1;
                break;
            }
            c if is_blank(c) => {
                key_end = i;
                let rest = line[i..].trim_start_matches(is_blank);
                value_start = line.len() - rest.len();
                if rest.starts_with('=') || rest.starts_with(':') {
                    value_start += 1;
                }
                break;
            }
            _ => {}
        }
    }

    let key = unescape(&line[..key_end], line_no)?;
    let value = unescape(line[value_start..].trim_start_matches(is_blank), line_no)?;
    Ok((key, value))
}

fn split_lines(input: &str) -> impl Iterator<Item = &str> {
    let mut rest = input;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let line = match rest.find(&['\r', '\n'][..]) {
            Some(end) => {
                let terminator = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
                let line = &rest[..end];
                rest = &rest[end + terminator..];
                line
            }
            None => std::mem::take(&mut rest),
        };
        Some(line)
    })
}

fn unescape(raw: &str, line: usize) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{000C}'),
            Some('u') => {
                let unit = read_code_unit(&mut chars, line)?;
                out.push(decode_code_point(unit, &mut chars, line)?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    Ok(out)
}

fn read_code_unit(chars: &mut Chars<'_>, line: usize) -> Result<u32, ConfigError> {
    let hex: String = chars.by_ref().take(4).collect();
    let malformed = || ConfigError::Syntax {
        line,
        message: format!("malformed \\uxxxx escape: \\u{hex}"),
    };

    if hex.len() != 4 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(malformed());
    }
    u32::from_str_radix(&hex, 16).map_err(|_| malformed())
}

/// Decode one UTF-16 code unit, consuming the `\uXXXX` low surrogate that
/// must follow a high surrogate.
fn decode_code_point(unit: u32, chars: &mut Chars<'_>, line: usize) -> Result<char, ConfigError> {
    let unpaired = || ConfigError::Syntax {
        line,
        message: format!("unpaired surrogate in escape: \\u{unit:04X}"),
    };

    match unit {
        0xD800..=0xDBFF => {
            let mut lookahead = chars.clone();
            if lookahead.next() != Some('\\') || lookahead.next() != Some('u') {
                return Err(unpaired());
            }
            let low = read_code_unit(&mut lookahead, line)?;
            if !(0xDC00..=0xDFFF).contains(&low) {
                return Err(unpaired());
            }
            *chars = lookahead;
            let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
            char::from_u32(code).ok_or_else(unpaired)
        }
        0xDC00..=0xDFFF => Err(unpaired()),
        _ => char::from_u32(unit).ok_or_else(unpaired),
    }
}
