//! Row addresses.
//!
//! An address locates a row in the original tree as a dot-joined sequence of
//! segments, e.g. `1.1.i2.3`:
//!
//! - an **ordinal** (`[1-9][0-9]*`) is the 1-based position of a key within
//!   its parent object;
//! - an **item marker** is the position of an element within its parent list.
//!
//! Two marker encodings exist, selected by [`MarkerScheme`]. All code outside
//! this module goes through [`MarkerScheme::render`], [`MarkerScheme::parse`]
//! and [`MarkerScheme::is_item_marker`] rather than inspecting raw text.

use core::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error that occurs while parsing an address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address {input:?} at position {position}: {message}")]
pub struct AddressError {
    pub input: String,
    pub message: String,
    pub position: usize,
}

impl AddressError {
    fn new(input: &str, message: impl Into<String>, position: usize) -> Self {
        AddressError {
            input: input.to_string(),
            message: message.into(),
            position,
        }
    }
}

/// How list item positions are written in addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MarkerScheme {
    /// `i1`, `i2`, ... (unbounded)
    #[default]
    Indexed,
    /// `a`, `b`, ... `z` (at most 26 items per list)
    Letters,
}

impl MarkerScheme {
    /// Largest list length the scheme can address, if bounded.
    pub fn capacity(self) -> Option<usize> {
        match self {
            MarkerScheme::Indexed => None,
            MarkerScheme::Letters => Some(26),
        }
    }

    /// Render the marker for the 0-based list position `index`.
    ///
    /// Returns `None` when the position is beyond the scheme's capacity.
    pub fn render(self, index: usize) -> Option<String> {
        match self {
            MarkerScheme::Indexed => Some(format!("i{}", index + 1)),
            MarkerScheme::Letters if index < 26 => Some(char::from(b'a' + index as u8).to_string()),
            MarkerScheme::Letters => None,
        }
    }

    /// Parse a marker token back to its 0-based list position.
    pub fn parse(self, token: &str) -> Option<usize> {
        match self {
            MarkerScheme::Indexed => {
                let digits = token.strip_prefix('i')?;
                parse_positive(digits).map(|n| n - 1)
            }
            MarkerScheme::Letters => match token.as_bytes() {
                [c @ b'a'..=b'z'] => Some((c - b'a') as usize),
                _ => None,
            },
        }
    }

    /// Check whether `token` is an item marker in this scheme.
    pub fn is_item_marker(self, token: &str) -> bool {
        self.parse(token).is_some()
    }
}

impl fmt::Display for MarkerScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerScheme::Indexed => f.write_str("indexed"),
            MarkerScheme::Letters => f.write_str("letters"),
        }
    }
}

/// Parse `[1-9][0-9]*` into a positive integer.
fn parse_positive(digits: &str) -> Option<usize> {
    let bytes = digits.as_bytes();
    match bytes.first() {
        Some(b'1'..=b'9') if bytes.iter().all(u8::is_ascii_digit) => digits.parse().ok(),
        _ => None,
    }
}

/// A single address segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// 1-based position of a key within its object
    Ordinal(usize),
    /// 0-based position of an element within its list
    Item(usize),
}

impl Segment {
    /// Create an ordinal segment (1-based).
    pub fn ordinal(n: usize) -> Self {
        Segment::Ordinal(n)
    }

    /// Create an item segment (0-based).
    pub fn item(index: usize) -> Self {
        Segment::Item(index)
    }

    /// Check whether this segment addresses a list element.
    pub fn is_item(&self) -> bool {
        matches!(self, Segment::Item(_))
    }
}

/// A row address: a non-empty sequence of segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(Vec<Segment>);

impl Address {
    /// Address of the `n`th (1-based) top-level key.
    pub fn root(n: usize) -> Self {
        Address(vec![Segment::Ordinal(n)])
    }

    /// Build an address from segments.
    ///
    /// Returns `None` for an empty sequence.
    pub fn from_segments(segments: Vec<Segment>) -> Option<Self> {
        if segments.is_empty() {
            None
        } else {
            Some(Address(segments))
        }
    }

    /// Extend this address by one segment.
    pub fn child(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Address(segments)
    }

    /// The address with its last segment removed, if any remain.
    pub fn parent(&self) -> Option<Address> {
        if self.0.len() > 1 {
            Some(Address(self.0[..self.0.len() - 1].to_vec()))
        } else {
            None
        }
    }

    /// The segments of this address.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// The last segment.
    pub fn last(&self) -> Segment {
        // Non-empty by construction.
        self.0[self.0.len() - 1]
    }

    /// The first segment.
    pub fn first(&self) -> Segment {
        self.0[0]
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Render as dot-joined text using `scheme` for item markers.
    ///
    /// Returns `None` when an item position exceeds the scheme's capacity.
    pub fn render(&self, scheme: MarkerScheme) -> Option<String> {
        let mut out = String::new();
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match segment {
                Segment::Ordinal(n) => out.push_str(&n.to_string()),
                Segment::Item(index) => out.push_str(&scheme.render(*index)?),
            }
        }
        Some(out)
    }

    /// Parse dot-joined address text.
    pub fn parse(input: &str, scheme: MarkerScheme) -> Result<Self, AddressError> {
        Parser::new(input, scheme).parse_address()
    }

    /// A renderable view of this address.
    pub fn display(&self, scheme: MarkerScheme) -> AddressDisplay<'_> {
        AddressDisplay {
            address: self,
            scheme,
        }
    }
}

/// Display adapter returned by [`Address::display`].
///
/// Item positions beyond the scheme's capacity are written in indexed form so
/// that error messages never fail to render.
pub struct AddressDisplay<'a> {
    address: &'a Address,
    scheme: MarkerScheme,
}

impl fmt::Display for AddressDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.address.render(self.scheme) {
            Some(text) => f.write_str(&text),
            None => match self.address.render(MarkerScheme::Indexed) {
                Some(text) => f.write_str(&text),
                None => Err(fmt::Error),
            },
        }
    }
}

/// Parser state.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
    scheme: MarkerScheme,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, scheme: MarkerScheme) -> Self {
        Parser {
            input,
            pos: 0,
            scheme,
        }
    }

    fn error(&self, message: impl Into<String>) -> AddressError {
        AddressError::new(self.input, message, self.pos)
    }

    /// Peek at the current character without consuming it.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Consume the next segment token (everything up to '.' or end).
    fn next_token(&mut self) -> &'a str {
        let rest = &self.input[self.pos..];
        let end = rest.find('.').unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn parse_segment(&mut self) -> Result<Segment, AddressError> {
        let start = self.pos;
        let token = self.next_token();
        if token.is_empty() {
            self.pos = start;
            return Err(self.error("empty segment"));
        }
        if let Some(n) = parse_positive(token) {
            return Ok(Segment::Ordinal(n));
        }
        if let Some(index) = self.scheme.parse(token) {
            return Ok(Segment::Item(index));
        }
        self.pos = start;
        Err(self.error(format!(
            "expected ordinal or {} item marker, found {:?}",
            self.scheme, token
        )))
    }

    fn parse_address(&mut self) -> Result<Address, AddressError> {
        let mut segments = vec![self.parse_segment()?];
        while let Some(c) = self.peek() {
            debug_assert_eq!(c, '.');
            self.pos += c.len_utf8();
            segments.push(self.parse_segment()?);
        }
        Ok(Address(segments))
    }
}
