//! Header storage for a parsed request.
//!
//! Headers are kept in an insertion-ordered map keyed by the exact header
//! name. A name keeps the position of its first insertion even when its value
//! is later overwritten, so an untouched request re-serializes with its
//! original header order.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::error::{ParseError, Result};

/// Bytes added around each header on the wire: `": "` and `"\r\n"`.
const HEADER_FRAMING_LEN: usize = 4;

// ---------------------------------------------------------------------------
// HeaderEntry
// ---------------------------------------------------------------------------

/// A single header field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderEntry {
    /// Header field name, casing preserved.
    pub name: String,
    /// Header field value, leading OWS stripped, trailing bytes verbatim.
    pub value: String,
}

impl HeaderEntry {
    /// Length of this entry once rendered as `name: value\r\n`.
    #[inline]
    pub fn wire_len(&self) -> usize {
        self.name.len() + self.value.len() + HEADER_FRAMING_LEN
    }

    /// Parse one non-empty header line (without its terminator).
    ///
    /// The first colon delimits the name. The name is taken verbatim and must
    /// be non-empty with no surrounding whitespace. Leading spaces and tabs of
    /// the value are stripped.
    pub fn parse_line(line: &str) -> Result<Self> {
        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::MalformedHeaderLine(line.to_string()));
        };

        if name.is_empty() || name.starts_with(is_ows) || name.ends_with(is_ows) {
            return Err(ParseError::MalformedHeaderLine(line.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            value: value.trim_start_matches(is_ows).to_string(),
        })
    }

    fn write_into(&self, out: &mut String) {
        out.push_str(&self.name);
        out.push_str(": ");
        out.push_str(&self.value);
        out.push_str("\r\n");
    }
}

#[inline]
fn is_ows(c: char) -> bool {
    c == ' ' || c == '\t'
}

// ---------------------------------------------------------------------------
// HeaderTable
// ---------------------------------------------------------------------------

/// Insertion-ordered header collection with exact-match name lookup.
#[derive(Debug, Clone, Default)]
pub struct HeaderTable {
    entries: IndexMap<String, HeaderEntry>,
}

impl HeaderTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header, or overwrite the value of an existing one in place.
    ///
    /// Returns `true` when an existing value was replaced.
    pub fn upsert(&mut self, name: &str, value: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(entry) => {
                entry.value.clear();
                entry.value.push_str(value);
                true
            }
            None => {
                self.entries.insert(
                    name.to_string(),
                    HeaderEntry {
                        name: name.to_string(),
                        value: value.to_string(),
                    },
                );
                false
            }
        }
    }

    /// Exact-match lookup by name.
    pub fn lookup(&self, name: &str) -> Option<&HeaderEntry> {
        self.entries.get(name)
    }

    /// Whether a header with exactly this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove a header and its position in the serialization order.
    pub fn remove(&mut self, name: &str) -> Result<HeaderEntry> {
        // shift_remove keeps the relative order of the remaining entries.
        self.entries
            .shift_remove(name)
            .ok_or_else(|| ParseError::HeaderNotFound(name.to_string()))
    }

    /// Number of distinct header names.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no headers.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every header.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over entries in serialization order.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderEntry> + '_ {
        self.entries.values()
    }

    /// Exact byte length of [`HeaderTable::write_into`] output.
    pub fn headers_len(&self) -> usize {
        self.iter().map(HeaderEntry::wire_len).sum()
    }

    /// Append every header as `name: value\r\n`, in order.
    pub fn write_into(&self, out: &mut String) {
        for entry in self.iter() {
            entry.write_into(out);
        }
    }
}

impl PartialEq for HeaderTable {
    /// Equal when both tables hold the same entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.count() == other.count() && self.iter().eq(other.iter())
    }
}

impl Eq for HeaderTable {}

impl Serialize for HeaderTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'a> IntoIterator for &'a HeaderTable {
    type Item = &'a HeaderEntry;
    type IntoIter = indexmap::map::Values<'a, String, HeaderEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

// ---------------------------------------------------------------------------
// Tests (unit)
// ---------------------------------------------------------------------------
