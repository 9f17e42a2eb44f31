//! Domain-ruleset category database: writer and reader.
//!
//! The blob groups matchers by category code behind a small index, so a
//! runtime consumer resolves one category in constant time and then scans
//! only that category's matchers. Layout: magic + version, category count,
//! index entries (code, data offset, item count) sorted by code, then the
//! per-category item data in the same order, written in a single streaming
//! pass.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use thiserror::Error;

const MAGIC: &[u8; 4] = b"GSDB";
const FORMAT_VERSION: u8 = 1;

/// Matcher kind for one domain entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RuleKind {
    /// Exact domain match.
    Domain = 0,
    /// Suffix match; values are stored with a leading dot.
    DomainSuffix = 1,
    /// Substring match anywhere in the queried name.
    DomainKeyword = 2,
    /// Regular-expression match.
    DomainRegex = 3,
}

impl RuleKind {
    fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(RuleKind::Domain),
            1 => Some(RuleKind::DomainSuffix),
            2 => Some(RuleKind::DomainKeyword),
            3 => Some(RuleKind::DomainRegex),
            _ => None,
        }
    }
}

/// One matcher inside a category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub kind: RuleKind,
    pub value: String,
}

/// Errors from writing or reading a domain-ruleset database.
#[derive(Debug, Error)]
pub enum GeositeError {
    #[error("category code of {0} bytes does not fit a length prefix")]
    CodeTooLong(usize),
    #[error("matcher value of {0} bytes does not fit a length prefix")]
    ValueTooLong(usize),
    #[error("failed to write database: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed database: {0}")]
    Malformed(&'static str),
}

/// Serialize the category map into `writer` as one complete database blob.
///
/// An empty map produces a valid header-only blob.
pub fn write<W: Write>(
    writer: &mut W,
    categories: &BTreeMap<String, Vec<Item>>,
) -> Result<(), GeositeError> {
    let mut bodies = Vec::with_capacity(categories.len());
    for items in categories.values() {
        let mut body = Vec::new();
        for item in items {
            if item.value.len() > usize::from(u16::MAX) {
                return Err(GeositeError::ValueTooLong(item.value.len()));
            }
            body.push(item.kind as u8);
            body.extend_from_slice(&(item.value.len() as u16).to_be_bytes());
            body.extend_from_slice(item.value.as_bytes());
        }
        bodies.push(body);
    }

    writer.write_all(MAGIC)?;
    writer.write_all(&[FORMAT_VERSION])?;
    writer.write_all(&(categories.len() as u32).to_be_bytes())?;
    let mut offset = 0u32;
    for ((code, items), body) in categories.iter().zip(&bodies) {
        if code.len() > usize::from(u8::MAX) {
            return Err(GeositeError::CodeTooLong(code.len()));
        }
        writer.write_all(&[code.len() as u8])?;
        writer.write_all(code.as_bytes())?;
        writer.write_all(&offset.to_be_bytes())?;
        writer.write_all(&(items.len() as u32).to_be_bytes())?;
        offset += body.len() as u32;
    }
    for body in &bodies {
        writer.write_all(body)?;
    }
    Ok(())
}

/// Read-side view of a serialized database.
#[derive(Debug, Clone)]
pub struct GeositeDatabase {
    index: HashMap<String, (u32, u32)>,
    data: Vec<u8>,
}

impl GeositeDatabase {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GeositeError> {
        let mut at = 0usize;
        if take(bytes, &mut at, 4)? != MAGIC {
            return Err(GeositeError::Malformed("bad magic"));
        }
        if take(bytes, &mut at, 1)?[0] != FORMAT_VERSION {
            return Err(GeositeError::Malformed("unsupported format version"));
        }
        let count = take_u32(bytes, &mut at)?;
        let mut index = HashMap::with_capacity(count as usize);
        for _ in 0..count {
            let code_len = take(bytes, &mut at, 1)?[0] as usize;
            let code = std::str::from_utf8(take(bytes, &mut at, code_len)?)
                .map_err(|_| GeositeError::Malformed("category code is not UTF-8"))?
                .to_string();
            let offset = take_u32(bytes, &mut at)?;
            let items = take_u32(bytes, &mut at)?;
            index.insert(code, (offset, items));
        }
        Ok(Self {
            index,
            data: bytes[at..].to_vec(),
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    /// Category codes in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.index.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Decode one category's matcher list. `Ok(None)` means the category is
    /// not present.
    pub fn read_category(&self, code: &str) -> Result<Option<Vec<Item>>, GeositeError> {
        let Some(&(offset, count)) = self.index.get(code) else {
            return Ok(None);
        };
        let mut at = offset as usize;
        let mut items = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let header = self
                .data
                .get(at..at + 3)
                .ok_or(GeositeError::Malformed("truncated category data"))?;
            let kind = RuleKind::from_u8(header[0])
                .ok_or(GeositeError::Malformed("unknown matcher kind"))?;
            let len = u16::from_be_bytes([header[1], header[2]]) as usize;
            let value = self
                .data
                .get(at + 3..at + 3 + len)
                .ok_or(GeositeError::Malformed("truncated category data"))?;
            let value = std::str::from_utf8(value)
                .map_err(|_| GeositeError::Malformed("matcher value is not UTF-8"))?;
            items.push(Item {
                kind,
                value: value.to_string(),
            });
            at += 3 + len;
        }
        Ok(Some(items))
    }
}

fn take<'a>(bytes: &'a [u8], at: &mut usize, len: usize) -> Result<&'a [u8], GeositeError> {
    let slice = bytes
        .get(*at..*at + len)
        .ok_or(GeositeError::Malformed("truncated database"))?;
    *at += len;
    Ok(slice)
}

fn take_u32(bytes: &[u8], at: &mut usize) -> Result<u32, GeositeError> {
    let raw = take(bytes, at, 4)?;
    Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
