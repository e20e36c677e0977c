//! Masking of non-semantic dump metadata.
//!
//! Two repositories built from the same history still differ in their UUID
//! and, unless the dump carries them through, in commit timestamps. The
//! normalizer rewrites such lines to fixed placeholders. It never adds or
//! removes lines, so divergence line numbers still point into the original
//! artifacts.
//!
//! Masking follows the record structure of the dump: the `UUID:` header is
//! only recognized in the preamble, `svn:date` only inside a revision
//! record's property block, and user masks only on record header lines.
//! Content bodies (node properties and file text) are copied byte for byte.

use std::borrow::Cow;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::DiffError;

pub const UUID_PLACEHOLDER: &str = "00000000-0000-0000-0000-000000000000";
pub const DATE_PLACEHOLDER: &str = "1970-01-01T00:00:00.000000Z";
pub const MASK_PLACEHOLDER: &str = "<masked>";

/// Which metadata to mask before comparing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeRules {
    /// Mask the `UUID:` header.
    pub uuid: bool,
    /// Mask `svn:date` revision property values.
    pub dates: bool,
    /// Extra regular expressions; any matching record header line is
    /// replaced by `<masked>`.
    pub mask: Vec<String>,
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self {
            uuid: true,
            dates: false,
            mask: Vec::new(),
        }
    }
}

/// Compiled form of [`NormalizeRules`].
#[derive(Debug, Clone)]
pub struct Normalizer {
    uuid: bool,
    dates: bool,
    masks: Vec<Regex>,
}

/// Lengths announced by one record's header block.
#[derive(Debug, Default)]
struct RecordHeader {
    revision: bool,
    prop_len: Option<usize>,
    text_len: Option<usize>,
    content_len: Option<usize>,
}

impl RecordHeader {
    fn observe(&mut self, line: &[u8]) {
        if line.starts_with(b"Revision-number: ") {
            self.revision = true;
        } else if let Some(n) = header_len(line, b"Prop-content-length: ") {
            self.prop_len = Some(n);
        } else if let Some(n) = header_len(line, b"Text-content-length: ") {
            self.text_len = Some(n);
        } else if let Some(n) = header_len(line, b"Content-length: ") {
            self.content_len = Some(n);
        }
    }

    fn body_len(&self) -> usize {
        self.content_len
            .unwrap_or_else(|| self.prop_len.unwrap_or(0).saturating_add(self.text_len.unwrap_or(0)))
    }
}

impl Normalizer {
    pub fn new(rules: &NormalizeRules) -> Result<Self, DiffError> {
        let masks = rules
            .mask
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| DiffError::Pattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            uuid: rules.uuid,
            dates: rules.dates,
            masks,
        })
    }

    /// A normalizer that leaves every artifact untouched.
    pub fn identity() -> Self {
        Self {
            uuid: false,
            dates: false,
            masks: Vec::new(),
        }
    }

    fn is_identity(&self) -> bool {
        !self.uuid && !self.dates && self.masks.is_empty()
    }

    pub fn normalize<'a>(&self, dump: &'a [u8]) -> Cow<'a, [u8]> {
        if self.is_identity() {
            return Cow::Borrowed(dump);
        }

        let mut out = Vec::with_capacity(dump.len());
        let mut changed = false;
        let mut preamble = true;
        let mut header: Option<RecordHeader> = None;
        let mut pos = 0;
        while pos < dump.len() {
            let line = line_at(dump, pos);
            pos += line.len();
            let (body, eol) = split_eol(line);

            if !body.is_empty() {
                let record = header.get_or_insert_with(RecordHeader::default);
                record.observe(body);
                if record.revision {
                    preamble = false;
                }
                if self.uuid && preamble && body.starts_with(b"UUID: ") {
                    out.extend_from_slice(b"UUID: ");
                    out.extend_from_slice(UUID_PLACEHOLDER.as_bytes());
                    out.extend_from_slice(eol);
                    changed = true;
                } else if self.masks.iter().any(|re| re.is_match(body)) {
                    out.extend_from_slice(MASK_PLACEHOLDER.as_bytes());
                    out.extend_from_slice(eol);
                    changed = true;
                } else {
                    out.extend_from_slice(line);
                }
                continue;
            }

            out.extend_from_slice(line);
            // a blank line closes the header block; the body follows verbatim
            let Some(record) = header.take() else {
                continue;
            };
            let end = pos.saturating_add(record.body_len()).min(dump.len());
            let content = &dump[pos..end];
            let props_end = record.prop_len.unwrap_or(0).min(content.len());
            if self.dates && record.revision && props_end > 0 {
                changed |= mask_date(&content[..props_end], &mut out);
                out.extend_from_slice(&content[props_end..]);
            } else {
                out.extend_from_slice(content);
            }
            pos = end;
        }

        if changed {
            Cow::Owned(out)
        } else {
            Cow::Borrowed(dump)
        }
    }
}

/// Copy a revision property block, replacing the `svn:date` value.
///
/// Anything that does not parse as `K n` / `V n` entries is copied as is.
fn mask_date(props: &[u8], out: &mut Vec<u8>) -> bool {
    let mut pos = 0;
    let mut key: &[u8] = &[];
    let mut changed = false;
    while pos < props.len() {
        let line = line_at(props, pos);
        let (body, _) = split_eol(line);
        let entry = header_len(body, b"K ")
            .map(|n| (true, n))
            .or_else(|| header_len(body, b"V ").map(|n| (false, n)));
        let Some((is_key, n)) = entry else {
            break;
        };
        let data_start = pos + line.len();
        let Some(data_end) = data_start.checked_add(n).filter(|&end| end <= props.len()) else {
            break;
        };
        let data = &props[data_start..data_end];

        if is_key {
            key = data;
            out.extend_from_slice(line);
            out.extend_from_slice(data);
        } else if key == b"svn:date" && !data.contains(&b'\n') && line.ends_with(b"\n") {
            out.extend_from_slice(format!("V {}\n", DATE_PLACEHOLDER.len()).as_bytes());
            out.extend_from_slice(DATE_PLACEHOLDER.as_bytes());
            changed = true;
        } else {
            out.extend_from_slice(line);
            out.extend_from_slice(data);
        }
        pos = data_end;
        // the newline terminating the data
        if props.get(pos) == Some(&b'\n') {
            out.push(b'\n');
            pos += 1;
        }
    }
    out.extend_from_slice(&props[pos..]);
    changed
}

fn header_len(line: &[u8], prefix: &[u8]) -> Option<usize> {
    let digits = line.strip_prefix(prefix)?;
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// The line starting at `pos`, including its newline if any.
fn line_at(data: &[u8], pos: usize) -> &[u8] {
    let rest = &data[pos..];
    match rest.iter().position(|&b| b == b'\n') {
        Some(i) => &rest[..=i],
        None => rest,
    }
}

fn split_eol(line: &[u8]) -> (&[u8], &[u8]) {
    match line.strip_suffix(b"\n") {
        Some(body) => (body, &line[body.len()..]),
        None => (line, &[]),
    }
}
