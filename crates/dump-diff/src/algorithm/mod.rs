//! Line-level diff: edit scripts and their grouping into divergences.

pub mod myers;

use bstr::BString;

use crate::{DiffLine, Divergence};

/// An edit operation in the edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Line present in both old and new (equal).
    Equal,
    /// Line inserted (present only in new).
    Insert,
    /// Line deleted (present only in old).
    Delete,
}

/// A single edit in the edit script, referencing lines by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    /// The operation.
    pub op: EditOp,
    /// Index into the old sequence (for Insert, the position it lands before).
    pub old_index: usize,
    /// Index into the new sequence (for Delete, the position it lands before).
    pub new_index: usize,
}

/// Compute a line-level edit script between two byte slices.
pub fn diff_edits(old: &[u8], new: &[u8]) -> Vec<Edit> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    myers::diff(&old_lines, &new_lines)
}

/// Diff two byte slices and group the changes into divergences carrying
/// `context_lines` lines of context on each side.
pub fn diff_divergences(old: &[u8], new: &[u8], context_lines: u32) -> Vec<Divergence> {
    let old_lines = split_lines(old);
    let new_lines = split_lines(new);
    let edits = myers::diff(&old_lines, &new_lines);
    edits_to_divergences(&edits, &old_lines, &new_lines, context_lines)
}

/// Convert a list of edits into divergences with context lines.
fn edits_to_divergences(
    edits: &[Edit],
    old_lines: &[&[u8]],
    new_lines: &[&[u8]],
    context_lines: u32,
) -> Vec<Divergence> {
    let ctx = context_lines as usize;

    // (start, end) index ranges of consecutive non-Equal edits
    let mut change_ranges: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;
    while i < edits.len() {
        if edits[i].op != EditOp::Equal {
            let start = i;
            while i < edits.len() && edits[i].op != EditOp::Equal {
                i += 1;
            }
            change_ranges.push((start, i));
        } else {
            i += 1;
        }
    }

    let Some(&first) = change_ranges.first() else {
        return Vec::new();
    };

    // Merge change ranges whose gap fits inside shared context
    let mut merged: Vec<(usize, usize)> = Vec::new();
    let mut current = first;
    for &(start, end) in &change_ranges[1..] {
        if start - current.1 <= 2 * ctx {
            current.1 = end;
        } else {
            merged.push(current);
            current = (start, end);
        }
    }
    merged.push(current);

    let old_offsets = line_offsets(old_lines);
    let new_offsets = line_offsets(new_lines);

    let mut divergences = Vec::with_capacity(merged.len());
    for (change_start, change_end) in merged {
        let from = change_start.saturating_sub(ctx);
        let to = (change_end + ctx).min(edits.len());

        let mut lines = Vec::with_capacity(to - from);
        let mut old_count = 0u32;
        let mut new_count = 0u32;
        for edit in &edits[from..to] {
            match edit.op {
                EditOp::Equal => {
                    lines.push(DiffLine::Context(BString::from(old_lines[edit.old_index])));
                    old_count += 1;
                    new_count += 1;
                }
                EditOp::Delete => {
                    lines.push(DiffLine::Deletion(BString::from(old_lines[edit.old_index])));
                    old_count += 1;
                }
                EditOp::Insert => {
                    lines.push(DiffLine::Addition(BString::from(new_lines[edit.new_index])));
                    new_count += 1;
                }
            }
        }

        let lead = &edits[from];
        let change = &edits[change_start];
        divergences.push(Divergence {
            old_start: (lead.old_index + 1) as u32,
            old_count,
            new_start: (lead.new_index + 1) as u32,
            new_count,
            old_offset: old_offsets[change.old_index],
            new_offset: new_offsets[change.new_index],
            lines,
        });
    }

    divergences
}

/// Byte offset of the start of each line, plus the total length.
fn line_offsets(lines: &[&[u8]]) -> Vec<u64> {
    let mut offsets = Vec::with_capacity(lines.len() + 1);
    let mut pos = 0u64;
    offsets.push(pos);
    for line in lines {
        pos += line.len() as u64;
        offsets.push(pos);
    }
    offsets
}

/// Split a byte slice into lines (preserving line endings).
pub fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    if data.is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    let mut start = 0;
    for (i, &byte) in data.iter().enumerate() {
        if byte == b'\n' {
            lines.push(&data[start..=i]);
            start = i + 1;
        }
    }
    // Content after the last newline is a line without a terminator
    if start < data.len() {
        lines.push(&data[start..]);
    }
    lines
}

/// Compute a hash for a line (used for fast comparison).
/// DJB2a (xor variant).
pub(crate) fn line_hash(line: &[u8]) -> u64 {
    let mut hash: u64 = 5381;
    for &b in line {
        hash = hash.wrapping_mul(33) ^ (b as u64);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_empty() {
        assert!(split_lines(b"").is_empty());
    }

    #[test]
    fn split_lines_no_trailing_newline() {
        let lines = split_lines(b"a\nb");
        assert_eq!(lines, vec![b"a\n".as_slice(), b"b"]);
    }

    #[test]
    fn split_lines_multiple() {
        let lines = split_lines(b"a\nb\nc\n");
        assert_eq!(lines, vec![b"a\n".as_slice(), b"b\n", b"c\n"]);
    }

    #[test]
    fn line_hash_deterministic() {
        assert_eq!(line_hash(b"hello\n"), line_hash(b"hello\n"));
        assert_ne!(line_hash(b"hello\n"), line_hash(b"world\n"));
    }

    #[test]
    fn no_changes_no_divergences() {
        assert!(diff_divergences(b"a\nb\n", b"a\nb\n", 3).is_empty());
    }

    #[test]
    fn single_change_ranges_and_offsets() {
        let old = b"K 4\nbla\nV 5\nblubb\nPROPS-END\n";
        let new = b"K 4\nbla\nV 5\nblubx\nPROPS-END\n";
        let divs = diff_divergences(old, new, 1);
        assert_eq!(divs.len(), 1);
        let d = &divs[0];
        assert_eq!((d.old_start, d.old_count), (3, 3));
        assert_eq!((d.new_start, d.new_count), (3, 3));
        // "K 4\nbla\nV 5\n" is 12 bytes
        assert_eq!(d.old_offset, 12);
        assert_eq!(d.new_offset, 12);
        assert_eq!(
            d.lines,
            vec![
                DiffLine::Context(BString::from("V 5\n")),
                DiffLine::Deletion(BString::from("blubb\n")),
                DiffLine::Addition(BString::from("blubx\n")),
                DiffLine::Context(BString::from("PROPS-END\n")),
            ]
        );
    }

    #[test]
    fn distant_changes_split_near_changes_merge() {
        let old: Vec<u8> = (0..20).flat_map(|i| format!("line {i}\n").into_bytes()).collect();
        let mut far = old.clone();
        let mut near = old.clone();
        far.splice(0..0, b"head\n".iter().copied());
        far.extend_from_slice(b"tail\n");
        near.splice(0..0, b"head\n".iter().copied());
        let insert_at = near.len() - "line 17\nline 18\nline 19\n".len();
        near.splice(insert_at..insert_at, b"mid\n".iter().copied());

        assert_eq!(diff_divergences(&old, &far, 3).len(), 2);
        assert_eq!(diff_divergences(&old, &near, 10).len(), 1);
    }

    #[test]
    fn trailing_insert_offset_is_end_of_old() {
        let divs = diff_divergences(b"a\nb\n", b"a\nb\nc\n", 0);
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0].old_offset, 4);
        assert_eq!(divs[0].new_offset, 4);
        assert_eq!(divs[0].old_count, 0);
        assert_eq!(divs[0].new_count, 1);
    }
}
