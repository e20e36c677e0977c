//! Unified diff format output.
//!
//! Produces standard unified diff format with `---`/`+++` headers,
//! `@@ ... @@` hunk headers, and context/addition/deletion lines.

use crate::{ComparisonResult, DiffLine, Divergence};

/// Format a comparison result as a unified diff between two labelled artifacts.
///
/// Returns an empty string when the artifacts are equivalent.
pub fn format(result: &ComparisonResult, old_label: &str, new_label: &str) -> String {
    let divergences = result.divergences();
    if divergences.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- {old_label}\n"));
    out.push_str(&format!("+++ {new_label}\n"));
    for divergence in divergences {
        format_divergence(&mut out, divergence);
    }
    out
}

/// Format a hunk header and lines.
fn format_divergence(out: &mut String, d: &Divergence) {
    out.push_str(&format!(
        "@@ -{} +{} @@ bytes {}/{}\n",
        range(d.old_start, d.old_count),
        range(d.new_start, d.new_count),
        d.old_offset,
        d.new_offset
    ));

    for line in &d.lines {
        let (marker, content) = match line {
            DiffLine::Context(content) => (' ', content),
            DiffLine::Addition(content) => ('+', content),
            DiffLine::Deletion(content) => ('-', content),
        };
        out.push(marker);
        push_line(out, content);
        ensure_newline(out);
    }
}

/// Append line content, spelling out bytes that are not UTF-8 as `\xNN`.
///
/// Backslashes in such a line are doubled so the escapes stay unambiguous.
fn push_line(out: &mut String, content: &[u8]) {
    if let Ok(text) = std::str::from_utf8(content) {
        out.push_str(text);
        return;
    }
    for chunk in content.utf8_chunks() {
        out.push_str(&chunk.valid().replace('\\', "\\\\"));
        for b in chunk.invalid() {
            out.push_str(&format!("\\x{b:02x}"));
        }
    }
}

/// Render a line range, omitting the count when it equals 1.
fn range(start: u32, count: u32) -> String {
    match count {
        // An empty side names the line after which the change applies
        0 => format!("{},0", start.saturating_sub(1)),
        1 => format!("{start}"),
        n => format!("{start},{n}"),
    }
}

/// Ensure the output ends with a newline.
fn ensure_newline(out: &mut String) {
    if !out.ends_with('\n') {
        out.push_str("\n\\ No newline at end of file\n");
    }
}
