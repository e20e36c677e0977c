//! Myers diff algorithm implementation.
//!
//! Implements Eugene Myers' O(ND) difference algorithm as described in
//! "An O(ND) Difference Algorithm and Its Variations" (1986).

use super::{line_hash, Edit, EditOp};

/// Edit distance beyond which the search gives up and reports the
/// remaining region as a wholesale replacement.
///
/// Round `d` keeps `2d + 1` furthest-reaching points for the backtrack, so
/// the trace holds at most `(MAX_EDIT_COST + 1)^2` entries (about 32 MiB).
const MAX_EDIT_COST: usize = 2048;

/// Compute a diff using the Myers algorithm.
pub fn diff(old: &[&[u8]], new: &[&[u8]]) -> Vec<Edit> {
    // Handle trivial cases
    if old.is_empty() && new.is_empty() {
        return Vec::new();
    }
    if old.is_empty() || new.is_empty() {
        return replace_all(old.len(), new.len());
    }

    // Pre-compute line hashes for O(1) comparison
    let old_hashes: Vec<u64> = old.iter().map(|l| line_hash(l)).collect();
    let new_hashes: Vec<u64> = new.iter().map(|l| line_hash(l)).collect();

    // Trim common prefix
    let prefix_len = old_hashes
        .iter()
        .zip(new_hashes.iter())
        .zip(old.iter().zip(new.iter()))
        .take_while(|((oh, nh), (a, b))| oh == nh && a == b)
        .count();

    // Trim common suffix
    let suffix_len = old_hashes[prefix_len..]
        .iter()
        .rev()
        .zip(new_hashes[prefix_len..].iter().rev())
        .zip(old[prefix_len..].iter().rev().zip(new[prefix_len..].iter().rev()))
        .take_while(|((oh, nh), (a, b))| oh == nh && a == b)
        .count();

    let old_trimmed = &old[prefix_len..old.len() - suffix_len];
    let new_trimmed = &new[prefix_len..new.len() - suffix_len];
    let old_h = &old_hashes[prefix_len..old_hashes.len() - suffix_len];
    let new_h = &new_hashes[prefix_len..new_hashes.len() - suffix_len];

    let inner_edits = myers_inner(old_trimmed, new_trimmed, old_h, new_h);

    let mut edits = Vec::with_capacity(old.len() + new.len());

    // Common prefix
    for i in 0..prefix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: i,
            new_index: i,
        });
    }

    // Inner edits (adjust indices)
    for edit in inner_edits {
        edits.push(Edit {
            op: edit.op,
            old_index: edit.old_index + prefix_len,
            new_index: edit.new_index + prefix_len,
        });
    }

    // Common suffix
    for i in 0..suffix_len {
        edits.push(Edit {
            op: EditOp::Equal,
            old_index: old.len() - suffix_len + i,
            new_index: new.len() - suffix_len + i,
        });
    }

    edits
}

/// Delete every old line, then insert every new line.
fn replace_all(n: usize, m: usize) -> Vec<Edit> {
    let deletes = (0..n).map(|i| Edit {
        op: EditOp::Delete,
        old_index: i,
        new_index: 0,
    });
    let inserts = (0..m).map(|j| Edit {
        op: EditOp::Insert,
        old_index: n,
        new_index: j,
    });
    deletes.chain(inserts).collect()
}

/// Core Myers algorithm on pre-trimmed sequences.
fn myers_inner(old: &[&[u8]], new: &[&[u8]], old_h: &[u64], new_h: &[u64]) -> Vec<Edit> {
    let n = old.len();
    let m = new.len();

    if n == 0 || m == 0 {
        return replace_all(n, m);
    }

    let max_d = (n + m).min(MAX_EDIT_COST);
    let offset = max_d as isize;

    // v[k + offset] = furthest reaching x on diagonal k
    let mut v = vec![0usize; 2 * max_d + 2];
    // trace[d] holds v for diagonals -d..=d after round d
    let mut trace: Vec<Vec<usize>> = Vec::new();

    for d in 0..=max_d {
        let d_i = d as isize;
        let mut k = -d_i;
        while k <= d_i {
            let idx = (k + offset) as usize;

            let mut x = if k == -d_i || (k != d_i && v[idx - 1] < v[idx + 1]) {
                // Go down (insert)
                v[idx + 1]
            } else {
                // Go right (delete)
                v[idx - 1] + 1
            };
            let mut y = (x as isize - k) as usize;

            // Follow the diagonal (snake)
            while x < n && y < m && old_h[x] == new_h[y] && old[x] == new[y] {
                x += 1;
                y += 1;
            }

            v[idx] = x;

            if x >= n && y >= m {
                trace.push(v[(offset - d_i) as usize..=(offset + d_i) as usize].to_vec());
                return backtrack(&trace, n, m);
            }

            k += 2;
        }
        trace.push(v[(offset - d_i) as usize..=(offset + d_i) as usize].to_vec());
    }

    replace_all(n, m)
}

/// Backtrack through the trace to produce the edit script.
fn backtrack(trace: &[Vec<usize>], n: usize, m: usize) -> Vec<Edit> {
    let mut edits = Vec::with_capacity(n + m);
    let mut x = n;
    let mut y = m;

    for d in (0..trace.len()).rev() {
        let k = x as isize - y as isize;
        let d_i = d as isize;

        let (prev_x, prev_y) = if d == 0 {
            (0, 0)
        } else {
            let prev = &trace[d - 1];
            let at = |k: isize| prev[(k + d_i - 1) as usize];
            let prev_k = if k == -d_i || (k != d_i && at(k - 1) < at(k + 1)) {
                k + 1
            } else {
                k - 1
            };
            let px = at(prev_k);
            (px, (px as isize - prev_k) as usize)
        };

        // Snake: equal lines between the edit and (x, y)
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit {
                op: EditOp::Equal,
                old_index: x,
                new_index: y,
            });
        }

        if d > 0 {
            if x == prev_x {
                y -= 1;
                edits.push(Edit {
                    op: EditOp::Insert,
                    old_index: x,
                    new_index: y,
                });
            } else {
                x -= 1;
                edits.push(Edit {
                    op: EditOp::Delete,
                    old_index: x,
                    new_index: y,
                });
            }
        }
    }

    edits.reverse();
    edits
}
