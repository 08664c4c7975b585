//! Text helpers shared by the text collectors.

/// Characters compared at each chunk boundary when looking for overlap.
pub const DEFAULT_OVERLAP_WINDOW: usize = 300;

/// Join chunks into one text, dropping the overlap a splitter leaves between
/// consecutive chunks.
///
/// Empty chunks are skipped. For each following chunk, its first `n`
/// characters are searched for in the last `2n` characters of the text merged
/// so far; when found and the chunk continues the text from that point, only
/// the non-overlapping remainder is appended. Otherwise the chunk is appended
/// after a newline.
pub fn merge_overlapping_texts<S: AsRef<str>>(chunks: &[S], n: usize) -> String {
    let mut parts = chunks.iter().map(AsRef::as_ref).filter(|c| !c.is_empty());
    let Some(first) = parts.next() else {
        return String::new();
    };

    let mut out = first.to_string();
    for next in parts {
        match overlap_len(&out, next, n) {
            Some(overlap) => out.push_str(&next[overlap.min(next.len())..]),
            None => {
                out.push('\n');
                out.push_str(next);
            }
        }
    }
    out
}

/// Byte length of the prefix of `next` already present at the end of `text`.
fn overlap_len(text: &str, next: &str, n: usize) -> Option<usize> {
    if n == 0 {
        return None;
    }
    let head = &next[..char_offset(next, n)];
    let tail = &text[suffix_offset(text, 2 * n)..];

    tail.match_indices(head).find_map(|(pos, _)| {
        let shared = &tail[pos..];
        if next.starts_with(shared) {
            Some(shared.len())
        } else if shared.starts_with(next) {
            // `next` lies entirely inside the tail.
            Some(next.len())
        } else {
            None
        }
    })
}

/// Byte offset of the `n`th character, or the string length.
fn char_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// Byte offset where the last `n` characters begin.
fn suffix_offset(s: &str, n: usize) -> usize {
    let count = s.chars().count();
    if count <= n {
        0
    } else {
        char_offset(s, count - n)
    }
}
