//! Input bounding for text forwarded to the completion service

/// Appended when text was cut
pub const TRUNCATION_MARKER: &str = "\n\n[...content truncated...]";

/// Keep at most `limit` characters, appending `TRUNCATION_MARKER` when cut.
///
/// Lengths are counted in `char`s so multi-byte text is never split
/// mid-codepoint. Text that is already a bounded result (at most `limit`
/// characters followed by the marker) is returned unchanged, which makes
/// the operation idempotent.
pub fn bound(text: &str, limit: usize) -> String
{   if text.chars().count() <= limit
    {   return text.to_string();
    }
    if let Some(body) = text.strip_suffix(TRUNCATION_MARKER)
    {   if body.chars().count() <= limit
        {   return text.to_string();
        }
    }
    let cut = byte_offset(text, limit);
    let mut out = String::with_capacity(cut + TRUNCATION_MARKER.len());
    out.push_str(&text[..cut]);
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Bound only what precedes the last `separator`; the trailing segment
/// from `separator` onward is always kept whole.
///
/// Without a separator this is plain `bound`.
pub fn bound_before_last(text: &str, separator: &str, limit: usize) -> String
{   let Some(at) = text.rfind(separator) else
    {   return bound(text, limit);
    };
    let (head, trailing) = text.split_at(at);
    if head.chars().count() <= limit
    {   return text.to_string();
    }
    let mut out = bound(head, limit);
    out.push_str("\n\n");
    out.push_str(trailing);
    out
}

/// The last `n` characters of `text`
pub fn tail(text: &str, n: usize) -> &str
{   let total = text.chars().count();
    if total <= n
    {   return text;
    }
    &text[byte_offset(text, total - n)..]
}

fn byte_offset(text: &str, chars: usize) -> usize
{   text.char_indices()
      .nth(chars)
      .map(|(i, _)| i)
      .unwrap_or(text.len())
}
