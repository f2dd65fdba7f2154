use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;

/// Truncate a string to at most `max_bytes` bytes at a character boundary.
pub fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}

/// Strip markdown code blocks from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Locate the first balanced `{...}` substring in free text.
///
/// Models wrap JSON in prose or code fences; this scanner tolerates both.
/// Braces inside JSON string literals (and escaped quotes within them) do not
/// affect the balance count.
pub fn first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode the first JSON object embedded in a model response into `T`.
pub fn parse_first_json<T: DeserializeOwned>(response: &str) -> Result<T> {
    let cleaned = strip_code_blocks(response);
    let json = first_json_object(cleaned)
        .ok_or_else(|| anyhow!("no JSON object found in model response"))?;
    serde_json::from_str(json).map_err(|e| anyhow!("failed to decode model JSON: {e}"))
}
