//! Pure, allocation-light text-scanning routines shared by every parser
//! flavor. None of these hold state or can fail loudly — a malformed
//! input just yields a smaller/partial result, never a panic.

/// Find the byte span of the first balanced `{...}` object starting at
/// or after `from`. Brace counting is quote-aware: a `{`/`}` inside a
/// `"..."` string literal does not change depth, and a backslash inside
/// a string escapes the following character.
pub fn find_balanced_object(text: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i < bytes.len() && bytes[i] != b'{' {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    let start = i;
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if escape {
                escape = false;
            } else if c == b'\\' {
                escape = true;
            } else if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some((start, i + 1));
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}

/// Split `args_str` on top-level commas, respecting nesting of
/// `"..."`, `'...'`, `(...)`, `[...]`, `{...}`. A comma inside any of
/// those is not a split point.
pub fn split_args_respecting_delimiters(args_str: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = args_str.chars().peekable();

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            current.push(c);
            if c == '\\' {
                if let Some(&next) = chars.peek() {
                    current.push(next);
                    chars.next();
                }
                continue;
            }
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => {
                quote = Some(c);
                current.push(c);
            }
            '(' | '[' | '{' => {
                depth += 1;
                current.push(c);
            }
            ')' | ']' | '}' => {
                depth -= 1;
                current.push(c);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() || !parts.is_empty() {
        parts.push(trimmed.to_string());
    }
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

/// Type a scalar value literal by attempt order: integer, float,
/// boolean (case-insensitive), JSON object/array, otherwise string
/// with surrounding matching quotes stripped.
pub fn coerce_scalar(token: &str) -> serde_json::Value {
    let trimmed = token.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return serde_json::json!(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return serde_json::json!(f);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => return serde_json::json!(true),
        "false" => return serde_json::json!(false),
        _ => {}
    }
    if (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
    {
        if let Ok(v) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return v;
        }
    }
    serde_json::json!(strip_matching_quotes(trimmed))
}

fn strip_matching_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Given the byte index of an opening `(`, scan forward for its
/// matching close, quote-aware. Returns the byte index just past the
/// matching `)` and `true`, or `text.len()` and `false` if the input
/// runs out before the parens balance (truncated LLM output) — the
/// caller treats the latter as a partial-args recovery case, not an
/// error.
pub fn find_paren_span(text: &str, open_pos: usize) -> (usize, bool) {
    let bytes = text.as_bytes();
    let mut depth: i32 = 1;
    let mut in_string = false;
    let mut quote = 0u8;
    let mut escape = false;
    let mut i = open_pos + 1;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if escape {
                escape = false;
            } else if c == b'\\' {
                escape = true;
            } else if c == quote {
                in_string = false;
            }
        } else {
            match c {
                b'"' | b'\'' => {
                    in_string = true;
                    quote = c;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return (i + 1, true);
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    (bytes.len(), false)
}

/// Extract the text following the first line that starts (after
/// leading whitespace, case-insensitively) with one of `prefixes`
/// followed by a colon. The captured text runs from after the colon to
/// the end of the input (ReAct-style fields are the tail of a
/// response, not a bounded block), trimmed.
pub fn extract_line_field(text: &str, prefixes: &[&str]) -> Option<(String, String)> {
    for line_start in line_starts(text) {
        let rest = &text[line_start..];
        let trimmed = rest.trim_start();
        for prefix in prefixes {
            if trimmed.len() >= prefix.len() && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix) {
                let after_prefix = &trimmed[prefix.len()..];
                let after_prefix = after_prefix.strip_prefix(':').unwrap_or(after_prefix);
                return Some((prefix.to_string(), after_prefix.trim().to_string()));
            }
        }
    }
    None
}

fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, c) in text.char_indices() {
        if c == '\n' {
            starts.push(i + 1);
        }
    }
    starts
}
