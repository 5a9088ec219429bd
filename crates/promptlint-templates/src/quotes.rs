/// Byte offsets of every `delimiter` in `s` that sits outside a single- or
/// double-quoted string literal. A backslash inside a literal escapes the
/// next character.
pub(crate) fn unquoted_positions(s: &str, delimiter: char) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut quote: Option<char> = None;
    let mut escape = false;

    for (idx, ch) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        match ch {
            '\\' if quote.is_some() => escape = true,
            '"' | '\'' if quote == Some(ch) => quote = None,
            '"' | '\'' if quote.is_none() => quote = Some(ch),
            _ if quote.is_some() => {}
            _ if ch == delimiter => positions.push(idx),
            _ => {}
        }
    }

    positions
}

/// Text of `s` before its first unquoted `delimiter`, or all of `s`.
pub(crate) fn before_unquoted(s: &str, delimiter: char) -> &str {
    match unquoted_positions(s, delimiter).first() {
        Some(&idx) => &s[..idx],
        None => s,
    }
}
