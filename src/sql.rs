//! Statement text helpers: comment stripping and read-only detection.

/// Removes `-- …`, `# …` and `/* … */` comments from `sql`.
///
/// Quoted literals and identifiers (`'…'`, `"…"`, `` `…` ``) are copied
/// verbatim, so comment markers inside them survive. A line comment keeps
/// its terminating newline; a block comment is replaced by a single space so
/// adjacent tokens stay separated.
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' | '`' => {
                out.push(ch);
                while let Some(inner) = chars.next() {
                    out.push(inner);
                    if inner == '\\' && ch != '`' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                        continue;
                    }
                    if inner == ch {
                        // Doubled quote is an escaped quote, keep scanning.
                        if chars.peek() == Some(&ch) {
                            if let Some(next) = chars.next() {
                                out.push(next);
                            }
                            continue;
                        }
                        break;
                    }
                }
            }
            '-' if chars.peek() == Some(&'-') => {
                skip_line(&mut chars, &mut out);
            }
            '#' => skip_line(&mut chars, &mut out),
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for inner in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        break;
                    }
                    prev = inner;
                }
                out.push(' ');
            }
            _ => out.push(ch),
        }
    }
    out
}

fn skip_line<I: Iterator<Item = char>>(chars: &mut I, out: &mut String) {
    for inner in chars {
        if inner == '\n' {
            out.push('\n');
            break;
        }
    }
}

/// Strips comments, trims, and upper-cases a statement for keyword checks.
pub fn normalize(sql: &str) -> String {
    strip_comments(sql).trim().to_uppercase()
}

/// Returns the leading keyword of a normalized statement, or an empty string.
pub fn leading_keyword(normalized: &str) -> &str {
    let end = normalized
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(normalized.len());
    &normalized[..end]
}

/// Returns `true` when the statement can be explained: after comment
/// stripping and case normalization it starts with `SELECT`.
pub fn is_select(sql: &str) -> bool {
    normalize(sql).starts_with("SELECT")
}
