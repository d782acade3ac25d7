//! Static Literal Evaluation for the VNode Compiler
//!
//! Recognizes expression source text that is known at compile time. Only
//! literals qualify: strings, numbers, booleans, `null` and `undefined`.

use crate::ir::Literal;

/// Try to read `expr` as a compile-time literal.
/// Returns None when the expression needs to be evaluated at run time.
pub fn eval_literal(expr: &str) -> Option<Literal> {
    let mut trimmed = expr.trim();

    // Redundant parentheses around a literal
    while trimmed.len() >= 2 && trimmed.starts_with('(') && trimmed.ends_with(')') {
        trimmed = trimmed[1..trimmed.len() - 1].trim();
    }

    if trimmed.is_empty() {
        return None;
    }

    if let Some(s) = try_parse_string_literal(trimmed) {
        return Some(Literal::Str(s));
    }

    match trimmed {
        "true" => return Some(Literal::Bool(true)),
        "false" => return Some(Literal::Bool(false)),
        "null" => return Some(Literal::Null),
        "undefined" => return Some(Literal::Undefined),
        _ => {}
    }

    if is_numeric_literal(trimmed) {
        return Some(Literal::Num(trimmed.to_string()));
    }

    None
}

/// `f64::from_str` also accepts `inf` and `NaN`, which are identifiers in JS.
fn is_numeric_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    let starts_numeric = digits
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || c == '.');
    starts_numeric && digits.parse::<f64>().is_ok()
}

/// Try to parse a string literal (single, double, or backtick quoted)
fn try_parse_string_literal(s: &str) -> Option<String> {
    let quote = s.chars().next()?;
    if !matches!(quote, '"' | '\'' | '`') || s.len() < 2 || !s.ends_with(quote) {
        return None;
    }

    let inner = &s[1..s.len() - 1];

    // The closing quote must be the only unescaped quote
    let mut escaped = false;
    for c in inner.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return None;
        }
    }
    if escaped {
        return None;
    }

    if quote == '`' && inner.contains("${") {
        return None;
    }

    Some(unescape_string(inner))
}

/// Decodes JS string escapes: single characters, `\xHH`, `\uHHHH`,
/// `\u{H+}`, `\0` and line continuations.
fn unescape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('0') if !chars.peek().is_some_and(char::is_ascii_digit) => result.push('\0'),
            Some('x') => push_code_point(&mut result, take_hex(&mut chars, 2), "\\x"),
            Some('u') if chars.peek() == Some(&'{') => {
                chars.next();
                let mut digits = String::new();
                while let Some(d) = chars.next_if(|d| *d != '}') {
                    digits.push(d);
                }
                chars.next();
                let code = u32::from_str_radix(&digits, 16).ok();
                push_code_point(&mut result, code, "\\u");
            }
            Some('u') => {
                let code = take_hex(&mut chars, 4);
                // Surrogate pairs arrive as two escapes
                match code {
                    Some(high @ 0xD800..=0xDBFF) => {
                        let low = take_low_surrogate(&mut chars);
                        let combined =
                            low.map(|low| 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00));
                        push_code_point(&mut result, combined.or(Some(0xFFFD)), "\\u");
                    }
                    _ => push_code_point(&mut result, code, "\\u"),
                }
            }
            // Line continuation
            Some('\r') => {
                chars.next_if_eq(&'\n');
            }
            Some('\n' | '\u{2028}' | '\u{2029}') => {}
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }

    result
}

fn take_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, len: usize) -> Option<u32> {
    let mut digits = String::with_capacity(len);
    for _ in 0..len {
        digits.push(chars.next_if(char::is_ascii_hexdigit)?);
    }
    u32::from_str_radix(&digits, 16).ok()
}

fn take_low_surrogate(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<u32> {
    let mut lookahead = chars.clone();
    if lookahead.next() != Some('\\') || lookahead.next() != Some('u') {
        return None;
    }
    let low = take_hex(&mut lookahead, 4).filter(|c| (0xDC00..=0xDFFF).contains(c))?;
    *chars = lookahead;
    Some(low)
}

/// Malformed escapes are kept as written.
fn push_code_point(out: &mut String, code: Option<u32>, raw: &str) {
    match code.and_then(char::from_u32) {
        Some(c) => out.push(c),
        None => out.push_str(raw),
    }
}
