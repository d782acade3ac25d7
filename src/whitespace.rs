//! JSX text normalization: whitespace collapsing and character references.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LINE_BREAK_RE: Regex = Regex::new(r"\r\n|\n|\r").unwrap();
    static ref ENTITY_RE: Regex = Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap();
}

/// Collapses a raw JSX text run. Lines after the first lose leading blanks,
/// lines before the last lose trailing blanks, blank lines disappear and the
/// survivors are joined by one space. An empty result means "no text".
pub fn normalize_text(raw: &str) -> String {
    let lines: Vec<&str> = LINE_BREAK_RE.split(raw).collect();
    let last = lines.len().saturating_sub(1);

    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut trimmed = *line;
        if i != 0 {
            trimmed = trimmed.trim_start_matches([' ', '\t']);
        }
        if i != last {
            trimmed = trimmed.trim_end_matches([' ', '\t']);
        }
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(trimmed);
    }
    out
}

/// Decodes the character references JSX text may carry. Unknown named
/// references are left alone.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    ENTITY_RE
        .replace_all(raw, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .to_string()
}

fn named_entity(name: &str) -> Option<char> {
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "hellip" => '\u{2026}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        "middot" => '\u{b7}',
        "times" => '\u{d7}',
        "euro" => '\u{20ac}',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_untouched() {
        assert_eq!(normalize_text("  hello  "), "  hello  ");
    }

    #[test]
    fn test_indentation_only_is_dropped() {
        assert_eq!(normalize_text("\n          "), "");
        assert_eq!(normalize_text("\r\n\t\t\r\n"), "");
    }

    #[test]
    fn test_multi_line_joined() {
        assert_eq!(
            normalize_text("\n    first line  \n    second\t\n  "),
            "first line second"
        );
        assert_eq!(normalize_text("a \n b"), "a b");
    }

    #[test]
    fn test_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
        assert_eq!(decode_entities("&nbsp;"), "\u{a0}");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
    }
}
