//! `.properties` decoding, following the `java.util.Properties` line grammar.

use crate::error::DecodeError;
use crate::types::PropertyMap;
use std::path::Path;

pub(super) fn decode(path: &Path, bytes: &[u8]) -> Result<PropertyMap, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::Encoding {
        path: path.to_path_buf(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut map = PropertyMap::new();
    for (line_no, logical) in logical_lines(text) {
        let (raw_key, raw_value) = split_key_value(&logical);
        let syntax = |message: String| DecodeError::Properties {
            path: path.to_path_buf(),
            line: line_no,
            message,
        };
        let key = unescape(raw_key).map_err(syntax)?;
        let value = unescape(raw_value).map_err(syntax)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Join continuation lines, dropping blanks and comments.
///
/// Yields the 1-based line number where each logical line starts.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut current: Option<(usize, String)> = None;

    // \r\n, \r and \n all end a line
    let text = text.replace("\r\n", "\n");
    for (idx, line) in text.split(['\n', '\r']).enumerate() {
        let trimmed = line.trim_start_matches([' ', '\t', '\x0c']);

        let (start, mut acc) = match current.take() {
            Some(pending) => pending,
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                (idx + 1, String::new())
            }
        };

        if ends_with_continuation(trimmed) {
            acc.push_str(&trimmed[..trimmed.len() - 1]);
            current = Some((start, acc));
        } else {
            acc.push_str(trimmed);
            out.push((start, acc));
        }
    }

    if let Some(pending) = current {
        out.push(pending);
    }
    out
}

/// A line continues when it ends in an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Split a logical line at the first unescaped `=`, `:` or whitespace.
fn split_key_value(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();
    for (i, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' | ' ' | '\t' | '\x0c' => {
                key_end = i;
                break;
            }
            _ => {}
        }
    }

    let key = &line[..key_end];
    let mut rest = line[key_end..].trim_start_matches([' ', '\t', '\x0c']);
    if let Some(stripped) = rest.strip_prefix(['=', ':']) {
        rest = stripped.trim_start_matches([' ', '\t', '\x0c']);
    }
    (key, rest)
}

fn unescape(raw: &str) -> Result<String, String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let code = read_hex4(&mut chars)?;
                let scalar = match code {
                    0xD800..=0xDBFF => {
                        let unpaired = || format!("unpaired surrogate \\u{code:04X}");
                        let rest = chars.as_str().strip_prefix("\\u").ok_or_else(unpaired)?;
                        chars = rest.chars();
                        let low = read_hex4(&mut chars)?;
                        if !(0xDC00..=0xDFFF).contains(&low) {
                            return Err(unpaired());
                        }
                        0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00)
                    }
                    0xDC00..=0xDFFF => {
                        return Err(format!("unpaired surrogate \\u{code:04X}"));
                    }
                    _ => code,
                };
                let ch = char::from_u32(scalar)
                    .ok_or_else(|| format!("\\u{code:04X} is not a valid character"))?;
                out.push(ch);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Ok(out)
}

/// Read the four hex digits of a `\uXXXX` escape.
fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let hex: String = chars.by_ref().take(4).collect();
    u32::from_str_radix(&hex, 16)
        .ok()
        .filter(|_| hex.len() == 4)
        .ok_or_else(|| format!("malformed \\u escape '\\u{hex}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> PropertyMap {
        decode(Path::new("test.properties"), text.as_bytes()).unwrap()
    }

    #[test]
    fn parses_all_separator_styles() {
        let map = parse("a=1\nb: 2\nc 3\nd = 4\n");
        assert_eq!(map["a"], "1");
        assert_eq!(map["b"], "2");
        assert_eq!(map["c"], "3");
        assert_eq!(map["d"], "4");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let map = parse("# comment\n! also comment\n\n   \nkey=value\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map["key"], "value");
    }

    #[test]
    fn joins_continuation_lines() {
        let map = parse("list=a,\\\n    b,\\\n    c\nnext=1\n");
        assert_eq!(map["list"], "a,b,c");
        assert_eq!(map["next"], "1");
    }

    #[test]
    fn escaped_backslash_does_not_continue() {
        let map = parse("path=C:\\\\temp\\\\\nother=x\n");
        assert_eq!(map["path"], "C:\\temp\\");
        assert_eq!(map["other"], "x");
    }

    #[test]
    fn decodes_escapes_in_keys_and_values() {
        let map = parse("my\\ key=tab\\there\nsnow=\\u2603\nurl=http\\://host\n");
        assert_eq!(map["my key"], "tab\there");
        assert_eq!(map["snow"], "\u{2603}");
        assert_eq!(map["url"], "http://host");
    }

    #[test]
    fn values_keep_literal_text() {
        let map = parse("enabled=true\ntimeout=30\nempty=\n");
        assert_eq!(map["enabled"], "true");
        assert_eq!(map["timeout"], "30");
        assert_eq!(map["empty"], "");
    }

    #[test]
    fn later_duplicate_key_wins() {
        let map = parse("a=1\na=2\n");
        assert_eq!(map["a"], "2");
    }

    #[test]
    fn malformed_unicode_escape_names_the_line() {
        let err = decode(Path::new("bad.properties"), b"ok=1\nbad=\\u12\n").unwrap_err();
        match err {
            DecodeError::Properties { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn surrogate_pair_escapes_combine() {
        let map = parse("greeting=hi \\uD83D\\uDE00\nclef=\\ud834\\udd1e\n");
        assert_eq!(map["greeting"], "hi \u{1F600}");
        assert_eq!(map["clef"], "\u{1D11E}");
    }

    #[test]
    fn unpaired_surrogates_are_rejected() {
        for text in ["a=\\uD83D\n", "a=\\uD83Dx\n", "a=\\uD83D\\u0041\n", "a=\\uDE00\n"] {
            let err = decode(Path::new("bad.properties"), text.as_bytes()).unwrap_err();
            match err {
                DecodeError::Properties { line, message, .. } => {
                    assert_eq!(line, 1);
                    assert!(message.contains("surrogate"), "{text}: {message}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn every_line_terminator_style_splits_lines() {
        let map = parse("a=1\rb=2\r\nc=3\nd=4");
        assert_eq!(map.len(), 4);
        assert_eq!(map["a"], "1");
        assert_eq!(map["b"], "2");
        assert_eq!(map["c"], "3");
        assert_eq!(map["d"], "4");
    }

    #[test]
    fn continuation_works_with_carriage_returns() {
        let map = parse("list=a,\\\r  b\rnext=1\r");
        assert_eq!(map["list"], "a,b");
        assert_eq!(map["next"], "1");
    }

    #[test]
    fn line_numbers_count_carriage_returns() {
        let err = decode(Path::new("bad.properties"), b"ok=1\rbad=\\u12\r").unwrap_err();
        match err {
            DecodeError::Properties { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_invalid_utf8() {
        let err = decode(Path::new("bad.properties"), &[0x6b, 0x3d, 0xff]).unwrap_err();
        assert!(matches!(err, DecodeError::Encoding { .. }));
    }
}
