//! Filesystem-safe slug cleaning for syllabus names.

/// Characters that are illegal in file names on at least one common filesystem.
const ILLEGAL_CHARS: [char; 10] = [':', '/', '<', '>', '"', '\\', '|', '?', '*', '\0'];

/// Cleans an upstream name or slug into a filesystem-safe string.
///
/// HTML entities and URL escapes are decoded first, illegal characters become
/// `-`, and trailing spaces/dots are removed. With `minimal_change` (the
/// unrestricted-filenames policy) that is all; otherwise parentheses are
/// dropped, spaces become `_`, and only `[A-Za-z0-9-_.()]` survive.
#[must_use]
pub fn clean_filename(value: &str, minimal_change: bool) -> String {
    let unescaped = unescape_html(value);
    let decoded = unquote_plus(&unescaped);

    let replaced: String = decoded
        .chars()
        .map(|c| match c {
            c if ILLEGAL_CHARS.contains(&c) => '-',
            '\n' => ' ',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_end_matches([' ', '.']);

    if minimal_change {
        return trimmed.to_string();
    }

    let without_parens: String = trimmed.chars().filter(|c| !matches!(c, '(' | ')')).collect();
    without_parens
        .trim_end_matches('.')
        .trim()
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '(' | ')'))
        .collect()
}

fn unquote_plus(value: &str) -> String {
    let spaced = value.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

fn unescape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end)));
        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}
