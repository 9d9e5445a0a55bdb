// src/marker.rs

use config::{Config, File, FileFormat, Value, ValueKind};

/// Front matter key flagging a translation as not started when set to `false`
pub const NOT_STARTED_KEY: &str = "translation-done";

/// True when the content opens with a YAML front matter block holding
/// `translation-done: false`.
///
/// Content that isn't UTF-8, has no front matter or whose front matter isn't a
/// YAML mapping simply carries no marker.
pub fn has_not_started_marker(content: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(content) else {
        return false;
    };
    let Some(header) = front_matter(text) else {
        return false;
    };
    let Ok(front) = Config::builder()
        .add_source(File::from_str(header, FileFormat::Yaml))
        .build()
    else {
        return false;
    };
    match front.get::<Value>(NOT_STARTED_KEY) {
        Ok(value) => matches!(value.kind, ValueKind::Boolean(false)),
        Err(_) => false,
    }
}

fn front_matter(text: &str) -> Option<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    if lines.next()?.trim_end() != "---" {
        return None;
    }

    let start = text.find('\n')? + 1;
    let mut offset = start;
    for line in lines {
        let fence = line.trim_end();
        if fence == "---" || fence == "..." {
            return Some(&text[start..offset]);
        }
        offset += line.len();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_present() {
        let content = b"---\ntitle: Accueil\ntranslation-done: false\n---\n\nNot translated yet.\n";
        assert!(has_not_started_marker(content));
    }

    #[test]
    fn test_marker_done() {
        let content = b"---\ntranslation-done: true\n---\nBonjour\n";
        assert!(!has_not_started_marker(content));
    }

    #[test]
    fn test_marker_needs_boolean() {
        let content = b"---\ntranslation-done: \"false\"\n---\n";
        assert!(!has_not_started_marker(content));
    }

    #[test]
    fn test_marker_crlf_fences() {
        let content = b"---\r\ntranslation-done: false\r\n---\r\nBody\r\n";
        assert!(has_not_started_marker(content));
    }

    #[test]
    fn test_no_front_matter() {
        assert!(!has_not_started_marker(b"# Title\n\ntranslation-done: false\n"));
        assert!(!has_not_started_marker(b""));
    }

    #[test]
    fn test_unclosed_front_matter() {
        assert!(!has_not_started_marker(b"---\ntranslation-done: false\n"));
    }

    #[test]
    fn test_invalid_yaml_or_bytes() {
        assert!(!has_not_started_marker(b"---\n: : [\n---\n"));
        assert!(!has_not_started_marker(b"---\n- a list\n---\n"));
        assert!(!has_not_started_marker(&[0xff, 0xfe, 0x00, 0x2d]));
    }
}
