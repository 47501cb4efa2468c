use crate::stringify::stringify;
use crate::value::Value;

/// UTF-8 encoding of U+FFFD, substituted for NUL bytes.
const REPLACEMENT_CHARACTER: &[u8] = b"\xEF\xBF\xBD";

/// HTML-escapes the text of `value`.
///
/// Absent input yields `None` rather than an empty string. Nil counts as absent: hosts
/// cannot tell a missing argument from an explicit `nil`.
pub fn escape_html(value: Option<&Value>) -> Option<Vec<u8>> {
    let value = value.filter(|v| !v.is_nil())?;
    let out = match value {
        Value::String(s) => escape_html_bytes(s),
        other => escape_html_bytes(&stringify(other)),
    };
    Some(out)
}

pub fn escape_html_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    escape_html_into(bytes, &mut out);
    out
}

/// Byte-oriented scan: none of the escaped bytes can occur inside a multi-byte UTF-8
/// sequence, so such sequences are copied through untouched.
pub fn escape_html_into(bytes: &[u8], out: &mut Vec<u8>) {
    for &b in bytes {
        match b {
            0 => out.extend_from_slice(REPLACEMENT_CHARACTER),
            b'"' => out.extend_from_slice(b"&#34;"),
            b'\'' => out.extend_from_slice(b"&#39;"),
            b'&' => out.extend_from_slice(b"&amp;"),
            b'<' => out.extend_from_slice(b"&lt;"),
            b'>' => out.extend_from_slice(b"&gt;"),
            _ => out.push(b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    fn esc(s: &str) -> Vec<u8> {
        escape_html(Some(&Value::from(s))).expect("escaped")
    }

    #[test]
    fn absent_is_null_and_distinct_from_empty() {
        assert_eq!(escape_html(None), None);
        assert_eq!(escape_html(Some(&Value::Nil)), None);
        assert_eq!(escape_html(Some(&Value::from(""))), Some(Vec::new()));
    }

    #[test]
    fn escapes_reserved_characters() {
        assert_eq!(
            esc("<a href='x'>&\"</a>"),
            b"&lt;a href=&#39;x&#39;&gt;&amp;&#34;&lt;/a&gt;"
        );
    }

    #[test]
    fn nul_becomes_replacement_character() {
        let v = Value::String(b"a\0b\0".to_vec());
        assert_eq!(
            escape_html(Some(&v)),
            Some(b"a\xEF\xBF\xBDb\xEF\xBF\xBD".to_vec())
        );
        assert_eq!(
            String::from_utf8(escape_html_bytes(b"\0")).expect("utf8"),
            "\u{FFFD}"
        );
    }

    #[test]
    fn numbers_and_booleans_are_stringified_first() {
        assert_eq!(escape_html(Some(&Value::from(42))), Some(b"42".to_vec()));
        assert_eq!(escape_html(Some(&Value::from(-1.5))), Some(b"-1.5".to_vec()));
        assert_eq!(escape_html(Some(&Value::from(true))), Some(b"true".to_vec()));
    }

    #[test]
    fn render_hook_output_is_escaped() {
        let v = Object::with_render("userdata", Value::from("<b>")).into_value();
        assert_eq!(escape_html(Some(&v)), Some(b"&lt;b&gt;".to_vec()));
    }

    #[test]
    fn escaping_is_not_idempotent() {
        let once = esc("&");
        let twice = escape_html_bytes(&once);
        assert_eq!(once, b"&amp;");
        assert_eq!(twice, b"&amp;amp;");
        assert_ne!(once, twice);
    }

    #[test]
    fn unreserved_text_is_unchanged() {
        for s in ["", "plain text", "a=b; c/d", "caf\u{e9} \u{1F600}", "\t\r\n"] {
            assert_eq!(esc(s), s.as_bytes());
        }
    }

    #[test]
    fn invalid_utf8_passes_through_bytewise() {
        let raw = b"\xff\xfe<".to_vec();
        assert_eq!(escape_html_bytes(&raw), b"\xff\xfe&lt;");
    }

    #[test]
    fn appends_to_existing_buffer() {
        let mut out = b"<p>".to_vec();
        escape_html_into(b"1 < 2", &mut out);
        assert_eq!(out, b"<p>1 &lt; 2");
    }
}
