//! Reduce an HTML page to readable text.

/// Strip scripts, styles and tags, collapse whitespace and decode common entities.
pub fn extract_text(html: &str) -> String {
    let without_scripts = remove_elements(html, "script");
    let text = remove_elements(&without_scripts, "style");

    let mut result = String::with_capacity(text.len());
    let mut in_tag = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '<' if !in_tag && chars.peek().is_some_and(|&n| starts_markup(n)) => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                result.push(' ');
            }
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }

    let collapsed = result.split_whitespace().collect::<Vec<_>>().join(" ");
    decode_entities(&collapsed)
}

/// A `<` opens a tag only before a tag name, a closing slash or a
/// declaration; anything else is page text.
fn starts_markup(next: char) -> bool {
    next.is_ascii_alphabetic() || next == '/' || next == '!'
}

/// Remove every `<name ...>...</name>` block, matching the tag name case-insensitively.
fn remove_elements(html: &str, name: &str) -> String {
    let open = format!("<{name}");
    let close = format!("</{name}>");
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = html.to_ascii_lowercase();

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    while let Some(start) = lower[cursor..].find(&open).map(|i| cursor + i) {
        let Some(end) = lower[start..].find(&close).map(|i| start + i + close.len()) else {
            break;
        };
        out.push_str(&html[cursor..start]);
        cursor = end;
    }
    out.push_str(&html[cursor..]);
    out
}

fn decode_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_markup() {
        let html = r#"<html><head><title>Post</title><style>p { color: red; }</style></head>
            <body><SCRIPT>alert("x")</SCRIPT><h1>Hello</h1>
            <p>Rust &amp; friends</p></body></html>"#;
        assert_eq!(extract_text(html), "Post Hello Rust & friends");
    }

    #[test]
    fn test_unterminated_script_is_kept_as_text() {
        assert_eq!(extract_text("<p>a</p><script>b"), "a b");
    }

    #[test]
    fn test_bare_angle_brackets_are_text() {
        assert_eq!(
            extract_text("<p>price < 5 then 3 > 2</p><!-- note --><br/>end"),
            "price < 5 then 3 > 2 end"
        );
        assert_eq!(extract_text("a <= b"), "a <= b");
    }

    #[test]
    fn test_entities_decode_once() {
        assert_eq!(extract_text("&amp;lt;"), "&lt;");
    }
}
