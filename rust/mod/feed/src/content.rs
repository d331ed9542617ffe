//! Post content rendering: HTML escaping and @mention links.

use std::sync::LazyLock;

use chirp_core::ServiceError;
use regex::Regex;

static MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@([A-Za-z0-9_]+)").expect("mention pattern compiles"));

/// Escape the characters that are significant in HTML text and attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape `text`, then turn every `@name` for which `is_user(name)` holds
/// into a link to that user's profile. Mentions of unknown names stay as
/// plain text.
pub fn render_content<F>(text: &str, mut is_user: F) -> Result<String, ServiceError>
where
    F: FnMut(&str) -> Result<bool, ServiceError>,
{
    let escaped = escape_html(text);
    let mut out = String::with_capacity(escaped.len());
    let mut last = 0;

    for caps in MENTION.captures_iter(&escaped) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !is_user(name.as_str())? {
            continue;
        }
        out.push_str(&escaped[last..whole.start()]);
        out.push_str(&format!(
            "<a href='/profile/{0}'>@{0}</a>",
            name.as_str()
        ));
        last = whole.end();
    }
    out.push_str(&escaped[last..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(name: &str) -> Result<bool, ServiceError> {
        Ok(matches!(name, "bob" | "alice"))
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"hi" & 'bye'</b>"#),
            "&lt;b&gt;&quot;hi&quot; &amp; &#39;bye&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn links_known_mentions_only() {
        let out = render_content("hello @bob and @carol", known).unwrap();
        assert_eq!(
            out,
            "hello <a href='/profile/bob'>@bob</a> and @carol"
        );
    }

    #[test]
    fn mention_at_edges_and_repeated() {
        let out = render_content("@alice, @alice!", known).unwrap();
        assert_eq!(
            out,
            "<a href='/profile/alice'>@alice</a>, <a href='/profile/alice'>@alice</a>!"
        );
    }

    #[test]
    fn escaping_happens_before_linking() {
        let out = render_content("<script>@bob</script>", known).unwrap();
        assert_eq!(
            out,
            "&lt;script&gt;<a href='/profile/bob'>@bob</a>&lt;/script&gt;"
        );
    }

    #[test]
    fn lookup_errors_propagate() {
        let err = render_content("@bob", |_| Err(ServiceError::Storage("down".into()))).unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }
}
