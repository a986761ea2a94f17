//! Small HTML building helpers shared by the section renderers and the template.

use crate::resume::template::strip_tokens;

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Trimmed, non-blank text or `None`. Text that is nothing but template tokens
/// is blank too: the final scrub would leave it empty.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter(|s| !s.contains('[') || !strip_tokens(s).trim().is_empty())
}

/// First non-blank of two alternates.
pub fn first_of<'a>(primary: &'a Option<String>, fallback: &'a Option<String>) -> Option<&'a str> {
    non_blank(primary.as_deref()).or_else(|| non_blank(fallback.as_deref()))
}

/// `<ul>` of escaped items, skipping blank entries. `None` when nothing is left.
pub fn bullet_list(items: &[String], class: &str) -> Option<String> {
    let lis: Vec<String> = items
        .iter()
        .filter_map(|item| non_blank(Some(item.as_str())))
        .map(|item| format!("<li>{}</li>", escape(item)))
        .collect();

    if lis.is_empty() {
        return None;
    }
    Some(format!("<ul class=\"{class}\">{}</ul>", lis.concat()))
}

/// `Open_Source` / `open-source` / `open source` → `Open Source`.
pub fn title_case(key: &str) -> String {
    key.split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape(r#"<b>"R&D" 'team'</b>"#),
            "&lt;b&gt;&quot;R&amp;D&quot; &#39;team&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  x ")), Some("x"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_token_only_text_is_blank() {
        assert_eq!(non_blank(Some("[SKILLS]")), None);
        assert_eq!(non_blank(Some(" [NA[EMAIL]ME] ")), None);
        assert_eq!(non_blank(Some("[NAME] [PHOTO]")), None);
        assert_eq!(non_blank(Some("Led [SKILLS]")), Some("Led [SKILLS]"));
        assert_eq!(non_blank(Some("[draft]")), Some("[draft]"));
    }

    #[test]
    fn test_bullet_list_skips_blank() {
        let items = vec!["a".to_string(), " ".to_string()];
        assert_eq!(
            bullet_list(&items, "bullets").as_deref(),
            Some("<ul class=\"bullets\"><li>a</li></ul>")
        );
        assert!(bullet_list(&[" ".to_string()], "bullets").is_none());
        assert!(bullet_list(&["[NAME]".to_string()], "bullets").is_none());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("open_source"), "Open Source");
        assert_eq!(title_case("side-projects"), "Side Projects");
        assert_eq!(title_case("Talks"), "Talks");
    }
}
