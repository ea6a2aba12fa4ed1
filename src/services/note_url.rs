use std::sync::OnceLock;

use regex::Regex;

const RESERVED_SEGMENT: &str = "api";

static NOTE_PATH_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Extract the creator username from a pasted note.com link, e.g.
/// `https://note.com/alice/n/abc123` gives `alice`.
pub fn parse_identifier(text: &str) -> Option<String> {
    let re = NOTE_PATH_RE
        .get_or_init(|| Regex::new(r"note\.com/([^/?#\s]+)").ok())
        .as_ref()?;

    let segment = re.captures(text.trim())?.get(1)?.as_str();
    if segment == RESERVED_SEGMENT {
        return None;
    }
    Some(segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_link() {
        assert_eq!(
            parse_identifier("https://note.com/alice/n/abc123").as_deref(),
            Some("alice")
        );
    }

    #[test]
    fn test_profile_link_with_query_and_fragment() {
        assert_eq!(parse_identifier("https://note.com/bob?ref=x").as_deref(), Some("bob"));
        assert_eq!(parse_identifier("note.com/bob#top").as_deref(), Some("bob"));
        assert_eq!(parse_identifier("  https://note.com/carol/  ").as_deref(), Some("carol"));
    }

    #[test]
    fn test_api_path_is_not_a_creator() {
        assert_eq!(parse_identifier("https://note.com/api/v1"), None);
    }

    #[test]
    fn test_other_hosts_do_not_match() {
        assert_eq!(parse_identifier("https://example.com/alice"), None);
        assert_eq!(parse_identifier("https://note.com/"), None);
        assert_eq!(parse_identifier(""), None);
    }
}
