//! Resolution of raw address-bar input into a canonical absolute URL.
//!
//! The resolver is total: any non-empty input maps to something loadable,
//! falling back to a search-engine query when the input does not look like
//! an address. Empty input rejects the launch outright.

/// Search endpoint used for non-address input. The query is appended
/// percent-encoded.
pub const SEARCH_ENDPOINT: &str = "https://www.google.com/search?q=";

/// Resolve raw user input into an absolute URL.
///
/// Returns `None` for empty (or whitespace-only) input. Otherwise:
/// input that already carries an `http`/`https` scheme passes through
/// unchanged; dotted, space-free input is treated as a bare hostname and
/// prefixed with `https://`; everything else becomes a search query.
///
/// Input that is both dotted and contains spaces (e.g. "go to example.com")
/// lands in the search branch. Searching is the safer interpretation of
/// ambiguous input.
pub fn resolve(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Some(trimmed.to_string());
    }

    if trimmed.contains('.') && !trimmed.contains(char::is_whitespace) {
        return Some(format!("https://{}", trimmed));
    }

    Some(format!("{}{}", SEARCH_ENDPOINT, urlencoding::encode(trimmed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_input_rejects_launch() {
        assert_eq!(resolve(""), None);
        assert_eq!(resolve("   "), None);
        assert_eq!(resolve("\t\n"), None);
    }

    #[test]
    fn scheme_prefixed_input_passes_through() {
        assert_eq!(
            resolve("https://example.com/path?q=1"),
            Some("https://example.com/path?q=1".to_string())
        );
        assert_eq!(
            resolve("http://insecure.example"),
            Some("http://insecure.example".to_string())
        );
    }

    #[test]
    fn bare_hostname_gets_https() {
        assert_eq!(resolve("example.com"), Some("https://example.com".to_string()));
        assert_eq!(
            resolve("docs.rs/serde"),
            Some("https://docs.rs/serde".to_string())
        );
    }

    #[test]
    fn plain_words_become_a_search() {
        let resolved = resolve("capital of france").unwrap();
        assert!(resolved.starts_with(SEARCH_ENDPOINT));
        assert!(resolved.contains("capital%20of%20france"));
    }

    #[test]
    fn dotted_input_with_spaces_is_searched_not_navigated() {
        let resolved = resolve("go to example.com").unwrap();
        assert!(resolved.starts_with(SEARCH_ENDPOINT));
        assert!(resolved.contains("example.com"));
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(resolve("  example.com  "), Some("https://example.com".to_string()));
    }
}
