//! Address-bar submissions.
//!
//! Typed text is not navigated to directly. It is handed to the content
//! endpoint as the `page` query parameter, and the tab shows the typed
//! text rather than the endpoint address.

/// Where a submission goes and what the tab shows meanwhile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSubmission {
    pub target: String,
    pub display: String,
}

/// Resolve typed text against `endpoint`; `None` for blank input
pub fn resolve_submission(endpoint: &str, typed: &str) -> Option<AddressSubmission> {
    if typed.trim().is_empty() {
        return None;
    }

    let separator = if endpoint.contains('?') { '&' } else { '?' };
    Some(AddressSubmission {
        target: format!("{}{}page={}", endpoint, separator, urlencoding::encode(typed)),
        display: typed.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENDPOINT: &str = "https://pages.test/api/page";

    #[test]
    fn test_encodes_typed_text() {
        let submission = resolve_submission(ENDPOINT, "cats & dogs?").unwrap();
        assert_eq!(
            submission.target,
            "https://pages.test/api/page?page=cats%20%26%20dogs%3F"
        );
        assert_eq!(submission.display, "cats & dogs?");
    }

    #[test]
    fn test_display_is_verbatim() {
        let submission = resolve_submission(ENDPOINT, "  padded ").unwrap();
        assert_eq!(submission.display, "  padded ");
    }

    #[test]
    fn test_endpoint_with_query() {
        let submission = resolve_submission("https://pages.test/gen?v=2", "x").unwrap();
        assert_eq!(submission.target, "https://pages.test/gen?v=2&page=x");
    }

    #[test]
    fn test_blank_rejected() {
        assert_eq!(resolve_submission(ENDPOINT, "   "), None);
        assert_eq!(resolve_submission(ENDPOINT, ""), None);
    }
}
