//! Address-bar input normalization.
//!
//! Turns whatever the user typed into a navigable address. Never fails:
//! input that cannot be parsed is returned as the best candidate string.

use crate::config::ShellConfig;
use url::Url;

/// Normalizes raw input and applies the placeholder-domain redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlNormalizer {
    placeholder_domain: String,
    redirect_target: String,
}

impl UrlNormalizer {
    pub fn new(placeholder_domain: impl Into<String>, redirect_target: impl Into<String>) -> Self {
        Self {
            placeholder_domain: placeholder_domain.into().trim().to_ascii_lowercase(),
            redirect_target: redirect_target.into(),
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(&config.placeholder_domain, &config.redirect_target)
    }

    /// Produce a navigable address from raw input
    pub fn normalize(&self, raw: &str) -> String {
        let input = raw.trim();

        if has_scheme(input) {
            return match Url::parse(input) {
                Ok(parsed) => self.redirect_or(parsed),
                Err(_) => input.to_string(),
            };
        }

        let candidate = format!("https://{}", input);
        match Url::parse(&candidate) {
            Ok(parsed) => self.redirect_or(parsed),
            Err(_) => candidate,
        }
    }

    fn redirect_or(&self, parsed: Url) -> String {
        if self.is_placeholder(&parsed) {
            log::debug!("Redirecting placeholder address {}", parsed);
            return self.redirect_target.clone();
        }
        parsed.into()
    }

    fn is_placeholder(&self, parsed: &Url) -> bool {
        parsed
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.placeholder_domain))
    }
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self::from_config(&ShellConfig::default())
    }
}

/// Whether `input` starts with `letter[letter|digit|+|.|-]*://`
pub fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };

    let mut chars = scheme.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> UrlNormalizer {
        UrlNormalizer::new("example.com", "https://home.test/")
    }

    #[test]
    fn test_scheme_detection() {
        assert!(has_scheme("https://a.test"));
        assert!(has_scheme("git+ssh://host/repo"));
        assert!(has_scheme("x-custom.v1://thing"));
        assert!(!has_scheme("a.test/path"));
        assert!(!has_scheme("1http://a.test"));
        assert!(!has_scheme("://a.test"));
        assert!(!has_scheme("ht tp://a.test"));
    }

    #[test]
    fn test_prepends_https() {
        assert_eq!(normalizer().normalize("rust-lang.org"), "https://rust-lang.org/");
        assert_eq!(
            normalizer().normalize("  docs.rs/serde?q=1  "),
            "https://docs.rs/serde?q=1"
        );
    }

    #[test]
    fn test_keeps_existing_scheme() {
        assert_eq!(normalizer().normalize("http://a.test/x"), "http://a.test/x");
    }

    #[test]
    fn test_placeholder_redirect() {
        let n = normalizer();
        assert_eq!(n.normalize("example.com"), "https://home.test/");
        assert_eq!(n.normalize("https://example.com/x"), "https://home.test/");
        assert_eq!(n.normalize("HTTP://EXAMPLE.COM"), "https://home.test/");
        assert_eq!(n.normalize("www.example.com"), "https://www.example.com/");
    }

    #[test]
    fn test_unparsable_with_scheme_is_returned_unchanged() {
        assert_eq!(normalizer().normalize(" http://[::1 "), "http://[::1");
    }

    #[test]
    fn test_unparsable_without_scheme_returns_candidate() {
        assert_eq!(normalizer().normalize("a b"), "https://a b");
    }
}
