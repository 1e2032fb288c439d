//! Category derivation for feed articles.
//!
//! The publisher files every story under a section path, e.g.
//! `https://g1.globo.com/economia/noticia/...`. The first path segment after
//! the publisher's host is taken as the article's category. Headlines API
//! articles never pass through here; they keep the category that was asked for.

use url::Url;

/// Maps feed links to category tags.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    host: String,
    fallback: String,
}

impl CategoryClassifier {
    pub fn new(host: impl Into<String>, fallback: impl Into<String>) -> Self {
        Self {
            host: host.into().to_lowercase(),
            fallback: fallback.into(),
        }
    }

    /// Category for a feed link.
    ///
    /// Returns the lowercased first path segment when the link is on the
    /// publisher's host and that segment is followed by another `/`.
    /// Anything else (no link, other host, bare section URL, unparseable
    /// URL) yields the fallback category.
    pub fn classify(&self, link: Option<&str>) -> String {
        link.and_then(|l| self.section_of(l))
            .unwrap_or_else(|| self.fallback.clone())
    }

    fn section_of(&self, link: &str) -> Option<String> {
        let url = Url::parse(link).ok()?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str()? != self.host {
            return None;
        }
        let mut segments = url.path_segments()?;
        let first = segments.next().filter(|s| !s.is_empty())?;
        // The section must be a directory, not the last path component.
        segments.next()?;
        Some(first.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> CategoryClassifier {
        CategoryClassifier::new("g1.globo.com", "geral")
    }

    #[test]
    fn test_section_from_publisher_link() {
        assert_eq!(
            classifier().classify(Some("https://g1.globo.com/economia/noticia.html")),
            "economia"
        );
    }

    #[test]
    fn test_section_is_lowercased() {
        assert_eq!(
            classifier().classify(Some("https://G1.globo.com/Politica/noticia/2025/a.ghtml")),
            "politica"
        );
    }

    #[test]
    fn test_section_with_trailing_slash() {
        assert_eq!(
            classifier().classify(Some("https://g1.globo.com/esporte/")),
            "esporte"
        );
    }

    #[test]
    fn test_bare_section_falls_back() {
        assert_eq!(
            classifier().classify(Some("https://g1.globo.com/economia")),
            "geral"
        );
    }

    #[test]
    fn test_other_domain_falls_back() {
        assert_eq!(
            classifier().classify(Some("https://example.com/economia/noticia.html")),
            "geral"
        );
        assert_eq!(
            classifier().classify(Some("https://ge.globo.com/futebol/noticia.html")),
            "geral"
        );
    }

    #[test]
    fn test_missing_or_invalid_link_falls_back() {
        assert_eq!(classifier().classify(None), "geral");
        assert_eq!(classifier().classify(Some("#")), "geral");
        assert_eq!(classifier().classify(Some("not a url")), "geral");
    }
}
