//! Field normalization: raw upstream records in, [`Article`]s out.
//!
//! Both sources go through the same rules:
//!
//! | Field | Fallback chain | Placeholder |
//! |-------|----------------|-------------|
//! | image | enclosure → media:content → media:thumbnail → first `<img src>` in embedded HTML → API `image` | none |
//! | description | description → content snippet | [`PLACEHOLDER_DESCRIPTION`] |
//! | content | encoded content → plain content → API content → description | [`PLACEHOLDER_CONTENT`] |
//! | title / link / source | the field itself | per-field constant |
//!
//! A feed item that ends up without an image is dropped. Headlines are
//! filtered for images by the fetcher before they reach this module.

use crate::classify::CategoryClassifier;
use crate::config::{
    DESCRIPTION_CUT_CHARS, DESCRIPTION_MAX_CHARS, ELLIPSIS, FEED_SOURCE_FALLBACK,
    HEADLINES_SOURCE_FALLBACK, PLACEHOLDER_CONTENT, PLACEHOLDER_DESCRIPTION, PLACEHOLDER_LINK,
    PLACEHOLDER_TITLE,
};
use crate::models::{Article, RawFeedItem, RawHeadline};
use crate::utils::{article_id, non_blank, truncate_chars};
use chrono::DateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Matches the `src` of the first `<img>` tag. Best effort only: this is
/// not an HTML parser and is not meant to become one.
static IMG_SRC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*["']([^"']+)["']"#).unwrap());

/// Candidate image locations for one record, in priority order.
#[derive(Debug, Default)]
pub struct ImageHints<'a> {
    pub enclosure: Option<&'a str>,
    pub media_content: Option<&'a str>,
    pub media_thumbnail: Option<&'a str>,
    /// HTML fragments scanned for an `<img>` tag, in order.
    pub html: Vec<&'a str>,
    /// Image URL handed over directly by the headlines API.
    pub direct: Option<&'a str>,
}

/// First image URL found walking the fallback chain.
pub fn resolve_image(hints: &ImageHints<'_>) -> Option<String> {
    non_blank(hints.enclosure)
        .or_else(|| non_blank(hints.media_content))
        .or_else(|| non_blank(hints.media_thumbnail))
        .map(str::to_string)
        .or_else(|| hints.html.iter().find_map(|html| first_img_src(html)))
        .or_else(|| non_blank(hints.direct).map(str::to_string))
}

/// `src` of the first `<img>` element in an HTML fragment.
pub fn first_img_src(html: &str) -> Option<String> {
    IMG_SRC_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|src| !src.is_empty())
}

/// Pick the first non-blank candidate and cap it at 150 characters.
///
/// Returns an empty string when nothing is available so the content chain
/// can tell "no description" apart from the placeholder.
pub fn resolve_description(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .find_map(|c| non_blank(*c))
        .map(|d| truncate_chars(d, DESCRIPTION_MAX_CHARS, DESCRIPTION_CUT_CHARS, ELLIPSIS))
        .unwrap_or_default()
}

/// Pick the first non-blank content candidate, then the description.
pub fn resolve_content(candidates: &[Option<&str>], description: &str) -> String {
    candidates
        .iter()
        .find_map(|c| non_blank(*c))
        .or_else(|| non_blank(Some(description)))
        .map(str::to_string)
        .unwrap_or_else(|| PLACEHOLDER_CONTENT.to_string())
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
    non_blank(value).unwrap_or(placeholder).to_string()
}

fn description_or_placeholder(description: String) -> String {
    if description.is_empty() {
        PLACEHOLDER_DESCRIPTION.to_string()
    } else {
        description
    }
}

/// RFC 2822 feed dates become RFC 3339; anything else is passed through.
fn normalize_pub_date(raw: Option<&str>) -> Option<String> {
    let raw = non_blank(raw)?;
    Some(
        DateTime::parse_from_rfc2822(raw)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|_| raw.to_string()),
    )
}

/// Turn one feed item into an [`Article`].
///
/// Returns `None` when no image can be resolved for the item.
pub fn normalize_feed_item(item: &RawFeedItem, classifier: &CategoryClassifier) -> Option<Article> {
    let hints = ImageHints {
        enclosure: item.enclosure_url.as_deref(),
        media_content: item.media_content_url.as_deref(),
        media_thumbnail: item.media_thumbnail_url.as_deref(),
        html: [item.content_encoded.as_deref(), item.description_html.as_deref()]
            .into_iter()
            .flatten()
            .collect(),
        direct: None,
    };
    let Some(image) = resolve_image(&hints) else {
        debug!(link = ?item.link, "Dropping feed item without image");
        return None;
    };

    let description =
        resolve_description(&[item.description.as_deref(), item.content_snippet.as_deref()]);
    let content = resolve_content(
        &[item.content_encoded.as_deref(), item.description.as_deref()],
        &description,
    );
    let link = or_placeholder(item.link.as_deref(), PLACEHOLDER_LINK);

    Some(Article {
        id: article_id(&link),
        title: or_placeholder(item.title.as_deref(), PLACEHOLDER_TITLE),
        description: description_or_placeholder(description),
        content,
        category: classifier.classify(non_blank(item.link.as_deref())),
        link,
        image: Some(image),
        source: or_placeholder(item.source_name.as_deref(), FEED_SOURCE_FALLBACK),
        pub_date: normalize_pub_date(item.pub_date.as_deref()),
    })
}

/// Turn one headlines API record into an [`Article`] filed under `category`.
pub fn normalize_headline(headline: &RawHeadline, category: &str) -> Article {
    let hints = ImageHints {
        html: headline.content.as_deref().into_iter().collect(),
        direct: headline.image.as_deref(),
        ..Default::default()
    };
    let description = resolve_description(&[headline.description.as_deref()]);
    let content = resolve_content(&[headline.content.as_deref()], &description);
    let link = or_placeholder(headline.url.as_deref(), PLACEHOLDER_LINK);
    let source_name = headline.source.as_ref().and_then(|s| s.name.as_deref());

    Article {
        id: article_id(&link),
        title: or_placeholder(headline.title.as_deref(), PLACEHOLDER_TITLE),
        description: description_or_placeholder(description),
        content,
        link,
        image: resolve_image(&hints),
        category: category.to_string(),
        source: or_placeholder(source_name, HEADLINES_SOURCE_FALLBACK),
        pub_date: non_blank(headline.publishedAt.as_deref()).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HeadlineSource;
    use pretty_assertions::assert_eq;

    fn classifier() -> CategoryClassifier {
        CategoryClassifier::new("g1.globo.com", "geral")
    }

    fn feed_item() -> RawFeedItem {
        RawFeedItem {
            title: Some("Juros sobem".to_string()),
            link: Some("https://g1.globo.com/economia/noticia/juros.ghtml".to_string()),
            description: Some("Banco Central eleva a Selic.".to_string()),
            media_content_url: Some("https://s2.glbimg.com/juros.jpg".to_string()),
            pub_date: Some("Tue, 06 May 2025 12:30:00 -0300".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_feed_item_full_normalization() {
        let article = normalize_feed_item(&feed_item(), &classifier()).unwrap();

        assert_eq!(article.title, "Juros sobem");
        assert_eq!(article.description, "Banco Central eleva a Selic.");
        assert_eq!(article.content, "Banco Central eleva a Selic.");
        assert_eq!(article.category, "economia");
        assert_eq!(article.source, "G1");
        assert_eq!(article.image.as_deref(), Some("https://s2.glbimg.com/juros.jpg"));
        assert_eq!(article.id, article_id(&article.link));
        assert_eq!(article.pub_date.as_deref(), Some("2025-05-06T12:30:00-03:00"));
    }

    #[test]
    fn test_feed_item_without_image_is_dropped() {
        let item = RawFeedItem {
            media_content_url: None,
            description_html: Some("<p>Sem foto</p>".to_string()),
            ..feed_item()
        };
        assert!(normalize_feed_item(&item, &classifier()).is_none());
    }

    #[test]
    fn test_image_chain_priority() {
        let hints = ImageHints {
            enclosure: Some("enclosure.jpg"),
            media_content: Some("media.jpg"),
            media_thumbnail: Some("thumb.jpg"),
            html: vec![r#"<img src="html.jpg">"#],
            direct: Some("direct.jpg"),
        };
        assert_eq!(resolve_image(&hints).as_deref(), Some("enclosure.jpg"));

        let hints = ImageHints { enclosure: Some("  "), ..hints };
        assert_eq!(resolve_image(&hints).as_deref(), Some("media.jpg"));

        let hints = ImageHints { media_content: None, ..hints };
        assert_eq!(resolve_image(&hints).as_deref(), Some("thumb.jpg"));

        let hints = ImageHints { media_thumbnail: None, ..hints };
        assert_eq!(resolve_image(&hints).as_deref(), Some("html.jpg"));

        let hints = ImageHints { html: vec!["<p>nada</p>"], ..hints };
        assert_eq!(resolve_image(&hints).as_deref(), Some("direct.jpg"));

        let hints = ImageHints { direct: None, ..hints };
        assert_eq!(resolve_image(&hints), None);
    }

    #[test]
    fn test_first_img_src_variants() {
        assert_eq!(
            first_img_src(r#"<p>x</p><IMG class="a" SRC='https://a/1.png'><img src="https://a/2.png">"#)
                .as_deref(),
            Some("https://a/1.png")
        );
        assert_eq!(first_img_src(r#"<image src="no.png">"#), None);
        assert_eq!(first_img_src("plain text"), None);
    }

    #[test]
    fn test_image_from_embedded_html() {
        let item = RawFeedItem {
            media_content_url: None,
            description_html: Some(r#"<img src="https://s2.glbimg.com/embed.jpg" /><br />Texto"#.to_string()),
            ..feed_item()
        };
        let article = normalize_feed_item(&item, &classifier()).unwrap();
        assert_eq!(article.image.as_deref(), Some("https://s2.glbimg.com/embed.jpg"));
    }

    #[test]
    fn test_long_description_is_truncated() {
        let long = format!("  {}  ", "palavra ".repeat(40));
        let description = resolve_description(&[Some(long.as_str())]);

        assert!(description.chars().count() <= 150);
        assert!(description.ends_with("..."));
        assert!(!description.starts_with(' '));
    }

    #[test]
    fn test_short_description_is_trimmed_only() {
        let raw = "   Uma descrição curta com acentuação.   ";
        assert_eq!(resolve_description(&[Some(raw)]), raw.trim());

        let boundary = "d".repeat(150);
        assert_eq!(resolve_description(&[Some(boundary.as_str())]), boundary);
    }

    #[test]
    fn test_description_falls_back_to_snippet_then_placeholder() {
        let item = RawFeedItem {
            description: Some("  ".to_string()),
            content_snippet: Some("Trecho do conteúdo".to_string()),
            ..feed_item()
        };
        let article = normalize_feed_item(&item, &classifier()).unwrap();
        assert_eq!(article.description, "Trecho do conteúdo");

        let item = RawFeedItem {
            description: None,
            content_snippet: None,
            ..feed_item()
        };
        let article = normalize_feed_item(&item, &classifier()).unwrap();
        assert_eq!(article.description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(article.content, PLACEHOLDER_CONTENT);
    }

    #[test]
    fn test_content_prefers_encoded() {
        let item = RawFeedItem {
            content_encoded: Some("<p>Texto completo</p>".to_string()),
            ..feed_item()
        };
        let article = normalize_feed_item(&item, &classifier()).unwrap();
        assert_eq!(article.content, "<p>Texto completo</p>");
    }

    #[test]
    fn test_feed_placeholders() {
        let item = RawFeedItem {
            media_thumbnail_url: Some("https://s2.glbimg.com/t.jpg".to_string()),
            ..Default::default()
        };
        let article = normalize_feed_item(&item, &classifier()).unwrap();

        assert_eq!(article.title, PLACEHOLDER_TITLE);
        assert_eq!(article.link, "#");
        assert_eq!(article.id, article_id("#"));
        assert_eq!(article.category, "geral");
        assert_eq!(article.source, "G1");
        assert_eq!(article.pub_date, None);
    }

    #[test]
    fn test_unparseable_pub_date_passes_through() {
        let item = RawFeedItem {
            pub_date: Some("ontem à tarde".to_string()),
            ..feed_item()
        };
        let article = normalize_feed_item(&item, &classifier()).unwrap();
        assert_eq!(article.pub_date.as_deref(), Some("ontem à tarde"));
    }

    #[test]
    fn test_headline_normalization() {
        let headline = RawHeadline {
            title: Some("Manchete".to_string()),
            description: Some("x".repeat(200)),
            content: Some("Texto da API".to_string()),
            url: Some("https://folha.uol.com.br/a.shtml".to_string()),
            image: Some("https://folha.uol.com.br/a.jpg".to_string()),
            publishedAt: Some("2025-05-06T12:00:00Z".to_string()),
            source: Some(HeadlineSource {
                name: Some("Folha".to_string()),
                url: None,
            }),
        };
        let article = normalize_headline(&headline, "tecnologia");

        assert_eq!(article.category, "tecnologia");
        assert_eq!(article.source, "Folha");
        assert_eq!(article.description, format!("{}...", "x".repeat(147)));
        assert_eq!(article.content, "Texto da API");
        assert_eq!(article.image.as_deref(), Some("https://folha.uol.com.br/a.jpg"));
        assert_eq!(article.id, article_id("https://folha.uol.com.br/a.shtml"));
        assert_eq!(article.pub_date.as_deref(), Some("2025-05-06T12:00:00Z"));
    }

    #[test]
    fn test_headline_placeholders() {
        let headline = RawHeadline {
            image: Some("https://a/b.jpg".to_string()),
            ..Default::default()
        };
        let article = normalize_headline(&headline, "geral");

        assert_eq!(article.title, PLACEHOLDER_TITLE);
        assert_eq!(article.link, "#");
        assert_eq!(article.source, "GNews");
        assert_eq!(article.description, PLACEHOLDER_DESCRIPTION);
        assert_eq!(article.content, PLACEHOLDER_CONTENT);
    }

    #[test]
    fn test_headline_content_falls_back_to_description() {
        let headline = RawHeadline {
            description: Some("Resumo".to_string()),
            image: Some("https://a/b.jpg".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize_headline(&headline, "geral").content, "Resumo");
    }
}
