use log::{error, info};
use scraper::{Html, Selector};

use crate::{
    CRAWLER_LOG,
    error::CrawlError,
    requests::PageSource,
    text_manipulators::{absolute_image_url, extract_text, take_words},
};

pub const SUMMARY_WORD_LIMIT: usize = 150;
pub const SUMMARY_PARAGRAPHS: usize = 7;

const TITLE_SELECTOR: &str = "h1#firstHeading";
const PARAGRAPH_SELECTOR: &str = "p";
const IMAGE_SELECTOR: &str = "img";

/// The fields kept from one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub summary: String,
    pub image_url: Option<String>,
}

/// Pulls an [`Article`] out of a Wikipedia page.
pub struct FieldExtractor {
    title: Selector,
    paragraph: Selector,
    image: Selector,
}

impl FieldExtractor {
    pub fn new() -> Result<Self, CrawlError> {
        Ok(Self {
            title: parse_selector(TITLE_SELECTOR)?,
            paragraph: parse_selector(PARAGRAPH_SELECTOR)?,
            image: parse_selector(IMAGE_SELECTOR)?,
        })
    }

    /// The title heading is mandatory. The summary is built from the first
    /// paragraphs in document order, the image is the first `<img>` anywhere
    /// in the page and may be absent.
    pub fn extract(&self, html: &str) -> Result<Article, CrawlError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .map(extract_text)
            .ok_or(CrawlError::MissingTitle)?
            .trim()
            .to_string();

        let paragraphs = document
            .select(&self.paragraph)
            .take(SUMMARY_PARAGRAPHS)
            .map(extract_text);
        let summary = take_words(paragraphs, SUMMARY_WORD_LIMIT);

        let image_url = document
            .select(&self.image)
            .next()
            .and_then(|img| img.value().attr("src"))
            .map(absolute_image_url);

        Ok(Article {
            title,
            summary,
            image_url,
        })
    }
}

fn parse_selector(selector: &'static str) -> Result<Selector, CrawlError> {
    Selector::parse(selector).map_err(|e| CrawlError::Selector {
        selector,
        details: e.to_string(),
    })
}

pub struct ArticleScraper<S> {
    source: S,
    extractor: FieldExtractor,
}

impl<S: PageSource> ArticleScraper<S> {
    pub fn new(source: S) -> Result<Self, CrawlError> {
        Ok(Self {
            source,
            extractor: FieldExtractor::new()?,
        })
    }

    /// Fetch and extract, keeping the reason for a failure.
    pub async fn try_crawl(&self, url: &str) -> Result<Article, CrawlError> {
        let html = self.source.fetch_page(url).await?;
        self.extractor.extract(&html)
    }

    /// Either a complete article or nothing; failures are logged here and
    /// never reach the caller.
    pub async fn crawl(&self, url: &str) -> Option<Article> {
        match self.try_crawl(url).await {
            Ok(article) => {
                info!(target: CRAWLER_LOG, "Crawled {url}: {:?}", article.title);
                Some(article)
            }
            Err(e) => {
                error!(target: CRAWLER_LOG, "Failed to crawl {url}: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Serves pages from memory; unknown URLs behave like a refused connection.
    pub(crate) struct StaticPages(pub HashMap<String, String>);

    impl PageSource for StaticPages {
        async fn fetch_page(&self, url: &str) -> Result<String, CrawlError> {
            self.0.get(url).cloned().ok_or(CrawlError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::BAD_GATEWAY,
            })
        }
    }

    pub(crate) fn wiki_page(title: &str, paragraphs: &[&str], img: Option<&str>) -> String {
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
        let img = img
            .map(|src| format!("<img src=\"{src}\" alt=\"\">"))
            .unwrap_or_default();
        format!(
            r#"<html><body>
                <h1 id="firstHeading" class="firstHeading"><span class="mw-page-title-main">{title}</span></h1>
                <div id="content">{img}{body}</div>
            </body></html>"#
        )
    }

    #[test]
    fn extracts_all_three_fields() {
        let html = wiki_page(
            "Elden Ring",
            &["Elden Ring is a 2022 action role-playing game."],
            Some("//upload.wikimedia.org/Elden_Ring.jpg"),
        );
        let article = FieldExtractor::new().unwrap().extract(&html).unwrap();

        assert_eq!(article.title, "Elden Ring");
        assert_eq!(article.summary, "Elden Ring is a 2022 action role-playing game.");
        assert_eq!(
            article.image_url.as_deref(),
            Some("https://upload.wikimedia.org/Elden_Ring.jpg")
        );
    }

    #[test]
    fn missing_title_is_an_error() {
        let html = "<html><body><h1>No id here</h1><p>text</p></body></html>";
        let err = FieldExtractor::new().unwrap().extract(html).unwrap_err();
        assert!(matches!(err, CrawlError::MissingTitle));
    }

    #[test]
    fn page_without_image_has_no_image_url() {
        let html = wiki_page("Girl with a Pearl Earring", &["A painting."], None);
        let article = FieldExtractor::new().unwrap().extract(&html).unwrap();
        assert_eq!(article.image_url, None);
    }

    #[test]
    fn first_image_wins() {
        let html = r#"<html><body>
            <h1 id="firstHeading">Winged Victory</h1>
            <img src="//upload.wikimedia.org/first.jpg">
            <p>Statue.</p>
            <img src="//upload.wikimedia.org/second.jpg">
        </body></html>"#;
        let article = FieldExtractor::new().unwrap().extract(html).unwrap();
        assert_eq!(
            article.image_url.as_deref(),
            Some("https://upload.wikimedia.org/first.jpg")
        );
    }

    #[test]
    fn summary_never_exceeds_word_limit() {
        let long = vec!["word"; 90].join(" ");
        let paragraphs = vec![long.as_str(); 7];
        let html = wiki_page("Long", &paragraphs, None);
        let article = FieldExtractor::new().unwrap().extract(&html).unwrap();
        assert_eq!(article.summary.split_whitespace().count(), SUMMARY_WORD_LIMIT);
    }

    #[test]
    fn summary_only_reads_first_seven_paragraphs() {
        let paragraphs = ["one", "two", "three", "four", "five", "six", "seven", "eight"];
        let html = wiki_page("Short", &paragraphs, None);
        let article = FieldExtractor::new().unwrap().extract(&html).unwrap();
        assert_eq!(article.summary, "one two three four five six seven");
    }

    #[tokio::test]
    async fn crawl_swallows_fetch_errors() {
        let scraper = ArticleScraper::new(StaticPages(HashMap::new())).unwrap();
        assert_eq!(scraper.crawl("https://en.wikipedia.org/wiki/Nowhere").await, None);
        assert!(matches!(
            scraper.try_crawl("https://en.wikipedia.org/wiki/Nowhere").await,
            Err(CrawlError::Status { .. })
        ));
    }

    #[tokio::test]
    async fn crawl_swallows_parse_errors() {
        let url = "https://en.wikipedia.org/wiki/Broken".to_string();
        let pages = HashMap::from([(url.clone(), "<p>no heading</p>".to_string())]);
        let scraper = ArticleScraper::new(StaticPages(pages)).unwrap();
        assert_eq!(scraper.crawl(&url).await, None);
    }
}
