//! Adapter for the single-version Batak Toba site
//!
//! The index page links one page per book; each book page holds a heading
//! per chapter followed by a block of `"<chapter>:<verse>. <body>"` lines.

use super::fetcher::fetch_html;
use super::traversal::{parse_selector, traverse, NodeProjector, Traversal};
use super::SourceAdapter;
use crate::config::TobaConfig;
use crate::corpus::{Book, Corpus, Language, Testament, TestamentIds, Version};
use crate::state::{VerseCursor, VerseNode};
use crate::SyncError;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html};
use url::Url;

pub struct TobaAdapter {
    client: Client,
    config: TobaConfig,
    projector: TobaProjector,
}

impl TobaAdapter {
    pub fn new(client: Client, config: TobaConfig) -> Result<Self, SyncError> {
        Ok(Self {
            client,
            config,
            projector: TobaProjector::new()?,
        })
    }
}

impl SourceAdapter for TobaAdapter {
    fn name(&self) -> &'static str {
        "toba"
    }

    async fn fetch_corpus(&self, testaments: &TestamentIds) -> Result<Corpus, SyncError> {
        let index_url = self.config.base_url.clone();
        let html = fetch_html(&self.client, &index_url, &[]).await?;
        let mut books = parse_book_index(&html, &self.config, testaments)?;

        if books.is_empty() {
            return Err(SyncError::HtmlStructure {
                url: index_url,
                message: "no book links in content block".to_string(),
            });
        }

        tracing::info!(books = books.len(), "Fetching book pages");

        for book in &mut books {
            let Some(url) = book.source_url.clone() else {
                continue;
            };
            let html = fetch_html(&self.client, &url, &[]).await?;
            let traversal = parse_book_page(&html, &self.projector, &url)?;

            tracing::debug!(
                book = %book.name,
                verses = traversal.verses.len(),
                skipped = traversal.skipped,
                "Parsed book page"
            );
            book.verses = traversal.verses;
        }

        Ok(Corpus {
            languages: vec![Language {
                name: self.config.language_name.clone(),
                code: self.config.language_code.clone(),
                versions: vec![Version {
                    name: self.config.version_name.clone(),
                    code: self.config.version_code.clone(),
                    slug: self.config.version_slug.clone(),
                    books,
                }],
            }],
        })
    }
}

/// Extracts book links from the index content block
///
/// Hrefs are resolved against the configured base URL. Links that match
/// neither testament fragment are not books and are skipped.
pub fn parse_book_index(
    html: &str,
    config: &TobaConfig,
    testaments: &TestamentIds,
) -> Result<Vec<Book>, SyncError> {
    let base_url = Url::parse(&config.base_url)?;
    let document = Html::parse_document(html);
    let selector = parse_selector("div[class='entry entry-content'] > p > a")?;

    let mut books = Vec::new();

    for anchor in document.select(&selector) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };

        let testament = if href.contains(&config.old_testament_fragment) {
            Testament::Old
        } else if href.contains(&config.new_testament_fragment) {
            Testament::New
        } else {
            tracing::warn!(href, "Link outside both testaments, skipping");
            continue;
        };

        let name = anchor.text().collect::<String>().trim().to_string();
        if name.is_empty() {
            tracing::warn!(href, "Book link without a name, skipping");
            continue;
        }

        let source_url = match base_url.join(href.trim()) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::warn!(href, error = %e, "Unresolvable book link, skipping");
                continue;
            }
        };

        let mut book = Book::new(name, testaments.get(testament));
        book.source_url = Some(source_url);
        books.push(book);
    }

    Ok(books)
}

/// Chapter heading plus the verse lines of the block that follows it
pub struct TobaProjector {
    chapter_number: Regex,
    verse_line: Regex,
}

impl TobaProjector {
    pub fn new() -> Result<Self, SyncError> {
        Ok(Self {
            chapter_number: Regex::new(r"(\d+)$")?,
            verse_line: Regex::new(r"^\d+:(\d+)\.? ")?,
        })
    }
}

impl NodeProjector for TobaProjector {
    fn project(&self, heading: ElementRef<'_>) -> Vec<VerseNode> {
        let title = heading.text().collect::<String>();
        let title = title.trim();

        let Some(chapter) = self
            .chapter_number
            .captures(title)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            tracing::warn!(title, "Chapter heading without a number");
            return Vec::new();
        };

        let Some(block) = heading.next_siblings().find_map(ElementRef::wrap) else {
            return Vec::new();
        };
        let block_text = block.text().collect::<String>();

        let mut nodes = Vec::new();
        for line in block_text.split('\n') {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let Some(caps) = self.verse_line.captures(line) else {
                tracing::trace!(line, "Not a verse line");
                continue;
            };
            let (Some(prefix), Some(number)) = (caps.get(0), caps.get(1)) else {
                continue;
            };

            nodes.push(VerseNode {
                chapter_marker: Some(chapter.clone()),
                verse_marker: Some(number.as_str().to_string()),
                text: line[prefix.end()..].to_string(),
                leading_numeral: false,
            });
        }

        nodes
    }
}

/// Parses every chapter heading of one book page
pub fn parse_book_page(
    html: &str,
    projector: &TobaProjector,
    url: &str,
) -> Result<Traversal, SyncError> {
    let document = Html::parse_document(html);
    let mut cursor = VerseCursor::new(1);

    Ok(traverse(
        &document,
        &parse_selector("h2.entry-title")?,
        projector,
        &mut cursor,
        url,
    ))
}
