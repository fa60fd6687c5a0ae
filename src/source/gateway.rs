//! Adapter for the multi-version catalogue site
//!
//! A run makes three kinds of requests:
//!
//! 1. `/versions/` once, to list languages and their versions
//! 2. `/versions/<slug>/` once per kept version, to list books and chapter counts
//! 3. `/passage/?search=<Book a-b>&version=<CODE>` once per chapter batch
//!
//! Only the configured language code and version allow-list survive the
//! index filter.

use super::chunker::{chapter_batches, passage_query};
use super::fetcher::{fetch_html, join_path};
use super::traversal::{own_text, parse_selector, select_text, traverse, NodeProjector, Traversal};
use super::SourceAdapter;
use crate::config::GatewayConfig;
use crate::corpus::{Book, Corpus, Language, Testament, TestamentIds, Version};
use crate::state::{VerseCursor, VerseNode};
use crate::SyncError;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

pub struct GatewayAdapter {
    client: Client,
    config: GatewayConfig,
}

impl GatewayAdapter {
    pub fn new(client: Client, config: GatewayConfig) -> Self {
        Self { client, config }
    }

    fn versions_url(&self) -> String {
        join_path(&self.config.base_url, "/versions/")
    }

    fn version_url(&self, slug: &str) -> String {
        join_path(&self.config.base_url, &format!("/versions/{}/", slug))
    }

    fn passage_url(&self) -> String {
        join_path(&self.config.base_url, "/passage/")
    }

    /// Fetches every chapter batch of one book and collects its verses
    async fn fetch_book_verses(&self, book: &mut Book, version_code: &str) -> Result<(), SyncError> {
        let url = self.passage_url();

        for batch in chapter_batches(book.chapters_count, self.config.chapters_per_request) {
            let search = passage_query(&book.name, &batch);
            let html = fetch_html(
                &self.client,
                &url,
                &[("search", search.as_str()), ("version", version_code)],
            )
            .await?;

            let traversal = parse_passage(&html, *batch.start(), &url)?;
            tracing::debug!(
                book = %book.name,
                version = version_code,
                search = %search,
                verses = traversal.verses.len(),
                skipped = traversal.skipped,
                "Parsed passage"
            );
            book.verses.extend(traversal.verses);
        }

        Ok(())
    }
}

impl SourceAdapter for GatewayAdapter {
    fn name(&self) -> &'static str {
        "gateway"
    }

    async fn fetch_corpus(&self, testaments: &TestamentIds) -> Result<Corpus, SyncError> {
        let index_url = self.versions_url();
        let html = fetch_html(&self.client, &index_url, &[]).await?;
        let mut languages =
            parse_version_index(&html, &self.config.language_code, &self.config.versions)?;

        if languages.is_empty() {
            return Err(SyncError::HtmlStructure {
                url: index_url,
                message: format!(
                    "no language {} with versions {:?}",
                    self.config.language_code, self.config.versions
                ),
            });
        }

        for language in &mut languages {
            for version in &mut language.versions {
                let version_url = self.version_url(&version.slug);
                let html = fetch_html(&self.client, &version_url, &[]).await?;
                version.books = parse_book_list(&html, testaments, &version_url)?;

                if version.books.is_empty() {
                    return Err(SyncError::HtmlStructure {
                        url: version_url,
                        message: "no books listed".to_string(),
                    });
                }

                tracing::info!(
                    version = %version.code,
                    books = version.books.len(),
                    "Fetching passages"
                );

                for book in &mut version.books {
                    self.fetch_book_verses(book, &version.code).await?;
                }
            }
        }

        Ok(Corpus { languages })
    }
}

/// Extracts languages matching `language_code` with their allowed versions
///
/// Languages left without any allowed version are dropped.
pub fn parse_version_index(
    html: &str,
    language_code: &str,
    allowed_versions: &[String],
) -> Result<Vec<Language>, SyncError> {
    let document = Html::parse_document(html);
    let language_selector = parse_selector("span.language-display")?;
    let anchor_selector = parse_selector("a")?;

    let mut languages = Vec::new();

    for span in document.select(&language_selector) {
        let Some(span_id) = span.value().attr("id") else {
            continue;
        };
        let language_id = span_id.replace("lang-", "");

        let Some(code) = span
            .next_sibling()
            .and_then(|node| node.value().as_text().and_then(|text| last_code_token(text)))
        else {
            tracing::debug!(language_id = %language_id, "Language without code");
            continue;
        };

        if code != language_code {
            continue;
        }

        let row_selector = match Selector::parse(&format!(
            r#"tr[data-language="{}"] > td[data-translation]"#,
            language_id
        )) {
            Ok(selector) => selector,
            Err(_) => {
                tracing::warn!(language_id = %language_id, "Unusable language id");
                continue;
            }
        };

        let mut versions = Vec::new();
        for cell in document.select(&row_selector) {
            for child in cell.children().filter_map(ElementRef::wrap) {
                let anchor = if child.value().name() == "a" {
                    Some(child)
                } else {
                    child.select(&anchor_selector).next()
                };
                let Some(anchor) = anchor else {
                    continue;
                };
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };

                let label = anchor.text().collect::<String>();
                if let Some(version) = parse_version_link(&label, href) {
                    if allowed_versions.iter().any(|allowed| *allowed == version.code) {
                        versions.push(version);
                    }
                }
            }
        }

        if !versions.is_empty() {
            languages.push(Language {
                name: span.text().collect::<String>().trim().to_string(),
                code,
                versions,
            });
        }
    }

    Ok(languages)
}

/// Parses `"Name Words (CODE)"` and a `/versions/<slug>/#booklist` href
fn parse_version_link(label: &str, href: &str) -> Option<Version> {
    let tokens: Vec<&str> = label.split_whitespace().collect();
    let (last, rest) = tokens.split_last()?;
    let code = strip_parens(last);
    if code.is_empty() {
        return None;
    }

    let slug = href
        .split_once("/versions/")
        .map(|(_, rest)| rest)
        .unwrap_or(href);
    let slug = slug.strip_suffix("#booklist").unwrap_or(slug);
    let slug = slug.trim_matches('/');
    if slug.is_empty() {
        return None;
    }

    Some(Version {
        name: rest.join(" "),
        code,
        slug: slug.to_string(),
        books: Vec::new(),
    })
}

fn last_code_token(text: &str) -> Option<String> {
    let code = strip_parens(text.split_whitespace().last()?);
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

fn strip_parens(token: &str) -> String {
    token.chars().filter(|c| *c != '(' && *c != ')').collect()
}

/// Extracts the book list of a version page, OT rows first
///
/// Rows whose chapter count does not parse are logged and skipped.
pub fn parse_book_list(
    html: &str,
    testaments: &TestamentIds,
    url: &str,
) -> Result<Vec<Book>, SyncError> {
    let document = Html::parse_document(html);
    let mut books = Vec::new();

    for (css, testament) in [
        ("tr.ot-book > td.book-name", Testament::Old),
        ("tr.nt-book > td.book-name", Testament::New),
    ] {
        let selector = parse_selector(css)?;

        for cell in document.select(&selector) {
            let raw_count = cell
                .children()
                .filter_map(ElementRef::wrap)
                .last()
                .map(|last| last.text().collect::<String>())
                .unwrap_or_default();

            let chapters_count = match raw_count.trim().parse::<u32>() {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!(url, raw = %raw_count.trim(), error = %e, "Bad chapter count");
                    continue;
                }
            };

            let name = own_text(cell);
            if name.is_empty() {
                tracing::warn!(url, %testament, "Book row without name");
                continue;
            }

            let mut book = Book::new(name, testaments.get(testament));
            book.chapters_count = chapters_count;
            books.push(book);
        }
    }

    Ok(books)
}

struct PassageProjector {
    chapter_marker: Selector,
    verse_marker: Selector,
}

impl NodeProjector for PassageProjector {
    fn project(&self, element: ElementRef<'_>) -> Vec<VerseNode> {
        vec![VerseNode::marked(
            select_text(element, &self.chapter_marker),
            select_text(element, &self.verse_marker),
            element.text().collect::<String>(),
        )]
    }
}

/// Parses the verse paragraphs of one passage page
///
/// `first_chapter` seeds the cursor so a batch page that opens mid-chapter
/// without a chapter marker still lands in the requested chapter.
pub fn parse_passage(html: &str, first_chapter: u32, url: &str) -> Result<Traversal, SyncError> {
    let document = Html::parse_document(html);
    let projector = PassageProjector {
        chapter_marker: parse_selector("span.chapternum")?,
        verse_marker: parse_selector("sup.versenum")?,
    };
    let mut cursor = VerseCursor::new(first_chapter);

    Ok(traverse(
        &document,
        &parse_selector("p.verse")?,
        &projector,
        &mut cursor,
        url,
    ))
}
