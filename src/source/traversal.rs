//! Ordered verse traversal over a parsed page
//!
//! Both sources reduce to the same loop: select nodes in document order,
//! project each into zero or more `VerseNode`s and feed them to a
//! `VerseCursor`. Only the projection differs per source.

use crate::corpus::Verse;
use crate::state::{Step, VerseCursor, VerseNode};
use crate::SyncError;
use scraper::{ElementRef, Html, Selector};

/// Source-specific view of one selected element
pub trait NodeProjector {
    fn project(&self, element: ElementRef<'_>) -> Vec<VerseNode>;
}

/// Verses emitted by a traversal, plus how many nodes were dropped
#[derive(Debug, Default)]
pub struct Traversal {
    pub verses: Vec<Verse>,
    pub skipped: usize,
}

/// Walks every element matching `selector` in document order
pub fn traverse<P: NodeProjector + ?Sized>(
    document: &Html,
    selector: &Selector,
    projector: &P,
    cursor: &mut VerseCursor,
    url: &str,
) -> Traversal {
    let mut traversal = Traversal::default();

    for element in document.select(selector) {
        for node in projector.project(element) {
            match cursor.apply(&node) {
                Step::Emit(verse) => traversal.verses.push(verse),
                Step::Skip(reason) => {
                    tracing::warn!(
                        url,
                        chapter = cursor.current_chapter(),
                        ?reason,
                        "Skipping verse node"
                    );
                    traversal.skipped += 1;
                }
            }
        }
    }

    traversal
}

/// Parses a fixed CSS selector
pub fn parse_selector(css: &str) -> Result<Selector, SyncError> {
    Selector::parse(css).map_err(|e| SyncError::Selector(format!("{}: {:?}", css, e)))
}

/// Concatenated text of every descendant matching `selector`, `None` if empty
pub fn select_text(element: ElementRef<'_>, selector: &Selector) -> Option<String> {
    let text: String = element
        .select(selector)
        .flat_map(|matched| matched.text())
        .collect();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Text of the element's direct text children only
pub fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| String::from(&**text)))
        .collect::<String>()
        .trim()
        .to_string()
}
