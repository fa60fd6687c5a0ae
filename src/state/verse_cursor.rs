//! Sticky chapter/verse state for ordered verse parsing
//!
//! Source pages only mark a chapter where it starts and often omit the verse
//! number of a chapter's first verse. The cursor carries the last chapter
//! seen across nodes and applies one transition per node:
//!
//! | Node carries | Chapter | Verse |
//! |---|---|---|
//! | chapter marker | replaced | marker or 1 |
//! | verse marker only | kept | replaced |
//! | neither | kept | 1 |
//! | unparseable marker | kept | kept (node skipped) |

use crate::corpus::Verse;

/// What a projector extracted from one source node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseNode {
    /// Raw chapter marker text, if the node carries one
    pub chapter_marker: Option<String>,

    /// Raw verse marker text, if the node carries one
    pub verse_marker: Option<String>,

    /// Markup-free text of the node
    pub text: String,

    /// Whether `text` still starts with the marker numeral
    pub leading_numeral: bool,
}

impl VerseNode {
    /// Node whose text still begins with its numeral marker
    pub fn marked(
        chapter_marker: Option<String>,
        verse_marker: Option<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            chapter_marker,
            verse_marker,
            text: text.into(),
            leading_numeral: true,
        }
    }
}

/// Why a node produced no verse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    BadChapterMarker(String),
    BadVerseMarker(String),
}

/// Outcome of applying one node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Emit(Verse),
    Skip(SkipReason),
}

/// Sticky `{current_chapter, current_verse}` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseCursor {
    current_chapter: u32,
    current_verse: u32,
}

impl VerseCursor {
    /// Starts a cursor at the first chapter of a fetched range
    pub fn new(start_chapter: u32) -> Self {
        Self {
            current_chapter: start_chapter,
            current_verse: 1,
        }
    }

    pub fn current_chapter(&self) -> u32 {
        self.current_chapter
    }

    pub fn current_verse(&self) -> u32 {
        self.current_verse
    }

    /// Applies the transition rule for one node
    pub fn apply(&mut self, node: &VerseNode) -> Step {
        let chapter_marker = node.chapter_marker.as_deref().and_then(clean_marker);
        let verse_marker = node.verse_marker.as_deref().and_then(clean_marker);

        let chapter = match chapter_marker {
            Some(raw) => match raw.parse::<u32>() {
                Ok(chapter) => chapter,
                Err(_) => return Step::Skip(SkipReason::BadChapterMarker(raw)),
            },
            None => self.current_chapter,
        };

        let verse = match &verse_marker {
            Some(raw) => match raw.parse::<u32>() {
                Ok(verse) => verse,
                Err(_) => return Step::Skip(SkipReason::BadVerseMarker(raw.clone())),
            },
            None => 1,
        };

        self.current_chapter = chapter;
        self.current_verse = verse;

        let body = if node.leading_numeral {
            // A chapter's first verse is marked by the chapter number; an
            // explicit verse marker without a chapter marker marks itself.
            let numeral = if verse > 1 || (node.chapter_marker.is_none() && verse_marker.is_some())
            {
                verse
            } else {
                chapter
            };
            strip_leading_numeral(&node.text, numeral)
        } else {
            node.text.as_str()
        };

        Step::Emit(Verse {
            chapter,
            number: verse,
            body: body.trim().to_string(),
        })
    }
}

/// Removes no-break spaces and surrounding whitespace; empty markers count as absent
fn clean_marker(raw: &str) -> Option<String> {
    let cleaned: String = raw.chars().filter(|c| *c != '\u{a0}').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Strips `numeral` from the start of `text` when it is a whole token
pub fn strip_leading_numeral(text: &str, numeral: u32) -> &str {
    let trimmed = text.trim_start();
    let digits = numeral.to_string();
    match trimmed.strip_prefix(digits.as_str()) {
        Some(rest) if !rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(step: Step) -> Verse {
        match step {
            Step::Emit(verse) => verse,
            Step::Skip(reason) => panic!("unexpected skip: {:?}", reason),
        }
    }

    #[test]
    fn test_chapter_is_sticky() {
        let mut cursor = VerseCursor::new(1);
        let nodes = [
            VerseNode::marked(Some("3\u{a0}".into()), None, "3\u{a0}First verse"),
            VerseNode::marked(None, Some("2\u{a0}".into()), "2\u{a0}Second verse"),
            VerseNode::marked(None, Some("3".into()), "3 Third verse"),
            VerseNode::marked(None, Some("4".into()), "4 Fourth verse"),
        ];

        let verses: Vec<Verse> = nodes.iter().map(|n| emit(cursor.apply(n))).collect();

        assert!(verses.iter().all(|v| v.chapter == 3));
        assert_eq!(
            verses.iter().map(|v| v.number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(verses[0].body, "First verse");
        assert_eq!(verses[3].body, "Fourth verse");
    }

    #[test]
    fn test_new_chapter_marker_replaces_chapter() {
        let mut cursor = VerseCursor::new(1);
        emit(cursor.apply(&VerseNode::marked(Some("1".into()), None, "1 a")));
        emit(cursor.apply(&VerseNode::marked(None, Some("2".into()), "2 b")));
        let verse = emit(cursor.apply(&VerseNode::marked(Some("2".into()), None, "2 c")));

        assert_eq!((verse.chapter, verse.number), (2, 1));
        assert_eq!(verse.body, "c");
        assert_eq!(cursor.current_chapter(), 2);
    }

    #[test]
    fn test_unmarked_node_defaults_to_verse_one() {
        let mut cursor = VerseCursor::new(7);
        let verse = emit(cursor.apply(&VerseNode::marked(None, None, "7 Opening words")));
        assert_eq!((verse.chapter, verse.number), (7, 1));
        assert_eq!(verse.body, "Opening words");
    }

    #[test]
    fn test_bad_marker_skips_and_keeps_state() {
        let mut cursor = VerseCursor::new(1);
        emit(cursor.apply(&VerseNode::marked(Some("4".into()), None, "4 a")));
        emit(cursor.apply(&VerseNode::marked(None, Some("2".into()), "2 b")));

        let step = cursor.apply(&VerseNode::marked(Some("IV".into()), Some("3".into()), "x"));
        assert_eq!(step, Step::Skip(SkipReason::BadChapterMarker("IV".into())));

        let step = cursor.apply(&VerseNode::marked(None, Some("3a".into()), "x"));
        assert_eq!(step, Step::Skip(SkipReason::BadVerseMarker("3a".into())));

        assert_eq!(cursor.current_chapter(), 4);
        assert_eq!(cursor.current_verse(), 2);

        let verse = emit(cursor.apply(&VerseNode::marked(None, Some("3".into()), "3 c")));
        assert_eq!((verse.chapter, verse.number), (4, 3));
    }

    #[test]
    fn test_explicit_verse_one_without_chapter_marker() {
        let mut cursor = VerseCursor::new(5);
        let verse = emit(cursor.apply(&VerseNode::marked(None, Some("1".into()), "1 Text")));
        assert_eq!((verse.chapter, verse.number), (5, 1));
        assert_eq!(verse.body, "Text");
    }

    #[test]
    fn test_pre_stripped_text_is_kept() {
        let mut cursor = VerseCursor::new(1);
        let node = VerseNode {
            chapter_marker: Some("2".into()),
            verse_marker: Some("5".into()),
            text: "5 ribu halak".into(),
            leading_numeral: false,
        };
        let verse = emit(cursor.apply(&node));
        assert_eq!(verse.body, "5 ribu halak");
    }

    #[test]
    fn test_strip_leading_numeral_whole_token_only() {
        assert_eq!(strip_leading_numeral("12 text", 12), " text");
        assert_eq!(strip_leading_numeral("12 text", 1), "12 text");
        assert_eq!(strip_leading_numeral("  3text", 3), "text");
        assert_eq!(strip_leading_numeral("text", 3), "text");
    }

    #[test]
    fn test_numeral_round_trip() {
        let mut cursor = VerseCursor::new(1);
        for (marker, text) in [("2", "2 And the earth"), ("10", "10\u{a0}And God called")] {
            let verse = emit(cursor.apply(&VerseNode::marked(None, Some(marker.into()), text)));
            let rebuilt = format!("{} {}", verse.number, verse.body);
            let normalize = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
            assert_eq!(normalize(&rebuilt), normalize(text));
        }
    }
}
