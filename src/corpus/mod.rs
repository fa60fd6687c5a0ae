//! In-memory corpus built by one sync run
//!
//! The tree is language → version → book → verse. An adapter builds it,
//! the store consumes it, and it is dropped after the merge. Identifiers are
//! not part of the tree; they are assigned while merging.

use std::fmt;

/// Old/New testament partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Testament {
    Old,
    New,
}

impl Testament {
    /// Fixed code of the testament row in the store
    pub fn code(&self) -> &'static str {
        match self {
            Self::Old => "OT",
            Self::New => "NT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Old => "Old",
            Self::New => "New",
        }
    }

    pub fn all() -> [Self; 2] {
        [Self::Old, Self::New]
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Testament uids resolved from the store before fetching
///
/// A missing entry is carried into every book of that testament and is
/// rejected by the store's foreign key when the book is merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestamentIds {
    pub old: Option<String>,
    pub new: Option<String>,
}

impl TestamentIds {
    pub fn get(&self, testament: Testament) -> Option<String> {
        match testament {
            Testament::Old => self.old.clone(),
            Testament::New => self.new.clone(),
        }
    }
}

/// Whole corpus for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    pub name: String,
    /// Two-letter (or source-specific) language code, unique in the store
    pub code: String,
    pub versions: Vec<Version>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Version {
    pub name: String,
    pub code: String,
    /// Path fragment of the version on the source site
    pub slug: String,
    pub books: Vec<Book>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    pub name: String,
    pub testament_uid: Option<String>,
    /// Absolute URL of the book page, for sources that link one page per book
    pub source_url: Option<String>,
    pub chapters_count: u32,
    pub verses: Vec<Verse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verse {
    pub chapter: u32,
    pub number: u32,
    pub body: String,
}

/// Entity counts of a corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusCounts {
    pub languages: usize,
    pub versions: usize,
    pub books: usize,
    pub verses: usize,
}

impl Corpus {
    pub fn counts(&self) -> CorpusCounts {
        let mut counts = CorpusCounts {
            languages: self.languages.len(),
            ..CorpusCounts::default()
        };
        for version in self.languages.iter().flat_map(|l| &l.versions) {
            counts.versions += 1;
            counts.books += version.books.len();
            counts.verses += version.books.iter().map(|b| b.verses.len()).sum::<usize>();
        }
        counts
    }
}

impl Book {
    pub fn new(name: impl Into<String>, testament_uid: Option<String>) -> Self {
        Self {
            name: name.into(),
            testament_uid,
            source_url: None,
            chapters_count: 0,
            verses: Vec::new(),
        }
    }

    /// Sets `chapters_count` to the highest chapter actually scraped
    ///
    /// Books with no scraped verses keep the count they were listed with.
    pub fn refresh_chapters_count(&mut self) {
        if let Some(highest) = self.verses.iter().map(|v| v.chapter).max() {
            self.chapters_count = highest;
        }
    }
}

impl fmt::Display for CorpusCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} languages, {} versions, {} books, {} verses",
            self.languages, self.versions, self.books, self.verses
        )
    }
}
