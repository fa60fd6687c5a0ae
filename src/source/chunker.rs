//! Chapter batching for passage requests
//!
//! A book of N chapters is requested in consecutive inclusive ranges of at
//! most `batch_size` chapters. A 45-chapter book with a batch size of 20 is
//! fetched as 1-20, 21-40 and 41-45.

use std::ops::RangeInclusive;

/// Splits `1..=chapters_count` into consecutive batches
///
/// A zero batch size is treated as one chapter per batch. A book with no
/// chapters yields no batches.
pub fn chapter_batches(chapters_count: u32, batch_size: u32) -> Vec<RangeInclusive<u32>> {
    let batch_size = batch_size.max(1);
    let mut batches = Vec::new();
    let mut first = 1;

    while first <= chapters_count {
        let last = first.saturating_add(batch_size - 1).min(chapters_count);
        batches.push(first..=last);
        first = last + 1;
    }

    batches
}

/// Builds the passage search term for one batch
///
/// Single-chapter batches use the plain `"<Book> <n>"` form.
pub fn passage_query(book: &str, batch: &RangeInclusive<u32>) -> String {
    if batch.start() == batch.end() {
        format!("{} {}", book, batch.start())
    } else {
        format!("{} {}-{}", book, batch.start(), batch.end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batches_cover_every_chapter_once() {
        assert_eq!(chapter_batches(45, 20), vec![1..=20, 21..=40, 41..=45]);
        assert_eq!(chapter_batches(40, 20), vec![1..=20, 21..=40]);
        assert_eq!(chapter_batches(3, 20), vec![1..=3]);
    }

    #[test]
    fn test_single_chapter_book() {
        let batches = chapter_batches(1, 20);
        assert_eq!(batches, vec![1..=1]);
        assert_eq!(passage_query("Jude", &batches[0]), "Jude 1");
    }

    #[test]
    fn test_edge_sizes() {
        assert!(chapter_batches(0, 20).is_empty());
        assert_eq!(chapter_batches(3, 0), vec![1..=1, 2..=2, 3..=3]);
    }

    #[test]
    fn test_passage_query_range() {
        assert_eq!(passage_query("1 Kings", &(21..=22)), "1 Kings 21-22");
    }
}
