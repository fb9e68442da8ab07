//! Verse pagination
//!
//! Lyrics are paged by verse (paragraph), never by raw line, so a page
//! boundary never falls inside a verse. Only after a page of verses is
//! selected are its lines flattened into one sequence.

use thiserror::Error;

/// Separator between verses
pub const VERSE_SEPARATOR: &str = "\n\n";

/// A selected page of lyric lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersePage {
    /// Requested page number (1-indexed)
    pub page: usize,
    /// Total number of pages for this text and page size
    pub total_pages: usize,
    /// Lines of the selected verses, verse order preserved
    pub lines: Vec<String>,
}

/// Pagination failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageError {
    #[error("page size must be at least 1")]
    ZeroPageSize,

    /// Includes every page of a text with no verses
    #[error("page {page} is out of range (total pages: {total_pages})")]
    OutOfRange { page: usize, total_pages: usize },
}

/// Split lyrics into verses, each a sequence of lines
///
/// Empty text has no verses. A trailing `'\r'` is dropped from every line.
pub fn split_verses(text: &str) -> Vec<Vec<&str>> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split(VERSE_SEPARATOR)
        .map(|verse| {
            verse
                .split('\n')
                .map(|line| line.strip_suffix('\r').unwrap_or(line))
                .collect()
        })
        .collect()
}

/// Number of pages needed for `total_verses` at `page_size` verses per page
pub fn total_pages(total_verses: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_verses.div_ceil(page_size)
}

/// Select page `page` (1-indexed) of `page_size` verses and flatten its lines
///
/// # Examples
/// ```
/// use songlib_catalog::verses::paginate;
///
/// let text = "line1\n\nline2a\nline2b\n\nline3";
/// let p = paginate(text, 2, 1).unwrap();
/// assert_eq!(p.lines, vec!["line2a", "line2b"]);
/// assert_eq!(p.total_pages, 3);
/// assert!(paginate(text, 4, 1).is_err());
/// ```
pub fn paginate(text: &str, page: usize, page_size: usize) -> Result<VersePage, PageError> {
    if page_size == 0 {
        return Err(PageError::ZeroPageSize);
    }

    let verses = split_verses(text);
    let total_pages = total_pages(verses.len(), page_size);

    if page < 1 || page > total_pages {
        return Err(PageError::OutOfRange { page, total_pages });
    }

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(verses.len());

    let lines = verses[start..end]
        .iter()
        .flat_map(|verse| verse.iter().map(|line| line.to_string()))
        .collect();

    Ok(VersePage {
        page,
        total_pages,
        lines,
    })
}
