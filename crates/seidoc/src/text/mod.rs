//! Text cleanup applied to every page before entity extraction.

pub mod normalize;

pub use normalize::{clean_text, normalize, normalize_address, repair_encoding};

/// Separator placed between pages of an `ExtractedText`.
pub const PAGE_SEPARATOR: char = '\u{000C}';

/// Join cleaned page texts, skipping pages that produced nothing.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for page in pages {
        let page = page.as_ref();
        if page.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(PAGE_SEPARATOR);
        }
        joined.push_str(page);
    }
    joined
}
