//! Verse paginator for lyrics text
//!
//! Lyrics are stored as one string with verses separated by a blank line.
//! A page is `page_size` consecutive verses; pages are 1-indexed.

/// Return the text of one page of verses.
///
/// The text is scanned once. A verse counter increments on the second of
/// two consecutive `\n` characters, and a character is emitted while the
/// counter lies in `[page_size * (page - 1), page_size * page)`. Boundary
/// detection looks one character ahead, so the final character of the text
/// is never examined and never emitted.
///
/// An empty string means the page lies past the last verse; deciding
/// whether that is an error is up to the caller.
pub fn page_of_verses(text: &str, page_size: usize, page: usize) -> String {
    let start = page_size.saturating_mul(page.saturating_sub(1));
    let end = page_size.saturating_mul(page);

    let mut verse = 0usize;
    let mut result = String::new();
    let mut chars = text.chars().peekable();

    while let Some(current) = chars.next() {
        let Some(&next) = chars.peek() else {
            break;
        };
        if verse >= end {
            break;
        }
        if verse >= start {
            result.push(current);
        }
        if current == '\n' && next == '\n' {
            verse += 1;
        }
    }

    result
}
