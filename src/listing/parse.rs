// src/listing/parse.rs
// =============================================================================
// Turns an autoindex HTML page into a list of entries.
//
// nginx and Apache both render one <a href="..."> per child:
//   <a href="../">../</a>
//   <a href="subdir/">subdir/</a>
//   <a href="file.fits">file.fits</a>
//
// A trailing '/' marks a directory. nginx prefixes names containing ':'
// with "./" (<a href="./obs:1.fits">), which still names a direct child.
// Anything that is not a direct child of the listing (the parent link,
// Apache's "?C=N;O=D" sort links, absolute paths, other sites) is dropped
// here so the walker never sees it.
//
// We use the `scraper` crate to parse HTML and select <a href> elements.
// =============================================================================

use scraper::{Html, Selector};

/// The parent-directory link every autoindex page starts with
pub const PARENT_DIR: &str = "../";

/// One child of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Relative href of the child, e.g. "data/" or "a.fits", without the
    /// "./" some servers put in front of it
    pub name: String,
    /// True when the href ends with '/'
    pub is_directory: bool,
}

impl Entry {
    /// Builds an entry from an href, or None when the href does not name a
    /// direct child of the listing.
    pub fn from_href(href: &str) -> Option<Self> {
        let href = href.trim();

        if href == PARENT_DIR || !is_child_href(href) {
            return None;
        }

        let name = href.strip_prefix("./").unwrap_or(href);
        Some(Entry {
            name: name.to_string(),
            is_directory: href.ends_with('/'),
        })
    }

    /// Name of the local file or folder (trailing '/' stripped).
    pub fn local_name(&self) -> &str {
        self.name.strip_suffix('/').unwrap_or(&self.name)
    }
}

/// Extracts the entries of a listing page in document order.
///
/// Example:
///   <a href="../">..</a><a href="a/">a/</a><a href="f.txt">f.txt</a>
///   -> [Entry { "a/", dir }, Entry { "f.txt", file }]
pub fn parse_listing(html: &str) -> Vec<Entry> {
    let document = Html::parse_document(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(Entry::from_href)
        .collect()
}

// Schemes that mark an href as a link to somewhere else entirely
const FOREIGN_SCHEMES: &[&str] = &["http", "https", "ftp", "mailto", "javascript", "data", "tel"];

// Returns true for hrefs like "name", "name/" or "./name:x"
fn is_child_href(href: &str) -> bool {
    if href.is_empty() || href.starts_with(['?', '#', '/']) {
        return false;
    }

    // "obs:1.fits" is a file name, "mailto:x@y" and "http://..." are not
    if href.contains("//") || has_foreign_scheme(href) {
        return false;
    }

    let name = child_name(href);
    !(name.is_empty() || name == "." || name == ".." || name.contains('/'))
}

fn has_foreign_scheme(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => FOREIGN_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()),
        None => false,
    }
}

// nginx writes names containing ':' as "./name:x" so browsers don't read
// them as a scheme; the child itself is "name:x"
fn child_name(href: &str) -> &str {
    let href = href.strip_prefix("./").unwrap_or(href);
    href.strip_suffix('/').unwrap_or(href)
}
