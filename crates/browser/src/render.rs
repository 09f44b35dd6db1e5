//! HTML fragments for the listing pages.
//!
//! Each entry renders as `\n<p><a href="HREF">TEXT</a></p>`; there is no
//! enclosing document.

use std::fmt::Write;

/// Link list under construction.
///
/// Built in a request-local buffer; a listing that fails midway is dropped
/// rather than sent.
#[derive(Debug, Default)]
pub struct Listing {
    html: String,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a link to `href` labelled `text`. Both are HTML-escaped here;
    /// `href` is expected to be percent-encoded already.
    pub fn push_link(&mut self, href: &str, text: &str) {
        // Writing into a String cannot fail.
        let _ = write!(
            self.html,
            "\n<p><a href=\"{}\">{}</a></p>",
            escape_html(href),
            escape_html(text)
        );
    }

    pub fn finish(self) -> String {
        self.html
    }
}

/// `<mount>/<segment>/...` with every segment percent-encoded.
pub fn href(mount: &str, segments: &[&str]) -> String {
    let mut out = mount.to_string();
    for segment in segments {
        out.push('/');
        out.push_str(&urlencoding::encode(segment));
    }
    out
}

/// Store directory: one link per registered name.
pub fn store_list<S: AsRef<str>>(mount: &str, names: &[S]) -> String {
    let mut listing = Listing::new();
    for name in names {
        let name = name.as_ref();
        listing.push_link(&href(mount, &[name]), name);
    }
    listing.finish()
}

/// Key directory of `store`, one link per key in iteration order.
///
/// Stops at the first iteration error and drops the partial page.
pub fn key_list<E>(
    mount: &str,
    store: &str,
    keys: impl IntoIterator<Item = Result<Vec<u8>, E>>,
) -> Result<String, E> {
    let mut listing = Listing::new();
    for key in keys {
        let key = key?;
        let key = String::from_utf8_lossy(&key);
        listing.push_link(&href(mount, &[store, key.as_ref()]), &key);
    }
    Ok(listing.finish())
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
