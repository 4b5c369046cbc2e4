//! Resource link map: file extension → ordered `(url, title)` links.

use std::collections::BTreeMap;

use serde::Serialize;

/// URL prefix marking content rendered in memory rather than fetched.
pub const IN_MEMORY_MARKER: &str = "#inmemory#";

/// One downloadable resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub url: String,
    pub title: String,
}

/// Links grouped by extension, in insertion order within each extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LinkMap {
    links: BTreeMap<String, Vec<Link>>,
}

impl LinkMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link under `extension`; exact duplicates are ignored.
    pub fn insert(&mut self, extension: &str, url: impl Into<String>, title: impl Into<String>) {
        let link = Link {
            url: url.into(),
            title: title.into(),
        };
        let entries = self
            .links
            .entry(extension.trim_start_matches('.').to_ascii_lowercase())
            .or_default();
        if !entries.contains(&link) {
            entries.push(link);
        }
    }

    /// Stores rendered HTML under the `html` extension.
    pub fn insert_in_memory_html(&mut self, html: &str, title: impl Into<String>) {
        self.insert("html", format!("{IN_MEMORY_MARKER}{html}"), title);
    }

    /// Merges `other` into `self`, keeping order and dropping duplicates.
    pub fn merge(&mut self, other: LinkMap) {
        for (extension, links) in other.links {
            for link in links {
                self.insert(&extension, link.url, link.title);
            }
        }
    }

    #[must_use]
    pub fn get(&self, extension: &str) -> Option<&[Link]> {
        self.links.get(extension).map(Vec::as_slice)
    }

    /// Iterates extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Link])> {
        self.links
            .iter()
            .map(|(extension, links)| (extension.as_str(), links.as_slice()))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Total number of links across all extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.values().map(Vec::len).sum()
    }
}

/// Returns the lowercase extension of a URL path, ignoring query and fragment.
#[must_use]
pub fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let last = path.rsplit('/').next().unwrap_or(path);
    let (_, extension) = last.rsplit_once('.')?;
    if extension.is_empty() || extension.len() > 8 || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(extension.to_ascii_lowercase())
}
