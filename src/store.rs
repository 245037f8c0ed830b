//! Page store: the ordered result of a crawl
//!
//! Records are appended by the coordinator in completion order and never
//! modified afterwards. Exporters read them through [`PageStore::by_depth`].

use serde::Serialize;
use std::collections::BTreeMap;

/// The result of successfully fetching and extracting one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    /// Normalized URL of the page
    pub url: String,

    /// Page title, `"Untitled"` if none was found
    pub title: String,

    /// Main content text; empty unless content extraction is enabled
    pub content: String,

    /// Distance from the seed page (seed is 0)
    pub depth: u32,

    /// URL of the page this one was discovered on; a lookup key only
    pub parent_url: Option<String>,

    /// In-scope normalized links found on the page, in discovery order
    pub child_urls: Vec<String>,
}

/// Append-only collection of page records
#[derive(Debug, Clone, Default)]
pub struct PageStore {
    records: Vec<PageRecord>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion (completion) order
    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageRecord> {
        self.records.iter()
    }

    /// Looks up a record by its normalized URL
    pub fn get(&self, url: &str) -> Option<&PageRecord> {
        self.records.iter().find(|r| r.url == url)
    }

    /// Deepest level that produced a record
    pub fn max_depth(&self) -> Option<u32> {
        self.records.iter().map(|r| r.depth).max()
    }

    /// Groups records by depth, ascending, with each group sorted by URL
    ///
    /// This is the view the exporters rely on.
    pub fn by_depth(&self) -> BTreeMap<u32, Vec<&PageRecord>> {
        let mut groups: BTreeMap<u32, Vec<&PageRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.depth).or_default().push(record);
        }
        for group in groups.values_mut() {
            group.sort_by(|a, b| a.url.cmp(&b.url));
        }
        groups
    }

    pub fn into_records(self) -> Vec<PageRecord> {
        self.records
    }
}

impl<'a> IntoIterator for &'a PageStore {
    type Item = &'a PageRecord;
    type IntoIter = std::slice::Iter<'a, PageRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
