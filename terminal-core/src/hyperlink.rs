//! OSC 8 hyperlink registry
//!
//! Cells store a small integer id; the registry maps ids back to targets.
//! Id 0 means "no link". The table is shared with snapshots by `Arc` and
//! only copied when a new link is registered while a snapshot holds it.

use std::collections::HashMap;
use std::sync::Arc;

/// Link targets indexed by `id - 1`.
pub type HyperlinkTable = Arc<Vec<Arc<str>>>;

#[derive(Debug, Clone, Default)]
pub struct HyperlinkRegistry {
    urls: HyperlinkTable,
    /// (OSC 8 `id=` parameter, uri) -> link id
    index: HashMap<(Option<String>, String), u32>,
}

impl HyperlinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for this link, reusing an existing one when the same target was
    /// opened before with the same `id=` parameter.
    pub fn register(&mut self, id: Option<&str>, uri: &str) -> u32 {
        let key = (id.map(str::to_owned), uri.to_owned());
        if let Some(&existing) = self.index.get(&key) {
            return existing;
        }
        let urls = Arc::make_mut(&mut self.urls);
        urls.push(Arc::from(uri));
        let link_id = urls.len() as u32;
        self.index.insert(key, link_id);
        link_id
    }

    pub fn get(&self, id: u32) -> Option<&str> {
        lookup(&self.urls, id)
    }

    pub fn table(&self) -> HyperlinkTable {
        Arc::clone(&self.urls)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

pub(crate) fn lookup(table: &HyperlinkTable, id: u32) -> Option<&str> {
    let index = (id as usize).checked_sub(1)?;
    table.get(index).map(|url| url.as_ref())
}
