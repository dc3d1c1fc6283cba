//! Working-state adapter
//!
//! The engine never talks to a concrete catalog service. It consumes the
//! `RemoteList` capability: read the current ordered list, replace it with a
//! new ordered list, resolve a url to a list id, create a list. Catalogs
//! paginate; the engine drains pages through `fetch_page` and stays
//! synchronous inside.
//!
//! `FileCatalog` is the implementation shipped with the crate: a list is a
//! JSON file holding an ordered array of items. It backs local use and the
//! test suite; network catalogs implement the same trait out of tree,
//! together with whatever credentials they need.

use crate::artifacts::core::EngineError;
use crate::artifacts::objects::blob::Item;
use rand;
use std::path::{Path, PathBuf};

/// Items served per page
pub const PAGE_SIZE: usize = 100;

/// One page of a paginated fetch
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub next_offset: Option<usize>,
}

/// Capabilities the engine needs from the external catalog
pub trait RemoteList {
    /// Fetch one page of the list, starting at `offset`
    fn fetch_page(&self, list_id: &str, offset: usize) -> anyhow::Result<ItemPage>;

    /// Replace the list with the given identifiers, in order
    fn replace_items(&self, list_id: &str, uris: &[String]) -> anyhow::Result<()>;

    /// Turn a user-supplied url into a list id
    fn resolve_url(&self, url: &str) -> anyhow::Result<String>;

    /// Create a new empty list, returning its id
    fn create_list(&self, name: &str) -> anyhow::Result<String>;

    /// Drain all pages into one ordered list
    fn fetch_items(&self, list_id: &str) -> anyhow::Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut offset = Some(0);

        while let Some(current) = offset {
            let page = self.fetch_page(list_id, current)?;
            items.extend(page.items);
            offset = page.next_offset;
        }

        Ok(items)
    }
}

/// JSON-file-backed catalog
///
/// The list id is the path of a file containing a JSON array of items.
/// Accepts `file:` urls and bare paths.
#[derive(Debug, Default)]
pub struct FileCatalog;

impl FileCatalog {
    pub fn new() -> Self {
        FileCatalog
    }

    fn read_list(&self, list_id: &str) -> anyhow::Result<Vec<Item>> {
        let content = std::fs::read_to_string(list_id).map_err(|source| {
            EngineError::remote(format!("cannot read catalog {}: {}", list_id, source))
        })?;

        serde_json::from_str(&content).map_err(|source| {
            EngineError::remote(format!("catalog {} is not valid JSON: {}", list_id, source))
        })
    }

    fn write_list(&self, list_id: &str, items: &[Item]) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(items)
            .map_err(|source| EngineError::remote(format!("cannot encode catalog: {}", source)))?;

        let path = PathBuf::from(list_id);
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let temp_path = parent.join(format!("tmp-catalog-{}", rand::random::<u32>()));

        std::fs::write(&temp_path, content).map_err(|source| {
            EngineError::remote(format!("cannot write catalog {}: {}", list_id, source))
        })?;
        std::fs::rename(&temp_path, &path).map_err(|source| {
            EngineError::remote(format!("cannot update catalog {}: {}", list_id, source))
        })?;

        Ok(())
    }
}

impl RemoteList for FileCatalog {
    fn fetch_page(&self, list_id: &str, offset: usize) -> anyhow::Result<ItemPage> {
        let all = self.read_list(list_id)?;

        let end = (offset + PAGE_SIZE).min(all.len());
        let items = all
            .get(offset..end)
            .map(|slice| slice.to_vec())
            .unwrap_or_default();
        let next_offset = (end < all.len()).then_some(end);

        Ok(ItemPage { items, next_offset })
    }

    fn replace_items(&self, list_id: &str, uris: &[String]) -> anyhow::Result<()> {
        // Keep the metadata of identifiers the catalog already knows;
        // stub out anything new with its bare identifier.
        let known = self.read_list(list_id).unwrap_or_default();

        let items: Vec<Item> = uris
            .iter()
            .map(|uri| {
                known
                    .iter()
                    .find(|item| &item.uri == uri)
                    .cloned()
                    .unwrap_or_else(|| {
                        Item::new(uri.clone(), uri.clone(), String::new(), String::new(), 0)
                    })
            })
            .collect();

        self.write_list(list_id, &items)
    }

    fn resolve_url(&self, url: &str) -> anyhow::Result<String> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.is_empty() {
            return Err(EngineError::remote(format!("cannot resolve url: {:?}", url)));
        }

        Ok(path.to_string())
    }

    fn create_list(&self, name: &str) -> anyhow::Result<String> {
        let path = PathBuf::from(format!("{name}.json"));
        if path.exists() {
            return Err(EngineError::remote(format!(
                "catalog {} already exists",
                path.display()
            )));
        }

        self.write_list(&path.to_string_lossy(), &[])?;
        Ok(path.to_string_lossy().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn item(uri: &str) -> Item {
        Item::new(
            uri.to_string(),
            format!("name of {uri}"),
            "Artist".into(),
            "Album".into(),
            180_000,
        )
    }

    fn write_catalog(dir: &TempDir, items: &[Item]) -> String {
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, serde_json::to_string(items).unwrap()).unwrap();
        path.to_string_lossy().to_string()
    }

    #[fixture]
    fn dir() -> TempDir {
        TempDir::new().unwrap()
    }

    #[rstest]
    fn fetch_items_preserves_order(dir: TempDir) {
        let list_id = write_catalog(&dir, &[item("uri:b"), item("uri:a")]);
        let items = FileCatalog::new().fetch_items(&list_id).unwrap();
        let uris: Vec<&str> = items.iter().map(|item| item.uri.as_str()).collect();
        assert_eq!(uris, vec!["uri:b", "uri:a"]);
    }

    #[rstest]
    fn fetching_paginates_past_the_page_size(dir: TempDir) {
        let many: Vec<Item> = (0..PAGE_SIZE + 3).map(|i| item(&format!("uri:{i}"))).collect();
        let list_id = write_catalog(&dir, &many);
        let catalog = FileCatalog::new();

        let first = catalog.fetch_page(&list_id, 0).unwrap();
        assert_eq!(first.items.len(), PAGE_SIZE);
        assert_eq!(first.next_offset, Some(PAGE_SIZE));

        let rest = catalog.fetch_page(&list_id, PAGE_SIZE).unwrap();
        assert_eq!(rest.items.len(), 3);
        assert_eq!(rest.next_offset, None);

        assert_eq!(catalog.fetch_items(&list_id).unwrap().len(), PAGE_SIZE + 3);
    }

    #[rstest]
    fn replace_keeps_known_metadata_and_order(dir: TempDir) {
        let list_id = write_catalog(&dir, &[item("uri:a"), item("uri:b")]);
        let catalog = FileCatalog::new();

        catalog
            .replace_items(&list_id, &["uri:b".into(), "uri:new".into()])
            .unwrap();

        let items = catalog.fetch_items(&list_id).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].uri, "uri:b");
        assert_eq!(items[0].name, "name of uri:b");
        assert_eq!(items[1].uri, "uri:new");
        assert_eq!(items[1].name, "uri:new", "unknown identifiers are stubbed");
    }

    #[rstest]
    fn missing_catalogs_surface_as_remote_errors(dir: TempDir) {
        let missing = dir.path().join("nope.json");
        let err = FileCatalog::new()
            .fetch_items(&missing.to_string_lossy())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<EngineError>(),
            Some(EngineError::Remote(_))
        ));
    }

    #[test]
    fn urls_resolve_by_stripping_the_scheme() {
        let catalog = FileCatalog::new();
        assert_eq!(catalog.resolve_url("file:///tmp/list.json").unwrap(), "/tmp/list.json");
        assert_eq!(catalog.resolve_url("/tmp/list.json").unwrap(), "/tmp/list.json");
        assert!(catalog.resolve_url("").is_err());
    }
}
