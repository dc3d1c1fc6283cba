use std::path::{Path, PathBuf};

/// Catalog item JSON in canonical field order
pub fn item(uri: &str, name: &str, artist: &str) -> serde_json::Value {
    serde_json::json!({
        "album": "Test Album",
        "artist": artist,
        "duration_ms": 180_000,
        "name": name,
        "uri": uri
    })
}

/// Shorthand: `track("A")` becomes uri `uri:A`, name `Song A`
pub fn track(id: &str) -> serde_json::Value {
    item(&format!("uri:{id}"), &format!("Song {id}"), "Test Artist")
}

/// Write (or rewrite) the catalog file backing the fake remote
pub fn write_catalog(path: &Path, items: &[serde_json::Value]) {
    std::fs::write(path, serde_json::to_string_pretty(items).unwrap())
        .expect("failed to write catalog");
}

/// Identifiers currently in the catalog file, in order
pub fn catalog_uris(path: &Path) -> Vec<String> {
    let content = std::fs::read_to_string(path).expect("failed to read catalog");
    let items: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
    items
        .iter()
        .map(|item| item["uri"].as_str().unwrap().to_string())
        .collect()
}

/// Default catalog path inside a scenario directory
pub fn catalog_path(dir: &Path) -> PathBuf {
    dir.join("catalog.json")
}
