use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tauri::{AppHandle, Manager};

pub const OVERFRAME_BASE_URL: &str = "https://overframe.gg";
const SITEMAP_URL: &str = "https://overframe.gg/sitemap.xml";
const CACHE_FILE_NAME: &str = "overframe_cache.json";

lazy_static::lazy_static! {
    static ref ITEM_CACHE: RwLock<HashMap<String, BuildCacheEntry>> =
        RwLock::new(HashMap::new());
    static ref ARSENAL_ITEM_RE: Regex =
        Regex::new(r"https://overframe\.gg/items/arsenal/(\d+)/([\w-]+)/")
            .expect("arsenal item regex");
    static ref BUILD_LINK_RE: Regex =
        Regex::new(r#"href="(/build/[^"]+)""#).expect("build link regex");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildCacheEntry {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildLookupPayload {
    pub url: String,
    /// False when the item was not in the cache and `url` is only a search
    /// page, not a concrete build.
    pub matched: bool,
}

/// Resolves the top-rated community build for an item: cache lookup, fetch
/// the item page, take the first build link. Unknown items fall back to the
/// overframe search page so the frontend always has something to load.
#[tauri::command]
pub async fn lookup_build(query: String) -> Result<BuildLookupPayload, String> {
    let query = query.trim();
    if query.is_empty() {
        return Err("Item name is required".to_string());
    }

    let Some(item_url) = item_url(query) else {
        return Ok(BuildLookupPayload {
            url: search_url(query),
            matched: false,
        });
    };

    match top_build_url(crate::http::client(), &item_url).await {
        Some(url) => Ok(BuildLookupPayload { url, matched: true }),
        // Item page exists but lists no builds yet; the page itself is
        // still the most useful thing to show.
        None => Ok(BuildLookupPayload {
            url: item_url,
            matched: true,
        }),
    }
}

/// Rebuilds the item cache from the overframe sitemap and persists it.
#[tauri::command]
pub async fn update_build_cache(app_handle: AppHandle) -> Result<usize, String> {
    let response = crate::http::client()
        .get(SITEMAP_URL)
        .send()
        .await
        .map_err(|error| error.to_string())?
        .error_for_status()
        .map_err(|error| error.to_string())?;
    let content = response.text().await.map_err(|error| error.to_string())?;

    let parsed = parse_sitemap(&content);
    if parsed.is_empty() {
        return Err("No arsenal items found in sitemap".to_string());
    }
    let count = parsed.len();

    if let Some(path) = cache_path(&app_handle) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| error.to_string())?;
        }
        let text = serde_json::to_string_pretty(&parsed).map_err(|error| error.to_string())?;
        std::fs::write(&path, text).map_err(|error| error.to_string())?;
    }

    let mut cache = ITEM_CACHE.write().map_err(|error| error.to_string())?;
    *cache = parsed;
    tracing::info!(items = count, "Updated overframe item cache");

    Ok(count)
}

/// Loads the persisted item cache, if any. Missing or corrupt files just
/// leave the cache empty until the next `update_build_cache`.
pub fn load_cache_from_disk(app_handle: &AppHandle) {
    let Some(path) = cache_path(app_handle) else {
        return;
    };
    let Ok(text) = std::fs::read_to_string(&path) else {
        return;
    };
    let Ok(parsed) = serde_json::from_str::<HashMap<String, BuildCacheEntry>>(&text) else {
        tracing::warn!(path = %path.display(), "Failed to load overframe cache");
        return;
    };

    let count = parsed.len();
    if let Ok(mut cache) = ITEM_CACHE.write() {
        *cache = parsed;
        tracing::info!(items = count, "Loaded overframe item cache");
    }
}

/// Exact lowercase key match first, then substring fuzzy match in either
/// direction ("volt" finds "volt prime" and vice versa).
pub fn item_url(item_name: &str) -> Option<String> {
    let key = item_name.trim().to_lowercase();
    let cache = ITEM_CACHE.read().ok()?;

    if let Some(entry) = cache.get(&key) {
        return Some(entry.url.clone());
    }
    cache
        .iter()
        .find(|(name, _)| name.contains(&key) || key.contains(name.as_str()))
        .map(|(_, entry)| entry.url.clone())
}

async fn top_build_url(client: &reqwest::Client, item_url: &str) -> Option<String> {
    let response = client.get(item_url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    let html = response.text().await.ok()?;
    extract_top_build_path(&html).map(|path| format!("{OVERFRAME_BASE_URL}{path}"))
}

/// First build link on an item page. The page lists builds sorted by rating
/// by default, so the first one is the top build; `/build/new/` is the
/// editor, not a build.
pub fn extract_top_build_path(html: &str) -> Option<String> {
    BUILD_LINK_RE
        .captures_iter(html)
        .map(|capture| capture[1].to_string())
        .find(|path| !path.contains("/new/"))
}

/// Sitemap URLs -> cache entries keyed by lowercase display name
/// ("volt-prime" -> "Volt Prime" under key "volt prime").
pub fn parse_sitemap(content: &str) -> HashMap<String, BuildCacheEntry> {
    let mut cache = HashMap::new();
    for capture in ARSENAL_ITEM_RE.captures_iter(content) {
        let id = capture[1].to_string();
        let slug = capture[2].to_string();
        let name = title_case(&slug.replace('-', " "));
        let url = format!("{OVERFRAME_BASE_URL}/items/arsenal/{id}/{slug}/");

        cache.insert(name.to_lowercase(), BuildCacheEntry { id, slug, name, url });
    }
    cache
}

fn cache_path(app_handle: &AppHandle) -> Option<PathBuf> {
    app_handle
        .path()
        .app_data_dir()
        .ok()
        .map(|dir| dir.join(CACHE_FILE_NAME))
}

fn search_url(query: &str) -> String {
    format!("{OVERFRAME_BASE_URL}/items/search?q={}", query.replace(' ', "%20"))
}

/// Uppercases the first letter of every whitespace-separated word and
/// lowercases the rest.
pub fn title_case(value: &str) -> String {
    value
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_arsenal_items_from_sitemap() {
        let content = concat!(
            "<urlset>",
            "<url><loc>https://overframe.gg/items/arsenal/60/volt/</loc></url>",
            "<url><loc>https://overframe.gg/items/arsenal/61/volt-prime/</loc></url>",
            "<url><loc>https://overframe.gg/builds/popular/</loc></url>",
            "</urlset>"
        );

        let cache = parse_sitemap(content);
        assert_eq!(cache.len(), 2);

        let volt_prime = cache.get("volt prime").unwrap();
        assert_eq!(volt_prime.name, "Volt Prime");
        assert_eq!(volt_prime.slug, "volt-prime");
        assert_eq!(
            volt_prime.url,
            "https://overframe.gg/items/arsenal/61/volt-prime/"
        );
    }

    #[test]
    fn first_build_link_wins_but_editor_links_are_skipped() {
        let html = concat!(
            "<a href=\"/build/new/61/volt-prime/\">New build</a>",
            "<a href=\"/build/123456/my-volt/\">Top build</a>",
            "<a href=\"/build/999999/other/\">Other</a>"
        );

        assert_eq!(
            extract_top_build_path(html),
            Some("/build/123456/my-volt/".to_string())
        );
    }

    #[test]
    fn no_build_links_yields_none() {
        assert_eq!(extract_top_build_path("<a href=\"/items/arsenal/60/volt/\">x</a>"), None);
    }

    #[test]
    fn title_case_normalizes_slug_words() {
        assert_eq!(title_case("volt prime"), "Volt Prime");
        assert_eq!(title_case("DUAL toxocyst"), "Dual Toxocyst");
    }

    #[test]
    fn search_url_encodes_spaces() {
        assert_eq!(
            search_url("volt prime"),
            "https://overframe.gg/items/search?q=volt%20prime"
        );
    }
}
