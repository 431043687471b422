use regex::Regex;
use serde::Serialize;
use serde_json::Value;

const MARKET_BASE_URL: &str = "https://api.warframe.market/v1";
const ITEMS_SEARCH_URL: &str = "https://api.warframestat.us/items/search";
const WIKI_API_URL: &str = "https://warframe.fandom.com/api.php";

const MAX_DROP_LINES: usize = 5;
const MIN_SUMMARY_CHARS: usize = 50;
const MAX_SUMMARY_CHARS: usize = 800;
const NO_DROPS_TEXT: &str = "Drops not listed in API. Check Wiki/Market/Dojo.";

lazy_static::lazy_static! {
    static ref PARAGRAPH_RE: Regex =
        Regex::new(r"(?s)<p[^>]*>(.*?)</p>").expect("paragraph regex");
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").expect("tag regex");
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").expect("whitespace regex");
}

#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResultPayload {
    pub name: String,
    pub price: String,
    pub drops: String,
    pub wiki: String,
}

/// Runs the full lookup pipeline for a user search: market price first
/// (it may resolve the query to a prime variant), then drop locations and
/// the wiki summary for the resolved name. Async command, so none of this
/// ever blocks the webview.
#[tauri::command]
pub async fn search_item(query: String) -> Result<SearchResultPayload, String> {
    let query = query.trim().to_string();
    if query.is_empty() {
        return Err("Search query is required".to_string());
    }

    let client = crate::http::client();
    let (price, resolved_name) = market_item_price(client, &query).await;
    let drops = drop_locations(client, &resolved_name).await;
    let wiki = wiki_summary(client, &resolved_name).await;

    Ok(SearchResultPayload {
        name: resolved_name,
        price,
        drops,
        wiki,
    })
}

/// Lowest in-game sell price on warframe.market. Tradeable items usually
/// live under `<slug>` or `<slug>_set`; a non-prime query falls back to its
/// prime set. Returns the price line plus the resolved display name.
pub async fn market_item_price(client: &reqwest::Client, item_name: &str) -> (String, String) {
    let slug = market_slug(item_name);

    if let Some(price) = fetch_lowest_price(client, &slug).await {
        return (price, item_name.to_string());
    }
    if let Some(price) = fetch_lowest_price(client, &format!("{slug}_set")).await {
        return (price, item_name.to_string());
    }
    if !slug.contains("prime") {
        if let Some(price) = fetch_lowest_price(client, &format!("{slug}_prime_set")).await {
            return (format!("{price} (Prime Set)"), format!("{item_name} Prime"));
        }
    }

    (
        "Market Price: Item not tradeable or not found.".to_string(),
        item_name.to_string(),
    )
}

async fn fetch_lowest_price(client: &reqwest::Client, url_key: &str) -> Option<String> {
    let url = format!("{MARKET_BASE_URL}/items/{url_key}/orders");
    let response = client.get(&url).send().await.ok()?;
    if !response.status().is_success() {
        // 404 just means "try the next slug candidate".
        return None;
    }
    let payload = response.json::<Value>().await.ok()?;
    Some(render_market_price(&payload))
}

fn render_market_price(payload: &Value) -> String {
    match lowest_online_sell_price(payload) {
        Some(platinum) => format!("Market Price: {platinum}p (Lowest Online)"),
        None => "Market Price: No players in-game.".to_string(),
    }
}

fn lowest_online_sell_price(payload: &Value) -> Option<i64> {
    payload
        .get("payload")?
        .get("orders")?
        .as_array()?
        .iter()
        .filter(|order| order.get("order_type").and_then(Value::as_str) == Some("sell"))
        .filter(|order| {
            order
                .get("user")
                .and_then(|user| user.get("status"))
                .and_then(Value::as_str)
                == Some("ingame")
        })
        .filter_map(|order| order.get("platinum").and_then(Value::as_i64))
        .min()
}

/// warframe.market URL key: lowercase, spaces to underscores, apostrophes
/// stripped ("Mesa's Waltz" -> "mesas_waltz").
pub fn market_slug(item_name: &str) -> String {
    item_name
        .trim()
        .to_lowercase()
        .replace(' ', "_")
        .replace('\'', "")
}

/// Top drop locations from the warframestat items API, sorted by chance.
pub async fn drop_locations(client: &reqwest::Client, item_name: &str) -> String {
    let url = format!("{ITEMS_SEARCH_URL}/{}", item_name.to_lowercase());
    let Ok(response) = client.get(&url).send().await else {
        return NO_DROPS_TEXT.to_string();
    };
    if !response.status().is_success() {
        return NO_DROPS_TEXT.to_string();
    }
    let Ok(results) = response.json::<Value>().await else {
        return NO_DROPS_TEXT.to_string();
    };

    select_item(&results, item_name)
        .and_then(render_drops)
        .unwrap_or_else(|| NO_DROPS_TEXT.to_string())
}

/// Exact name match preferred, else the first search result.
fn select_item<'a>(results: &'a Value, item_name: &str) -> Option<&'a Value> {
    let list = results.as_array()?;
    let lowered = item_name.to_lowercase();
    list.iter()
        .find(|item| {
            item.get("name")
                .and_then(Value::as_str)
                .map(|name| name.to_lowercase() == lowered)
                .unwrap_or(false)
        })
        .or_else(|| list.first())
}

fn render_drops(item: &Value) -> Option<String> {
    let drops = item.get("drops")?.as_array()?;
    if drops.is_empty() {
        return None;
    }

    let mut sorted: Vec<&Value> = drops.iter().collect();
    sorted.sort_by(|a, b| {
        drop_chance(b)
            .partial_cmp(&drop_chance(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut block = String::from("Drops From:");
    for drop in sorted.iter().take(MAX_DROP_LINES) {
        let location = drop
            .get("location")
            .and_then(Value::as_str)
            .unwrap_or("Unknown");
        let rarity = drop.get("rarity").and_then(Value::as_str).unwrap_or("");
        let chance = drop_chance(drop) * 100.0;
        block.push_str(&format!("\n- {location} ({rarity}, {chance:.1}%)"));
    }
    Some(block)
}

fn drop_chance(drop: &Value) -> f64 {
    drop.get("chance").and_then(Value::as_f64).unwrap_or(0.0)
}

/// First real paragraph of the wiki page's intro section, via the Fandom
/// parse API. The returned HTML gets a deliberately crude regex tag strip;
/// anything structural about the page is not this module's problem.
pub async fn wiki_summary(client: &reqwest::Client, item_name: &str) -> String {
    let title = crate::builds::title_case(item_name).replace(' ', "_");
    let url = format!(
        "{WIKI_API_URL}?action=parse&page={title}&prop=text&format=json&section=0&redirects=1"
    );

    let Ok(response) = client.get(&url).send().await else {
        return "Wiki search failed.".to_string();
    };
    let Ok(data) = response.json::<Value>().await else {
        return "Wiki search failed.".to_string();
    };

    if let Some(info) = data
        .get("error")
        .and_then(|error| error.get("info"))
        .and_then(Value::as_str)
    {
        return format!("Wiki: {info}");
    }

    let html = data
        .get("parse")
        .and_then(|parse| parse.get("text"))
        .and_then(|text| text.get("*"))
        .and_then(Value::as_str)
        .unwrap_or("");

    match first_paragraph(html) {
        Some(text) => format!("Wiki: {text}"),
        None => "Wiki: No summary content found.".to_string(),
    }
}

/// Extracts the first `<p>` whose stripped text is long enough to be a real
/// summary (skips infobox stubs and update notes), truncated to a display
/// budget.
pub fn first_paragraph(html: &str) -> Option<String> {
    for capture in PARAGRAPH_RE.captures_iter(html) {
        // Tags are replaced by spaces so adjacent elements don't merge into
        // one word, then runs of whitespace collapse.
        let without_tags = TAG_RE.replace_all(&capture[1], " ");
        let text = WHITESPACE_RE
            .replace_all(without_tags.trim(), " ")
            .to_string();

        if text.chars().count() > MIN_SUMMARY_CHARS && !text.contains("Update") {
            if text.chars().count() > MAX_SUMMARY_CHARS {
                let truncated: String = text.chars().take(MAX_SUMMARY_CHARS).collect();
                return Some(format!("{truncated}..."));
            }
            return Some(text);
        }
    }
    None
}
