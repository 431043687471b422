const USER_AGENT: &str = "Orbiter/0.1 (Warframe companion overlay)";

lazy_static::lazy_static! {
    static ref CLIENT: reqwest::Client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .expect("failed to build HTTP client");
}

/// Shared client for all upstream calls. Some of the APIs (warframe.market,
/// the wiki) reject requests without a User-Agent. Timeouts and retries are
/// left to the client's defaults.
pub fn client() -> &'static reqwest::Client {
    &CLIENT
}
