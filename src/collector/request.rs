//! Page request construction
//!
//! Target addresses follow a fixed template keyed by listing identifier and
//! page number. The storefront region is pinned to the US store.

use url::Url;

/// Review listing endpoint of the storefront
pub const DEFAULT_ENDPOINT: &str =
    "https://itunes.apple.com/WebObjects/MZStore.woa/wa/viewContentsUserReviews";

/// US storefront marker
pub const STORE_FRONT: &str = "143441-1,29";

/// Timezone offset marker sent with every request (seconds)
pub const TIMEZONE_OFFSET: &str = "3600";

pub const STORE_FRONT_HEADER: &str = "X-Apple-Store-Front";
pub const TIMEZONE_HEADER: &str = "X-Apple-Tz";
pub const USER_AGENT_HEADER: &str = "User-Agent";

/// One page fetch, built right before it is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub source_id: String,
    pub page: u32,
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
}

impl PageRequest {
    pub fn new(endpoint: &Url, source_id: &str, page: u32, user_agent: &str) -> Self {
        Self {
            source_id: source_id.to_string(),
            page,
            url: review_page_url(endpoint, source_id, page),
            headers: vec![
                (USER_AGENT_HEADER, user_agent.to_string()),
                (STORE_FRONT_HEADER, STORE_FRONT.to_string()),
                (TIMEZONE_HEADER, TIMEZONE_OFFSET.to_string()),
            ],
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Builds the address of one review page, sorted most recent first, across all versions
pub fn review_page_url(endpoint: &Url, source_id: &str, page: u32) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("id", source_id)
        .append_pair("pageNumber", &page.to_string())
        .append_pair("sortOrdering", "4")
        .append_pair("onlyLatestVersion", "false")
        .append_pair("type", "Purple Software");
    url
}
