//! Raw product URL cleanup and storefront detection.
//!
//! Normalization strips tracking parameters while keeping affiliate
//! attribution, then identifies the platform, merchant, region and product id
//! from the cleaned URL. Unparseable input yields a degraded record instead of
//! an error.

mod platform;

pub use platform::Platform;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Cleaned URL plus everything detected about the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedUrl {
    pub original: String,
    pub normalized: String,
    pub merchant: String,
    pub platform: Platform,
    pub region: Option<String>,
    pub product_id: Option<String>,
    pub is_product_page: bool,
}

const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "gbraid", "wbraid", "msclkid", "dclid", "yclid", "twclid", "ttclid",
    "igshid", "mc_cid", "mc_eid", "_ga", "_gl", "ref", "ref_", "spm", "si", "srsltid",
    "_encoding", "psc",
];

const TRACKING_PREFIXES: &[&str] = &["utm_", "pd_rd_", "pf_rd_"];

const AFFILIATE_PARAMS: &[&str] = &[
    "tag",
    "awc",
    "irclickid",
    "clickid",
    "aff_id",
    "affid",
    "affiliate_id",
    "ascsubtag",
    "subid",
    "sub_id",
    "cjevent",
    "ranmid",
    "ransiteid",
    "raneaid",
    "sscid",
    "partner_id",
    "campid",
    "mkcid",
    "mkrid",
    "linkcode",
];

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.-]*://").expect("invalid scheme pattern"));

static PRODUCT_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(/(products?|p|dp|item|items|sku|buy)/[^/]+)|(\.html?$)|(-\d{3,}$)|(/\d{5,}$)")
        .expect("invalid product path pattern")
});

static CATEGORY_PATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)/(category|categories|collections?|c|search|s|shop-all|brands?|tags?|blog|pages)(/|$)")
        .expect("invalid category path pattern")
});

/// Affiliate parameters always survive, even when they look like tracking noise.
pub fn is_affiliate_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    AFFILIATE_PARAMS.contains(&key.as_str())
}

pub fn is_tracking_param(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    TRACKING_PARAMS.contains(&key.as_str())
        || TRACKING_PREFIXES
            .iter()
            .any(|prefix| key.starts_with(prefix))
}

fn keep_param(key: &str) -> bool {
    is_affiliate_param(key) || !is_tracking_param(key)
}

/// Normalize a raw product URL. Never fails; see [`NormalizedUrl`].
pub fn normalize_url(raw: &str) -> NormalizedUrl {
    let trimmed = raw.trim();
    let candidate = if SCHEME_RE.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = match Url::parse(&candidate) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => url,
        _ => return degraded(raw),
    };

    url.set_fragment(None);
    strip_tracking_params(&mut url);
    trim_trailing_slash(&mut url);

    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    let path = url.path().to_string();
    let detected = platform::detect(&host, &path);
    let is_product_page = detected
        .platform
        .product_page_rule(&path, detected.product_id.as_deref())
        .unwrap_or_else(|| looks_like_product_path(&path));

    NormalizedUrl {
        original: raw.to_string(),
        normalized: url.to_string(),
        merchant: detected.merchant,
        platform: detected.platform,
        region: detected.region,
        product_id: detected.product_id,
        is_product_page,
    }
}

fn degraded(raw: &str) -> NormalizedUrl {
    NormalizedUrl {
        original: raw.to_string(),
        normalized: raw.trim().to_string(),
        merchant: "unknown".to_string(),
        platform: Platform::Unknown,
        region: None,
        product_id: None,
        is_product_page: false,
    }
}

fn strip_tracking_params(url: &mut Url) {
    if url.query().is_none() {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| keep_param(key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
        return;
    }

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter().map(|(key, value)| (key.as_str(), value.as_str())));
}

fn trim_trailing_slash(url: &mut Url) {
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
        url.set_path(&trimmed);
    }
}

fn looks_like_product_path(path: &str) -> bool {
    let depth = path.split('/').filter(|segment| !segment.is_empty()).count();
    depth >= 2 && PRODUCT_PATH_RE.is_match(path) && !CATEGORY_PATH_RE.is_match(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amazon_marketplace_url_keeps_tag_and_drops_utm() {
        let normalized =
            normalize_url("https://www.amazon.de/dp/B08N5WRWNW?tag=abc-21&utm_source=ig");

        assert_eq!(normalized.platform, Platform::Amazon);
        assert_eq!(normalized.region.as_deref(), Some("DE"));
        assert_eq!(normalized.product_id.as_deref(), Some("B08N5WRWNW"));
        assert!(normalized.is_product_page);
        assert!(normalized.normalized.contains("tag=abc-21"));
        assert!(!normalized.normalized.contains("utm_source"));
        assert_eq!(normalized.merchant, "amazon");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "https://www.amazon.de/dp/B08N5WRWNW?tag=abc-21&utm_source=ig",
            "example.com/shop/products/blue-mug/?color=blue&fbclid=xyz#reviews",
            "HTTP://Store.Example.CO.UK/Collections/Mugs/",
            "https://www.ebay.com/itm/Some-Item/123456789012?mkcid=1&_trkparms=abc",
            "not a url at all",
            "https://shop.test/search?q=hello%20world&gclid=1",
        ];

        for input in inputs {
            let once = normalize_url(input);
            let twice = normalize_url(&once.normalized);
            assert_eq!(once.normalized, twice.normalized, "input: {input}");
        }
    }

    #[test]
    fn affiliate_membership_overrides_tracking_prefixes() {
        assert!(is_tracking_param("utm_campaign"));
        assert!(is_tracking_param("pd_rd_w"));
        assert!(is_affiliate_param("TAG"));

        let normalized = normalize_url("https://brand.example/p/widget?awc=123_456&gclid=zzz");
        assert!(normalized.normalized.contains("awc=123_456"));
        assert!(!normalized.normalized.contains("gclid"));
    }

    #[test]
    fn missing_scheme_defaults_to_https() {
        let normalized = normalize_url("www.walmart.com/ip/Desk-Lamp/55512345");
        assert!(normalized.normalized.starts_with("https://www.walmart.com/ip/"));
        assert_eq!(normalized.platform, Platform::Walmart);
        assert_eq!(normalized.product_id.as_deref(), Some("55512345"));
        assert_eq!(normalized.region.as_deref(), Some("US"));
    }

    #[test]
    fn unparseable_input_degrades_instead_of_failing() {
        let normalized = normalize_url("http://");
        assert_eq!(normalized.platform, Platform::Unknown);
        assert!(!normalized.is_product_page);
        assert_eq!(normalized.merchant, "unknown");
    }

    #[test]
    fn generic_rule_rejects_category_and_shallow_paths() {
        assert!(normalize_url("https://outdoor.example/products/trail-pack").is_product_page);
        assert!(!normalize_url("https://outdoor.example/category/packs").is_product_page);
        assert!(!normalize_url("https://outdoor.example/packs").is_product_page);
        assert!(normalize_url("https://outdoor.example/packs/trail-pack-20431").is_product_page);
    }

    #[test]
    fn fragment_and_trailing_slash_are_removed() {
        let normalized = normalize_url("https://outdoor.example/products/trail-pack/#specs");
        assert_eq!(
            normalized.normalized,
            "https://outdoor.example/products/trail-pack"
        );
        assert_eq!(normalized.platform, Platform::Independent);
        assert_eq!(normalized.merchant, "outdoor");
    }
}
