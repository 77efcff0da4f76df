use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Storefront family a URL belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Amazon,
    Ebay,
    Walmart,
    Etsy,
    Aliexpress,
    Target,
    BestBuy,
    Shopify,
    Independent,
    Unknown,
}

impl Platform {
    /// Platform-specific product page rule; `None` defers to the generic heuristic.
    pub(crate) fn product_page_rule(self, path: &str, product_id: Option<&str>) -> Option<bool> {
        match self {
            Platform::Amazon | Platform::BestBuy => Some(product_id.is_some()),
            Platform::Ebay => Some(path.contains("/itm/")),
            Platform::Walmart => Some(path.contains("/ip/")),
            Platform::Etsy => Some(path.contains("/listing/")),
            Platform::Aliexpress => Some(path.contains("/item/")),
            Platform::Target => Some(path.contains("/p/") || product_id.is_some()),
            Platform::Shopify => Some(path.contains("/products/")),
            Platform::Independent | Platform::Unknown => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum MerchantRule {
    Fixed(&'static str),
    Subdomain,
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum RegionRule {
    TopLevelDomain,
    Fixed(&'static str),
    Global,
}

pub(crate) struct PlatformPattern {
    host: Regex,
    pub(crate) platform: Platform,
    merchant: MerchantRule,
    region: RegionRule,
    product_id: Option<Regex>,
}

fn pattern(
    host: &str,
    platform: Platform,
    merchant: MerchantRule,
    region: RegionRule,
    product_id: Option<&str>,
) -> PlatformPattern {
    PlatformPattern {
        host: Regex::new(host).expect("invalid platform host pattern"),
        platform,
        merchant,
        region,
        product_id: product_id.map(|re| Regex::new(re).expect("invalid product id pattern")),
    }
}

// Ordered: the first matching host decides the platform.
static PLATFORM_PATTERNS: Lazy<Vec<PlatformPattern>> = Lazy::new(|| {
    vec![
        pattern(
            r"(^|\.)amazon\.(com|ca|com\.mx|com\.br|co\.uk|de|fr|it|es|nl|se|pl|com\.tr|ae|sa|in|co\.jp|com\.au|sg)$",
            Platform::Amazon,
            MerchantRule::Fixed("amazon"),
            RegionRule::TopLevelDomain,
            Some(r"(?i)/(?:dp|gp/product|gp/aw/d|exec/obidos/asin|o/asin)/([a-z0-9]{10})(?:/|$)"),
        ),
        pattern(
            r"^(amzn\.to|amzn\.eu|a\.co)$",
            Platform::Amazon,
            MerchantRule::Fixed("amazon"),
            RegionRule::Global,
            None,
        ),
        pattern(
            r"(^|\.)ebay\.(com|ca|co\.uk|de|fr|it|es|nl|ie|at|ch|com\.au)$",
            Platform::Ebay,
            MerchantRule::Fixed("ebay"),
            RegionRule::TopLevelDomain,
            Some(r"/itm/(?:[^/]+/)?(\d{9,14})(?:/|$)"),
        ),
        pattern(
            r"(^|\.)walmart\.(com|ca)$",
            Platform::Walmart,
            MerchantRule::Fixed("walmart"),
            RegionRule::TopLevelDomain,
            Some(r"/ip/(?:[^/]+/)?(\d+)(?:/|$)"),
        ),
        pattern(
            r"(^|\.)etsy\.com$",
            Platform::Etsy,
            MerchantRule::Fixed("etsy"),
            RegionRule::Global,
            Some(r"/listing/(\d+)"),
        ),
        pattern(
            r"(^|\.)aliexpress\.(com|us|ru)$",
            Platform::Aliexpress,
            MerchantRule::Fixed("aliexpress"),
            RegionRule::Global,
            Some(r"/item/(\d+)\.html"),
        ),
        pattern(
            r"(^|\.)target\.com$",
            Platform::Target,
            MerchantRule::Fixed("target"),
            RegionRule::Fixed("US"),
            Some(r"/A-(\d+)(?:/|$)"),
        ),
        pattern(
            r"(^|\.)bestbuy\.(com|ca)$",
            Platform::BestBuy,
            MerchantRule::Fixed("bestbuy"),
            RegionRule::TopLevelDomain,
            Some(r"/(\d{7})\.p$"),
        ),
        pattern(
            r"^([a-z0-9-]+)\.myshopify\.com$",
            Platform::Shopify,
            MerchantRule::Subdomain,
            RegionRule::Global,
            Some(r"/products/([^/]+)"),
        ),
    ]
});

/// Platform facts extracted from a parsed host and path.
pub(crate) struct PlatformMatch {
    pub(crate) platform: Platform,
    pub(crate) merchant: String,
    pub(crate) region: Option<String>,
    pub(crate) product_id: Option<String>,
}

pub(crate) fn detect(host: &str, path: &str) -> PlatformMatch {
    let Some(pattern) = PLATFORM_PATTERNS
        .iter()
        .find(|pattern| pattern.host.is_match(host))
    else {
        return PlatformMatch {
            platform: Platform::Independent,
            merchant: registrable_name(host),
            region: country_code_region(host),
            product_id: None,
        };
    };

    let merchant = match pattern.merchant {
        MerchantRule::Fixed(name) => name.to_string(),
        MerchantRule::Subdomain => pattern
            .host
            .captures(host)
            .and_then(|captures| captures.get(1))
            .map(|store| store.as_str().to_string())
            .unwrap_or_else(|| registrable_name(host)),
    };

    let region = match pattern.region {
        RegionRule::TopLevelDomain => marketplace_region(host),
        RegionRule::Fixed(code) => Some(code.to_string()),
        RegionRule::Global => None,
    };

    let product_id = pattern.product_id.as_ref().and_then(|re| {
        re.captures(path)
            .and_then(|captures| captures.get(1))
            .map(|id| match pattern.platform {
                Platform::Amazon => id.as_str().to_ascii_uppercase(),
                _ => id.as_str().to_string(),
            })
    });

    PlatformMatch {
        platform: pattern.platform,
        merchant,
        region,
        product_id,
    }
}

const MULTI_PART_SUFFIXES: &[(&str, &str)] = &[
    ("co.uk", "UK"),
    ("com.au", "AU"),
    ("co.jp", "JP"),
    ("com.mx", "MX"),
    ("com.br", "BR"),
    ("com.tr", "TR"),
    ("co.nz", "NZ"),
];

// Two-letter TLDs that are marketed as generic rather than national.
const GENERIC_CC_TLDS: &[&str] = &["io", "co", "ai", "me", "tv", "ly", "gg", "fm", "so"];

fn marketplace_region(host: &str) -> Option<String> {
    for (suffix, region) in MULTI_PART_SUFFIXES {
        if host.ends_with(&format!(".{suffix}")) {
            return Some(region.to_string());
        }
    }

    match host.rsplit('.').next() {
        Some("com") => Some("US".to_string()),
        Some(tld) if tld.len() == 2 => Some(tld.to_ascii_uppercase()),
        _ => None,
    }
}

fn country_code_region(host: &str) -> Option<String> {
    for (suffix, region) in MULTI_PART_SUFFIXES {
        if host.ends_with(&format!(".{suffix}")) {
            return Some(region.to_string());
        }
    }

    match host.rsplit('.').next() {
        Some(tld) if tld.len() == 2 && !GENERIC_CC_TLDS.contains(&tld) => {
            Some(tld.to_ascii_uppercase())
        }
        _ => None,
    }
}

/// `shop.gymshark.co.uk` -> `gymshark`.
pub(crate) fn registrable_name(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let labels: Vec<&str> = host.split('.').filter(|label| !label.is_empty()).collect();
    let suffix_len = if MULTI_PART_SUFFIXES
        .iter()
        .any(|(suffix, _)| host.ends_with(&format!(".{suffix}")))
    {
        2
    } else {
        1
    };

    if labels.len() > suffix_len {
        labels[labels.len() - suffix_len - 1].to_string()
    } else {
        labels.first().copied().unwrap_or("unknown").to_string()
    }
}
