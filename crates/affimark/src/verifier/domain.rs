use serde::{Deserialize, Serialize};

/// One of the three independent 0-100 scoring dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pillar {
    ProductViability,
    OfferMerchant,
    Economics,
}

impl Pillar {
    /// Tie-break order used whenever the weakest pillar is selected.
    pub const ALL: [Pillar; 3] = [
        Pillar::ProductViability,
        Pillar::OfferMerchant,
        Pillar::Economics,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::ProductViability => "Product viability",
            Self::OfferMerchant => "Offer & merchant",
            Self::Economics => "Economics",
        }
    }
}

/// Pillar scores produced by the external scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PillarScores {
    pub product_viability: f32,
    pub offer_merchant: f32,
    pub economics: f32,
}

impl PillarScores {
    pub fn new(product_viability: f32, offer_merchant: f32, economics: f32) -> Self {
        Self {
            product_viability,
            offer_merchant,
            economics,
        }
    }

    pub fn get(&self, pillar: Pillar) -> f32 {
        match pillar {
            Pillar::ProductViability => self.product_viability,
            Pillar::OfferMerchant => self.offer_merchant,
            Pillar::Economics => self.economics,
        }
    }

    /// Lowest pillar; the first one in [`Pillar::ALL`] wins ties.
    pub fn weakest(&self) -> (Pillar, f32) {
        let mut weakest = (Pillar::ProductViability, self.product_viability);
        for pillar in Pillar::ALL {
            let score = self.get(pillar);
            if score < weakest.1 {
                weakest = (pillar, score);
            }
        }
        weakest
    }

    pub fn min(&self) -> f32 {
        self.weakest().1
    }

    pub fn average(&self) -> f32 {
        (self.product_viability + self.offer_merchant + self.economics) / 3.0
    }

    pub fn count_below(&self, threshold: f32) -> usize {
        Pillar::ALL
            .iter()
            .filter(|pillar| self.get(**pillar) < threshold)
            .count()
    }
}

/// Three-tier confidence shared by evidence, verdicts and program lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLevel {
    Low,
    Med,
    High,
}

impl ConfidenceLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Med => "MED",
            Self::High => "HIGH",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    LimitedStock,
    OutOfStock,
    #[default]
    Unknown,
}

/// Product page facts handed over by the scraper.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapedProductData {
    pub title: Option<String>,
    pub price: Option<f32>,
    pub rating: Option<f32>,
    pub review_count: Option<u32>,
    pub availability: Availability,
    pub claims: Vec<String>,
    pub description: Option<String>,
    pub has_return_policy: bool,
    pub has_shipping_info: bool,
}

impl ScrapedProductData {
    pub fn page_found(&self) -> bool {
        self.title.is_some() || self.price.is_some()
    }
}

/// Merchant reputation from the reputation aggregator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationData {
    pub overall_rating: Option<f32>,
    pub sources: Vec<ReputationSource>,
}

impl ReputationData {
    pub fn has_data(&self) -> bool {
        self.overall_rating.is_some() || !self.sources.is_empty()
    }

    pub fn total_reviews(&self) -> u32 {
        self.sources
            .iter()
            .fold(0, |total: u32, source| total.saturating_add(source.review_count))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationSource {
    pub source: String,
    pub rating: Option<f32>,
    pub review_count: u32,
    pub last_review_days: Option<u32>,
    pub url: Option<String>,
}

/// Affiliate program terms. Rates are percentages (4.5 means 4.5%).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionData {
    pub rate_low: Option<f32>,
    pub rate_high: Option<f32>,
    pub cookie_days: Option<u32>,
    pub network: Option<String>,
    pub requires_application: Option<bool>,
    pub last_verified_days: Option<u32>,
}

impl CommissionData {
    pub fn has_rate(&self) -> bool {
        self.rate_low.is_some() || self.rate_high.is_some()
    }

    pub fn program_found(&self) -> bool {
        self.has_rate() || self.network.is_some()
    }
}

/// Aggregate price statistics for the product's category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub p25_price: f32,
    pub median_price: f32,
    pub p75_price: f32,
    #[serde(default)]
    pub median_aov: Option<f32>,
}

impl CategoryStats {
    /// Piecewise-linear percentile estimate of `price` within the category.
    pub fn price_percentile(&self, price: f32) -> f32 {
        let lerp = |value: f32, low: f32, high: f32, from: f32, to: f32| {
            if high <= low {
                to
            } else {
                from + (to - from) * ((value - low) / (high - low)).clamp(0.0, 1.0)
            }
        };

        let percentile = if price <= self.p25_price {
            lerp(price, 0.0, self.p25_price, 0.0, 0.25)
        } else if price <= self.median_price {
            lerp(price, self.p25_price, self.median_price, 0.25, 0.5)
        } else if price <= self.p75_price {
            lerp(price, self.median_price, self.p75_price, 0.5, 0.75)
        } else {
            lerp(price, self.p75_price, self.p75_price * 2.0, 0.75, 1.0)
        };

        percentile.clamp(0.0, 1.0)
    }
}

/// Sub-component points behind the product viability pillar (each 0-25).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductViabilityBreakdown {
    pub demand_signals: f32,
    pub review_quality: f32,
    pub price_competitiveness: f32,
    pub market_fit: f32,
}

/// Sub-component points behind the offer & merchant pillar (40/30/30).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OfferMerchantBreakdown {
    pub reputation: f32,
    pub policies: f32,
    pub trust_signals: f32,
}

/// Sub-component points behind the economics pillar (40/20/25/15).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomicsBreakdown {
    pub commission: f32,
    pub cookie_window: f32,
    pub order_value: f32,
    pub program_access: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreBreakdowns {
    pub product_viability: ProductViabilityBreakdown,
    pub offer_merchant: OfferMerchantBreakdown,
    pub economics: EconomicsBreakdown,
}

/// Output of the external scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub scores: PillarScores,
    #[serde(default)]
    pub breakdowns: ScoreBreakdowns,
}
