// 📡 Signal Provider Entity
//
// A provider sells trading signals by subscription.
// Facets: signal type (tag membership), risk level (exact), price band (range).

use super::{check_rating, to_tags, Listing};
use crate::facets::{FacetKind, FacetOption, FacetSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// RISK LEVEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    /// Accepts the English names and the Portuguese labels of the seed data
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "baixo" => Ok(RiskLevel::Low),
            "medium" | "médio" | "medio" => Ok(RiskLevel::Medium),
            "high" | "alto" => Ok(RiskLevel::High),
            other => Err(format!("unknown risk level: {}", other)),
        }
    }
}

impl TryFrom<String> for RiskLevel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        level.as_str().to_string()
    }
}

// ============================================================================
// PROVIDER ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Stable identity
    pub id: String,
    pub name: String,

    /// Percentage of winning signals (0-100)
    pub win_rate: u8,
    pub trades_last_month: u32,
    pub signal_types: Vec<String>,
    pub subscription_price: u32,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub rating: f64,
    pub followers: u32,
    #[serde(default)]
    pub description: String,
    pub risk_level: RiskLevel,
    pub avg_pips_profit_monthly: u32,
    #[serde(default = "default_verified")]
    pub verified: bool,
    pub affiliate_url: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn default_currency() -> String {
    "USD".to_string()
}

pub(crate) fn default_verified() -> bool {
    true
}

impl Provider {
    /// Create a provider with a fresh UUID; statistics start at zero
    pub fn new(name: &str, signal_types: &[&str], risk_level: RiskLevel, subscription_price: u32) -> Self {
        let now = Utc::now();

        Provider {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            win_rate: 0,
            trades_last_month: 0,
            signal_types: to_tags(signal_types),
            subscription_price,
            currency: default_currency(),
            rating: 0.0,
            followers: 0,
            description: String::new(),
            risk_level,
            avg_pips_profit_monthly: 0,
            verified: true,
            affiliate_url: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }
}

// Facet accessors

fn signal_types(p: &Provider) -> &[String] {
    &p.signal_types
}

fn risk_level(p: &Provider) -> &str {
    p.risk_level.as_str()
}

/// English names and Portuguese labels both select the same level
fn canonical_risk_level(raw: &str) -> Option<&'static str> {
    raw.parse::<RiskLevel>().ok().map(|level| level.as_str())
}

fn subscription_price(p: &Provider) -> f64 {
    f64::from(p.subscription_price)
}

const SIGNAL_TYPE_OPTIONS: &[FacetOption] = &[
    FacetOption { value: "Forex", label: "Forex" },
    FacetOption { value: "Crypto", label: "Crypto" },
    FacetOption { value: "CFDs", label: "CFDs" },
    FacetOption { value: "Commodities", label: "Commodities" },
];

const RISK_LEVEL_OPTIONS: &[FacetOption] = &[
    FacetOption { value: "low", label: "Low" },
    FacetOption { value: "medium", label: "Medium" },
    FacetOption { value: "high", label: "High" },
];

const PRICE_RANGE_OPTIONS: &[FacetOption] = &[
    FacetOption { value: "0-100", label: "$0 - $100" },
    FacetOption { value: "100-150", label: "$100 - $150" },
    FacetOption { value: "150-9999", label: "$150+" },
];

impl Listing for Provider {
    const CATALOG: &'static str = "providers";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn search_tags(&self) -> &[String] {
        &self.signal_types
    }

    fn affiliate_url(&self) -> &str {
        &self.affiliate_url
    }

    fn validate(&self) -> Result<(), String> {
        check_rating(self.rating)?;
        if self.win_rate > 100 {
            return Err(format!("win rate {} above 100", self.win_rate));
        }
        Ok(())
    }

    fn declared_facets() -> Vec<FacetSpec<Self>> {
        vec![
            FacetSpec {
                name: "signalType",
                label: "Signal type",
                kind: FacetKind::Contains(signal_types),
                options: SIGNAL_TYPE_OPTIONS,
            },
            FacetSpec {
                name: "riskLevel",
                label: "Risk level",
                kind: FacetKind::Exact(risk_level, canonical_risk_level),
                options: RISK_LEVEL_OPTIONS,
            },
            FacetSpec {
                name: "priceRange",
                label: "Price (USD)",
                kind: FacetKind::Range(subscription_price),
                options: PRICE_RANGE_OPTIONS,
            },
        ]
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_creation() {
        let provider = Provider::new("Alpha Signals", &["Forex", "Crypto"], RiskLevel::Low, 99);

        assert_eq!(provider.name, "Alpha Signals");
        assert_eq!(provider.signal_types, vec!["Forex", "Crypto"]);
        assert_eq!(provider.currency, "USD");
        assert!(provider.verified);
        assert_eq!(provider.id.len(), 36); // UUID format
    }

    #[test]
    fn test_risk_level_parsing() {
        assert_eq!("low".parse::<RiskLevel>().unwrap(), RiskLevel::Low);
        assert_eq!("Médio".parse::<RiskLevel>().unwrap(), RiskLevel::Medium);
        assert_eq!("ALTO".parse::<RiskLevel>().unwrap(), RiskLevel::High);
        assert!("extreme".parse::<RiskLevel>().is_err());
        assert_eq!(RiskLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_provider_json_shape() {
        let json = serde_json::json!({
            "id": "1",
            "name": "Alpha Signals",
            "winRate": 87,
            "tradesLastMonth": 156,
            "signalTypes": ["Forex", "Crypto"],
            "subscriptionPrice": 99,
            "rating": 4.8,
            "followers": 2340,
            "riskLevel": "Baixo",
            "avgPipsProfitMonthly": 450,
            "affiliateUrl": "https://alphasignals.com/subscribe"
        });

        let provider: Provider = serde_json::from_value(json).unwrap();
        assert_eq!(provider.risk_level, RiskLevel::Low);
        assert_eq!(provider.currency, "USD");

        let back = serde_json::to_value(&provider).unwrap();
        assert_eq!(back["riskLevel"], "low");
        assert_eq!(back["subscriptionPrice"], 99);
    }

    #[test]
    fn test_provider_validation() {
        let mut provider = Provider::new("Alpha", &[], RiskLevel::Low, 10);
        provider.rating = 4.9;
        assert!(provider.validate().is_ok());

        provider.rating = 5.5;
        assert!(provider.validate().is_err());

        provider.rating = 4.0;
        provider.win_rate = 120;
        assert!(provider.validate().is_err());
    }

    #[test]
    fn test_declared_facets() {
        let names: Vec<_> = Provider::declared_facets().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["signalType", "riskLevel", "priceRange"]);
    }
}
