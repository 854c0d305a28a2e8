// 🏦 Broker Entity
//
// A broker opens trading accounts.
// Facets: instrument (tag membership), minimum deposit ceiling, regulation (tag membership).

use super::provider::{default_currency, default_verified};
use super::{check_rating, to_tags, Listing};
use crate::facets::{FacetKind, FacetOption, FacetSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Broker {
    /// Stable identity
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub account_types: Vec<String>,
    pub min_deposit: u32,

    /// Displayed as-is, e.g. "1:500"
    #[serde(default)]
    pub max_leverage: String,
    #[serde(default)]
    pub spreads_from: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub bonus: Option<String>,
    pub rating: f64,

    /// Jurisdictions (FCA, CySEC, ASIC, ...)
    pub regulation: Vec<String>,
    pub instruments: Vec<String>,
    #[serde(default)]
    pub platforms_supported: Vec<String>,
    #[serde(default)]
    pub withdrawal_time: String,
    #[serde(default)]
    pub customer_support: String,
    #[serde(default = "default_verified")]
    pub verified: bool,
    pub affiliate_url: String,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Broker {
    /// Create a broker with a fresh UUID
    pub fn new(name: &str, instruments: &[&str], regulation: &[&str], min_deposit: u32) -> Self {
        let now = Utc::now();

        Broker {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            account_types: Vec::new(),
            min_deposit,
            max_leverage: String::new(),
            spreads_from: 0.0,
            currency: default_currency(),
            bonus: None,
            rating: 0.0,
            regulation: to_tags(regulation),
            instruments: to_tags(instruments),
            platforms_supported: Vec::new(),
            withdrawal_time: String::new(),
            customer_support: String::new(),
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

fn instruments(b: &Broker) -> &[String] {
    &b.instruments
}

fn min_deposit(b: &Broker) -> f64 {
    f64::from(b.min_deposit)
}

fn regulation(b: &Broker) -> &[String] {
    &b.regulation
}

const INSTRUMENT_OPTIONS: &[FacetOption] = &[
    FacetOption { value: "Forex", label: "Forex" },
    FacetOption { value: "Crypto", label: "Crypto" },
    FacetOption { value: "CFDs", label: "CFDs" },
    FacetOption { value: "Stocks", label: "Stocks" },
    FacetOption { value: "Commodities", label: "Commodities" },
];

const MIN_DEPOSIT_OPTIONS: &[FacetOption] = &[
    FacetOption { value: "100", label: "Up to $100" },
    FacetOption { value: "250", label: "Up to $250" },
    FacetOption { value: "500", label: "Up to $500" },
    FacetOption { value: "1000", label: "Up to $1000" },
];

const REGULATION_OPTIONS: &[FacetOption] = &[
    FacetOption { value: "FCA", label: "FCA (United Kingdom)" },
    FacetOption { value: "CySEC", label: "CySEC (Cyprus)" },
    FacetOption { value: "ASIC", label: "ASIC (Australia)" },
];

impl Listing for Broker {
    const CATALOG: &'static str = "brokers";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn search_tags(&self) -> &[String] {
        &self.instruments
    }

    fn affiliate_url(&self) -> &str {
        &self.affiliate_url
    }

    fn validate(&self) -> Result<(), String> {
        check_rating(self.rating)?;
        if !(self.spreads_from.is_finite() && self.spreads_from >= 0.0) {
            return Err(format!("negative spread {}", self.spreads_from));
        }
        Ok(())
    }

    fn declared_facets() -> Vec<FacetSpec<Self>> {
        vec![
            FacetSpec {
                name: "instrumentType",
                label: "Instrument",
                kind: FacetKind::Contains(instruments),
                options: INSTRUMENT_OPTIONS,
            },
            FacetSpec {
                name: "minDeposit",
                label: "Minimum deposit",
                kind: FacetKind::AtMost(min_deposit),
                options: MIN_DEPOSIT_OPTIONS,
            },
            FacetSpec {
                name: "regulation",
                label: "Regulation",
                kind: FacetKind::Contains(regulation),
                options: REGULATION_OPTIONS,
            },
        ]
    }
}
