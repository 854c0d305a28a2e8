// 🔎 Filter Predicates - search + facets
//
// Every predicate is a pure function (entity, criterion) -> bool.
// A catalog declares its facets once; the engine ANDs all of them together.

use crate::entities::Listing;
use crate::error::{CatalogError, CatalogResult};
use serde::Serialize;

/// Reserved facet value meaning "no constraint"
pub const NO_CONSTRAINT: &str = "all";

// ============================================================================
// FACET DECLARATION
// ============================================================================

/// How a facet reads its attribute from an entity, and how it compares.
pub enum FacetKind<E> {
    /// Scalar attribute compared by canonical form. The second fn maps a raw
    /// control value to that form; `None` rejects the value.
    Exact(fn(&E) -> &str, fn(&str) -> Option<&'static str>),

    /// Numeric ceiling: entity value <= selected threshold
    AtMost(fn(&E) -> f64),

    /// Tag set: selected value must be one of the entity's tags
    Contains(fn(&E) -> &[String]),

    /// Numeric band written as "min-max" (open-ended as "min-" or "min")
    Range(fn(&E) -> f64),
}

// Manual impls: fn pointers are Copy whatever E is
impl<E> Clone for FacetKind<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for FacetKind<E> {}

impl<E> FacetKind<E> {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetKind::Exact(..) => "exact",
            FacetKind::AtMost(_) => "at_most",
            FacetKind::Contains(_) => "contains",
            FacetKind::Range(_) => "range",
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(self, FacetKind::AtMost(_) | FacetKind::Range(_))
    }
}

/// One selectable value of a facet, for building controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// A named, independently controllable filter dimension
pub struct FacetSpec<E> {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FacetKind<E>,
    pub options: &'static [FacetOption],
}

impl<E> Clone for FacetSpec<E> {
    fn clone(&self) -> Self {
        FacetSpec {
            name: self.name,
            label: self.label,
            kind: self.kind,
            options: self.options,
        }
    }
}

impl<E> FacetSpec<E> {
    /// Parse a raw control value into a criterion for this facet.
    ///
    /// The sentinel `all` is always accepted. Numeric facets reject values
    /// that do not parse to a finite number.
    pub fn parse(&self, raw: &str) -> CatalogResult<Criterion> {
        if raw.eq_ignore_ascii_case(NO_CONSTRAINT) {
            return Ok(Criterion::Any);
        }

        let invalid = || CatalogError::InvalidFacetValue {
            facet: self.name.to_string(),
            value: raw.to_string(),
        };

        match self.kind {
            FacetKind::Exact(_, canonical) => canonical(raw)
                .map(|value| Criterion::Text(value.to_string()))
                .ok_or_else(invalid),
            FacetKind::Contains(_) => Ok(Criterion::Text(raw.to_string())),
            FacetKind::AtMost(_) => parse_number(raw)
                .map(Criterion::Threshold)
                .ok_or_else(invalid),
            FacetKind::Range(_) => {
                let (min, max) = match raw.split_once('-') {
                    Some((min, max)) => (min, Some(max)),
                    None => (raw, None),
                };
                let min = parse_number(min).ok_or_else(invalid)?;
                let max = match max.map(str::trim) {
                    None | Some("") => None,
                    Some(max) => Some(parse_number(max).ok_or_else(invalid)?),
                };
                // A zero ceiling reads as "no ceiling"
                let max = max.filter(|m| *m != 0.0);
                Ok(Criterion::Range { min, max })
            }
        }
    }

    /// Facet predicate: true when the criterion is `Any` or the entity satisfies it
    pub fn matches(&self, entity: &E, criterion: &Criterion) -> bool {
        match (self.kind, criterion) {
            (_, Criterion::Any) => true,
            (FacetKind::Exact(get, _), Criterion::Text(value)) => get(entity) == value.as_str(),
            (FacetKind::Contains(get), Criterion::Text(value)) => {
                get(entity).iter().any(|tag| tag == value)
            }
            (FacetKind::AtMost(get), Criterion::Threshold(max)) => get(entity) <= *max,
            (FacetKind::Range(get), Criterion::Range { min, max }) => {
                let value = get(entity);
                value >= *min && max.map_or(true, |max| value <= max)
            }
            // parse() never pairs a kind with a foreign criterion
            _ => false,
        }
    }

    pub fn descriptor(&self) -> FacetDescriptor {
        FacetDescriptor {
            name: self.name,
            label: self.label,
            kind: self.kind.as_str(),
            numeric: self.kind.is_numeric(),
            options: self.options.to_vec(),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Serializable description of a declared facet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: &'static str,
    pub numeric: bool,
    pub options: Vec<FacetOption>,
}

// ============================================================================
// CRITERIA
// ============================================================================

/// Parsed selection of one facet
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Criterion {
    /// The "no constraint" sentinel
    #[default]
    Any,
    Text(String),
    Threshold(f64),
    Range { min: f64, max: Option<f64> },
}

impl Criterion {
    pub fn is_any(&self) -> bool {
        matches!(self, Criterion::Any)
    }

    /// Render back to the control value that produced it
    pub fn to_control_value(&self) -> String {
        match self {
            Criterion::Any => NO_CONSTRAINT.to_string(),
            Criterion::Text(value) => value.clone(),
            Criterion::Threshold(max) => format_number(*max),
            Criterion::Range { min, max: Some(max) } => {
                format!("{}-{}", format_number(*min), format_number(*max))
            }
            Criterion::Range { min, max: None } => format!("{}-", format_number(*min)),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ============================================================================
// SEARCH PREDICATE
// ============================================================================

/// Free-text search term. Kept verbatim (whitespace included), matched
/// case-insensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    pub fn new(raw: &str) -> Self {
        SearchTerm {
            raw: raw.to_string(),
            folded: raw.to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Name or any category tag contains the term
    pub fn matches<E: Listing>(&self, entity: &E) -> bool {
        if self.folded.is_empty() {
            return true;
        }

        entity.name().to_lowercase().contains(&self.folded)
            || entity
                .search_tags()
                .iter()
                .any(|tag| tag.to_lowercase().contains(&self.folded))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Broker, Provider, RiskLevel};

    fn facet<E: Listing>(name: &str) -> FacetSpec<E> {
        E::declared_facets()
            .into_iter()
            .find(|f| f.name == name)
            .unwrap()
    }

    #[test]
    fn test_sentinel_always_parses() {
        for spec in Broker::declared_facets() {
            assert_eq!(spec.parse("all").unwrap(), Criterion::Any);
            assert_eq!(spec.parse("ALL").unwrap(), Criterion::Any);
        }
    }

    #[test]
    fn test_numeric_facet_rejects_garbage() {
        let spec = facet::<Broker>("minDeposit");

        let err = spec.parse("lots").unwrap_err();
        assert_eq!(
            err,
            CatalogError::InvalidFacetValue {
                facet: "minDeposit".to_string(),
                value: "lots".to_string(),
            }
        );
        assert!(spec.parse("NaN").is_err());
        assert_eq!(spec.parse("250").unwrap(), Criterion::Threshold(250.0));
    }

    #[test]
    fn test_range_parsing() {
        let spec = facet::<Provider>("priceRange");

        assert_eq!(
            spec.parse("100-150").unwrap(),
            Criterion::Range { min: 100.0, max: Some(150.0) }
        );
        assert_eq!(spec.parse("150-").unwrap(), Criterion::Range { min: 150.0, max: None });
        assert_eq!(spec.parse("150").unwrap(), Criterion::Range { min: 150.0, max: None });
        assert_eq!(spec.parse("50-0").unwrap(), Criterion::Range { min: 50.0, max: None });
        assert!(spec.parse("-").is_err());
        assert!(spec.parse("10-x").is_err());
    }

    #[test]
    fn test_exact_is_case_insensitive() {
        let spec = facet::<Provider>("riskLevel");
        let provider = Provider::new("Alpha", &["Forex"], RiskLevel::Medium, 99);

        assert!(spec.matches(&provider, &spec.parse("Medium").unwrap()));
        assert!(!spec.matches(&provider, &spec.parse("low").unwrap()));
    }

    #[test]
    fn test_exact_accepts_labels_and_rejects_unknown() {
        let spec = facet::<Provider>("riskLevel");
        let provider = Provider::new("Alpha", &["Forex"], RiskLevel::Medium, 99);

        let criterion = spec.parse("Médio").unwrap();
        assert_eq!(criterion, Criterion::Text("medium".to_string()));
        assert!(spec.matches(&provider, &criterion));
        assert_eq!(criterion.to_control_value(), "medium");

        assert_eq!(
            spec.parse("extreme").unwrap_err(),
            CatalogError::InvalidFacetValue {
                facet: "riskLevel".to_string(),
                value: "extreme".to_string(),
            }
        );
    }

    #[test]
    fn test_contains_is_membership() {
        let spec = facet::<Broker>("regulation");
        let broker = Broker::new("TradeMax", &["Forex"], &["CySEC", "FCA"], 100);

        assert!(spec.matches(&broker, &spec.parse("FCA").unwrap()));
        assert!(!spec.matches(&broker, &spec.parse("ASIC").unwrap()));
        // membership, not substring
        assert!(!spec.matches(&broker, &spec.parse("FC").unwrap()));
    }

    #[test]
    fn test_at_most_threshold_is_inclusive() {
        let spec = facet::<Broker>("minDeposit");
        let broker = Broker::new("BlueFX", &["Forex"], &["ASIC"], 250);

        assert!(spec.matches(&broker, &Criterion::Threshold(250.0)));
        assert!(!spec.matches(&broker, &Criterion::Threshold(249.0)));
    }

    #[test]
    fn test_search_matches_name_or_tag() {
        let provider = Provider::new("FxMasters", &["Forex", "Crypto"], RiskLevel::Low, 10);

        assert!(SearchTerm::new("").matches(&provider));
        assert!(SearchTerm::new("Fx").matches(&provider));
        assert!(SearchTerm::new("fXm").matches(&provider));
        assert!(SearchTerm::new("crypt").matches(&provider));
        assert!(!SearchTerm::new("stocks").matches(&provider));
    }

    #[test]
    fn test_search_keeps_whitespace() {
        let provider = Provider::new("Alpha Signals", &["Forex"], RiskLevel::Low, 10);

        assert!(SearchTerm::new("a s").matches(&provider));
        assert!(!SearchTerm::new(" alpha").matches(&provider));
        assert!(!SearchTerm::new(" ").matches(&Provider::new("Solo", &[], RiskLevel::Low, 1)));
    }

    #[test]
    fn test_control_value_round_trip() {
        assert_eq!(Criterion::Any.to_control_value(), "all");
        assert_eq!(Criterion::Threshold(500.0).to_control_value(), "500");
        assert_eq!(
            Criterion::Range { min: 0.0, max: Some(100.0) }.to_control_value(),
            "0-100"
        );
    }
}
