//! # Jurisdiction Model
//!
//! Canonical representation of a US administrative jurisdiction and its
//! naming hierarchy: state → county (or county equivalent) → subdivision.
//!
//! A [`Jurisdiction`] is immutable once built and compares by value. Every
//! constructor (and deserialization) validates that the tier fields nest
//! strictly according to the declared [`JurisdictionType`]:
//!
//! | Type tier | `county` | `subdivision` |
//! |-----------|----------|---------------|
//! | state | absent | absent |
//! | county, parish, borough | required | absent |
//! | city, town, township, village, unincorporated area | optional | required |
//! | gore | absent | required |
//!
//! The derived phrases feed the verification graph prompts, which follow a
//! fixed phrasing convention: states read "Colorado state", counties read as
//! bare proper nouns ("Jefferson County"), and subdivisions read as a clause
//! with a definite article ("the town of Golden").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JurisdictionError;

// ---------------------------------------------------------------------------
// Tier
// ---------------------------------------------------------------------------

/// One level of the jurisdiction hierarchy, ordered from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Statewide.
    State,
    /// County or county equivalent (parish, borough).
    County,
    /// Municipality or other sub-county area.
    Subdivision,
}

impl Tier {
    /// Identifier fragment used in graph node names (`is_county`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::County => "county",
            Self::Subdivision => "subdivision",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// JurisdictionType
// ---------------------------------------------------------------------------

/// The declared type of a jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum JurisdictionType {
    /// A US state.
    State,
    /// A county.
    County,
    /// A Louisiana parish (county equivalent).
    Parish,
    /// An Alaska borough (county equivalent).
    Borough,
    /// An incorporated city.
    City,
    /// A town.
    Town,
    /// A civil township.
    Township,
    /// A village.
    Village,
    /// An unincorporated area administered by its county.
    UnincorporatedArea,
    /// A Vermont gore: an unorganized area outside any town, and outside the
    /// county naming chain.
    Gore,
}

impl JurisdictionType {
    /// Every jurisdiction type, broadest tier first.
    pub fn all() -> &'static [JurisdictionType] {
        &[
            Self::State,
            Self::County,
            Self::Parish,
            Self::Borough,
            Self::City,
            Self::Town,
            Self::Township,
            Self::Village,
            Self::UnincorporatedArea,
            Self::Gore,
        ]
    }

    /// Lowercase label as it reads in prose ("unincorporated area").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::State => "state",
            Self::County => "county",
            Self::Parish => "parish",
            Self::Borough => "borough",
            Self::City => "city",
            Self::Town => "town",
            Self::Township => "township",
            Self::Village => "village",
            Self::UnincorporatedArea => "unincorporated area",
            Self::Gore => "gore",
        }
    }

    /// Label with each word capitalized ("Unincorporated Area").
    pub fn title(&self) -> String {
        self.as_str()
            .split(' ')
            .map(capitalize)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Label usable inside an identifier ("unincorporated_area").
    pub fn slug(&self) -> String {
        self.as_str().replace(' ', "_")
    }

    /// The tier this type lives on.
    pub fn tier(&self) -> Tier {
        match self {
            Self::State => Tier::State,
            Self::County | Self::Parish | Self::Borough => Tier::County,
            Self::City
            | Self::Town
            | Self::Township
            | Self::Village
            | Self::UnincorporatedArea
            | Self::Gore => Tier::Subdivision,
        }
    }

    /// Types below the county tier that never carry a county name.
    pub fn skips_county_tier(&self) -> bool {
        matches!(self, Self::Gore)
    }

    /// The county-equivalent type a state uses for its county tier
    /// ("Parish" in Louisiana, "Borough" in Alaska).
    pub fn county_equivalent_in(state: &str) -> Self {
        match state.trim().to_lowercase().as_str() {
            "louisiana" => Self::Parish,
            "alaska" => Self::Borough,
            _ => Self::County,
        }
    }

    /// Types whose name reads as a proper noun with the type as suffix
    /// ("Buels Gore") rather than as "the <type> of <name>".
    pub fn is_proper_noun_suffix(&self) -> bool {
        matches!(self, Self::Gore)
    }
}

impl fmt::Display for JurisdictionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JurisdictionType {
    type Err = JurisdictionError;

    /// Case-insensitive; underscores, hyphens and repeated whitespace are
    /// treated as single spaces.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| JurisdictionError::UnknownType(s.to_string()))
    }
}

impl TryFrom<String> for JurisdictionType {
    type Error = JurisdictionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JurisdictionType> for String {
    fn from(value: JurisdictionType) -> Self {
        value.as_str().to_string()
    }
}

// ---------------------------------------------------------------------------
// Jurisdiction
// ---------------------------------------------------------------------------

/// A validated administrative jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "JurisdictionRecord", into = "JurisdictionRecord")]
pub struct Jurisdiction {
    jurisdiction_type: JurisdictionType,
    state: String,
    county: Option<String>,
    subdivision: Option<String>,
    code: Option<u64>,
}

impl Jurisdiction {
    /// Build a jurisdiction from raw parts, validating the tier invariant.
    ///
    /// Blank optional names are treated as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`JurisdictionError`] when the state is empty or the
    /// county/subdivision fields do not match `jurisdiction_type`.
    pub fn new(
        jurisdiction_type: JurisdictionType,
        state: impl Into<String>,
        county: Option<String>,
        subdivision: Option<String>,
    ) -> Result<Self, JurisdictionError> {
        let jurisdiction = Self {
            jurisdiction_type,
            state: state.into().trim().to_string(),
            county: non_blank(county),
            subdivision: non_blank(subdivision),
            code: None,
        };
        jurisdiction.validate()?;
        Ok(jurisdiction)
    }

    /// A statewide jurisdiction.
    pub fn state(state: impl Into<String>) -> Result<Self, JurisdictionError> {
        Self::new(JurisdictionType::State, state, None, None)
    }

    /// A county-tier jurisdiction (county, parish or borough).
    pub fn county(
        jurisdiction_type: JurisdictionType,
        state: impl Into<String>,
        county: impl Into<String>,
    ) -> Result<Self, JurisdictionError> {
        Self::new(jurisdiction_type, state, Some(county.into()), None)
    }

    /// A subdivision-tier jurisdiction, optionally nested in a county.
    pub fn subdivision(
        jurisdiction_type: JurisdictionType,
        state: impl Into<String>,
        county: Option<String>,
        subdivision: impl Into<String>,
    ) -> Result<Self, JurisdictionError> {
        Self::new(jurisdiction_type, state, county, Some(subdivision.into()))
    }

    /// Attach a numeric identifier (e.g. a FIPS code). Not used in phrasing.
    pub fn with_code(mut self, code: u64) -> Self {
        self.code = Some(code);
        self
    }

    /// Check that the tier fields nest strictly for the declared type.
    pub fn validate(&self) -> Result<(), JurisdictionError> {
        if self.state.trim().is_empty() {
            return Err(JurisdictionError::EmptyState);
        }
        let type_label = || self.jurisdiction_type.as_str().to_string();

        match self.jurisdiction_type.tier() {
            Tier::State => {
                if let Some(county) = &self.county {
                    return Err(JurisdictionError::UnexpectedCounty {
                        jurisdiction_type: type_label(),
                        county: county.clone(),
                    });
                }
            }
            Tier::County => {
                if self.county.is_none() {
                    return Err(JurisdictionError::MissingCounty {
                        jurisdiction_type: type_label(),
                    });
                }
            }
            Tier::Subdivision => {
                if self.subdivision.is_none() {
                    return Err(JurisdictionError::MissingSubdivision {
                        jurisdiction_type: type_label(),
                    });
                }
                if let (true, Some(county)) =
                    (self.jurisdiction_type.skips_county_tier(), &self.county)
                {
                    return Err(JurisdictionError::UnexpectedCounty {
                        jurisdiction_type: type_label(),
                        county: county.clone(),
                    });
                }
            }
        }

        if self.jurisdiction_type.tier() < Tier::Subdivision {
            if let Some(subdivision) = &self.subdivision {
                return Err(JurisdictionError::UnexpectedSubdivision {
                    jurisdiction_type: type_label(),
                    subdivision: subdivision.clone(),
                });
            }
        }
        Ok(())
    }

    /// The declared jurisdiction type.
    pub fn jurisdiction_type(&self) -> JurisdictionType {
        self.jurisdiction_type
    }

    /// State name.
    pub fn state_name(&self) -> &str {
        &self.state
    }

    /// County name, if the lineage includes the county tier.
    pub fn county_name(&self) -> Option<&str> {
        self.county.as_deref()
    }

    /// Subdivision name, if the jurisdiction is below the county tier.
    pub fn subdivision_name(&self) -> Option<&str> {
        self.subdivision.as_deref()
    }

    /// Numeric identifier, if one was attached.
    pub fn code(&self) -> Option<u64> {
        self.code
    }

    /// The tier lineage from state down to this jurisdiction, omitting tiers
    /// with no name (e.g. a city recorded without its county, or a gore).
    pub fn tiers(&self) -> Vec<Tier> {
        let mut tiers = vec![Tier::State];
        if self.county.is_some() {
            tiers.push(Tier::County);
        }
        if self.subdivision.is_some() {
            tiers.push(Tier::Subdivision);
        }
        tiers
    }

    /// "Colorado state". Never "the state of Colorado".
    pub fn state_phrase(&self) -> String {
        format!("{} state", self.state)
    }

    /// Bare county phrase ("Jefferson County", "Orleans Parish").
    ///
    /// County-tier jurisdictions use their declared type as the suffix.
    /// Below the county tier the suffix is the state's county equivalent.
    pub fn full_county_phrase(&self) -> Option<String> {
        let county = self.county.as_deref()?;
        let suffix = match self.jurisdiction_type.tier() {
            Tier::County => self.jurisdiction_type.title(),
            _ => JurisdictionType::county_equivalent_in(&self.state).title(),
        };
        Some(format!("{county} {suffix}"))
    }

    /// Subdivision phrase without an article ("town of Golden"), or the
    /// proper-noun form for suffix types ("Buels Gore").
    pub fn full_subdivision_phrase(&self) -> Option<String> {
        let name = self.subdivision.as_deref()?;
        if self.jurisdiction_type.is_proper_noun_suffix() {
            Some(format!("{name} {}", self.jurisdiction_type.title()))
        } else {
            Some(format!("{} of {name}", self.jurisdiction_type))
        }
    }

    /// Subdivision phrase as it is embedded in prose: "the town of Golden",
    /// or the bare proper noun for suffix types ("Buels Gore").
    pub fn subdivision_clause(&self) -> Option<String> {
        let phrase = self.full_subdivision_phrase()?;
        if self.jurisdiction_type.is_proper_noun_suffix() {
            Some(phrase)
        } else {
            Some(format!("the {phrase}"))
        }
    }

    /// Display name: "Town of Golden, Jefferson County, Colorado".
    pub fn full_name(&self) -> String {
        let subdivision = self.full_subdivision_phrase().map(|p| capitalize(&p));
        [subdivision, self.full_county_phrase(), Some(self.state.clone())]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Which names a reader should look for in a document to confirm this
    /// jurisdiction ("the state name and the town name").
    pub fn names_to_extract(&self) -> String {
        match self.jurisdiction_type {
            JurisdictionType::State => "the state name".to_string(),
            other => format!("the state name and the {other} name"),
        }
    }
}

impl fmt::Display for Jurisdiction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Wire form of a [`Jurisdiction`]; converted through validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionRecord {
    /// Jurisdiction type label.
    #[serde(rename = "type")]
    pub jurisdiction_type: JurisdictionType,
    /// State name.
    pub state: String,
    /// County name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,
    /// Subdivision name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdivision: Option<String>,
    /// Numeric identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u64>,
}

impl TryFrom<JurisdictionRecord> for Jurisdiction {
    type Error = JurisdictionError;

    fn try_from(record: JurisdictionRecord) -> Result<Self, Self::Error> {
        let jurisdiction = Self::new(
            record.jurisdiction_type,
            record.state,
            record.county,
            record.subdivision,
        )?;
        Ok(match record.code {
            Some(code) => jurisdiction.with_code(code),
            None => jurisdiction,
        })
    }
}

impl From<Jurisdiction> for JurisdictionRecord {
    fn from(j: Jurisdiction) -> Self {
        Self {
            jurisdiction_type: j.jurisdiction_type,
            state: j.state,
            county: j.county,
            subdivision: j.subdivision,
            code: j.code,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
