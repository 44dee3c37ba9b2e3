use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// The only country the provider matches against.
pub const DOMESTIC_COUNTRY: &str = "US";

/// Raw address fields as entered by a user or importer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressInput {
    pub street: String,
    #[serde(default)]
    pub secondary: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
}

impl AddressInput {
    pub fn is_domestic(&self) -> bool {
        is_domestic(&self.country)
    }

    /// Fields in the provider's query parameter names. Blank secondary lines
    /// are left out.
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = vec![("street", self.street.as_str())];
        if let Some(x) = self.secondary.as_deref().filter(|x| !x.trim().is_empty()) {
            pairs.push(("secondary", x));
        }
        pairs.push(("city", self.city.as_str()));
        pairs.push(("state", self.state.as_str()));
        pairs.push(("zipcode", self.zipcode.as_str()));
        pairs
    }
}

impl fmt::Display for AddressInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.street)?;
        if let Some(x) = &self.secondary {
            write!(f, ", {x}")?;
        }
        write!(
            f,
            ", {}, {} {}, {}",
            self.city, self.state, self.zipcode, self.country
        )
    }
}

pub fn is_domestic(country: &str) -> bool {
    country.trim().eq_ignore_ascii_case(DOMESTIC_COUNTRY)
}

/// Normalized address built from the provider's first candidate.
#[skip_serializing_none]
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VerifiedAddress {
    pub delivery_line1: String,
    pub delivery_line2: Option<String>,
    pub last_line: String,
    /// Street part of the delivery line: number, directionals, name, suffix.
    pub street_line: String,
    /// Secondary unit, e.g. "Ste 850".
    pub secondary_line: Option<String>,
    pub city: String,
    pub state: String,
    /// ZIP with the plus-4 extension appended when the provider has one.
    pub zipcode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub record_type: Option<String>,
    pub dpv_match_code: Option<String>,
    pub dpv_footnotes: Option<String>,
    pub delivery_point_barcode: Option<String>,
}

/// Result of a call that reached the provider and got a 2xx back.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", content = "address", rename_all = "snake_case")]
pub enum Verification {
    Verified(VerifiedAddress),
    NotDeliverable,
}

impl Verification {
    pub fn is_deliverable(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

// provider schema, only the parts we read

#[derive(Debug, Deserialize)]
pub(crate) struct Candidate {
    #[serde(rename = "delivery_line_1")]
    delivery_line1: String,
    #[serde(rename = "delivery_line_2")]
    delivery_line2: Option<String>,
    last_line: String,
    delivery_point_barcode: Option<String>,
    #[serde(default)]
    components: Components,
    #[serde(default)]
    metadata: Metadata,
    #[serde(default)]
    analysis: Analysis,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Components {
    primary_number: Option<String>,
    street_predirection: Option<String>,
    street_name: Option<String>,
    street_suffix: Option<String>,
    street_postdirection: Option<String>,
    secondary_designator: Option<String>,
    secondary_number: Option<String>,
    city_name: Option<String>,
    state_abbreviation: Option<String>,
    zipcode: Option<String>,
    plus4_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Metadata {
    record_type: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Analysis {
    dpv_match_code: Option<String>,
    dpv_footnotes: Option<String>,
}

fn join_present<'a>(parts: impl IntoIterator<Item = &'a Option<String>>) -> Option<String> {
    let joined = parts
        .into_iter()
        .flatten()
        .map(|x| x.trim())
        .filter(|x| !x.is_empty())
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

/// "New York NY 10026-2283" split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
struct LastLine {
    city: String,
    state: String,
    zipcode: String,
}

impl LastLine {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().rev();
        let zipcode = words.next()?;
        let state = words.next()?;
        let city = words.rev().join(" ");

        let zip_ok = match zipcode.split_once('-') {
            Some((zip, plus4)) => digits(zip, 5) && digits(plus4, 4),
            None => digits(zipcode, 5),
        };
        if !zip_ok || state.len() != 2 || !state.chars().all(|x| x.is_ascii_uppercase()) {
            return None;
        }
        if city.is_empty() {
            return None;
        }

        Some(Self {
            city,
            state: state.to_string(),
            zipcode: zipcode.to_string(),
        })
    }
}

fn digits(x: &str, len: usize) -> bool {
    x.len() == len && x.chars().all(|x| x.is_ascii_digit())
}

impl From<Candidate> for VerifiedAddress {
    fn from(x: Candidate) -> Self {
        let c = &x.components;

        let street_line = join_present([
            &c.primary_number,
            &c.street_predirection,
            &c.street_name,
            &c.street_suffix,
            &c.street_postdirection,
        ])
        .unwrap_or_else(|| x.delivery_line1.clone());
        let secondary_line = join_present([&c.secondary_designator, &c.secondary_number]);

        let zipcode = match (&c.zipcode, &c.plus4_code) {
            (Some(zip), Some(plus4)) if !plus4.is_empty() => Some(format!("{zip}-{plus4}")),
            (Some(zip), _) => Some(zip.clone()),
            (None, _) => None,
        };

        // sparse candidates still carry the last line
        let last = LastLine::parse(&x.last_line);
        let or_last = |field: Option<String>, pick: fn(LastLine) -> String| {
            field
                .filter(|x| !x.trim().is_empty())
                .or_else(|| last.clone().map(pick))
                .unwrap_or_default()
        };

        Self {
            street_line,
            secondary_line,
            city: or_last(c.city_name.clone(), |x| x.city),
            state: or_last(c.state_abbreviation.clone(), |x| x.state),
            zipcode: or_last(zipcode, |x| x.zipcode),
            latitude: x.metadata.latitude,
            longitude: x.metadata.longitude,
            record_type: x.metadata.record_type,
            dpv_match_code: x.analysis.dpv_match_code,
            dpv_footnotes: x.analysis.dpv_footnotes,
            delivery_point_barcode: x.delivery_point_barcode,
            delivery_line2: x.delivery_line2.filter(|x| !x.is_empty()),
            delivery_line1: x.delivery_line1,
            last_line: x.last_line,
        }
    }
}
