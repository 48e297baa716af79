//! A single public alert taken from a CAP feed entry.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::CapError;
use crate::types::{Certainty, Severity, Urgency};

/// Universal Geographic Code notation (zone and county codes such as `MIZ001`).
pub const UGC: &str = "UGC";

/// Six-digit FIPS county notation.
pub const FIPS6: &str = "FIPS6";

static NO_CODES: BTreeSet<String> = BTreeSet::new();

/// One alert from a feed, presented as a field map and a geocode map.
///
/// Field names are element local names. Atom and CAP children share one
/// key space, so `id`, `title`, `event` and `urgency` are all plain fields.
/// Lookups accept an optional `cap:` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    fields: IndexMap<String, String>,
    geocodes: IndexMap<String, BTreeSet<String>>,
}

impl Alert {
    /// Build an alert from already extracted fields and geocodes.
    pub fn from_parts(
        fields: IndexMap<String, String>,
        geocodes: IndexMap<String, BTreeSet<String>>,
    ) -> Self {
        Self { fields, geocodes }
    }

    /// Look up a scalar field by name.
    pub fn get_field(&self, name: &str) -> Result<&str, CapError> {
        self.field(name)
            .ok_or_else(|| CapError::FieldNotFound(name.to_string()))
    }

    /// Look up a scalar field by name, returning `None` if absent.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(field_key(name)).map(String::as_str)
    }

    /// Location codes published under `notation`; empty if there are none.
    pub fn get_geocode(&self, notation: &str) -> &BTreeSet<String> {
        self.geocodes.get(notation).unwrap_or(&NO_CODES)
    }

    /// All fields in document order.
    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// All geocodes, keyed by notation.
    pub fn geocodes(&self) -> &IndexMap<String, BTreeSet<String>> {
        &self.geocodes
    }

    /// The alert identifier, used as the de-duplication key within a feed.
    pub fn id(&self) -> Option<&str> {
        self.field("id")
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title")
    }

    pub fn event(&self) -> Option<&str> {
        self.field("event")
    }

    pub fn area_desc(&self) -> Option<&str> {
        self.field("areaDesc")
    }

    pub fn urgency(&self) -> Urgency {
        self.parse_enum("urgency")
    }

    pub fn severity(&self) -> Severity {
        self.parse_enum("severity")
    }

    pub fn certainty(&self) -> Certainty {
        self.parse_enum("certainty")
    }

    /// When the alert takes effect. `None` if absent or not RFC 3339.
    pub fn effective(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp("effective")
    }

    /// When the alert expires. `None` if absent or not RFC 3339.
    pub fn expires(&self) -> Option<DateTime<FixedOffset>> {
        self.timestamp("expires")
    }

    pub fn ugc_codes(&self) -> &BTreeSet<String> {
        self.get_geocode(UGC)
    }

    pub fn fips6_codes(&self) -> &BTreeSet<String> {
        self.get_geocode(FIPS6)
    }

    /// Whether the alert has expired at `now`. Alerts without a readable
    /// expiry never expire.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires()
            .is_some_and(|expires| expires.with_timezone(&Utc) <= now)
    }

    fn parse_enum<T>(&self, name: &str) -> T
    where
        T: std::str::FromStr<Err = std::convert::Infallible>,
    {
        self.field(name)
            .unwrap_or_default()
            .parse()
            .unwrap_or_else(|never| match never {})
    }

    fn timestamp(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(self.field(name)?.trim()).ok()
    }
}

fn field_key(name: &str) -> &str {
    name.strip_prefix("cap:").unwrap_or(name)
}
