//! A de-duplicated collection of alerts, keyed by alert id.

use std::collections::HashSet;
use std::ops::{Add, AddAssign};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::warn;

use crate::alert::{Alert, UGC};
use crate::error::CapError;

/// A set of alerts indexed by identifier.
///
/// Inserting an alert whose id is already present replaces the earlier
/// copy, so the most recently added alert always wins. Iteration follows
/// first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    alerts: IndexMap<String, Alert>,
}

impl Feed {
    /// Index `alerts` by id. Later duplicates overwrite earlier ones.
    ///
    /// Alerts without an `id` field cannot be indexed and are dropped.
    pub fn new(alerts: impl IntoIterator<Item = Alert>) -> Self {
        let mut feed = Self::default();
        feed.extend(alerts);
        feed
    }

    /// Insert one alert, replacing any alert with the same id.
    ///
    /// Returns the replaced alert, if any.
    pub fn insert(&mut self, alert: Alert) -> Option<Alert> {
        let Some(id) = alert.id().map(str::to_string) else {
            warn!("Dropping alert without an id: {:?}", alert.title());
            return None;
        };
        self.alerts.insert(id, alert)
    }

    /// Merge `other` into this feed; `other`'s copies win on conflict.
    pub fn merge(&mut self, other: Feed) -> &mut Self {
        self.alerts.extend(other.alerts);
        self
    }

    /// All alerts, in insertion order.
    pub fn alerts(&self) -> Vec<&Alert> {
        self.alerts.values().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.values()
    }

    /// Consume the feed, returning its alerts in insertion order.
    pub fn into_alerts(self) -> Vec<Alert> {
        self.alerts.into_values().collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.alerts.keys().map(String::as_str)
    }

    pub fn get(&self, id: &str) -> Option<&Alert> {
        self.alerts.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.alerts.contains_key(id)
    }

    /// Number of alerts held.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Alias for [`Feed::len`].
    pub fn count_alerts(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Group alerts by the value of `field`.
    ///
    /// Groups appear in the order their first alert is visited, and each
    /// group keeps visiting order. Fails if any alert lacks the field.
    pub fn categorize(&self, field: &str) -> Result<IndexMap<String, Vec<&Alert>>, CapError> {
        let mut groups: IndexMap<String, Vec<&Alert>> = IndexMap::new();
        for alert in self.alerts.values() {
            let value = alert.get_field(field)?;
            groups.entry(value.to_string()).or_default().push(alert);
        }
        Ok(groups)
    }

    /// Alerts whose `field` value is one of `values`.
    ///
    /// Fails if any alert lacks the field.
    pub fn filter<S: AsRef<str>>(&self, field: &str, values: &[S]) -> Result<Vec<&Alert>, CapError> {
        let ids = self.matching_field(field, values)?;
        Ok(self.select(&ids))
    }

    /// Like [`Feed::filter`], but also replaces this feed's contents with the
    /// result. On error the feed is left unchanged.
    pub fn retain_field<S: AsRef<str>>(
        &mut self,
        field: &str,
        values: &[S],
    ) -> Result<Vec<&Alert>, CapError> {
        let ids = self.matching_field(field, values)?;
        self.alerts.retain(|id, _| ids.contains(id));
        Ok(self.alerts())
    }

    /// Alerts covering every one of `locations` under `notation`.
    ///
    /// Partial coverage is not a match. An empty location list matches
    /// every alert.
    pub fn filter_by_location<S: AsRef<str>>(&self, locations: &[S], notation: &str) -> Vec<&Alert> {
        self.alerts
            .values()
            .filter(|alert| covers_all(alert, locations, notation))
            .collect()
    }

    /// [`Feed::filter_by_location`] with `UGC` notation.
    pub fn filter_by_zone<S: AsRef<str>>(&self, zones: &[S]) -> Vec<&Alert> {
        self.filter_by_location(zones, UGC)
    }

    /// Like [`Feed::filter_by_location`], but also replaces this feed's
    /// contents with the result.
    pub fn retain_location<S: AsRef<str>>(&mut self, locations: &[S], notation: &str) -> Vec<&Alert> {
        self.alerts
            .retain(|_, alert| covers_all(alert, locations, notation));
        self.alerts()
    }

    /// Drop every alert that has expired at `now`. Returns how many were removed.
    pub fn remove_expired(&mut self, now: DateTime<Utc>) -> usize {
        let before = self.alerts.len();
        self.alerts.retain(|_, alert| !alert.is_expired_at(now));
        before - self.alerts.len()
    }

    fn matching_field<S: AsRef<str>>(
        &self,
        field: &str,
        values: &[S],
    ) -> Result<HashSet<String>, CapError> {
        let mut ids = HashSet::new();
        for (id, alert) in &self.alerts {
            let value = alert.get_field(field)?;
            if values.iter().any(|v| v.as_ref() == value) {
                ids.insert(id.clone());
            }
        }
        Ok(ids)
    }

    fn select(&self, ids: &HashSet<String>) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|(id, _)| ids.contains(*id))
            .map(|(_, alert)| alert)
            .collect()
    }
}

fn covers_all<S: AsRef<str>>(alert: &Alert, locations: &[S], notation: &str) -> bool {
    let codes = alert.get_geocode(notation);
    locations.iter().all(|loc| codes.contains(loc.as_ref()))
}

impl Extend<Alert> for Feed {
    fn extend<I: IntoIterator<Item = Alert>>(&mut self, iter: I) {
        for alert in iter {
            self.insert(alert);
        }
    }
}

impl FromIterator<Alert> for Feed {
    fn from_iter<I: IntoIterator<Item = Alert>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl From<Vec<Alert>> for Feed {
    fn from(alerts: Vec<Alert>) -> Self {
        Self::new(alerts)
    }
}

impl IntoIterator for Feed {
    type Item = Alert;
    type IntoIter = indexmap::map::IntoValues<String, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.into_values()
    }
}

impl<'a> IntoIterator for &'a Feed {
    type Item = &'a Alert;
    type IntoIter = indexmap::map::Values<'a, String, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.values()
    }
}

impl Add for Feed {
    type Output = Feed;

    fn add(mut self, other: Feed) -> Feed {
        self.merge(other);
        self
    }
}

impl Add<&Feed> for &Feed {
    type Output = Feed;

    fn add(self, other: &Feed) -> Feed {
        Feed::new(self.iter().chain(other.iter()).cloned())
    }
}

impl AddAssign for Feed {
    fn add_assign(&mut self, other: Feed) {
        self.merge(other);
    }
}

impl AddAssign<&Feed> for Feed {
    fn add_assign(&mut self, other: &Feed) {
        self.extend(other.iter().cloned());
    }
}
