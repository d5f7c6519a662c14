use crate::{
    error::{PlannerError, Result},
    schemas::{StructuredOutput, TextFields},
    structured_output,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::ops::Deref;

/// Characters that signal markdown or HTML leaking into plain prose.
const MARKUP_CHARS: &[char] = &['*', '#', '[', ']', '`', '<', '>'];

/// Destination and length of a trip to plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    destination: String,
    days: u32,
}

impl ItineraryRequest {
    /// Rejects a blank destination or a zero-day trip.
    pub fn new(destination: &str, days: u32) -> Result<Self> {
        let destination = destination.trim();
        if destination.is_empty() {
            return Err(PlannerError::InvalidRequest(
                "destination must not be blank".to_string(),
            ));
        }
        if days == 0 {
            return Err(PlannerError::InvalidRequest(
                "days must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            destination: destination.to_string(),
            days,
        })
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn days(&self) -> u32 {
        self.days
    }
}

/// One day of the trip, split into morning, afternoon and night.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[structured_output(name = "ItineraryDay")]
pub struct ItineraryDay {
    /// Day number and a short theme for the day, e.g. 'Day 1 - Arrival and Old Town'
    pub day: String,
    /// Suggested activity or place for the morning, with a brief description of the activity
    pub morning: String,
    /// Suggested activity or place for the afternoon, with a brief description of the activity
    pub afternoon: String,
    /// Dinner suggestion and/or a night-time activity
    pub night: String,
}

impl ItineraryDay {
    /// True when any text field carries markdown or HTML characters.
    pub fn contains_markup(&self) -> bool {
        self.text_fields()
            .iter()
            .any(|(_, text)| text.contains(MARKUP_CHARS) || text.contains("__"))
    }
}

/// Ordered day plans, day 1 first. Never empty once decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary(Vec<ItineraryDay>);

impl Itinerary {
    /// Schema handed to the provider as `responseSchema` and used to validate its reply.
    pub fn response_schema() -> Value {
        json!({
            "type": "array",
            "minItems": 1,
            "items": ItineraryDay::schema().provider_schema(),
        })
    }

    pub fn days(&self) -> &[ItineraryDay] {
        &self.0
    }

    pub fn into_days(self) -> Vec<ItineraryDay> {
        self.0
    }

    pub fn contains_markup(&self) -> bool {
        self.0.iter().any(ItineraryDay::contains_markup)
    }
}

impl Deref for Itinerary {
    type Target = [ItineraryDay];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for Itinerary {
    type Item = ItineraryDay;
    type IntoIter = std::vec::IntoIter<ItineraryDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Itinerary {
    type Item = &'a ItineraryDay;
    type IntoIter = std::slice::Iter<'a, ItineraryDay>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<ItineraryDay>> for Itinerary {
    fn from(days: Vec<ItineraryDay>) -> Self {
        Self(days)
    }
}
