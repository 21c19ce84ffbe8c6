//! Observation domain model and write-boundary validation.
//!
//! # Responsibility
//! - Define the single stored entity of the ledger.
//! - Turn raw caller input into a validated `ObservationDraft`.
//!
//! # Invariants
//! - `item_name` is trimmed and never empty.
//! - `quantity` is never negative.
//! - `record_date` is a real calendar date written as `YYYY-MM-DD`.
//! - `sequence_id` is assigned by storage, never by callers.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Insertion-order identifier assigned by the ledger store.
///
/// Only meaningful as a tie-breaker between same-dated observations.
pub type SequenceId = i64;

/// Wire format of `record_date`, both in storage and at the input boundary.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Years that fit the four-digit `YYYY` field.
const RECORD_YEAR_RANGE: std::ops::RangeInclusive<i32> = 0..=9999;

static RECORD_DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid record date regex"));

/// Input field names used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationField {
    ItemName,
    Quantity,
    RecordDate,
}

impl ObservationField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ItemName => "item_name",
            Self::Quantity => "quantity",
            Self::RecordDate => "record_date",
        }
    }
}

/// Rejection reasons at the ledger write boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required input was absent or blank.
    MissingField(ObservationField),
    /// Quantity is not an integer, or is negative. Carries the raw input.
    InvalidQuantity(String),
    /// Date is not a valid `YYYY-MM-DD` calendar date. Carries the raw input.
    InvalidDate(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing required field `{}`", field.as_str()),
            Self::InvalidQuantity(value) => write!(
                f,
                "invalid quantity `{value}`; expected a non-negative integer"
            ),
            Self::InvalidDate(value) => {
                write!(f, "invalid record date `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl ValidationError {
    /// Stable machine-readable code; never contains caller input.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "missing_field",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::InvalidDate(_) => "invalid_date",
        }
    }
}

impl Error for ValidationError {}

/// One immutable stock snapshot stored in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Storage-assigned, strictly increasing insertion id.
    pub sequence_id: SequenceId,
    /// Case-sensitive grouping key.
    pub item_name: String,
    /// Absolute quantity on `record_date`.
    pub quantity: i64,
    /// Serialized as `YYYY-MM-DD`.
    pub record_date: NaiveDate,
}

impl Observation {
    /// Total recency order used by the latest-per-item reduction.
    ///
    /// Later `record_date` wins; on equal dates the higher `sequence_id` wins.
    /// Sequence ids are unique, so two distinct stored observations never
    /// compare equal.
    pub fn recency_key(&self) -> (NaiveDate, SequenceId) {
        (self.record_date, self.sequence_id)
    }

    /// Returns `true` when `self` replaces `other` as the current record.
    pub fn supersedes(&self, other: &Observation) -> bool {
        self.recency_key() > other.recency_key()
    }
}

/// Validated observation input, not yet assigned a sequence id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationDraft {
    item_name: String,
    quantity: i64,
    record_date: NaiveDate,
}

impl ObservationDraft {
    /// Validates raw textual input, as submitted by a form or command line.
    ///
    /// Blank inputs are reported as `MissingField` before any format check,
    /// checking `item_name`, then `quantity`, then `record_date`.
    pub fn parse(
        item_name: &str,
        quantity: &str,
        record_date: &str,
    ) -> Result<Self, ValidationError> {
        let item_name = required(item_name, ObservationField::ItemName)?;
        let quantity_text = required(quantity, ObservationField::Quantity)?;
        let record_date_text = required(record_date, ObservationField::RecordDate)?;

        let parsed = quantity_text
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidQuantity(quantity.to_string()))?;
        let quantity = non_negative(parsed, quantity)?;
        let record_date = parse_record_date(record_date_text)?;

        Ok(Self {
            item_name: item_name.to_string(),
            quantity,
            record_date,
        })
    }

    /// Validates already-typed input.
    ///
    /// Dates outside years `0000..=9999` have no `YYYY-MM-DD` spelling and
    /// are rejected as `InvalidDate`.
    pub fn new(
        item_name: impl Into<String>,
        quantity: i64,
        record_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let item_name = item_name.into();
        let trimmed = required(&item_name, ObservationField::ItemName)?;
        let quantity = non_negative(quantity, &quantity.to_string())?;
        if !RECORD_YEAR_RANGE.contains(&record_date.year()) {
            return Err(ValidationError::InvalidDate(format_record_date(record_date)));
        }
        Ok(Self {
            item_name: trimmed.to_string(),
            quantity,
            record_date,
        })
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn record_date(&self) -> NaiveDate {
        self.record_date
    }

    /// Binds the draft to its storage-assigned sequence id.
    pub fn into_observation(self, sequence_id: SequenceId) -> Observation {
        Observation {
            sequence_id,
            item_name: self.item_name,
            quantity: self.quantity,
            record_date: self.record_date,
        }
    }
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// Chrono alone accepts unpadded fields such as `2024-1-5`; the shape check
/// keeps stored dates lexicographically sortable.
pub fn parse_record_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if !RECORD_DATE_SHAPE_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidDate(value.to_string()));
    }
    NaiveDate::parse_from_str(trimmed, RECORD_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(value.to_string()))
}

/// Formats a date the way the ledger stores it.
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}

fn required(value: &str, field: ObservationField) -> Result<&str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed)
}

fn non_negative(quantity: i64, raw: &str) -> Result<i64, ValidationError> {
    if quantity < 0 {
        return Err(ValidationError::InvalidQuantity(raw.to_string()));
    }
    Ok(quantity)
}
