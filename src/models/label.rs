//! Label data models: the in-progress draft and the immutable stored record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Calendar-date wire format used by every date field on a label.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reserved product-type name whose selection disables automatic expiration
/// derivation; the expiration date must then be entered by hand.
pub const PRODUCT_TYPE_OTHER_NAME: &str = "Outro (Validade Manual)";

/// A dropdown-style selection: either a real registry name or nothing.
///
/// Serialized as the bare name string, with the empty string standing for
/// "no selection" (wire-compatible with the stored history). Modeled as an
/// explicit variant internally so a real name can never collide with the
/// sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    Name(String),
}

impl Selection {
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Selection::Empty
        } else {
            Selection::Name(raw.to_string())
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Selection::Empty => None,
            Selection::Name(name) => Some(name),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_name().unwrap_or(""))
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Selection::from_raw(&raw))
    }
}

/// Parse a `YYYY-MM-DD` field value into the pure calendar domain.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

/// Format a calendar date back into the `YYYY-MM-DD` field form.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// The single in-progress label being edited.
///
/// Date fields hold the raw `YYYY-MM-DD` field text rather than parsed dates
/// so the validator can report unparseable input instead of losing it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDraft {
    pub product_name: String,
    pub handling_date: String,
    pub expiration_date: String,
    pub responsible_name: Selection,
    pub conservation_type_name: Selection,
    pub product_type_name: Selection,
    pub supplier_name: String,
}

impl LabelDraft {
    /// A fresh draft with the handling date pre-filled to `today`.
    pub fn seeded(today: NaiveDate) -> Self {
        Self {
            handling_date: format_date(today),
            ..Self::default()
        }
    }

    pub fn handling_date_parsed(&self) -> Option<NaiveDate> {
        parse_date(&self.handling_date)
    }

    pub fn expiration_date_parsed(&self) -> Option<NaiveDate> {
        parse_date(&self.expiration_date)
    }
}

/// A committed label in the history collection. Immutable once created; the
/// core never deletes stored labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLabel {
    pub id: String,
    pub submission_timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub draft: LabelDraft,
}
