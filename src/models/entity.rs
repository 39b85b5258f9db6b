//! Reference-registry data models.
//!
//! Every registry record shares the same base shape: an opaque unique `id`
//! and a trimmed, non-empty `name`. Records are persisted as one flat JSON
//! collection per registry key.

use serde::{Deserialize, Serialize};

/// Common access to the `{ id, name }` base shape of a registry record.
pub trait NamedRecord {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
}

macro_rules! impl_named_record {
    ($ty:ty) => {
        impl NamedRecord for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn set_name(&mut self, name: String) {
                self.name = name;
            }
        }
    };
}

/// A staff member responsible for labeling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Responsible {
    pub id: String,
    pub name: String,
}

/// A product category, e.g. "Massa cozida".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductType {
    pub id: String,
    pub name: String,
}

/// A storage/preservation method, optionally carrying a default shelf life.
///
/// `validity_days: None` means "no automatic expiration rule"; `Some(0)` is a
/// real rule that expires the product on the handling day itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConservationType {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity_days: Option<u32>,
}

/// A specific catalog item (e.g. "Bolo de chocolate") linked to the
/// [`ProductType`] it belongs to. The link may dangle after the product type
/// is deleted; display code falls back to a placeholder in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCatalogEntry {
    pub id: String,
    pub name: String,
    pub product_type_id: String,
}

impl_named_record!(Responsible);
impl_named_record!(ProductType);
impl_named_record!(ConservationType);
impl_named_record!(ItemCatalogEntry);
