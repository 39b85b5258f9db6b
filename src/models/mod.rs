pub mod entity;
pub mod label;

pub use entity::{ConservationType, ItemCatalogEntry, NamedRecord, ProductType, Responsible};
pub use label::{LabelDraft, Selection, StoredLabel, DATE_FORMAT, PRODUCT_TYPE_OTHER_NAME};
