//! Food-safety label generator and expiration monitor backend.
//!
//! Reference registries feed a label form whose expiration date is derived
//! from the handling date and the selected conservation type's default shelf
//! life; validated submissions land in a local history that the monitor
//! filters, sorts and summarizes by expiration window. Remote collaborators
//! (notification webhook, remote database insert) are optional and never
//! block a submission.

pub mod db;
pub mod defaults;
pub mod form;
pub mod identity;
pub mod models;
pub mod monitor;
pub mod registry;
pub mod remote;
pub mod rules;
pub mod service;
pub mod settings;
pub mod validate;

pub use db::Database;
pub use form::{FormPhase, LabelForm};
pub use models::{
    ConservationType, ItemCatalogEntry, LabelDraft, ProductType, Responsible, Selection,
    StoredLabel, PRODUCT_TYPE_OTHER_NAME,
};
pub use monitor::{ExpirySummary, FilterCriteria, SortField, SortOrder, SortSpec};
pub use registry::Registry;
pub use remote::{RemoteClients, RemoteOutcome};
pub use rules::{resolve_expiration, RuleOutcome};
pub use service::{LabelService, SubmitReport, UNKNOWN_PRODUCT_TYPE};
pub use settings::{RemoteDatabaseSettings, RemoteSettings, SettingsStore};
pub use validate::{validate, Field, FieldError};
