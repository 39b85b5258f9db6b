//! Session-level controller: owns the registries, the form, the stored-label
//! history and the collaborators, and wires them into the submit pipeline.

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::db::{keys, Database};
use crate::defaults;
use crate::form::LabelForm;
use crate::identity;
use crate::models::{
    ConservationType, ItemCatalogEntry, ProductType, Responsible, StoredLabel,
};
use crate::monitor::{self, ExpirySummary, FilterCriteria, SortSpec};
use crate::registry::Registry;
use crate::remote::{RemoteClients, RemoteOutcome};
use crate::settings::RemoteSettings;
use crate::validate::FieldError;

/// Placeholder shown when a catalog entry points at a deleted product type.
pub const UNKNOWN_PRODUCT_TYPE: &str = "Tipo desconhecido";

/// Composite result of one submit attempt. Remote failures never block the
/// submission; they are folded into the message instead.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReport {
    pub committed: bool,
    pub errors: Vec<FieldError>,
    pub webhook: RemoteOutcome,
    pub remote_db: RemoteOutcome,
    pub message: String,
}

impl SubmitReport {
    fn rejected(errors: Vec<FieldError>) -> Self {
        Self {
            committed: false,
            errors,
            webhook: RemoteOutcome::NotConfigured,
            remote_db: RemoteOutcome::NotConfigured,
            message: "Por favor, corrija os erros no formulário.".to_string(),
        }
    }
}

pub struct LabelService {
    db: Database,
    remotes: RemoteClients,
    responsibles: Registry<Responsible>,
    product_types: Registry<ProductType>,
    items: Registry<ItemCatalogEntry>,
    conservation_types: Registry<ConservationType>,
    history: Vec<StoredLabel>,
    form: LabelForm,
}

impl LabelService {
    /// Load every collection, seeding product and conservation types from
    /// the built-in catalog on first run (or when the stored state is
    /// malformed).
    pub async fn open(db: Database, settings: RemoteSettings) -> Result<Self> {
        let responsibles = db.load_or_default(keys::RESPONSIBLES, Vec::new()).await?;
        let product_types = db
            .load_or_default(keys::PRODUCT_TYPES, defaults::initial_product_types())
            .await?;
        let items = db.load_or_default(keys::ITEMS, Vec::new()).await?;
        let conservation_types = db
            .load_or_default(
                keys::CONSERVATION_TYPES,
                defaults::initial_conservation_types(),
            )
            .await?;
        let history = db.load_or_default(keys::STORED_LABELS, Vec::new()).await?;

        Ok(Self {
            db,
            remotes: RemoteClients::new(settings),
            responsibles: Registry::new(responsibles),
            product_types: Registry::new(product_types),
            items: Registry::new(items),
            conservation_types: Registry::new(conservation_types),
            history,
            form: LabelForm::new(identity::today()),
        })
    }

    pub fn responsibles(&self) -> &[Responsible] {
        self.responsibles.records()
    }

    pub fn product_types(&self) -> &[ProductType] {
        self.product_types.records()
    }

    pub fn items(&self) -> &[ItemCatalogEntry] {
        self.items.records()
    }

    pub fn conservation_types(&self) -> &[ConservationType] {
        self.conservation_types.records()
    }

    pub fn history(&self) -> &[StoredLabel] {
        &self.history
    }

    pub fn form(&self) -> &LabelForm {
        &self.form
    }

    // ---- reference registries -------------------------------------------

    pub async fn add_responsible(&mut self, name: &str) -> Result<Responsible> {
        let record = Responsible {
            id: identity::new_id(),
            name: name.to_string(),
        };
        self.responsibles.insert(record.clone())?;
        self.db
            .save_collection(keys::RESPONSIBLES, self.responsibles.records())
            .await?;
        Ok(record)
    }

    pub async fn rename_responsible(&mut self, id: &str, name: &str) -> Result<()> {
        self.responsibles.rename(id, name)?;
        self.db
            .save_collection(keys::RESPONSIBLES, self.responsibles.records())
            .await
    }

    pub async fn delete_responsible(&mut self, id: &str) -> Result<bool> {
        let removed = self.responsibles.remove(id);
        if removed {
            self.db
                .save_collection(keys::RESPONSIBLES, self.responsibles.records())
                .await?;
        }
        Ok(removed)
    }

    pub async fn add_product_type(&mut self, name: &str) -> Result<ProductType> {
        let record = ProductType {
            id: identity::new_id(),
            name: name.to_string(),
        };
        self.product_types.insert(record.clone())?;
        self.db
            .save_collection(keys::PRODUCT_TYPES, self.product_types.records())
            .await?;
        Ok(record)
    }

    pub async fn rename_product_type(&mut self, id: &str, name: &str) -> Result<()> {
        self.product_types.rename(id, name)?;
        self.db
            .save_collection(keys::PRODUCT_TYPES, self.product_types.records())
            .await
    }

    /// Deleting a product type leaves any catalog entries pointing at it
    /// dangling; display falls back to [`UNKNOWN_PRODUCT_TYPE`].
    pub async fn delete_product_type(&mut self, id: &str) -> Result<bool> {
        let removed = self.product_types.remove(id);
        if removed {
            self.db
                .save_collection(keys::PRODUCT_TYPES, self.product_types.records())
                .await?;
        }
        Ok(removed)
    }

    pub async fn add_item(&mut self, name: &str, product_type_id: &str) -> Result<ItemCatalogEntry> {
        if product_type_id.trim().is_empty() {
            bail!("item precisa de um tipo de produto");
        }
        let record = ItemCatalogEntry {
            id: identity::new_id(),
            name: name.to_string(),
            product_type_id: product_type_id.to_string(),
        };
        self.items.insert(record.clone())?;
        self.db
            .save_collection(keys::ITEMS, self.items.records())
            .await?;
        Ok(record)
    }

    pub async fn update_item(&mut self, id: &str, name: &str, product_type_id: &str) -> Result<()> {
        if product_type_id.trim().is_empty() {
            bail!("item precisa de um tipo de produto");
        }
        self.items.rename(id, name)?;
        if let Some(item) = self.items.get_mut(id) {
            item.product_type_id = product_type_id.to_string();
        }
        self.db
            .save_collection(keys::ITEMS, self.items.records())
            .await
    }

    pub async fn delete_item(&mut self, id: &str) -> Result<bool> {
        let removed = self.items.remove(id);
        if removed {
            self.db
                .save_collection(keys::ITEMS, self.items.records())
                .await?;
        }
        Ok(removed)
    }

    pub async fn add_conservation_type(
        &mut self,
        name: &str,
        validity_input: &str,
    ) -> Result<ConservationType> {
        let validity_days = defaults::normalize_validity_input(validity_input)?;
        let record = ConservationType {
            id: identity::new_id(),
            name: name.to_string(),
            validity_days,
        };
        self.conservation_types.insert(record.clone())?;
        self.db
            .save_collection(keys::CONSERVATION_TYPES, self.conservation_types.records())
            .await?;
        Ok(record)
    }

    pub async fn update_conservation_type(
        &mut self,
        id: &str,
        name: &str,
        validity_input: &str,
    ) -> Result<()> {
        let validity_days = defaults::normalize_validity_input(validity_input)?;
        self.conservation_types.rename(id, name)?;
        if let Some(record) = self.conservation_types.get_mut(id) {
            record.validity_days = validity_days;
        }
        self.db
            .save_collection(keys::CONSERVATION_TYPES, self.conservation_types.records())
            .await
    }

    pub async fn delete_conservation_type(&mut self, id: &str) -> Result<bool> {
        let removed = self.conservation_types.remove(id);
        if removed {
            self.db
                .save_collection(keys::CONSERVATION_TYPES, self.conservation_types.records())
                .await?;
        }
        Ok(removed)
    }

    /// Display name of a catalog entry's product type, degrading to a
    /// placeholder when the reference dangles.
    pub fn item_product_type_name(&self, entry: &ItemCatalogEntry) -> &str {
        self.product_types
            .get(&entry.product_type_id)
            .map(|pt| pt.name.as_str())
            .unwrap_or(UNKNOWN_PRODUCT_TYPE)
    }

    // ---- form edits ------------------------------------------------------

    pub fn edit_product_name(&mut self, value: &str) {
        self.form.set_product_name(
            value,
            self.items.records(),
            self.product_types.records(),
            self.conservation_types.records(),
        );
    }

    pub fn edit_product_type(&mut self, value: &str) {
        self.form
            .set_product_type(value, self.conservation_types.records());
    }

    pub fn edit_conservation_type(&mut self, value: &str) {
        self.form
            .set_conservation_type(value, self.conservation_types.records());
    }

    pub fn edit_handling_date(&mut self, value: &str) {
        self.form
            .set_handling_date(value, self.conservation_types.records());
    }

    pub fn edit_expiration_date(&mut self, value: &str) {
        self.form.set_expiration_date(value);
    }

    pub fn edit_responsible(&mut self, value: &str) {
        self.form.set_responsible(value);
    }

    pub fn edit_supplier_name(&mut self, value: &str) {
        self.form.set_supplier_name(value);
    }

    pub fn load_last_submitted(&mut self) -> bool {
        self.form
            .load_last_submitted(self.conservation_types.records())
    }

    // ---- submission ------------------------------------------------------

    /// Validate the draft, persist it to the local history, then attempt the
    /// two remote collaborators concurrently and combine their outcomes. A
    /// failed local save rolls the history entry back and parks the form in
    /// `Failed`, so a retry resubmits the same draft instead of minting a
    /// duplicate.
    pub async fn submit(&mut self) -> Result<SubmitReport> {
        let draft = match self.form.begin_submit() {
            Ok(draft) => draft,
            Err(errors) => return Ok(SubmitReport::rejected(errors)),
        };

        let label = StoredLabel {
            id: identity::new_id(),
            submission_timestamp: identity::now(),
            draft: draft.clone(),
        };
        self.history.push(label.clone());
        if let Err(err) = self
            .db
            .save_collection(keys::STORED_LABELS, &self.history)
            .await
        {
            self.history.pop();
            self.form.fail_submit();
            return Err(err);
        }

        // Independent boundary calls: neither blocks the other's attempt.
        let (webhook, remote_db) = tokio::join!(
            self.remotes.notify_webhook(&draft),
            self.remotes.insert_label(&label)
        );

        self.form.commit(identity::today());

        let message = compose_message(&webhook, &remote_db);
        Ok(SubmitReport {
            committed: true,
            errors: Vec::new(),
            webhook,
            remote_db,
            message,
        })
    }

    // ---- monitor ---------------------------------------------------------

    pub fn query_history(&self, criteria: &FilterCriteria, sort: SortSpec) -> Vec<StoredLabel> {
        monitor::query(&self.history, criteria, sort)
    }

    /// Always over the full, unfiltered history.
    pub fn expiry_summary(&self, today: NaiveDate) -> ExpirySummary {
        monitor::expiry_summary(&self.history, today)
    }
}

fn compose_message(webhook: &RemoteOutcome, remote_db: &RemoteOutcome) -> String {
    let webhook_part = match webhook {
        RemoteOutcome::NotConfigured => "Webhook não configurado. ".to_string(),
        RemoteOutcome::Delivered => "Enviada para o webhook. ".to_string(),
        RemoteOutcome::Failed(err) => format!("Falha no webhook: {err}. "),
    };
    let db_part = match remote_db {
        RemoteOutcome::NotConfigured => "Banco de dados remoto não configurado.".to_string(),
        RemoteOutcome::Delivered => "Salva no banco de dados!".to_string(),
        RemoteOutcome::Failed(err) => format!("Erro no banco de dados remoto: {err}."),
    };

    if webhook.is_failure() || remote_db.is_failure() {
        format!("Concluído com problemas: {webhook_part}{db_part}")
    } else {
        format!("Sucesso! {webhook_part}{db_part}")
    }
}
