//! Label form state machine.
//!
//! Tracks the single in-progress draft, whether its expiration date is
//! currently auto-derived or manually overridden, and the field errors from
//! the last submit attempt. Every driving-field edit synchronously re-runs
//! the rule resolver on the latest draft before the next edit is accepted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::label::format_date;
use crate::models::{
    ConservationType, ItemCatalogEntry, LabelDraft, ProductType, Selection,
    PRODUCT_TYPE_OTHER_NAME,
};
use crate::rules::{resolve_expiration, RuleOutcome};
use crate::validate::{validate, Field, FieldError};

/// Lifecycle of the form. `AutoDerived` and `ManualOverride` are the two
/// flavors of "being edited with a value in the expiration field".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FormPhase {
    Empty,
    Editing,
    AutoDerived,
    ManualOverride,
    Submitting,
    Committed,
    /// The draft validated but could not be stored; it is retained for a
    /// retry.
    Failed,
}

#[derive(Debug, Clone)]
pub struct LabelForm {
    draft: LabelDraft,
    phase: FormPhase,
    errors: Vec<FieldError>,
    last_submitted: Option<LabelDraft>,
}

impl LabelForm {
    /// A fresh form seeded with `today` as the handling date.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            draft: LabelDraft::seeded(today),
            phase: FormPhase::Empty,
            errors: Vec::new(),
            last_submitted: None,
        }
    }

    pub fn draft(&self) -> &LabelDraft {
        &self.draft
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Whether the expiration field is currently owned by the resolver (the
    /// interface renders it read-only in that case).
    pub fn expiration_is_auto(&self) -> bool {
        self.phase == FormPhase::AutoDerived
    }

    pub fn last_submitted(&self) -> Option<&LabelDraft> {
        self.last_submitted.as_ref()
    }

    /// Edit the product name. A name matching a catalog entry pulls that
    /// entry's product type into the draft (one-way convenience; a dangling
    /// link clears the selection instead).
    pub fn set_product_name(
        &mut self,
        value: &str,
        items: &[ItemCatalogEntry],
        product_types: &[ProductType],
        conservation_types: &[ConservationType],
    ) {
        self.clear_error(Field::ProductName);
        self.draft.product_name = value.to_string();

        if let Some(entry) = items.iter().find(|item| item.name == value) {
            self.clear_error(Field::ProductTypeName);
            self.draft.product_type_name = product_types
                .iter()
                .find(|pt| pt.id == entry.product_type_id)
                .map(|pt| Selection::Name(pt.name.clone()))
                .unwrap_or(Selection::Empty);
        }

        self.recompute(conservation_types);
    }

    pub fn set_product_type(&mut self, value: &str, conservation_types: &[ConservationType]) {
        self.clear_error(Field::ProductTypeName);
        self.draft.product_type_name = Selection::from_raw(value);
        self.recompute(conservation_types);
    }

    pub fn set_conservation_type(&mut self, value: &str, conservation_types: &[ConservationType]) {
        self.clear_error(Field::ConservationTypeName);
        self.draft.conservation_type_name = Selection::from_raw(value);
        self.recompute(conservation_types);
    }

    pub fn set_handling_date(&mut self, value: &str, conservation_types: &[ConservationType]) {
        self.clear_error(Field::HandlingDate);
        self.draft.handling_date = value.to_string();
        self.recompute(conservation_types);
    }

    /// Direct edit of the expiration field: suspends auto-derivation until
    /// the next driving-field change.
    pub fn set_expiration_date(&mut self, value: &str) {
        self.clear_error(Field::ExpirationDate);
        self.draft.expiration_date = value.to_string();
        self.phase = FormPhase::ManualOverride;
    }

    pub fn set_responsible(&mut self, value: &str) {
        self.clear_error(Field::ResponsibleName);
        self.draft.responsible_name = Selection::from_raw(value);
        self.touch();
    }

    pub fn set_supplier_name(&mut self, value: &str) {
        self.draft.supplier_name = value.to_string();
        self.touch();
    }

    /// Validate and enter `Submitting`. On success the caller receives the
    /// draft to persist and must finish with [`commit`](Self::commit); on
    /// failure the form returns to `Editing` with the error set populated
    /// and the draft retained for correction.
    pub fn begin_submit(&mut self) -> Result<LabelDraft, Vec<FieldError>> {
        self.phase = FormPhase::Submitting;
        let errors = validate(&self.draft);
        if errors.is_empty() {
            self.errors.clear();
            Ok(self.draft.clone())
        } else {
            self.errors = errors.clone();
            self.phase = FormPhase::Editing;
            Err(errors)
        }
    }

    /// Record that a draft accepted by [`begin_submit`](Self::begin_submit)
    /// could not be persisted. The draft stays as it is and the form parks
    /// in `Failed` until the next edit.
    pub fn fail_submit(&mut self) {
        self.phase = FormPhase::Failed;
    }

    /// Finish a successful submission: remember the committed draft and
    /// reset to a fresh draft seeded with today's handling date.
    pub fn commit(&mut self, today: NaiveDate) {
        let committed = std::mem::replace(&mut self.draft, LabelDraft::seeded(today));
        self.last_submitted = Some(committed);
        self.errors.clear();
        self.phase = FormPhase::Committed;
    }

    /// Replace the draft with the previously committed one and re-run
    /// resolution to re-establish the auto/manual state. Does not
    /// re-validate; returns whether anything was loaded.
    pub fn load_last_submitted(&mut self, conservation_types: &[ConservationType]) -> bool {
        let Some(last) = self.last_submitted.clone() else {
            return false;
        };
        self.draft = last;
        self.errors.clear();
        self.phase = FormPhase::Editing;
        self.recompute(conservation_types);
        true
    }

    /// Re-derive the expiration field from the driving fields. Called after
    /// every driving-field edit, so a manual override never survives one.
    fn recompute(&mut self, conservation_types: &[ConservationType]) {
        let outcome = resolve_expiration(
            &self.draft.handling_date,
            &self.draft.conservation_type_name,
            &self.draft.product_type_name,
            conservation_types,
        );

        match outcome {
            RuleOutcome::Auto(expiration) => {
                self.draft.expiration_date = format_date(expiration);
                self.phase = FormPhase::AutoDerived;
            }
            RuleOutcome::NoRule => {
                // A previously derived value is stale once its handling date
                // is gone; keep it for every other no-rule reason.
                if self.phase == FormPhase::AutoDerived
                    && self.draft.handling_date.is_empty()
                    && !self.draft.conservation_type_name.is_empty()
                    && self.draft.product_type_name.as_name() != Some(PRODUCT_TYPE_OTHER_NAME)
                {
                    self.draft.expiration_date.clear();
                }
                self.phase = FormPhase::Editing;
            }
        }
    }

    fn clear_error(&mut self, field: Field) {
        self.errors.retain(|error| error.field != field);
    }

    /// Non-driving edits leave the auto/manual state alone but move a
    /// settled form back into `Editing`.
    fn touch(&mut self) {
        if matches!(
            self.phase,
            FormPhase::Empty | FormPhase::Committed | FormPhase::Failed
        ) {
            self.phase = FormPhase::Editing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conservation_types() -> Vec<ConservationType> {
        vec![
            ConservationType {
                id: "ct-1".into(),
                name: "Refrigerado (3 dias)".into(),
                validity_days: Some(3),
            },
            ConservationType {
                id: "ct-2".into(),
                name: "A gosto".into(),
                validity_days: None,
            },
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn starts_empty_and_seeded_with_today() {
        let form = LabelForm::new(today());
        assert_eq!(form.phase(), FormPhase::Empty);
        assert_eq!(form.draft().handling_date, "2024-06-01");
        assert!(form.draft().expiration_date.is_empty());
    }

    #[test]
    fn driving_fields_derive_expiration_then_manual_override_sticks() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());

        form.set_handling_date("2024-06-01", &types);
        form.set_product_type("Doces e sobremesas", &types);
        form.set_conservation_type("Refrigerado (3 dias)", &types);

        assert_eq!(form.phase(), FormPhase::AutoDerived);
        assert!(form.expiration_is_auto());
        assert_eq!(form.draft().expiration_date, "2024-06-04");

        // Direct edit takes over and survives non-driving edits.
        form.set_expiration_date("2024-06-10");
        assert_eq!(form.phase(), FormPhase::ManualOverride);
        form.set_supplier_name("Distribuidora X");
        form.set_responsible("Ana");
        assert_eq!(form.phase(), FormPhase::ManualOverride);
        assert_eq!(form.draft().expiration_date, "2024-06-10");

        // A driving-field change drops the override and re-derives.
        form.set_handling_date("2024-06-02", &types);
        assert_eq!(form.phase(), FormPhase::AutoDerived);
        assert_eq!(form.draft().expiration_date, "2024-06-05");
    }

    #[test]
    fn other_product_type_disables_derivation() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());

        form.set_conservation_type("Refrigerado (3 dias)", &types);
        assert_eq!(form.phase(), FormPhase::AutoDerived);

        form.set_product_type(PRODUCT_TYPE_OTHER_NAME, &types);
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(!form.expiration_is_auto());
        // The previously derived value is kept for manual adjustment.
        assert_eq!(form.draft().expiration_date, "2024-06-04");
    }

    #[test]
    fn clearing_handling_date_clears_a_derived_expiration() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());

        form.set_conservation_type("Refrigerado (3 dias)", &types);
        assert_eq!(form.draft().expiration_date, "2024-06-04");

        form.set_handling_date("", &types);
        assert_eq!(form.phase(), FormPhase::Editing);
        assert!(form.draft().expiration_date.is_empty());
    }

    #[test]
    fn manual_value_survives_losing_the_rule() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());

        form.set_expiration_date("2024-07-01");
        form.set_conservation_type("A gosto", &types);
        assert_eq!(form.draft().expiration_date, "2024-07-01");
    }

    #[test]
    fn catalog_match_pulls_product_type() {
        let types = conservation_types();
        let product_types = vec![ProductType {
            id: "pt-1".into(),
            name: "Doces e sobremesas".into(),
        }];
        let items = vec![
            ItemCatalogEntry {
                id: "it-1".into(),
                name: "Bolo de chocolate".into(),
                product_type_id: "pt-1".into(),
            },
            ItemCatalogEntry {
                id: "it-2".into(),
                name: "Pavê".into(),
                product_type_id: "pt-deleted".into(),
            },
        ];

        let mut form = LabelForm::new(today());
        form.set_product_name("Bolo de chocolate", &items, &product_types, &types);
        assert_eq!(
            form.draft().product_type_name,
            Selection::Name("Doces e sobremesas".into())
        );

        // Dangling link degrades to no selection instead of crashing.
        form.set_product_name("Pavê", &items, &product_types, &types);
        assert_eq!(form.draft().product_type_name, Selection::Empty);

        // Unknown product names leave the selection alone.
        form.set_product_type("Massa cozida", &types);
        form.set_product_name("Improviso", &items, &product_types, &types);
        assert_eq!(
            form.draft().product_type_name,
            Selection::Name("Massa cozida".into())
        );
    }

    #[test]
    fn failed_submit_keeps_draft_and_collects_errors() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());
        form.set_product_name("Bolo", &[], &[], &types);

        let errors = form.begin_submit().unwrap_err();
        assert!(!errors.is_empty());
        assert_eq!(form.phase(), FormPhase::Editing);
        assert_eq!(form.draft().product_name, "Bolo");
        assert_eq!(form.errors().len(), errors.len());

        // Correcting a field clears that field's error.
        let before = form.errors().len();
        form.set_responsible("Ana");
        assert_eq!(form.errors().len(), before - 1);
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn unpersisted_submission_parks_in_failed_until_edited() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());
        form.set_product_name("Bolo", &[], &[], &types);
        form.set_product_type("Doces e sobremesas", &types);
        form.set_conservation_type("Refrigerado (3 dias)", &types);
        form.set_responsible("Ana");

        form.begin_submit().unwrap();
        form.fail_submit();
        assert_eq!(form.phase(), FormPhase::Failed);
        assert_eq!(form.draft().product_name, "Bolo");
        assert!(form.last_submitted().is_none());

        form.set_supplier_name("Distribuidora X");
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[test]
    fn commit_resets_and_load_last_restores_with_rederivation() {
        let types = conservation_types();
        let mut form = LabelForm::new(today());

        form.set_product_name("Bolo", &[], &[], &types);
        form.set_product_type("Doces e sobremesas", &types);
        form.set_conservation_type("Refrigerado (3 dias)", &types);
        form.set_responsible("Ana");

        let draft = form.begin_submit().unwrap();
        assert_eq!(form.phase(), FormPhase::Submitting);
        form.commit(NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());

        assert_eq!(form.phase(), FormPhase::Committed);
        assert_eq!(form.draft().handling_date, "2024-06-02");
        assert!(form.draft().product_name.is_empty());
        assert_eq!(form.last_submitted(), Some(&draft));

        assert!(form.load_last_submitted(&types));
        assert_eq!(form.draft(), &draft);
        assert_eq!(form.phase(), FormPhase::AutoDerived);
    }

    #[test]
    fn load_last_without_history_is_a_no_op() {
        let mut form = LabelForm::new(today());
        assert!(!form.load_last_submitted(&conservation_types()));
        assert_eq!(form.phase(), FormPhase::Empty);
    }
}
