//! Cross-field validation gating label submission.
//!
//! Every rule is checked independently and all failures are collected, so
//! the caller can surface each message on its own field.

use serde::Serialize;

use crate::models::label::parse_date;
use crate::models::LabelDraft;

/// The label fields a validation error can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    ProductName,
    ProductTypeName,
    ConservationTypeName,
    HandlingDate,
    ExpirationDate,
    ResponsibleName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Validate a draft for submission. An empty result means the draft is
/// submittable; at most one error is reported per field.
pub fn validate(draft: &LabelDraft) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if draft.product_name.trim().is_empty() {
        errors.push(FieldError::new(
            Field::ProductName,
            "Produto (Nome) é obrigatório.",
        ));
    }
    if draft.product_type_name.is_empty() {
        errors.push(FieldError::new(
            Field::ProductTypeName,
            "Tipo de Produto é obrigatório.",
        ));
    }
    if draft.conservation_type_name.is_empty() {
        errors.push(FieldError::new(
            Field::ConservationTypeName,
            "Tipo de Conservação é obrigatório.",
        ));
    }

    let handling = if draft.handling_date.is_empty() {
        errors.push(FieldError::new(
            Field::HandlingDate,
            "Data da Manipulação é obrigatória.",
        ));
        None
    } else {
        let parsed = parse_date(&draft.handling_date);
        if parsed.is_none() {
            errors.push(FieldError::new(
                Field::HandlingDate,
                "Data da Manipulação inválida.",
            ));
        }
        parsed
    };

    let expiration = if draft.expiration_date.is_empty() {
        errors.push(FieldError::new(
            Field::ExpirationDate,
            "Validade é obrigatória.",
        ));
        None
    } else {
        let parsed = parse_date(&draft.expiration_date);
        if parsed.is_none() {
            errors.push(FieldError::new(
                Field::ExpirationDate,
                "Data de Validade inválida.",
            ));
        }
        parsed
    };

    // Same-day expiration is allowed; only a strictly earlier date fails.
    if let (Some(handling), Some(expiration)) = (handling, expiration) {
        if expiration < handling {
            errors.push(FieldError::new(
                Field::ExpirationDate,
                "Validade não pode ser anterior à Data da Manipulação.",
            ));
        }
    }

    if draft.responsible_name.is_empty() {
        errors.push(FieldError::new(
            Field::ResponsibleName,
            "Responsável é obrigatório.",
        ));
    }

    // supplier_name is never required.
    errors
}
