//! Seeded reference data and validity-day input normalization.
//!
//! The initial catalog mirrors the kitchen's food-safety spreadsheet: a list
//! of product categories plus conservation methods whose shelf-life column
//! holds free text like "3 a 5 dias". Only the first embedded number is
//! meaningful for auto-derivation; ranges keep the conservative lower bound.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::identity;
use crate::models::{ConservationType, ProductType};

static FIRST_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid literal pattern"));

const INITIAL_PRODUCT_TYPES: &[&str] = &[
    "Laticínios (abertos)",
    "Queijos fracionados",
    "Massa cozida",
    "Hortifruti higienizado",
    "Carne crua congelada",
    "Carne crua resfriada",
    "Peixes e frutos do mar",
    "Frango cru resfriado",
    "Frango temperado",
    "Preparações prontas",
    "Sopas e caldos",
    "Doces e sobremesas",
    "Alimentos secos (arroz, farinha, grãos)",
    "Pães e bolos caseiros",
    "Ovos crus com casca",
    "Ovos cozidos descascados",
];

// (display name, shelf-life column from the spreadsheet)
const INITIAL_CONSERVATION_TYPES: &[(&str, &str)] = &[
    ("Refrigerado (Laticínios: 3 a 5 dias)", "3 a 5 dias"),
    ("Refrigerado (Queijos fracionados: 5 dias)", "5 dias"),
    ("Refrigerado (Massa cozida: 3 dias)", "3 dias"),
    ("Refrigerado (Hortifruti: 2 dias)", "2 dias"),
    ("Congelado (Carne crua: 90 dias)", "90 dias"),
    ("Refrigerado (Carne crua: 3 dias)", "3 dias"),
    ("Refrigerado (Peixes/Frutos do mar: 1 a 2 dias)", "1 a 2 dias"),
    ("Refrigerado (Frango cru: 2 dias)", "2 dias"),
    ("Refrigerado (Frango temperado: 1 a 2 dias)", "1 a 2 dias"),
    ("Refrigerado (Preparações prontas: 3 dias)", "3 dias"),
    ("Refrigerado (Sopas/Caldos: 3 dias)", "3 dias"),
    ("Refrigerado (Doces/Sobremesas: 3 a 5 dias)", "3 a 5 dias"),
    (
        "Temperatura ambiente (Alimentos secos: 30 a 90 dias)",
        "30 a 90 dias",
    ),
    ("Temperatura ambiente (Pães/Bolos: 3 dias)", "3 dias"),
    (
        "Refrigerado (Ovos crus c/ casca: 7 dias após abertura)",
        "7 dias (após abertura da caixa)",
    ),
    ("Refrigerado (Ovos cozidos descascados: 2 dias)", "2 dias"),
];

/// Extract the first whole number from spreadsheet-style shelf-life text.
/// `None` when the text carries no number at all.
pub fn parse_validity_days(raw: &str) -> Option<u32> {
    FIRST_NUMBER
        .find(raw)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// Normalize user input for a conservation type's validity days.
///
/// Empty input means "no automatic rule". Anything else must be a whole
/// non-negative number; negative or non-numeric input is rejected instead of
/// being silently coerced.
pub fn normalize_validity_input(raw: &str) -> Result<Option<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u32>() {
        Ok(days) => Ok(Some(days)),
        Err(_) => bail!("validade em dias deve ser um número inteiro não-negativo, não '{trimmed}'"),
    }
}

/// Product types seeded on first run, each with a freshly minted id.
pub fn initial_product_types() -> Vec<ProductType> {
    INITIAL_PRODUCT_TYPES
        .iter()
        .map(|name| ProductType {
            id: identity::new_id(),
            name: (*name).to_string(),
        })
        .collect()
}

/// Conservation types seeded on first run, with validity days parsed from
/// the spreadsheet column.
pub fn initial_conservation_types() -> Vec<ConservationType> {
    INITIAL_CONSERVATION_TYPES
        .iter()
        .map(|(name, spreadsheet_value)| ConservationType {
            id: identity::new_id(),
            name: (*name).to_string(),
            validity_days: parse_validity_days(spreadsheet_value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_validity_days_takes_first_number() {
        assert_eq!(parse_validity_days("3 a 5 dias"), Some(3));
        assert_eq!(parse_validity_days("90 dias"), Some(90));
        assert_eq!(parse_validity_days("7 dias (após abertura da caixa)"), Some(7));
        assert_eq!(parse_validity_days("sem prazo"), None);
        assert_eq!(parse_validity_days(""), None);
    }

    #[test]
    fn normalize_validity_input_rules() {
        assert_eq!(normalize_validity_input("").unwrap(), None);
        assert_eq!(normalize_validity_input("   ").unwrap(), None);
        assert_eq!(normalize_validity_input("5").unwrap(), Some(5));
        assert_eq!(normalize_validity_input(" 0 ").unwrap(), Some(0));
        assert!(normalize_validity_input("-2").is_err());
        assert!(normalize_validity_input("três").is_err());
        assert!(normalize_validity_input("3 dias").is_err());
    }

    #[test]
    fn seeded_collections_are_complete() {
        let product_types = initial_product_types();
        assert_eq!(product_types.len(), 16);

        let conservation_types = initial_conservation_types();
        assert_eq!(conservation_types.len(), 16);
        // Every seeded conservation method carries a derivable shelf life.
        assert!(conservation_types.iter().all(|ct| ct.validity_days.is_some()));

        let frozen = conservation_types
            .iter()
            .find(|ct| ct.name.starts_with("Congelado"))
            .unwrap();
        assert_eq!(frozen.validity_days, Some(90));
    }
}
