//! Validity rule resolver: derives an expiration date from a handling date
//! and the selected conservation type's default shelf life.

use chrono::{Days, NaiveDate};

use crate::models::label::parse_date;
use crate::models::{ConservationType, Selection, PRODUCT_TYPE_OTHER_NAME};

/// Outcome of attempting to auto-derive an expiration date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// A rule applied; the expiration field should be overwritten with this
    /// date and treated as auto-computed.
    Auto(NaiveDate),
    /// No rule applies; the expiration field stays under manual control.
    NoRule,
}

impl RuleOutcome {
    pub fn is_auto(&self) -> bool {
        matches!(self, RuleOutcome::Auto(_))
    }
}

/// Resolve the expiration date for the current draft fields.
///
/// The "Outro (Validade Manual)" product type unconditionally disables
/// derivation. Otherwise a rule applies when the handling date parses, a
/// conservation type is selected, that name exists in the registry, and it
/// carries a validity-day count. Zero days is a valid rule (expires on the
/// handling day); a stale conservation name that matches nothing resolves to
/// no rule. Date addition happens in the pure calendar domain, so month and
/// year boundaries and DST shifts cannot skew it.
pub fn resolve_expiration(
    handling_date: &str,
    conservation_type_name: &Selection,
    product_type_name: &Selection,
    conservation_types: &[ConservationType],
) -> RuleOutcome {
    if product_type_name.as_name() == Some(PRODUCT_TYPE_OTHER_NAME) {
        return RuleOutcome::NoRule;
    }

    let Some(handling) = parse_date(handling_date) else {
        return RuleOutcome::NoRule;
    };
    let Some(selected) = conservation_type_name.as_name() else {
        return RuleOutcome::NoRule;
    };

    let rule_days = conservation_types
        .iter()
        .find(|ct| ct.name == selected)
        .and_then(|ct| ct.validity_days);

    match rule_days {
        Some(days) => match handling.checked_add_days(Days::new(u64::from(days))) {
            Some(expiration) => RuleOutcome::Auto(expiration),
            None => RuleOutcome::NoRule,
        },
        None => RuleOutcome::NoRule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conservation(name: &str, validity_days: Option<u32>) -> ConservationType {
        ConservationType {
            id: name.to_lowercase(),
            name: name.to_string(),
            validity_days,
        }
    }

    fn named(name: &str) -> Selection {
        Selection::Name(name.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn adds_validity_days_in_calendar_domain() {
        let types = vec![conservation("Refrigerado", Some(1)), conservation("Congelado", Some(5))];

        // Leap-day boundary.
        assert_eq!(
            resolve_expiration("2024-02-28", &named("Refrigerado"), &Selection::Empty, &types),
            RuleOutcome::Auto(date(2024, 2, 29))
        );
        // Year boundary.
        assert_eq!(
            resolve_expiration("2024-12-30", &named("Congelado"), &Selection::Empty, &types),
            RuleOutcome::Auto(date(2025, 1, 4))
        );
    }

    #[test]
    fn zero_days_is_a_real_rule() {
        let types = vec![conservation("Consumo imediato", Some(0))];
        assert_eq!(
            resolve_expiration(
                "2024-06-01",
                &named("Consumo imediato"),
                &Selection::Empty,
                &types
            ),
            RuleOutcome::Auto(date(2024, 6, 1))
        );
    }

    #[test]
    fn other_product_type_always_forces_manual_entry() {
        let types = vec![conservation("Refrigerado", Some(3))];
        assert_eq!(
            resolve_expiration(
                "2024-06-01",
                &named("Refrigerado"),
                &named(PRODUCT_TYPE_OTHER_NAME),
                &types
            ),
            RuleOutcome::NoRule
        );
    }

    #[test]
    fn missing_inputs_resolve_to_no_rule() {
        let types = vec![
            conservation("Refrigerado", Some(3)),
            conservation("A gosto", None),
        ];

        // No handling date, unparseable handling date.
        assert_eq!(
            resolve_expiration("", &named("Refrigerado"), &Selection::Empty, &types),
            RuleOutcome::NoRule
        );
        assert_eq!(
            resolve_expiration("01/06/2024", &named("Refrigerado"), &Selection::Empty, &types),
            RuleOutcome::NoRule
        );
        // No conservation selection.
        assert_eq!(
            resolve_expiration("2024-06-01", &Selection::Empty, &Selection::Empty, &types),
            RuleOutcome::NoRule
        );
        // Stale name that matches no registry entry.
        assert_eq!(
            resolve_expiration("2024-06-01", &named("Defumado"), &Selection::Empty, &types),
            RuleOutcome::NoRule
        );
        // Conservation type without a default shelf life.
        assert_eq!(
            resolve_expiration("2024-06-01", &named("A gosto"), &Selection::Empty, &types),
            RuleOutcome::NoRule
        );
    }
}
