//! Monitor query engine: filtering, sorting and expiration-window summaries
//! over the stored-label history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::label::format_date;
use crate::models::{Selection, StoredLabel};

/// Sparse filter over the history. Absent or empty fields constrain nothing;
/// present fields are combined conjunctively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Case-insensitive substring match.
    pub product_name: Option<String>,
    /// Case-insensitive substring match.
    pub supplier_name: Option<String>,
    /// Exact name match when selected.
    pub responsible_name: Selection,
    pub product_type_name: Selection,
    pub conservation_type_name: Selection,
    /// Inclusive `YYYY-MM-DD` bounds. Lexicographic comparison on the
    /// zero-padded form is chronological comparison.
    pub handling_date_from: Option<String>,
    pub handling_date_to: Option<String>,
    pub expiration_date_from: Option<String>,
    pub expiration_date_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    ExpirationDate,
    SubmissionTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortSpec {
    pub field: SortField,
    pub order: SortOrder,
}

impl Default for SortSpec {
    /// Newest submissions first, matching the monitor's default view.
    fn default() -> Self {
        Self {
            field: SortField::SubmissionTimestamp,
            order: SortOrder::Descending,
        }
    }
}

/// Label counts for the fixed yesterday/today/tomorrow expiration windows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirySummary {
    pub yesterday: usize,
    pub today: usize,
    pub tomorrow: usize,
}

fn active_text(filter: &Option<String>) -> Option<&str> {
    filter.as_deref().filter(|text| !text.is_empty())
}

fn active_range(bound: &Option<String>) -> Option<&str> {
    bound.as_deref().filter(|text| !text.is_empty())
}

fn matches(label: &StoredLabel, criteria: &FilterCriteria) -> bool {
    let draft = &label.draft;

    if let Some(needle) = active_text(&criteria.product_name) {
        if !draft
            .product_name
            .to_lowercase()
            .contains(&needle.to_lowercase())
        {
            return false;
        }
    }
    if let Some(needle) = active_text(&criteria.supplier_name) {
        if !draft
            .supplier_name
            .to_lowercase()
            .contains(&needle.to_lowercase())
        {
            return false;
        }
    }

    if let Some(name) = criteria.responsible_name.as_name() {
        if draft.responsible_name.as_name() != Some(name) {
            return false;
        }
    }
    if let Some(name) = criteria.product_type_name.as_name() {
        if draft.product_type_name.as_name() != Some(name) {
            return false;
        }
    }
    if let Some(name) = criteria.conservation_type_name.as_name() {
        if draft.conservation_type_name.as_name() != Some(name) {
            return false;
        }
    }

    if let Some(from) = active_range(&criteria.handling_date_from) {
        if draft.handling_date.as_str() < from {
            return false;
        }
    }
    if let Some(to) = active_range(&criteria.handling_date_to) {
        if draft.handling_date.as_str() > to {
            return false;
        }
    }
    if let Some(from) = active_range(&criteria.expiration_date_from) {
        if draft.expiration_date.as_str() < from {
            return false;
        }
    }
    if let Some(to) = active_range(&criteria.expiration_date_to) {
        if draft.expiration_date.as_str() > to {
            return false;
        }
    }

    true
}

/// Filter and sort the history. The sort is stable: labels comparing equal
/// on the sort key keep their input order, so identical inputs always yield
/// identical output.
pub fn query(
    labels: &[StoredLabel],
    criteria: &FilterCriteria,
    sort: SortSpec,
) -> Vec<StoredLabel> {
    let mut result: Vec<StoredLabel> = labels
        .iter()
        .filter(|label| matches(label, criteria))
        .cloned()
        .collect();

    result.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::ExpirationDate => a.draft.expiration_date.cmp(&b.draft.expiration_date),
            SortField::SubmissionTimestamp => a.submission_timestamp.cmp(&b.submission_timestamp),
        };
        match sort.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });

    result
}

/// Count labels expiring exactly yesterday, today and tomorrow relative to
/// the caller-supplied `today`. Always computed over the full, unfiltered
/// collection; comparison is calendar-date equality only.
pub fn expiry_summary(labels: &[StoredLabel], today: NaiveDate) -> ExpirySummary {
    let today_key = format_date(today);
    let yesterday_key = today.pred_opt().map(format_date);
    let tomorrow_key = today.succ_opt().map(format_date);

    let mut summary = ExpirySummary::default();
    for label in labels {
        let expiration = label.draft.expiration_date.as_str();
        if yesterday_key.as_deref() == Some(expiration) {
            summary.yesterday += 1;
        }
        if expiration == today_key {
            summary.today += 1;
        }
        if tomorrow_key.as_deref() == Some(expiration) {
            summary.tomorrow += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LabelDraft;

    fn label(
        id: &str,
        product: &str,
        handling: &str,
        expiration: &str,
        submitted: &str,
    ) -> StoredLabel {
        StoredLabel {
            id: id.into(),
            submission_timestamp: submitted.parse().unwrap(),
            draft: LabelDraft {
                product_name: product.into(),
                handling_date: handling.into(),
                expiration_date: expiration.into(),
                responsible_name: Selection::Name("Ana".into()),
                conservation_type_name: Selection::Name("Refrigerado".into()),
                product_type_name: Selection::Name("Massa cozida".into()),
                supplier_name: "Distribuidora Central".into(),
            },
        }
    }

    fn history() -> Vec<StoredLabel> {
        vec![
            label("1", "Lasanha", "2024-05-30", "2024-06-02", "2024-05-30T10:00:00Z"),
            label("2", "Bolo de fubá", "2024-06-01", "2024-06-01", "2024-06-01T08:00:00Z"),
            label("3", "Caldo verde", "2024-05-31", "2024-06-01", "2024-05-31T09:00:00Z"),
            label("4", "Pão caseiro", "2024-05-28", "2024-05-31", "2024-05-28T12:00:00Z"),
        ]
    }

    #[test]
    fn summary_counts_fixed_windows() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let summary = expiry_summary(&history(), today);
        assert_eq!(
            summary,
            ExpirySummary {
                yesterday: 1,
                today: 2,
                tomorrow: 1,
            }
        );
    }

    #[test]
    fn text_filter_is_case_insensitive_substring() {
        let criteria = FilterCriteria {
            product_name: Some("bolo".into()),
            ..FilterCriteria::default()
        };
        let result = query(&history(), &criteria, SortSpec::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].draft.product_name, "Bolo de fubá");
    }

    #[test]
    fn filters_combine_conjunctively() {
        // Matches the text filter but falls outside the date range.
        let criteria = FilterCriteria {
            product_name: Some("lasanha".into()),
            expiration_date_from: Some("2024-06-03".into()),
            ..FilterCriteria::default()
        };
        assert!(query(&history(), &criteria, SortSpec::default()).is_empty());
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let criteria = FilterCriteria {
            expiration_date_from: Some("2024-06-01".into()),
            expiration_date_to: Some("2024-06-01".into()),
            ..FilterCriteria::default()
        };
        let result = query(&history(), &criteria, SortSpec::default());
        let ids: Vec<&str> = result.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn exact_match_filter_excludes_other_names() {
        let mut criteria = FilterCriteria {
            responsible_name: Selection::Name("Bruno".into()),
            ..FilterCriteria::default()
        };
        assert!(query(&history(), &criteria, SortSpec::default()).is_empty());

        criteria.responsible_name = Selection::Name("Ana".into());
        assert_eq!(query(&history(), &criteria, SortSpec::default()).len(), 4);
    }

    #[test]
    fn empty_criteria_constrain_nothing() {
        let criteria = FilterCriteria {
            product_name: Some(String::new()),
            expiration_date_from: Some(String::new()),
            ..FilterCriteria::default()
        };
        assert_eq!(query(&history(), &criteria, SortSpec::default()).len(), 4);
    }

    #[test]
    fn sort_by_expiration_is_stable_both_ways() {
        let sort_asc = SortSpec {
            field: SortField::ExpirationDate,
            order: SortOrder::Ascending,
        };
        let asc = query(&history(), &FilterCriteria::default(), sort_asc);
        let ids: Vec<&str> = asc.iter().map(|l| l.id.as_str()).collect();
        // Labels 2 and 3 tie on 2024-06-01 and keep their input order.
        assert_eq!(ids, vec!["4", "2", "3", "1"]);

        let sort_desc = SortSpec {
            field: SortField::ExpirationDate,
            order: SortOrder::Descending,
        };
        let desc = query(&history(), &FilterCriteria::default(), sort_desc);
        let ids: Vec<&str> = desc.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn default_sort_is_newest_submission_first() {
        let result = query(&history(), &FilterCriteria::default(), SortSpec::default());
        let ids: Vec<&str> = result.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1", "4"]);
    }
}
