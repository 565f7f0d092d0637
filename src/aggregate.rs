use std::collections::BTreeMap;

use crate::models::ExpenseRecord;

/// Sums amounts grouped by category. Pure; accumulates in input order so
/// floating-point totals are deterministic for a given record sequence.
/// Zero and negative amounts participate like any other value.
pub fn aggregate_by_category(records: &[ExpenseRecord]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.category.clone()).or_insert(0.0) += record.amount;
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: &str, amount: f64) -> ExpenseRecord {
        ExpenseRecord {
            id: 0,
            account_id: 1,
            category: category.to_string(),
            amount,
            date: "2024-01-01".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(aggregate_by_category(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_categories_are_summed() {
        let records = vec![
            record("Food", 10.0),
            record("Food", 5.0),
            record("Travel", 3.0),
        ];
        let totals = aggregate_by_category(&records);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Food"], 15.0);
        assert_eq!(totals["Travel"], 3.0);
    }

    #[test]
    fn test_zero_and_negative_amounts() {
        let records = vec![
            record("Bills", -20.0),
            record("Bills", 0.0),
            record("Bills", 5.0),
        ];
        let totals = aggregate_by_category(&records);
        assert_eq!(totals["Bills"], -15.0);
    }
}
