//! Upgrades older document shapes before deserialization.

use serde_json::{Map, Value};

use crate::core::errors::{LedgerError, Result};
use crate::domain::YearMonth;

/// Month that receives a legacy single `salary` value.
pub const DEFAULT_LEGACY_SALARY_MONTH: &str = "2025-05";

pub fn default_legacy_month() -> YearMonth {
    DEFAULT_LEGACY_SALARY_MONTH
        .parse()
        .expect("default legacy month is a valid key")
}

const LEGACY_SALARY: &str = "salary";
const MONTHLY_SALARIES: &str = "monthlySalaries";
const PAYMENTS: &str = "payments";
const CATEGORIES: &str = "categories";

/// Normalizes a raw document in place and returns a note per applied change.
pub fn migrate_document(document: &mut Value, legacy_month: YearMonth) -> Result<Vec<String>> {
    let root = document.as_object_mut().ok_or_else(|| {
        LedgerError::Persistence("document root must be a JSON object".into())
    })?;
    let mut notes = Vec::new();

    if is_missing(root, MONTHLY_SALARIES) {
        let mut salaries = Map::new();
        if let Some(amount) = root.get(LEGACY_SALARY).and_then(Value::as_f64) {
            salaries.insert(legacy_month.to_string(), Value::from(amount));
            notes.push(format!(
                "moved legacy salary {amount} into monthlySalaries[{legacy_month}]"
            ));
        } else {
            notes.push("initialized missing monthlySalaries".to_string());
        }
        root.insert(MONTHLY_SALARIES.into(), Value::Object(salaries));
    }

    if root.remove(LEGACY_SALARY).is_some() {
        notes.push("dropped legacy salary field".to_string());
    }

    for key in [PAYMENTS, CATEGORIES] {
        if is_missing(root, key) {
            root.insert(key.into(), Value::Array(Vec::new()));
            notes.push(format!("initialized missing {key}"));
        }
    }

    Ok(notes)
}

fn is_missing(root: &Map<String, Value>, key: &str) -> bool {
    matches!(root.get(key), None | Some(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn may() -> YearMonth {
        default_legacy_month()
    }

    #[test]
    fn moves_legacy_salary_into_fallback_month() {
        let mut doc = json!({"salary": 4200, "payments": [], "categories": []});
        let notes = migrate_document(&mut doc, may()).unwrap();
        assert_eq!(
            doc,
            json!({"monthlySalaries": {"2025-05": 4200.0}, "payments": [], "categories": []})
        );
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn drops_legacy_salary_even_when_monthly_map_exists() {
        let mut doc = json!({
            "salary": 1,
            "monthlySalaries": {"2024-01": 10},
            "payments": [],
            "categories": []
        });
        migrate_document(&mut doc, may()).unwrap();
        assert!(doc.get("salary").is_none());
        assert_eq!(doc["monthlySalaries"], json!({"2024-01": 10}));
    }

    #[test]
    fn current_documents_are_untouched() {
        let mut doc = json!({"monthlySalaries": {}, "payments": [], "categories": []});
        let before = doc.clone();
        assert!(migrate_document(&mut doc, may()).unwrap().is_empty());
        assert_eq!(doc, before);
    }

    #[test]
    fn fills_missing_collections() {
        let mut doc = json!({});
        migrate_document(&mut doc, may()).unwrap();
        assert_eq!(doc, json!({"monthlySalaries": {}, "payments": [], "categories": []}));
    }

    #[test]
    fn rejects_non_object_roots() {
        let mut doc = json!([1, 2, 3]);
        assert!(matches!(
            migrate_document(&mut doc, may()),
            Err(LedgerError::Persistence(_))
        ));
    }
}
