//! Category identity lookups and the case-insensitive name rule.

use std::collections::HashMap;

use uuid::Uuid;

use crate::core::errors::{LedgerError, Result};
use crate::domain::category::{normalize_name, Category};

/// Read-only index over a category list.
pub struct CategoryResolver<'a> {
    categories: &'a [Category],
    names: HashMap<Uuid, &'a str>,
}

impl<'a> CategoryResolver<'a> {
    pub fn new(categories: &'a [Category]) -> Self {
        let names = categories
            .iter()
            .map(|category| (category.id, category.name.as_str()))
            .collect();
        Self { categories, names }
    }

    /// Name for a reference; absent and dangling references both yield `None`.
    pub fn name_of(&self, id: Option<Uuid>) -> Option<&'a str> {
        id.and_then(|id| self.names.get(&id).copied())
    }

    /// Finds a category by case-insensitive name.
    pub fn find_by_name(&self, name: &str) -> Option<&'a Category> {
        let normalized = normalize_name(name);
        self.categories
            .iter()
            .find(|category| normalize_name(&category.name) == normalized)
    }

    /// Fails with `Conflict` when another category (other than `exclude`) has the name.
    pub fn ensure_unique(&self, candidate: &str, exclude: Option<Uuid>) -> Result<()> {
        let normalized = normalize_name(candidate);
        let duplicate = self.categories.iter().any(|category| {
            normalize_name(&category.name) == normalized
                && exclude.map_or(true, |id| category.id != id)
        });
        if duplicate {
            Err(LedgerError::Conflict(format!(
                "category `{}` already exists",
                candidate.trim()
            )))
        } else {
            Ok(())
        }
    }
}
