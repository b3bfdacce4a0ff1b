//! Validator registry.
//!
//! Holds sheet validators in registration order and row/cell validators
//! bucketed by group. Groups remember the order in which they were first
//! seen; that order breaks ties when the dependency graph leaves two groups
//! unordered.

use std::collections::HashMap;

use super::{CellValidator, RowValidator, SheetValidator};

/// All row and cell validators sharing one group name.
pub struct ValidatorGroup {
    name: String,
    rows: Vec<Box<dyn RowValidator>>,
    cells: Vec<Box<dyn CellValidator>>,
}

impl ValidatorGroup {
    fn new(name: String) -> Self {
        Self {
            name,
            rows: Vec::new(),
            cells: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn row_validators(&self) -> &[Box<dyn RowValidator>] {
        &self.rows
    }

    pub fn cell_validators(&self) -> &[Box<dyn CellValidator>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.rows.len() + self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for ValidatorGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorGroup")
            .field("name", &self.name)
            .field("rows", &self.rows.len())
            .field("cells", &self.cells.len())
            .finish()
    }
}

/// Registry of every validator taking part in a session.
#[derive(Default)]
pub struct ValidatorRegistry {
    sheet_validators: Vec<Box<dyn SheetValidator>>,
    groups: Vec<ValidatorGroup>,
    group_index: HashMap<String, usize>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_sheet(&mut self, validator: Box<dyn SheetValidator>) -> &mut Self {
        self.sheet_validators.push(validator);
        self
    }

    pub fn register_row(&mut self, validator: Box<dyn RowValidator>) -> &mut Self {
        let group = validator.group().to_string();
        self.group_mut(group).rows.push(validator);
        self
    }

    pub fn register_cell(&mut self, validator: Box<dyn CellValidator>) -> &mut Self {
        let group = validator.group().to_string();
        self.group_mut(group).cells.push(validator);
        self
    }

    pub fn register_sheets<I>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn SheetValidator>>,
    {
        for v in validators {
            self.register_sheet(v);
        }
        self
    }

    pub fn register_rows<I>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn RowValidator>>,
    {
        for v in validators {
            self.register_row(v);
        }
        self
    }

    pub fn register_cells<I>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = Box<dyn CellValidator>>,
    {
        for v in validators {
            self.register_cell(v);
        }
        self
    }

    // Builder-style variants.

    pub fn with_sheet(mut self, validator: impl SheetValidator + 'static) -> Self {
        self.register_sheet(Box::new(validator));
        self
    }

    pub fn with_row(mut self, validator: impl RowValidator + 'static) -> Self {
        self.register_row(Box::new(validator));
        self
    }

    pub fn with_cell(mut self, validator: impl CellValidator + 'static) -> Self {
        self.register_cell(Box::new(validator));
        self
    }

    fn group_mut(&mut self, name: String) -> &mut ValidatorGroup {
        let idx = match self.group_index.get(&name) {
            Some(&idx) => idx,
            None => {
                let idx = self.groups.len();
                self.group_index.insert(name.clone(), idx);
                self.groups.push(ValidatorGroup::new(name));
                idx
            }
        };
        &mut self.groups[idx]
    }

    pub fn sheet_validators(&self) -> &[Box<dyn SheetValidator>] {
        &self.sheet_validators
    }

    /// Groups in first-registration order.
    pub fn groups(&self) -> &[ValidatorGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&ValidatorGroup> {
        self.group_index.get(name).map(|&idx| &self.groups[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.sheet_validators.is_empty() && self.groups.is_empty()
    }
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("sheet_validators", &self.sheet_validators.len())
            .field("groups", &self.groups)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::builtin::{
        FieldValidator, RequireFields, RequireOneOf, Required, RowRule,
    };

    #[test]
    fn test_groups_keep_first_registration_order() {
        let registry = ValidatorRegistry::new()
            .with_cell(FieldValidator::new("b", Required))
            .with_row(RowRule::new(RequireOneOf::new(["a", "b"])).in_group("either"))
            .with_cell(FieldValidator::new("a", Required))
            .with_cell(FieldValidator::new("b", Required).message("again"));

        let names: Vec<&str> = registry.groups().iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["b", "either", "a"]);
        assert_eq!(registry.group("b").unwrap().len(), 2);
        assert_eq!(registry.group("either").unwrap().row_validators().len(), 1);
    }

    #[test]
    fn test_within_group_order_preserved() {
        let registry = ValidatorRegistry::new()
            .with_cell(FieldValidator::new("x", Required).in_group("g").message("first"))
            .with_cell(FieldValidator::new("y", Required).in_group("g").message("second"));

        let messages: Vec<&str> = registry
            .group("g")
            .unwrap()
            .cell_validators()
            .iter()
            .map(|v| v.error_message())
            .collect();
        assert_eq!(messages, vec!["first", "second"]);
    }

    #[test]
    fn test_sheet_validators_do_not_create_groups() {
        let registry = ValidatorRegistry::new().with_sheet(RequireFields::new(["a"]));
        assert_eq!(registry.sheet_validators().len(), 1);
        assert!(registry.groups().is_empty());
        assert!(!registry.is_empty());
    }
}
