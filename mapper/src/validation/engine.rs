//! Per-row execution of validator groups.
//!
//! Groups run in dependency order. A group whose dependency failed or was
//! skipped on this row is itself skipped, which cascades down the order.
//! Inside a group every validator runs, so independent failures on one row
//! are all reported. Group status lives only for the row being validated.

use std::collections::HashMap;

use crate::models::{ErrorMessage, HeaderFields, Row, SheetMeta};

use super::graph::DependencyGraph;
use super::registry::{ValidatorGroup, ValidatorRegistry};
use super::{CellValidator, Outcome, RowContext};

/// Status of one group for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupStatus {
    Pass,
    Fail,
    Skipped,
}

/// What happened to a single row.
#[derive(Debug, Clone, Default)]
pub struct RowOutcome {
    /// Group statuses in execution order.
    pub statuses: Vec<(String, GroupStatus)>,
    pub messages: Vec<ErrorMessage>,
}

impl RowOutcome {
    pub fn status(&self, group: &str) -> Option<GroupStatus> {
        self.statuses.iter().find(|(g, _)| g == group).map(|(_, s)| *s)
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Runs every group against one row at a time.
pub struct RowValidationEngine<'a> {
    registry: &'a ValidatorRegistry,
    graph: &'a DependencyGraph,
    order: &'a [String],
    meta: &'a SheetMeta,
    fields: &'a HeaderFields,
    sheet_index: usize,
}

impl<'a> RowValidationEngine<'a> {
    /// `order` must be a dependency-respecting order over the graph's groups.
    pub fn new(
        registry: &'a ValidatorRegistry,
        graph: &'a DependencyGraph,
        order: &'a [String],
        meta: &'a SheetMeta,
        fields: &'a HeaderFields,
        sheet_index: usize,
    ) -> Self {
        Self {
            registry,
            graph,
            order,
            meta,
            fields,
            sheet_index,
        }
    }

    pub fn validate_row(&self, row: &Row) -> RowOutcome {
        let mut status: HashMap<&str, GroupStatus> = HashMap::with_capacity(self.order.len());
        let mut outcome = RowOutcome::default();
        let ctx = RowContext {
            row,
            fields: self.fields,
            meta: self.meta,
        };

        for name in self.order {
            let Some(group) = self.registry.group(name) else {
                continue;
            };

            let blocked = self.graph.dependencies(name).is_some_and(|deps| {
                deps.iter()
                    .any(|dep| status.get(dep.as_str()) != Some(&GroupStatus::Pass))
            });

            let group_status = if blocked {
                GroupStatus::Skipped
            } else {
                let before = outcome.messages.len();
                self.run_group(group, &ctx, &mut outcome.messages);
                if outcome.messages.len() > before {
                    GroupStatus::Fail
                } else {
                    GroupStatus::Pass
                }
            };

            status.insert(name.as_str(), group_status);
            outcome.statuses.push((name.clone(), group_status));
        }

        outcome
    }

    fn run_group(
        &self,
        group: &ValidatorGroup,
        ctx: &RowContext<'_>,
        messages: &mut Vec<ErrorMessage>,
    ) {
        for validator in group.row_validators() {
            if validator.validate(ctx) == Outcome::Fail {
                messages.push(ErrorMessage::row(
                    validator.write_strategy(),
                    validator.error_message(),
                    self.sheet_index,
                    ctx.row.index,
                ));
            }
        }

        for validator in group.cell_validators() {
            for cell in ctx.row.cells() {
                if self.fields.field(cell.column_index) != Some(validator.field()) {
                    continue;
                }
                if validator.validate(cell, self.meta) == Outcome::Fail {
                    messages.push(ErrorMessage::cell(
                        validator.write_strategy(),
                        validator.error_message(),
                        self.sheet_index,
                        cell.row_index,
                        cell.column_index,
                    ));
                }
            }
        }
    }
}
