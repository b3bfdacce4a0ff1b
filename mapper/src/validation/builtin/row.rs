//! Row validators: rules spanning several fields of the same row.

use std::collections::BTreeSet;

use crate::models::WriteStrategy;
use crate::validation::{DependencyValidator, Outcome, RowContext, RowValidator};

/// A rule over a whole row.
pub trait RowCheck: Send + Sync {
    fn check(&self, ctx: &RowContext<'_>) -> Outcome;

    fn default_message(&self) -> String;

    /// Group used when none is configured.
    fn default_group(&self) -> String;
}

/// A [`RowCheck`] with its group, dependencies and presentation.
pub struct RowRule<C> {
    group: String,
    depends_on: BTreeSet<String>,
    message: String,
    strategy: WriteStrategy,
    check: C,
}

impl<C: RowCheck> RowRule<C> {
    pub fn new(check: C) -> Self {
        Self {
            group: check.default_group(),
            depends_on: BTreeSet::new(),
            message: check.default_message(),
            strategy: WriteStrategy::TextBox,
            check,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    pub fn requires<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on.extend(groups.into_iter().map(Into::into));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn strategy(mut self, strategy: WriteStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl<C: RowCheck> DependencyValidator for RowRule<C> {
    fn group(&self) -> &str {
        &self.group
    }

    fn depends_on(&self) -> &BTreeSet<String> {
        &self.depends_on
    }

    fn error_message(&self) -> &str {
        &self.message
    }

    fn write_strategy(&self) -> WriteStrategy {
        self.strategy
    }
}

impl<C: RowCheck> RowValidator for RowRule<C> {
    fn validate(&self, ctx: &RowContext<'_>) -> Outcome {
        self.check.check(ctx)
    }
}

/// At least one of the fields must be filled in.
#[derive(Debug, Clone)]
pub struct RequireOneOf {
    fields: Vec<String>,
}

impl RequireOneOf {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl RowCheck for RequireOneOf {
    fn check(&self, ctx: &RowContext<'_>) -> Outcome {
        self.fields.iter().any(|f| ctx.value(f).is_some()).into()
    }

    fn default_message(&self) -> String {
        format!("at least one of [{}] is required", self.fields.join(", "))
    }

    fn default_group(&self) -> String {
        format!("one-of:{}", self.fields.join(","))
    }
}

/// The fields are filled in together or left blank together.
#[derive(Debug, Clone)]
pub struct RequireTogether {
    fields: Vec<String>,
}

impl RequireTogether {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl RowCheck for RequireTogether {
    fn check(&self, ctx: &RowContext<'_>) -> Outcome {
        let filled = self.fields.iter().filter(|f| ctx.value(f).is_some()).count();
        (filled == 0 || filled == self.fields.len()).into()
    }

    fn default_message(&self) -> String {
        format!("[{}] must be filled in together", self.fields.join(", "))
    }

    fn default_group(&self) -> String {
        format!("together:{}", self.fields.join(","))
    }
}

/// Ad-hoc row rule from a closure.
pub struct FnRowCheck<F> {
    group: String,
    message: String,
    check: F,
}

impl<F> FnRowCheck<F>
where
    F: Fn(&RowContext<'_>) -> Outcome + Send + Sync,
{
    pub fn new(group: impl Into<String>, message: impl Into<String>, check: F) -> Self {
        Self {
            group: group.into(),
            message: message.into(),
            check,
        }
    }
}

impl<F> RowCheck for FnRowCheck<F>
where
    F: Fn(&RowContext<'_>) -> Outcome + Send + Sync,
{
    fn check(&self, ctx: &RowContext<'_>) -> Outcome {
        (self.check)(ctx)
    }

    fn default_message(&self) -> String {
        self.message.clone()
    }

    fn default_group(&self) -> String {
        self.group.clone()
    }
}
