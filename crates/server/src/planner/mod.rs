//! Partial update (PATCH) planning.
//!
//! A PATCH request carries only the fields the client wants to change. The
//! planner compares that partial payload with the persisted row and produces
//! an [`UpdatePlan`]: the minimal ordered list of column assignments plus the
//! id predicate.
//!
//! Column names in a plan always come from a closed enum implementing
//! [`Column`], never from request keys, so the dynamic `SET` list cannot be
//! used for injection. Values are always bound as parameters.
//!
//! A plan is never empty: [`PlanBuilder::finish`] rejects an empty assignment
//! list with [`PlanError::NothingToUpdate`] so the store is not called.

pub mod product;
pub mod user;

use thiserror::Error;

pub use product::{ProductColumn, ProductPatch, plan_product_update};
pub use user::{UserColumn, UserPatch, plan_user_update};

/// Errors produced while planning an update.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// No submitted field differs from the persisted row.
    #[error("no data to update")]
    NothingToUpdate,

    /// A submitted field holds a value the entity can never take.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// A trusted column of an entity table.
pub trait Column: Copy + Eq + std::fmt::Debug {
    /// Table the column belongs to.
    const TABLE: &'static str;

    /// Column name as it appears in the schema.
    fn name(self) -> &'static str;
}

/// A value to bind for one column assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Bool(bool),
}

/// An ordered, non-empty set of column assignments for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdatePlan<C: Column> {
    id: i64,
    assignments: Vec<(C, ColumnValue)>,
}

impl<C: Column> UpdatePlan<C> {
    /// Row id the plan applies to.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }

    /// Column assignments in the order they were planned.
    #[must_use]
    pub fn assignments(&self) -> &[(C, ColumnValue)] {
        &self.assignments
    }

    /// Columns touched by the plan.
    pub fn columns(&self) -> impl Iterator<Item = C> + '_ {
        self.assignments.iter().map(|(column, _)| *column)
    }
}

#[cfg(test)]
impl<C: Column> UpdatePlan<C> {
    /// Value assigned to `column`, if the plan touches it.
    pub(crate) fn value_of(&self, column: C) -> Option<&ColumnValue> {
        self.assignments
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, value)| value)
    }
}

/// Accumulates assignments for a single row.
#[derive(Debug)]
pub struct PlanBuilder<C: Column> {
    id: i64,
    assignments: Vec<(C, ColumnValue)>,
}

impl<C: Column> PlanBuilder<C> {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self {
            id,
            assignments: Vec::new(),
        }
    }

    /// Assign `value` to `column`, replacing an earlier assignment to the same column.
    pub fn set(&mut self, column: C, value: ColumnValue) -> &mut Self {
        if let Some(slot) = self.assignments.iter_mut().find(|(c, _)| *c == column) {
            slot.1 = value;
        } else {
            self.assignments.push((column, value));
        }
        self
    }

    /// Assign a string column if the submitted value is not blank and differs.
    pub fn set_text(&mut self, column: C, submitted: Option<&str>, current: &str) -> &mut Self {
        if let Some(value) = submitted.filter(|v| !v.trim().is_empty() && *v != current) {
            self.set(column, ColumnValue::Text(value.to_owned()));
        }
        self
    }

    /// Assign a float column if a value was submitted and differs.
    pub fn set_real(&mut self, column: C, submitted: Option<f64>, current: f64) -> &mut Self {
        if let Some(value) = submitted.filter(|v| v.to_bits() != current.to_bits()) {
            self.set(column, ColumnValue::Real(value));
        }
        self
    }

    /// Assign a flag column if a value was submitted and differs.
    pub fn set_bool(&mut self, column: C, submitted: Option<bool>, current: bool) -> &mut Self {
        if let Some(value) = submitted.filter(|v| *v != current) {
            self.set(column, ColumnValue::Bool(value));
        }
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Seal the plan.
    ///
    /// # Errors
    ///
    /// Returns `PlanError::NothingToUpdate` if no column was assigned.
    pub fn finish(self) -> Result<UpdatePlan<C>, PlanError> {
        if self.is_empty() {
            return Err(PlanError::NothingToUpdate);
        }
        Ok(UpdatePlan {
            id: self.id,
            assignments: self.assignments,
        })
    }
}
