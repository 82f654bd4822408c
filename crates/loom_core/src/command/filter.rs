//! Filter add/update/delete.
//!
//! A filter's condition family must fit its column's type; a new filter
//! without an explicit condition gets the column type's default.

use crate::command::error::{required, ArgumentsError, CommandError, CommandResult, UndoError};
use crate::command::Command;
use crate::model::column::{Column, ColumnId};
use crate::model::filter::{Filter, FilterCondition, FilterId};
use crate::model::snapshot::Snapshot;
use serde::Deserialize;
use uuid::Uuid;

fn ensure_condition_fits(column: &Column, condition: &FilterCondition) -> CommandResult<()> {
    if condition.fits(column.kind) {
        return Ok(());
    }
    Err(CommandError::TypeMismatch {
        column_id: column.id,
        expected: column.kind,
        actual: condition.kind(),
    })
}

/// Arguments for `FilterAddCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterAddArgs {
    pub column_id: Option<ColumnId>,
    pub condition: Option<FilterCondition>,
}

/// Appends an enabled filter on one column.
#[derive(Debug, Clone)]
pub struct FilterAddCommand {
    filter_id: FilterId,
    column_id: ColumnId,
    condition: Option<FilterCondition>,
    applied: bool,
}

impl FilterAddCommand {
    pub const NAME: &'static str = "filter_add";

    pub fn new(args: FilterAddArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            filter_id: Uuid::new_v4(),
            column_id: required(args.column_id, Self::NAME, "column_id")?,
            condition: args.condition,
            applied: false,
        })
    }

    pub fn filter_id(&self) -> FilterId {
        self.filter_id
    }
}

impl Command for FilterAddCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let column = snapshot.column(self.column_id)?;
        let condition = match &self.condition {
            Some(condition) => {
                ensure_condition_fits(column, condition)?;
                condition.clone()
            }
            None => FilterCondition::default_for(column.kind),
        };

        let mut next = snapshot.clone();
        next.filters
            .push(Filter::with_id(self.filter_id, self.column_id, condition));

        self.applied = true;
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        if !self.applied {
            return Err(UndoError::new(Self::NAME).into());
        }
        let index = snapshot.filter_index(self.filter_id)?;
        let mut next = snapshot.clone();
        next.filters.remove(index);

        self.applied = false;
        Ok(next)
    }
}

/// Arguments for `FilterUpdateCommand`. At least one of `condition`/`is_enabled`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterUpdateArgs {
    pub id: Option<FilterId>,
    pub condition: Option<FilterCondition>,
    pub is_enabled: Option<bool>,
}

/// Replaces a filter's condition or toggles it.
#[derive(Debug, Clone)]
pub struct FilterUpdateCommand {
    filter_id: FilterId,
    condition: Option<FilterCondition>,
    is_enabled: Option<bool>,
    previous: Option<Filter>,
}

impl FilterUpdateCommand {
    pub const NAME: &'static str = "filter_update";

    pub fn new(args: FilterUpdateArgs) -> Result<Self, ArgumentsError> {
        let filter_id = required(args.id, Self::NAME, "id")?;
        if args.condition.is_none() && args.is_enabled.is_none() {
            return Err(ArgumentsError::Missing {
                command: Self::NAME,
                field: "condition",
            });
        }
        Ok(Self {
            filter_id,
            condition: args.condition,
            is_enabled: args.is_enabled,
            previous: None,
        })
    }
}

impl Command for FilterUpdateCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = snapshot.filter_index(self.filter_id)?;
        let previous = snapshot.filters[index].clone();
        if let Some(condition) = &self.condition {
            ensure_condition_fits(snapshot.column(previous.column_id)?, condition)?;
        }

        let mut next = snapshot.clone();
        let filter = &mut next.filters[index];
        if let Some(condition) = &self.condition {
            filter.condition = condition.clone();
        }
        if let Some(is_enabled) = self.is_enabled {
            filter.is_enabled = is_enabled;
        }

        self.previous = Some(previous);
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let previous = self.previous.as_ref().ok_or(UndoError::new(Self::NAME))?;
        let index = snapshot.filter_index(self.filter_id)?;
        let mut next = snapshot.clone();
        next.filters[index] = previous.clone();

        self.previous = None;
        Ok(next)
    }
}

/// Arguments for `FilterDeleteCommand`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterDeleteArgs {
    pub id: Option<FilterId>,
}

/// Removes one filter. Undo reinserts it at its original index.
#[derive(Debug, Clone)]
pub struct FilterDeleteCommand {
    filter_id: FilterId,
    deleted: Option<(usize, Filter)>,
}

impl FilterDeleteCommand {
    pub const NAME: &'static str = "filter_delete";

    pub fn new(args: FilterDeleteArgs) -> Result<Self, ArgumentsError> {
        Ok(Self {
            filter_id: required(args.id, Self::NAME, "id")?,
            deleted: None,
        })
    }
}

impl Command for FilterDeleteCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let index = snapshot.filter_index(self.filter_id)?;
        let mut next = snapshot.clone();
        let filter = next.filters.remove(index);

        self.deleted = Some((index, filter));
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let (index, filter) = self.deleted.take().ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        next.filters.insert(index.min(next.filters.len()), filter);
        Ok(next)
    }
}
