//! Table-level settings update.

use crate::command::error::{ArgumentsError, CommandResult, UndoError};
use crate::command::Command;
use crate::model::snapshot::{Settings, Snapshot};
use serde::Deserialize;

/// Arguments for `SettingsUpdateCommand`. At least one field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SettingsUpdateArgs {
    pub num_frozen_columns: Option<usize>,
    pub show_calculation_row: Option<bool>,
}

/// Changes display settings. Frozen columns clamp to the column count.
#[derive(Debug, Clone)]
pub struct SettingsUpdateCommand {
    args: SettingsUpdateArgs,
    previous: Option<Settings>,
}

impl SettingsUpdateCommand {
    pub const NAME: &'static str = "settings_update";

    pub fn new(args: SettingsUpdateArgs) -> Result<Self, ArgumentsError> {
        if args.num_frozen_columns.is_none() && args.show_calculation_row.is_none() {
            return Err(ArgumentsError::Missing {
                command: Self::NAME,
                field: "num_frozen_columns",
            });
        }
        Ok(Self {
            args,
            previous: None,
        })
    }
}

impl Command for SettingsUpdateCommand {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn execute(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let mut next = snapshot.clone();
        if let Some(frozen) = self.args.num_frozen_columns {
            next.settings.num_frozen_columns = frozen.min(next.columns.len());
        }
        if let Some(show) = self.args.show_calculation_row {
            next.settings.show_calculation_row = show;
        }

        self.previous = Some(snapshot.settings.clone());
        Ok(next)
    }

    fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let previous = self.previous.take().ok_or(UndoError::new(Self::NAME))?;
        let mut next = snapshot.clone();
        next.settings = previous;
        Ok(next)
    }
}
