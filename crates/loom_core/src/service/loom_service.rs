//! Open-document session.
//!
//! # Responsibility
//! - Own the current snapshot and the history that produced it.
//! - Accept commands built in code or submitted as plain argument records.
//! - Serve the visible row set (filters, then search, then sort) and the
//!   calculation row.
//!
//! # Invariants
//! - The current snapshot only changes through `run`/`submit`/`undo`/`redo`.
//! - A failed command leaves the current snapshot untouched.
//! - Sessions never share a timeline; each owns its `CommandHistory`.

use crate::command::error::CommandResult;
use crate::command::{Command, CommandRequest};
use crate::history::{CommandHistory, HistoryConfig};
use crate::model::column::{CalculationType, ColumnId};
use crate::model::error::IntegrityError;
use crate::model::row::Row;
use crate::model::snapshot::Snapshot;
use crate::view::{calculate, filtered_rows, search_rows, sort_rows, CalculationValue};
use log::{error, info};

/// One open document: current snapshot plus its undo/redo timeline.
#[derive(Debug)]
pub struct LoomSession {
    snapshot: Snapshot,
    history: CommandHistory,
}

impl Default for LoomSession {
    fn default() -> Self {
        Self {
            snapshot: Snapshot::new(),
            history: CommandHistory::default(),
        }
    }
}

impl LoomSession {
    /// Opens a session over a fresh 1x1 table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session over a host-provided snapshot.
    ///
    /// # Errors
    /// - Returns `IntegrityError` when the snapshot breaks a cross-entity
    ///   invariant; such a document cannot be edited safely.
    pub fn open(snapshot: Snapshot, config: HistoryConfig) -> Result<Self, IntegrityError> {
        if let Err(err) = snapshot.check_integrity() {
            error!("event=session_open module=service status=error error={err}");
            return Err(err);
        }
        info!(
            "event=session_open module=service status=ok columns={} rows={} filters={}",
            snapshot.columns.len(),
            snapshot.rows.len(),
            snapshot.filters.len()
        );
        Ok(Self {
            snapshot,
            history: CommandHistory::new(config),
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    /// Closes the session, handing the current snapshot back to the host.
    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Runs a command against the current snapshot and records it.
    pub fn run(&mut self, command: Box<dyn Command>) -> CommandResult<&Snapshot> {
        let next = self.history.run(command, &self.snapshot)?;
        self.replace(next);
        Ok(&self.snapshot)
    }

    /// Validates a plain argument record, then runs the command it names.
    pub fn submit(&mut self, request: CommandRequest) -> CommandResult<&Snapshot> {
        let command = request.into_command()?;
        self.run(command)
    }

    pub fn undo(&mut self) -> CommandResult<&Snapshot> {
        let next = self.history.undo(&self.snapshot)?;
        self.replace(next);
        Ok(&self.snapshot)
    }

    pub fn redo(&mut self) -> CommandResult<&Snapshot> {
        let next = self.history.redo(&self.snapshot)?;
        self.replace(next);
        Ok(&self.snapshot)
    }

    /// Rows as the table shows them: enabled filters, then `search`, then
    /// the active sort.
    pub fn visible_rows(&self, search: &str) -> Vec<&Row> {
        let snapshot = &self.snapshot;
        let rows = filtered_rows(snapshot, &snapshot.filters);
        let rows = search_rows(snapshot, rows, search);
        match snapshot.sort_column() {
            Some(column) => sort_rows(rows, column, &snapshot.sources),
            None => rows,
        }
    }

    /// Calculation-row values over `rows` for every column with a
    /// calculation selected, in column order.
    pub fn calculations(&self, rows: &[&Row]) -> Vec<(ColumnId, CalculationValue)> {
        self.snapshot
            .columns
            .iter()
            .filter(|column| column.calculation_type != CalculationType::None)
            .filter_map(|column| {
                calculate(&self.snapshot, rows, column.id)
                    .ok()
                    .map(|value| (column.id, value))
            })
            .collect()
    }

    fn replace(&mut self, next: Snapshot) {
        if cfg!(debug_assertions) {
            if let Err(err) = next.check_integrity() {
                error!("event=integrity_check module=service status=error error={err}");
            }
        }
        self.snapshot = next;
    }
}

#[cfg(test)]
mod tests {
    use super::LoomSession;
    use crate::command::{CommandRequest, RowAddArgs};
    use crate::history::HistoryConfig;
    use crate::model::snapshot::Snapshot;

    #[test]
    fn open_rejects_table_without_columns() {
        let mut snapshot = Snapshot::with_dimensions(1, 1);
        snapshot.columns.clear();
        snapshot.rows.clear();
        assert!(LoomSession::open(snapshot, HistoryConfig::default()).is_err());
    }

    #[test]
    fn submit_then_undo_restores_initial_snapshot() {
        let mut session = LoomSession::new();
        let initial = session.snapshot().clone();
        session
            .submit(CommandRequest::RowAdd(RowAddArgs::default()))
            .unwrap();
        assert_eq!(session.snapshot().rows.len(), 2);
        assert_eq!(session.undo().unwrap(), &initial);
        assert_eq!(session.redo().unwrap().rows.len(), 2);
    }
}
