//! Undo/redo sequencing over reversible commands.
//!
//! # Responsibility
//! - Run commands against the caller's snapshot and keep them for undo.
//! - Replay undone commands on redo.
//!
//! # Invariants
//! - A successful `run` clears the redo stack.
//! - A failed `run`, `undo` or `redo` leaves both stacks as they were.
//! - `undo`/`redo` on an empty stack return the input snapshot unchanged.
//! - Only commands are stored; each carries its own captured delta.
//!
//! ```text
//! run(c1) run(c2) run(c3)   applied: [c1, c2, c3]  redo: []
//! undo() undo()             applied: [c1]          redo: [c3, c2]
//! run(c4)                   applied: [c1, c4]      redo: []
//! ```

use crate::command::error::CommandResult;
use crate::command::Command;
use crate::model::snapshot::Snapshot;
use log::{debug, warn};
use std::collections::VecDeque;
use std::fmt;

/// History limits. Unbounded unless the host sets `max_depth`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Maximum number of applied commands kept for undo. Oldest are evicted.
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    pub fn bounded(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

/// One document's undo/redo timeline.
pub struct CommandHistory {
    /// Newest at the back.
    applied: VecDeque<Box<dyn Command>>,
    /// Next command to redo at the back.
    redo: Vec<Box<dyn Command>>,
    config: HistoryConfig,
}

impl fmt::Debug for CommandHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandHistory")
            .field("undo_depth", &self.applied.len())
            .field("redo_depth", &self.redo.len())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl CommandHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            applied: VecDeque::new(),
            redo: Vec::new(),
            config,
        }
    }

    /// Executes `command` and records it for undo.
    ///
    /// # Errors
    /// - Returns the command's error; the command is dropped and the redo
    ///   stack is kept.
    pub fn run(
        &mut self,
        mut command: Box<dyn Command>,
        snapshot: &Snapshot,
    ) -> CommandResult<Snapshot> {
        let next = match command.execute(snapshot) {
            Ok(next) => next,
            Err(err) => {
                warn!(
                    "event=history_run module=history status=error command={} error={}",
                    command.name(),
                    err
                );
                return Err(err);
            }
        };

        debug!(
            "event=history_run module=history status=ok command={} undo_depth={} cleared_redo={}",
            command.name(),
            self.applied.len() + 1,
            self.redo.len()
        );
        self.redo.clear();
        self.applied.push_back(command);
        self.enforce_depth();
        Ok(next)
    }

    /// Reverts the most recent applied command.
    ///
    /// # Errors
    /// - Returns the command's undo error; the command stays applied.
    pub fn undo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let Some(mut command) = self.applied.pop_back() else {
            debug!("event=history_undo module=history status=noop");
            return Ok(snapshot.clone());
        };

        match command.undo(snapshot) {
            Ok(next) => {
                debug!(
                    "event=history_undo module=history status=ok command={} undo_depth={}",
                    command.name(),
                    self.applied.len()
                );
                self.redo.push(command);
                Ok(next)
            }
            Err(err) => {
                warn!(
                    "event=history_undo module=history status=error command={} error={}",
                    command.name(),
                    err
                );
                self.applied.push_back(command);
                Err(err)
            }
        }
    }

    /// Re-applies the most recently undone command.
    ///
    /// # Errors
    /// - Returns the command's error; the command stays undone.
    pub fn redo(&mut self, snapshot: &Snapshot) -> CommandResult<Snapshot> {
        let Some(mut command) = self.redo.pop() else {
            debug!("event=history_redo module=history status=noop");
            return Ok(snapshot.clone());
        };

        match command.redo(snapshot) {
            Ok(next) => {
                debug!(
                    "event=history_redo module=history status=ok command={} redo_depth={}",
                    command.name(),
                    self.redo.len()
                );
                self.applied.push_back(command);
                self.enforce_depth();
                Ok(next)
            }
            Err(err) => {
                warn!(
                    "event=history_redo module=history status=error command={} error={}",
                    command.name(),
                    err
                );
                self.redo.push(command);
                Err(err)
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.applied.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.applied.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Name of the command `undo` would revert.
    pub fn next_undo_name(&self) -> Option<&'static str> {
        self.applied.back().map(|command| command.name())
    }

    /// Name of the command `redo` would re-apply.
    pub fn next_redo_name(&self) -> Option<&'static str> {
        self.redo.last().map(|command| command.name())
    }

    /// Forgets the whole timeline.
    pub fn clear(&mut self) {
        self.applied.clear();
        self.redo.clear();
    }

    pub fn config(&self) -> HistoryConfig {
        self.config
    }

    fn enforce_depth(&mut self) {
        let Some(max_depth) = self.config.max_depth else {
            return;
        };
        while self.applied.len() > max_depth {
            if let Some(evicted) = self.applied.pop_front() {
                debug!(
                    "event=history_evict module=history status=ok command={} max_depth={}",
                    evicted.name(),
                    max_depth
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CommandHistory, HistoryConfig};
    use crate::command::{
        ColumnAddArgs, ColumnAddCommand, CommandError, RowDeleteArgs, RowDeleteCommand,
    };
    use crate::model::snapshot::Snapshot;
    use uuid::Uuid;

    fn add_column() -> Box<ColumnAddCommand> {
        Box::new(ColumnAddCommand::new(ColumnAddArgs::default()))
    }

    #[test]
    fn undo_and_redo_on_empty_history_are_noops() {
        let snapshot = Snapshot::with_dimensions(2, 2);
        let mut history = CommandHistory::default();
        assert_eq!(history.undo(&snapshot).unwrap(), snapshot);
        assert_eq!(history.redo(&snapshot).unwrap(), snapshot);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn new_run_clears_redo_but_failed_run_keeps_it() {
        let s0 = Snapshot::with_dimensions(1, 1);
        let mut history = CommandHistory::default();
        let s1 = history.run(add_column(), &s0).unwrap();
        let back = history.undo(&s1).unwrap();
        assert_eq!(back, s0);
        assert_eq!(history.redo_depth(), 1);

        let stale = Box::new(
            RowDeleteCommand::new(RowDeleteArgs {
                id: Some(Uuid::new_v4()),
                last: false,
            })
            .unwrap(),
        );
        assert!(matches!(
            history.run(stale, &back),
            Err(CommandError::NotFound(_))
        ));
        assert_eq!(history.redo_depth(), 1);
        assert_eq!(history.undo_depth(), 0);

        history
            .run(
                Box::new(RowDeleteCommand::new(RowDeleteArgs { id: None, last: true }).unwrap()),
                &back,
            )
            .unwrap();
        assert_eq!(history.redo_depth(), 0);
        assert_eq!(history.next_undo_name(), Some("row_delete"));
    }

    #[test]
    fn bounded_history_evicts_oldest() {
        let mut snapshot = Snapshot::with_dimensions(1, 0);
        let mut history = CommandHistory::new(HistoryConfig::bounded(2));
        for _ in 0..3 {
            snapshot = history.run(add_column(), &snapshot).unwrap();
        }
        assert_eq!(history.undo_depth(), 2);
        snapshot = history.undo(&snapshot).unwrap();
        snapshot = history.undo(&snapshot).unwrap();
        assert_eq!(snapshot.columns.len(), 2);
        assert_eq!(history.undo(&snapshot).unwrap(), snapshot);
    }
}
