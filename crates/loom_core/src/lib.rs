//! Core engine for loom tables.
//! Every document mutation goes through a reversible command; this crate is
//! the single source of truth for cross-entity invariants.

pub mod command;
pub mod history;
pub mod logging;
pub mod model;
pub mod service;
pub mod view;

pub use command::error::{ArgumentsError, CommandResult};
pub use command::{Command, CommandError, CommandRequest, UndoError};
pub use history::{CommandHistory, HistoryConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::cell::{Cell, CellId, CellValue};
pub use model::column::{
    CalculationType, CellType, Column, ColumnId, CurrencyType, DateFormat, NumberFormat, SortDir,
};
pub use model::error::{EntityKind, IntegrityError, NotFoundError};
pub use model::filter::{Filter, FilterCondition, FilterId};
pub use model::row::{Row, RowId};
pub use model::snapshot::{Settings, Snapshot};
pub use model::source::{Source, SourceId, SourceType};
pub use model::tag::{Color, Tag, TagId};
pub use service::loom_service::LoomSession;
pub use view::{
    calculate, filtered_rows, matches, search_rows, sort_rows, sorted_rows, CalculationValue,
};

/// Minimal health-check API for host integration probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
