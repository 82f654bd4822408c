//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `loom_core` linkage with a short scripted session.
//! - Keep output deterministic for quick local sanity checks.

use loom_core::command::{ColumnAddArgs, ColumnDeleteArgs};
use loom_core::{CommandRequest, LoomSession};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("loom_core ping={}", loom_core::ping());
    println!("loom_core version={}", loom_core::core_version());

    if let Ok(log_dir) = std::env::var("LOOM_LOG_DIR") {
        if let Err(err) = loom_core::init_logging(loom_core::default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match round_trip() {
        Ok(columns) => {
            println!("loom_core round_trip=ok columns={columns}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("loom_core round_trip=error error={err}");
            ExitCode::FAILURE
        }
    }
}

/// Adds a column, deletes it, undoes the delete and returns the column count.
///
/// A restored count that differs from the pre-delete count is an error.
fn round_trip() -> Result<usize, String> {
    let mut session = LoomSession::new();
    let initial = session.snapshot().columns.len();

    session
        .submit(CommandRequest::ColumnAdd(ColumnAddArgs::default()))
        .map_err(|err| err.to_string())?;
    session
        .submit(CommandRequest::ColumnDelete(ColumnDeleteArgs {
            id: None,
            last: true,
        }))
        .map_err(|err| err.to_string())?;
    let restored = session
        .undo()
        .map_err(|err| err.to_string())?
        .columns
        .len();

    if restored != initial + 1 {
        return Err(format!(
            "unexpected column count after undo: expected={} actual={restored}",
            initial + 1
        ));
    }
    Ok(restored)
}
