//! Document-level use-case services.
//!
//! # Responsibility
//! - Pair one snapshot with one undo/redo timeline per open document.
//! - Keep hosts decoupled from command and history plumbing.

pub mod loom_service;
