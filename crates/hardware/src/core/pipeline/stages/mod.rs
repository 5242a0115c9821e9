//! Pipeline stage implementations.
//!
//! One cycle runs the four stages in reverse dependency order:
//! 1. **Commit:** Retires the ROB head and may signal a squash.
//! 2. **Writeback:** Broadcasts finished results to the ROB and every pool.
//! 3. **Execute:** Dispatches ready stations into lanes and ticks countdowns.
//! 4. **Issue:** Fetches, renames and allocates ROB and station slots.
//!
//! Commit runs first so that capacity it frees is usable by issue in the
//! same cycle; execute runs after writeback so a result is never visible
//! before its countdown has expired.

/// In-order retirement.
pub mod commit;

/// Lane dispatch and countdown.
pub mod execute;

/// Fetch, rename and reservation-station allocation.
pub mod issue;

/// Result broadcast.
pub mod writeback;

/// Commit stage entry point.
pub use commit::{CommitOutcome, commit_stage};
/// Execute stage entry point.
pub use execute::execute_stage;
/// Issue stage entry point.
pub use issue::{issue_stage, rename};
/// Writeback stage entry point.
pub use writeback::writeback_stage;
