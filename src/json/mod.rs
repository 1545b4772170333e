//! Purpose: JSON decoding boundary shared by the CLI, transport, and tests.
//! Exports: `parse` module with decode helpers and failure categorization.
//! Role: Single seam between raw bytes and `DynamicValue` trees.
//! Invariants: Decoding goes through this module; callers never hand-roll parsing.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub mod parse;
