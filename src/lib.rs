//! Purpose: Library crate behind the `jsonlens` CLI.
//! Exports: `core` (values, navigation, coercion, dates, builders, errors),
//! `json` (decode boundary), `api` (public surface and transport collaborator).
//! Role: Typed, best-effort reads over decoded JSON-shaped trees.
//! Invariants: Core modules are pure; only `api::transport` performs I/O.
//! Invariants: Exploratory reads report absence instead of failing.
pub mod api;
pub mod core;
pub mod json;
