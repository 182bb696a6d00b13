//! Behavioral specs for the `ot` binary.
//!
//! Each spec runs the real binary against a temp state directory and, where
//! polling is involved, a local stub of the backend's progress endpoint.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/cli.rs"]
mod cli;
#[path = "specs/operations.rs"]
mod operations;
#[path = "specs/track.rs"]
mod track;
