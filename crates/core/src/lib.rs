//! `scopegate-core`: identifiers and errors shared by the gate crates.
//!
//! This crate has no IO and no knowledge of HTTP or storage.

pub mod error;
pub mod id;

pub use error::{CoreError, CoreResult};
pub use id::{PrincipalId, RoleId};
