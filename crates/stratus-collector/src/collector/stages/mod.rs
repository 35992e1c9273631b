//! The enumeration stages composed out of `stratus-pipeline` primitives.
//!
//! Each stage is non-blocking to construct: it spawns its tasks and returns
//! the receiving end of its bounded output channel. Stages compose by
//! feeding one stage's receiver to the next; `main.rs` wires the final
//! receiver into the sink. With every hop bounded, a slow sink backpressures
//! all the way to the API instead of buffering a tenant in memory.
//!
//! ## Submodules
//!
//! - [`management_groups`] - Discovery of the groups visible to the token.
//! - [`role_assignments`] - Fan-out enumeration of per-group role
//!   assignments.

mod management_groups;
mod role_assignments;

pub use management_groups::list_management_groups;
pub use role_assignments::{LANES, list_role_assignments};
