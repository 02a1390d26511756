//! Runtime module - the contracts between the hub and its collaborators.
//!
//! The wallet runtime (key management, chain sync, transfer tracking) lives
//! outside this workspace. The hub only creates a handle through a
//! [`SystemFactory`], commands it (`connect_all` / `disconnect_all`), reads
//! snapshots from it, and receives its callbacks as a [`SystemListener`].

mod runtime_traits;
mod tracker_traits;

pub use runtime_traits::*;
pub use tracker_traits::*;
