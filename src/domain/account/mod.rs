//! Account directory
//!
//! Accounts are managed elsewhere; the booking core only resolves them to
//! attribute ownership and check roles.

pub mod directory;
pub mod model;

pub use directory::AccountDirectory;
pub use model::{Account, AccountRole};
