//! Vehicle aggregate
//!
//! Contains the Vehicle entity, its status enum, and the catalog interface
//! the booking core reads from.

pub mod model;
pub mod repository;

pub use model::{Vehicle, VehicleStatus};
pub use repository::VehicleRepository;
