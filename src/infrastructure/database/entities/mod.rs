//! Database entities module

pub mod account;
pub mod reservation;
pub mod vehicle;

pub use account::Entity as Account;
pub use reservation::Entity as Reservation;
pub use vehicle::Entity as Vehicle;
