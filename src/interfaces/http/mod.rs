//! HTTP REST API interfaces
//!
//! - `common`: response envelope, error mapping, validated JSON
//! - `middleware`: bearer authentication and the admin gate
//! - `modules`: request handlers per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_api_router;
