//! Fundline backend library modules.
//!
//! The domain layer ([`domain`]) carries the business rules; [`store`],
//! [`auth`], and [`api`] are the driven and driving adapters around it.

pub mod api;
pub mod auth;
pub mod config;
pub mod doc;
pub mod domain;
pub mod middleware;
pub mod store;

pub use doc::ApiDoc;
pub use middleware::request_id::RequestId;
