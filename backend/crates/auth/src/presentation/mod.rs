//! Presentation Layer
//!
//! HTTP surface: admission control, token extraction middleware, handlers,
//! DTOs and the router.

pub mod admission;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
