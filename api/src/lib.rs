//! HTTP surface of the salon authentication service.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
