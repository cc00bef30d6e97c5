//! Demo endpoint set served over HTTP/1.1.
//!
//! Handlers are declared in [`api`], their inputs validated by [`validate`],
//! resolved through [`routing`] and served by [`server`].

pub mod api;
pub mod config;
pub mod docs;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
pub mod validate;
