//! Routing module
//!
//! Provides the route table for the handler set:
//! - Route patterns parsed into literal and parameter segments
//! - Explicit, ordered registration with declaration checks
//! - First-match resolution with method-not-allowed detection

mod matcher;
mod pattern;
mod registry;
mod route;

pub use matcher::Resolution;
pub use pattern::{PathPattern, Segment};
pub use registry::{Registry, RegistryError};
pub use route::{HandlerError, HandlerFn, Route, RouteDef, RouteMeta};
