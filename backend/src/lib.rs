//! Teamboard backend: team projects, progress tracking and reward points.
//!
//! Layout follows a hexagonal split: [`domain`] holds types, services and
//! ports, [`inbound`] adapts HTTP onto the driving ports and [`outbound`]
//! implements the driven ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
