//! # ModKit - shared building blocks for the SOS server modules
//!
//! - [`contracts`]: the trait every REST-exposing module implements so the
//!   ingress can mount it.
//! - [`api`]: JSON error body ([`ApiError`]) and success envelope ([`ApiResponse`])
//!   shared by every REST surface.
//! - [`validation`]: a pipeline of independent field checks that reports every
//!   violation at once instead of stopping at the first.
//! - [`ids`]: 24-character hexadecimal record identifiers.
//! - [`room`]: an in-process publish/subscribe registry keyed by room name,
//!   holding the outbound handles of live sessions.

pub use anyhow::Result;

pub mod api;
pub mod contracts;
pub mod ids;
pub mod room;
pub mod validation;

pub use api::{ApiError, ApiResponse, ApiResult, ErrorBody, ErrorDetails, JsonBody, Pagination};
pub use contracts::RestfulModule;
pub use room::{PublishReport, RoomRegistry, SessionId};
pub use validation::{Pipeline, Violation};
