// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::OperatorsModule;

// Bearer-token extractors other modules put on their handlers.
pub use api::rest::extract::{CurrentAdmin, SuperAdmin};
pub use domain::service::AuthService;

// === INTERNAL MODULES ===
// Exposed for integration tests and application wiring; only `contract`
// and the re-exports above are meant for other modules.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
