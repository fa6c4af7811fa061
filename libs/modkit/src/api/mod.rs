//! JSON bodies shared by every REST surface.
//!
//! Failures render as `{"success": false, "error": .., "details"?: .., "message"?: ..}`,
//! successes as `{"success": true, "message"?: .., "data": .., "pagination"?: ..}`.

pub mod error;
pub mod extract;
pub mod response;

pub use error::{
    expose_internal_details, set_expose_internal_details, ApiError, ApiResult, ErrorBody,
    ErrorDetails,
};
pub use extract::JsonBody;
pub use response::{ApiResponse, Pagination};
