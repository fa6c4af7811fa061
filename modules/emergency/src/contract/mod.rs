pub mod model;

pub use model::{
    EmergencyRequest, GeoPoint, ListParams, NewRequest, Page, Priority, RequestId, RequestStatus,
    StatusUpdate,
};
