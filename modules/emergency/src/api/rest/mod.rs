pub mod dto;
pub mod error;
pub mod handlers;
pub mod live;
pub mod room_adapter;
pub mod routes;
