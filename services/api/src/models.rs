//! API models for request and response payloads

pub mod car;
pub mod query;

pub use car::{Car, CarResponse, CarStatus, NewCar};
pub use query::{CarFilters, CarListParams, CarListResponse, CarPage, PageRequest, PaginationInfo};
