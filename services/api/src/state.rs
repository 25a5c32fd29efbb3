//! Application state shared across handlers

use common::jwt::JwtService;
use sqlx::PgPool;

use crate::{repositories::CarRepository, uploads::UploadStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub car_repository: CarRepository,
    pub jwt_service: JwtService,
    pub uploads: UploadStore,
    pub dev_mode: bool,
}

impl AppState {
    pub fn new(db_pool: PgPool, jwt_service: JwtService, uploads: UploadStore, dev_mode: bool) -> Self {
        Self {
            car_repository: CarRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
            uploads,
            dev_mode,
        }
    }
}
