//! Business logic services

pub mod catalog;
pub mod lifecycle;

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub lifecycle: lifecycle::LifecycleService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            lifecycle: lifecycle::LifecycleService::new(repository.clone()),
            repository,
        }
    }
}

/// Run derive-based validation, mapping failures to a validation error
pub(crate) fn validate(payload: &impl Validate) -> AppResult<()> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}
