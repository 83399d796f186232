use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// Failures reported by an [`EmployeeStore`](crate::EmployeeStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("employee {0} not found")]
    NotFound(Uuid),
    #[error("email {0} violates the unique constraint")]
    Conflict(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("employee already exists with given email: {email}")]
    DuplicateResource { email: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl HrError {
    pub fn duplicate(email: impl Into<String>) -> Self {
        Self::DuplicateResource {
            email: email.into(),
        }
    }
}

pub type HrResult<T> = Result<T, HrError>;
