use crate::inventory::BuildError;
use actix_web::error::BlockingError;
use actix_web::http::StatusCode;
use actix_web::ResponseError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to build snapshot")]
    Build(#[from] BuildError),
    #[error("Failed to render page")]
    Render(#[from] std::fmt::Error),
    #[error("Blocking task was canceled")]
    Canceled,
}

impl From<BlockingError<ServiceError>> for ServiceError {
    fn from(e: BlockingError<ServiceError>) -> Self {
        match e {
            BlockingError::Error(e) => e,
            BlockingError::Canceled => Self::Canceled,
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Build(_) | Self::Render(_) | Self::Canceled => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
