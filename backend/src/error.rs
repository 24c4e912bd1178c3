use actix_web::HttpResponse;
use common::rules::validation::ValidationError;
use log::error;

/// Failure talking to the datastore or to the session file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    Session(#[from] serde_json::Error),
}

/// Everything a service call can refuse or fail with.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("sign in first")]
    Unauthenticated,
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("upload rejected: {0}")]
    Upload(String),
    #[error("could not write the spreadsheet: {0}")]
    Export(String),
}

impl From<rusqlite::Error> for ServiceError {
    fn from(err: rusqlite::Error) -> Self {
        ServiceError::Store(StoreError::Database(err))
    }
}

impl ServiceError {
    /// Sync failures are logged and answered with a generic message; the
    /// other cases carry their own message back to the client.
    pub fn to_response(&self) -> HttpResponse {
        match self {
            ServiceError::Store(err) => {
                error!("Store operation failed: {}", err);
                HttpResponse::ServiceUnavailable().body("Synchronisation with the datastore failed")
            }
            ServiceError::Validation(ValidationError::PinMismatch) | ServiceError::Unauthenticated => {
                HttpResponse::Unauthorized().body(self.to_string())
            }
            ServiceError::Validation(_) | ServiceError::Upload(_) => {
                HttpResponse::BadRequest().body(self.to_string())
            }
            ServiceError::Forbidden(_) => HttpResponse::Forbidden().body(self.to_string()),
            ServiceError::NotFound(_) => HttpResponse::NotFound().body(self.to_string()),
            ServiceError::Conflict(_) => HttpResponse::Conflict().body(self.to_string()),
            ServiceError::Export(_) => {
                error!("{}", self);
                HttpResponse::InternalServerError().body(self.to_string())
            }
        }
    }
}
