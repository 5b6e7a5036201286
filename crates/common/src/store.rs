//! Translation of Persistent Store failures into the service taxonomy
//!
//! Raw store messages are logged here and never reach a response body.

use eklavya_store::StoreError;

use crate::error::Error;

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, .. } => {
                Error::NotFound(format!("{} record not found", singular(&collection)))
            }
            StoreError::Conflict { .. } => Error::Conflict(
                "The booking was changed by someone else, reload and try again".to_string(),
            ),
            StoreError::AlreadyExists { .. } => {
                Error::Conflict("This record already exists".to_string())
            }
            StoreError::Unavailable(_) | StoreError::Timeout(_) => {
                tracing::error!(error = %err, "Store unavailable after retries");
                Error::StoreUnavailable
            }
            StoreError::IndexUnavailable { .. }
            | StoreError::InvalidData(_)
            | StoreError::Backend(_) => Error::Internal(err.to_string()),
        }
    }
}

fn singular(collection: &str) -> String {
    let name = collection.strip_suffix('s').unwrap_or(collection);
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => "Record".to_string(),
    }
}
