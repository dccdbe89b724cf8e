//! Conversions from external infrastructure errors into domain errors.

use leadflow_domain::LeadflowError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct InfraError(pub LeadflowError);

impl From<InfraError> for LeadflowError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LeadflowError> for InfraError {
    fn from(value: LeadflowError) -> Self {
        InfraError(value)
    }
}

trait IntoLeadflowError {
    fn into_leadflow(self) -> LeadflowError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for SqlError {
    fn into_leadflow(self) -> LeadflowError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match (err.code, err.extended_code) {
                    (ErrorCode::DatabaseBusy, _) => {
                        LeadflowError::Database("database is busy".into())
                    }
                    (ErrorCode::DatabaseLocked, _) => {
                        LeadflowError::Database("database is locked".into())
                    }
                    // SQLITE_CONSTRAINT_UNIQUE
                    (ErrorCode::ConstraintViolation, 2067) => {
                        LeadflowError::Database(format!("unique constraint violation: {message}"))
                    }
                    // SQLITE_CONSTRAINT_FOREIGNKEY
                    (ErrorCode::ConstraintViolation, 787) => {
                        LeadflowError::Database("foreign key constraint violation".into())
                    }
                    _ => LeadflowError::Database(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::QueryReturnedNoRows => LeadflowError::NotFound("no rows returned by query".into()),
            RE::FromSqlConversionFailure(_, _, cause) => {
                LeadflowError::Database(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, _, ty) => {
                LeadflowError::Database(format!("invalid column type: {ty}"))
            }
            RE::InvalidPath(path) => LeadflowError::Database(format!(
                "invalid database path: {}",
                path.to_string_lossy()
            )),
            other => LeadflowError::Database(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(LeadflowError::Database(format!("connection pool: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl IntoLeadflowError for HttpError {
    fn into_leadflow(self) -> LeadflowError {
        // Request URLs may carry credentials (Telegram puts the bot token in the path)
        let err = self.without_url();
        if err.is_timeout() {
            return LeadflowError::Network("HTTP request timed out".into());
        }

        if err.is_connect() {
            return LeadflowError::Network("HTTP connection failure".into());
        }

        if let Some(status) = err.status() {
            return status_error(status, None);
        }

        if err.is_decode() {
            return LeadflowError::Network(format!("invalid HTTP response body: {err}"));
        }

        LeadflowError::Network(err.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_leadflow())
    }
}

/// Map a non-success HTTP status (plus optional response body) to the
/// matching domain error.
pub(crate) fn status_error(status: reqwest::StatusCode, body: Option<&str>) -> LeadflowError {
    let code = status.as_u16();
    let mut message =
        format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));
    if let Some(body) = body.map(str::trim).filter(|b| !b.is_empty()) {
        message.push_str(": ");
        message.extend(body.chars().take(200));
    }

    match code {
        401 | 403 => LeadflowError::Auth(message),
        404 => LeadflowError::NotFound(message),
        400..=499 if code != 429 => LeadflowError::InvalidInput(message),
        _ => LeadflowError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → LeadflowError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(LeadflowError::Internal(format!("json: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
