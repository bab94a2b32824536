use uuid::Uuid;

use matchup_shared::errors::{AppError, ErrorCode};

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("users cannot interact with their own profile")]
    SelfInterest,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("user is not a member of this match")]
    NotMatchMember,

    #[error("{0}")]
    Validation(String),

    /// The winning row of a lost insert race could not be read back.
    #[error("match for pair {low}/{high} disappeared after a unique violation")]
    MatchVanished { low: Uuid, high: Uuid },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ConnectionResult<T> = Result<T, ConnectionError>;

impl From<ConnectionError> for AppError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::SelfInterest => {
                AppError::new(ErrorCode::CannotInteractSelf, "cannot like or pass your own profile")
            }
            ConnectionError::NotFound("match") => AppError::new(ErrorCode::MatchNotFound, "match not found"),
            ConnectionError::NotFound(what) => {
                AppError::new(ErrorCode::ProfileNotFound, format!("{what} not found"))
            }
            ConnectionError::NotMatchMember => AppError::new(ErrorCode::NotMatchMember, err.to_string()),
            ConnectionError::Validation(msg) => AppError::new(ErrorCode::InvalidPreferences, msg),
            ConnectionError::MatchVanished { .. } => AppError::Internal(anyhow::Error::new(err)),
            ConnectionError::Store(StoreError::Database(e)) => AppError::Database(e),
            ConnectionError::Store(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_wire_codes() {
        assert_eq!(AppError::from(ConnectionError::SelfInterest).code(), ErrorCode::CannotInteractSelf);
        assert_eq!(AppError::from(ConnectionError::NotFound("profile")).code(), ErrorCode::ProfileNotFound);
        assert_eq!(AppError::from(ConnectionError::NotFound("match")).code(), ErrorCode::MatchNotFound);
        assert_eq!(AppError::from(ConnectionError::NotMatchMember).code(), ErrorCode::NotMatchMember);
        assert_eq!(
            AppError::from(ConnectionError::Validation("bad".into())).code(),
            ErrorCode::InvalidPreferences
        );
        assert_eq!(AppError::from(ConnectionError::Store(StoreError::Poisoned)).code(), ErrorCode::InternalError);
    }
}
