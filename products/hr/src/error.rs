use platform_api::ApiError;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

pub type HrResult<T> = Result<T, HrError>;

#[derive(Debug, Error)]
pub enum HrError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("employee {0} not found")]
    EmployeeNotFound(Uuid),
    #[error("unknown employee {0} referenced")]
    UnknownEmployee(Uuid),
    #[error("employee {0} already exists")]
    DuplicateEmployee(Uuid),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
}

impl HrError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl From<HrError> for ApiError {
    fn from(value: HrError) -> Self {
        match value {
            HrError::InvalidInput(_) | HrError::UnknownEmployee(_) => {
                ApiError::InvalidInput(value.to_string())
            }
            HrError::EmployeeNotFound(_) => ApiError::NotFound,
            HrError::DuplicateEmployee(_) => ApiError::Conflict(value.to_string()),
            HrError::Db(err) => ApiError::internal(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_onto_api_taxonomy() {
        let id = Uuid::nil();
        assert!(matches!(
            ApiError::from(HrError::invalid("bad")),
            ApiError::InvalidInput(msg) if msg == "bad"
        ));
        assert!(matches!(
            ApiError::from(HrError::EmployeeNotFound(id)),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(HrError::DuplicateEmployee(id)),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(HrError::Db(DbErr::Custom("down".into()))),
            ApiError::Internal(_)
        ));
    }
}
