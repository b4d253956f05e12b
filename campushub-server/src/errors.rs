use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campushub_core::{AccessError, AuthError, DatabaseError, Role, StorageError, WorkflowError};
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Your account is pending admin approval. An admin must verify your account before you can continue.")]
    PendingApproval,
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("This operation requires the {0} role")]
    RoleRequired(&'static str),
    #[error("Caller does not act for an approved society")]
    NotASociety,
    #[error("Profile is not a society signup")]
    NotASocietySignup,
    #[error("Society has already been approved")]
    AlreadyApproved,
    #[error("Event is not open for registration")]
    EventNotOpen,
    #[error("Event belongs to a different society")]
    NotOwner,
    #[error("Unsupported file extension")]
    InvalidExtension,
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidCredentials => StatusCode::BAD_REQUEST,
            Self::PendingApproval => StatusCode::FORBIDDEN,
            Self::NotAuthenticated => StatusCode::UNAUTHORIZED,
            Self::RoleRequired(_) => StatusCode::FORBIDDEN,
            Self::NotASociety => StatusCode::FORBIDDEN,
            Self::NotASocietySignup => StatusCode::CONFLICT,
            Self::AlreadyApproved => StatusCode::CONFLICT,
            Self::EventNotOpen => StatusCode::CONFLICT,
            Self::NotOwner => StatusCode::FORBIDDEN,
            Self::InvalidExtension => StatusCode::BAD_REQUEST,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.as_status_code(), self.to_string()).into_response()
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Student => "student",
        Role::Society => "society",
        Role::Admin => "admin",
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::PendingApproval => Self::PendingApproval,
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AccessError> for ServerError {
    fn from(value: AccessError) -> Self {
        match value {
            AccessError::NotAuthenticated => Self::NotAuthenticated,
            // The session points nowhere; a fresh login is the only fix
            AccessError::UnknownProfile => Self::NotAuthenticated,
            AccessError::RoleMismatch { required } => Self::RoleRequired(role_name(required)),
            AccessError::PendingApproval => Self::PendingApproval,
            AccessError::Store(e) => Self::Unknown(e.to_string()),
        }
    }
}

impl From<WorkflowError> for ServerError {
    fn from(value: WorkflowError) -> Self {
        match value {
            WorkflowError::NotASociety => Self::NotASociety,
            WorkflowError::NotASocietySignup => Self::NotASocietySignup,
            WorkflowError::AlreadyApproved => Self::AlreadyApproved,
            WorkflowError::EventNotOpen => Self::EventNotOpen,
            WorkflowError::NotOwner => Self::NotOwner,
            WorkflowError::Db(e) => e.into(),
        }
    }
}

impl From<StorageError> for ServerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::InvalidExtension => Self::InvalidExtension,
            e => Self::Unknown(e.to_string()),
        }
    }
}
