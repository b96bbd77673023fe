//! Application error type.
//!
//! Every failure in Warden is an [`AppError`] carrying an [`ErrorKind`]. The
//! kind is what callers match on; the wrapped [`anyhow::Error`] carries the
//! human-readable message. The HTTP layer turns the kind into a status code.

use std::fmt;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// The category of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input (empty names, invalid email, short password).
    Validation,
    /// A unique name or email is already taken.
    DuplicateName,
    /// A referenced id or name does not exist.
    NotFound,
    /// The operation would break a protection invariant.
    ProtectedResource,
    /// The membership being added already exists.
    AlreadyMember,
    Unauthorized,
    Forbidden,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::DuplicateName => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ProtectedResource => StatusCode::FORBIDDEN,
            ErrorKind::AlreadyMember => StatusCode::CONFLICT,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            kind,
            error: err.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }

    pub fn validation<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Validation, err)
    }

    pub fn duplicate_name<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::DuplicateName, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::NotFound, err)
    }

    pub fn protected<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::ProtectedResource, err)
    }

    pub fn already_member<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::AlreadyMember, err)
    }

    pub fn unauthorized<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Unauthorized, err)
    }

    pub fn forbidden<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Forbidden, err)
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(ErrorKind::Internal, err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::Internal {
            tracing::error!(error = ?self.error, "internal error");
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            kind: self.kind,
        });

        (self.kind.status(), body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_kind_status_mapping() {
        assert_eq!(
            ErrorKind::Validation.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ErrorKind::DuplicateName.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorKind::ProtectedResource.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(ErrorKind::AlreadyMember.status(), StatusCode::CONFLICT);
        assert_eq!(ErrorKind::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ErrorKind::Internal.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_constructors_set_kind() {
        assert_eq!(
            AppError::protected(anyhow!("nope")).kind(),
            ErrorKind::ProtectedResource
        );
        assert_eq!(
            AppError::already_member(anyhow!("twice")).kind(),
            ErrorKind::AlreadyMember
        );
        assert_eq!(
            AppError::duplicate_name(anyhow!("taken")).kind(),
            ErrorKind::DuplicateName
        );
    }

    #[test]
    fn test_foreign_errors_become_internal() {
        let err: AppError = std::io::Error::other("disk on fire").into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.error.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::ProtectedResource).unwrap();
        assert_eq!(json, r#""protected_resource""#);
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::not_found(anyhow!("Role not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
