use crate::domain::{Actor, MemberId, StaffId};
use async_trait::async_trait;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// 操作主体のロールを示すヘッダー
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// 操作主体のIDを示すヘッダー
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// 認証済みの操作主体
///
/// 認証は上流（ゲートウェイ等）で行われ、結果がヘッダーで渡される前提。
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedActor(pub Actor);

/// 操作主体を特定できない
#[derive(Debug)]
pub enum AuthError {
    MissingHeader(&'static str),
    InvalidHeader(&'static str),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingHeader(name) => format!("Missing {} header", name),
            AuthError::InvalidHeader(name) => format!("Invalid {} header", name),
        };
        let body = Json(ErrorResponse::new("UNAUTHENTICATED", message));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

fn header_value<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, AuthError> {
    parts
        .headers
        .get(name)
        .ok_or(AuthError::MissingHeader(name))?
        .to_str()
        .map_err(|_| AuthError::InvalidHeader(name))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedActor
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let role = header_value(parts, ACTOR_ROLE_HEADER)?;
        let id: i64 = header_value(parts, ACTOR_ID_HEADER)?
            .trim()
            .parse()
            .map_err(|_| AuthError::InvalidHeader(ACTOR_ID_HEADER))?;

        let invalid_id = |_| AuthError::InvalidHeader(ACTOR_ID_HEADER);
        let actor = match role.trim().to_ascii_lowercase().as_str() {
            "member" => Actor::Member(MemberId::try_from(id).map_err(invalid_id)?),
            "librarian" => Actor::Librarian(StaffId::try_from(id).map_err(invalid_id)?),
            "admin" => Actor::Admin(StaffId::try_from(id).map_err(invalid_id)?),
            _ => return Err(AuthError::InvalidHeader(ACTOR_ROLE_HEADER)),
        };

        Ok(AuthenticatedActor(actor))
    }
}
