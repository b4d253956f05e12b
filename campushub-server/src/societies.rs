use axum::{routing::get, Json};

use crate::{
    auth::Session,
    context::ServerContext,
    errors::ServerResult,
    serialized::{Society, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/societies",
    tag = "societies",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Society>)
    )
)]
async fn list_societies(
    _session: Session,
    context: ServerContext,
) -> ServerResult<Json<Vec<Society>>> {
    let societies = context.hub.workflow.list_societies().await?;

    Ok(Json(societies.to_serialized()))
}

pub fn router() -> Router {
    Router::new().route("/", get(list_societies))
}
