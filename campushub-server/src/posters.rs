use axum::{body::Bytes, extract::Query, routing::post, Json};
use campushub_core::{PosterStore, Role};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    auth::Caller,
    context::ServerContext,
    errors::{ServerError, ServerResult},
    serialized::PosterUpload,
    Router,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct PosterQuery {
    /// File extension of the uploaded poster, e.g. `png`
    pub extension: String,
}

#[utoipa::path(
    post,
    path = "/v1/posters",
    tag = "posters",
    params(PosterQuery),
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = PosterUpload)
    )
)]
async fn upload_poster(
    Caller(caller): Caller,
    context: ServerContext,
    Query(query): Query<PosterQuery>,
    bytes: Bytes,
) -> ServerResult<Json<PosterUpload>> {
    let pass = context.hub.access.evaluate(&caller, Role::Society).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;
    let society_id = profile.society_id.ok_or(ServerError::NotASociety)?;

    let url = context
        .posters
        .store(society_id, &query.extension, &bytes)
        .await?;

    Ok(Json(PosterUpload { url }))
}

pub fn router() -> Router {
    Router::new().route("/", post(upload_poster))
}
