use axum::{
    extract::Path,
    routing::{get, post},
    Json,
};
use campushub_core::{NewSignup, PrimaryKey, Role};

use crate::{
    auth::Caller,
    context::ServerContext,
    errors::ServerResult,
    schemas::{NewAdminSchema, ValidatedJson},
    serialized::{Event, Profile, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/admin/societies/pending",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Profile>)
    )
)]
async fn pending_societies(
    Caller(caller): Caller,
    context: ServerContext,
) -> ServerResult<Json<Vec<Profile>>> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    let profiles = context.hub.workflow.pending_societies().await?;

    Ok(Json(profiles.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/admin/societies/{id}/approve",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Profile)
    )
)]
async fn approve_society(
    Caller(caller): Caller,
    context: ServerContext,
    Path(profile_id): Path<PrimaryKey>,
) -> ServerResult<Json<Profile>> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    let profile = context.hub.workflow.approve_society(profile_id).await?;

    Ok(Json(profile.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/admin/societies/{id}/reject",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Signup was rejected and its profile deleted")
    )
)]
async fn reject_society(
    Caller(caller): Caller,
    context: ServerContext,
    Path(profile_id): Path<PrimaryKey>,
) -> ServerResult<()> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    context.hub.workflow.reject_society(profile_id).await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/admin/events/pending",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Event>)
    )
)]
async fn pending_events(
    Caller(caller): Caller,
    context: ServerContext,
) -> ServerResult<Json<Vec<Event>>> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    let events = context.hub.workflow.pending_events().await?;

    Ok(Json(events.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/admin/events/{id}/approve",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Event)
    )
)]
async fn approve_event(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
) -> ServerResult<Json<Event>> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    let event = context.hub.workflow.approve_event(event_id).await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/admin/events/{id}/reject",
    tag = "admin",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Event)
    )
)]
async fn reject_event(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
) -> ServerResult<Json<Event>> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    let event = context.hub.workflow.reject_event(event_id).await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/admin/accounts",
    tag = "admin",
    request_body = NewAdminSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Profile)
    )
)]
async fn create_admin(
    Caller(caller): Caller,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<NewAdminSchema>,
) -> ServerResult<Json<Profile>> {
    context.hub.access.evaluate(&caller, Role::Admin).await?;

    let profile = context
        .hub
        .auth
        .register_admin(NewSignup {
            username: body.username,
            email: body.email,
            password: body.password,
            display_name: body.display_name,
        })
        .await?;

    Ok(Json(profile.to_serialized()))
}

pub fn router() -> Router {
    Router::new()
        .route("/societies/pending", get(pending_societies))
        .route("/societies/:id/approve", post(approve_society))
        .route("/societies/:id/reject", post(reject_society))
        .route("/events/pending", get(pending_events))
        .route("/events/:id/approve", post(approve_event))
        .route("/events/:id/reject", post(reject_event))
        .route("/accounts", post(create_admin))
}
