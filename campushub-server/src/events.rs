use axum::{
    extract::Path,
    routing::{delete, get, patch, post},
    Json,
};
use campushub_core::{EventProposal, PrimaryKey, RegistrationDetails, Role, UpdatedEvent};

use crate::{
    auth::{Caller, Session},
    context::ServerContext,
    errors::{ServerError, ServerResult},
    schemas::{NewEventSchema, RegistrationSchema, UpdateEventSchema, ValidatedJson},
    serialized::{Attendee, Event, EventEntry, ToSerialized},
    Router,
};

#[utoipa::path(
    get,
    path = "/v1/events",
    tag = "events",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Event>)
    )
)]
async fn list_events(_session: Session, context: ServerContext) -> ServerResult<Json<Vec<Event>>> {
    let events = context.hub.workflow.approved_events().await?;

    Ok(Json(events.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/events",
    tag = "events",
    request_body = NewEventSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Event)
    )
)]
async fn create_event(
    Caller(caller): Caller,
    context: ServerContext,
    ValidatedJson(body): ValidatedJson<NewEventSchema>,
) -> ServerResult<Json<Event>> {
    let pass = context.hub.access.evaluate(&caller, Role::Society).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    let event = context
        .hub
        .workflow
        .propose_event(
            &profile,
            EventProposal {
                title: body.title,
                description: body.description,
                event_date: body.event_date,
                start_time: body.start_time,
                end_time: body.end_time,
                venue: body.venue,
                poster_url: body.poster_url,
            },
        )
        .await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    get,
    path = "/v1/events/mine",
    tag = "events",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<EventEntry>)
    )
)]
async fn my_events(
    Caller(caller): Caller,
    context: ServerContext,
) -> ServerResult<Json<Vec<EventEntry>>> {
    let pass = context.hub.access.evaluate(&caller, Role::Society).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    let entries = context.hub.workflow.events_for_society(&profile).await?;

    Ok(Json(entries.to_serialized()))
}

#[utoipa::path(
    patch,
    path = "/v1/events/{id}",
    tag = "events",
    request_body = UpdateEventSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Event)
    )
)]
async fn update_event(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
    ValidatedJson(body): ValidatedJson<UpdateEventSchema>,
) -> ServerResult<Json<Event>> {
    let pass = context.hub.access.evaluate(&caller, Role::Society).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    let event = context
        .hub
        .workflow
        .update_event(
            &profile,
            UpdatedEvent {
                id: event_id,
                title: body.title,
                description: body.description,
                event_date: body.event_date,
                start_time: body.start_time,
                end_time: body.end_time,
                venue: body.venue,
                poster_url: body.poster_url,
            },
        )
        .await?;

    Ok(Json(event.to_serialized()))
}

#[utoipa::path(
    delete,
    path = "/v1/events/{id}",
    tag = "events",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Event and its registrations were deleted")
    )
)]
async fn delete_event(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
) -> ServerResult<()> {
    let pass = context.hub.access.evaluate(&caller, Role::Society).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    context.hub.workflow.delete_event(&profile, event_id).await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/events/{id}/registrations",
    tag = "events",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<Attendee>)
    )
)]
async fn attendees(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
) -> ServerResult<Json<Vec<Attendee>>> {
    let pass = context.hub.access.evaluate(&caller, Role::Society).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    let registrations = context.hub.workflow.attendees(&profile, event_id).await?;

    Ok(Json(registrations.to_serialized()))
}

#[utoipa::path(
    post,
    path = "/v1/events/{id}/registrations",
    tag = "events",
    request_body = RegistrationSchema,
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Student was registered for the event")
    )
)]
async fn register(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
    ValidatedJson(body): ValidatedJson<RegistrationSchema>,
) -> ServerResult<()> {
    let pass = context.hub.access.evaluate(&caller, Role::Student).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    context
        .hub
        .workflow
        .register(
            &profile,
            event_id,
            RegistrationDetails {
                full_name: body.full_name,
                roll_number: body.roll_number,
                phone_number: body.phone_number,
                department: body.department,
            },
        )
        .await?;

    Ok(())
}

#[utoipa::path(
    delete,
    path = "/v1/events/{id}/registrations",
    tag = "events",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, description = "Registration was cancelled")
    )
)]
async fn cancel_registration(
    Caller(caller): Caller,
    context: ServerContext,
    Path(event_id): Path<PrimaryKey>,
) -> ServerResult<()> {
    let pass = context.hub.access.evaluate(&caller, Role::Student).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    context
        .hub
        .workflow
        .cancel_registration(&profile, event_id)
        .await?;

    Ok(())
}

#[utoipa::path(
    get,
    path = "/v1/registrations",
    tag = "events",
    security(
        ("BearerAuth" = [])
    ),
    responses(
        (status = 200, body = Vec<i32>, description = "Ids of the events the student is registered for")
    )
)]
pub async fn my_registrations(
    Caller(caller): Caller,
    context: ServerContext,
) -> ServerResult<Json<Vec<PrimaryKey>>> {
    let pass = context.hub.access.evaluate(&caller, Role::Student).await?;
    let profile = pass.into_profile().ok_or(ServerError::NotAuthenticated)?;

    let ids = context.hub.workflow.registered_event_ids(&profile).await?;

    Ok(Json(ids))
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_events))
        .route("/", post(create_event))
        .route("/mine", get(my_events))
        .route("/:id", patch(update_event))
        .route("/:id", delete(delete_event))
        .route("/:id/registrations", get(attendees))
        .route("/:id/registrations", post(register))
        .route("/:id/registrations", delete(cancel_registration))
}
