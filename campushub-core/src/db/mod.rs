use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

mod data;
pub use data::*;

mod pg;
pub use pg::*;

#[cfg(test)]
pub(crate) mod memory;

pub type Result<T> = std::result::Result<T, DatabaseError>;
pub type BoxedDatabase = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// An unknown or internal error happened with the database
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
    /// A resource already exists
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        /// The resource in question
        resource: &'static str,
        /// The field that is conflicting
        field: &'static str,
        /// The conflicting value
        value: String,
    },
    /// A resource in the database doesn't exist
    #[error("{resource}:{identifier} doesn't exist")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
}

/// Helper trait to reduce boilerplate
pub trait IntoDatabaseError {
    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError;
    fn any(self) -> DatabaseError;
}

/// Helper trait to reduce boilerplate
pub trait DatabaseResult {
    /// Turns the Result into a conflict error if it's Ok()
    fn conflict_or_ok(self, resource: &'static str, field: &'static str, value: &str)
        -> Result<()>;
}

impl<T> DatabaseResult for Result<T> {
    fn conflict_or_ok(
        self,
        resource: &'static str,
        field: &'static str,
        value: &str,
    ) -> Result<()> {
        match self {
            Ok(_) => Err(DatabaseError::Conflict {
                resource,
                field,
                value: value.to_string(),
            }),
            Err(e) => match e {
                DatabaseError::NotFound {
                    resource: _,
                    identifier: _,
                } => Ok(()),
                e => Err(e),
            },
        }
    }
}

/// Represents a type that can fetch and mutate campushub data in a database
#[async_trait]
pub trait Database: Send + Sync {
    async fn profile_by_id(&self, profile_id: PrimaryKey) -> Result<ProfileData>;
    async fn profile_by_username(&self, username: &str) -> Result<ProfileData>;
    async fn profile_by_email(&self, email: &str) -> Result<ProfileData>;
    async fn create_profile(&self, new_profile: NewProfile) -> Result<ProfileData>;
    async fn update_profile_status(
        &self,
        profile_id: PrimaryKey,
        status: AccountStatus,
    ) -> Result<ProfileData>;
    async fn delete_profile(&self, profile_id: PrimaryKey) -> Result<()>;
    async fn list_pending_societies(&self) -> Result<Vec<ProfileData>>;

    async fn session_by_token(&self, token: &str) -> Result<SessionData>;
    async fn create_session(&self, new_session: NewSession) -> Result<SessionData>;
    async fn delete_session_by_token(&self, token: &str) -> Result<()>;
    async fn delete_sessions_for_profile(&self, profile_id: PrimaryKey) -> Result<()>;
    async fn clear_expired_sessions(&self) -> Result<()>;

    async fn society_by_id(&self, society_id: PrimaryKey) -> Result<SocietyData>;
    async fn create_society(&self, new_society: NewSociety) -> Result<SocietyData>;
    async fn delete_society(&self, society_id: PrimaryKey) -> Result<()>;
    async fn list_societies(&self) -> Result<Vec<SocietyData>>;

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData>;
    async fn create_event(&self, new_event: NewEvent) -> Result<EventData>;
    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData>;
    async fn update_event_status(
        &self,
        event_id: PrimaryKey,
        status: EventStatus,
    ) -> Result<EventData>;
    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()>;
    async fn events_by_status(&self, status: EventStatus) -> Result<Vec<EventData>>;
    async fn events_by_society(&self, society_id: PrimaryKey) -> Result<Vec<EventEntryData>>;

    async fn registration_by_pair(
        &self,
        event_id: PrimaryKey,
        student_id: PrimaryKey,
    ) -> Result<RegistrationData>;
    async fn create_registration(
        &self,
        new_registration: NewRegistration,
    ) -> Result<RegistrationData>;
    async fn delete_registration(
        &self,
        event_id: PrimaryKey,
        student_id: PrimaryKey,
    ) -> Result<()>;
    async fn registrations_for_event(&self, event_id: PrimaryKey)
        -> Result<Vec<RegistrationData>>;
    async fn registration_event_ids(&self, student_id: PrimaryKey) -> Result<Vec<PrimaryKey>>;
}

#[derive(Debug)]
pub struct NewProfile {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    /// Decides role, initial status, and society link
    pub kind: ProfileKind,
}

#[derive(Debug)]
pub struct NewSession {
    pub token: String,
    pub profile_id: PrimaryKey,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct NewSociety {
    pub name: String,
}

#[derive(Debug)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: String,
    pub poster_url: Option<String>,
    /// The society proposing the event
    pub society_id: PrimaryKey,
}

#[derive(Debug, Default)]
pub struct UpdatedEvent {
    pub id: PrimaryKey,
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub venue: Option<String>,
    pub poster_url: Option<String>,
}

#[derive(Debug)]
pub struct NewRegistration {
    pub event_id: PrimaryKey,
    pub student_id: PrimaryKey,
    pub full_name: String,
    pub roll_number: String,
    pub phone_number: String,
    pub department: String,
}
