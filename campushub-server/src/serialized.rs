//! All schemas that are exposed from endpoints are defined here
//! along with the conversions from the core data types

use campushub_core::{
    AccountStatus as CoreAccountStatus, EventData, EventEntryData, EventStatus as CoreEventStatus,
    ProfileData, RegistrationData, Role as CoreRole, SessionData, SocietyData,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Society,
    Admin,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Profile {
    id: i32,
    username: String,
    email: String,
    display_name: String,
    role: Role,
    status: AccountStatus,
    society_id: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResult {
    token: String,
    profile: Profile,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Society {
    id: i32,
    name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Event {
    id: i32,
    title: String,
    description: String,
    event_date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    venue: String,
    poster_url: Option<String>,
    society_id: i32,
    society_name: String,
    status: EventStatus,
    created_at: DateTime<Utc>,
}

/// An event on a society's own dashboard
#[derive(Debug, Serialize, ToSchema)]
pub struct EventEntry {
    event: Event,
    registration_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Attendee {
    full_name: String,
    roll_number: String,
    phone_number: String,
    department: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PosterUpload {
    pub url: String,
}

impl From<CoreRole> for Role {
    fn from(value: CoreRole) -> Self {
        match value {
            CoreRole::Student => Self::Student,
            CoreRole::Society => Self::Society,
            CoreRole::Admin => Self::Admin,
        }
    }
}

impl From<CoreAccountStatus> for AccountStatus {
    fn from(value: CoreAccountStatus) -> Self {
        match value {
            CoreAccountStatus::Pending => Self::Pending,
            CoreAccountStatus::Approved => Self::Approved,
        }
    }
}

impl From<CoreEventStatus> for EventStatus {
    fn from(value: CoreEventStatus) -> Self {
        match value {
            CoreEventStatus::Pending => Self::Pending,
            CoreEventStatus::Approved => Self::Approved,
            CoreEventStatus::Rejected => Self::Rejected,
        }
    }
}

/// Helper trait to convert any type into a serialized version
pub trait ToSerialized<T>
where
    T: Serialize,
{
    fn to_serialized(&self) -> T;
}

impl<I, O> ToSerialized<Vec<O>> for Vec<I>
where
    I: ToSerialized<O>,
    O: Serialize,
{
    fn to_serialized(&self) -> Vec<O> {
        self.iter().map(|x| x.to_serialized()).collect()
    }
}

impl ToSerialized<Profile> for ProfileData {
    fn to_serialized(&self) -> Profile {
        Profile {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role.into(),
            status: self.status.into(),
            society_id: self.society_id,
        }
    }
}

impl ToSerialized<LoginResult> for SessionData {
    fn to_serialized(&self) -> LoginResult {
        LoginResult {
            token: self.token.clone(),
            profile: self.profile.to_serialized(),
        }
    }
}

impl ToSerialized<Society> for SocietyData {
    fn to_serialized(&self) -> Society {
        Society {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl ToSerialized<Event> for EventData {
    fn to_serialized(&self) -> Event {
        Event {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            event_date: self.event_date,
            start_time: self.start_time,
            end_time: self.end_time,
            venue: self.venue.clone(),
            poster_url: self.poster_url.clone(),
            society_id: self.society_id,
            society_name: self.society_name.clone(),
            status: self.status.into(),
            created_at: self.created_at,
        }
    }
}

impl ToSerialized<EventEntry> for EventEntryData {
    fn to_serialized(&self) -> EventEntry {
        EventEntry {
            event: self.event.to_serialized(),
            registration_count: self.registration_count,
        }
    }
}

impl ToSerialized<Attendee> for RegistrationData {
    fn to_serialized(&self) -> Attendee {
        Attendee {
            full_name: self.full_name.clone(),
            roll_number: self.roll_number.clone(),
            phone_number: self.phone_number.clone(),
            department: self.department.clone(),
            created_at: self.created_at,
        }
    }
}
