use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// The type used for primary keys in the database.
pub type PrimaryKey = i32;

/// The role a profile acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "profile_role", rename_all = "lowercase")]
pub enum Role {
    Student,
    Society,
    Admin,
}

/// Approval state of an account. Only societies ever start out pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "account_status", rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Approved,
}

/// Approval state of an event proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
pub enum EventStatus {
    Pending,
    Approved,
    Rejected,
}

/// What kind of account a new profile is created as.
///
/// The role decides the initial approval status, so a student or admin
/// profile in the pending state is unrepresentable.
#[derive(Debug, Clone, Copy)]
pub enum ProfileKind {
    Student,
    Admin,
    Society { society_id: PrimaryKey },
}

impl ProfileKind {
    pub fn role(&self) -> Role {
        match self {
            Self::Student => Role::Student,
            Self::Admin => Role::Admin,
            Self::Society { .. } => Role::Society,
        }
    }

    pub fn initial_status(&self) -> AccountStatus {
        match self {
            Self::Society { .. } => AccountStatus::Pending,
            _ => AccountStatus::Approved,
        }
    }

    pub fn society_id(&self) -> Option<PrimaryKey> {
        match self {
            Self::Society { society_id } => Some(*society_id),
            _ => None,
        }
    }
}

/// A campushub account
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileData {
    pub id: PrimaryKey,
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
    pub status: AccountStatus,
    /// Present iff the profile acts on behalf of a society
    pub society_id: Option<PrimaryKey>,
}

/// Login session data for authentication
#[derive(Debug, Clone)]
pub struct SessionData {
    pub id: PrimaryKey,
    /// The session token, or key if you will
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// The profile that is logged in
    pub profile: ProfileData,
}

/// An organizational entity that owns events
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SocietyData {
    pub id: PrimaryKey,
    pub name: String,
}

/// A campus event, always read together with the owning society's name
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventData {
    pub id: PrimaryKey,
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: String,
    pub poster_url: Option<String>,
    pub society_id: PrimaryKey,
    pub society_name: String,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

/// An event as listed on a society's own dashboard
#[derive(Debug, Clone)]
pub struct EventEntryData {
    pub event: EventData,
    pub registration_count: i64,
}

/// A student's registration for an event
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistrationData {
    pub id: PrimaryKey,
    pub event_id: PrimaryKey,
    pub student_id: PrimaryKey,
    pub full_name: String,
    pub roll_number: String,
    pub phone_number: String,
    pub department: String,
    pub created_at: DateTime<Utc>,
}
