use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, query, query_as, query_scalar, Error as SqlxError, PgPool};

use crate::{
    AccountStatus, Database, DatabaseError, DatabaseResult, EventData, EventEntryData, EventStatus,
    IntoDatabaseError, NewEvent, NewProfile, NewRegistration, NewSession, NewSociety, PrimaryKey,
    ProfileData, RegistrationData, Result, Role, SessionData, SocietyData, UpdatedEvent,
};

/// A postgres database implementation for campushub
pub struct PgDatabase {
    pool: PgPool,
}

/// Flat row for the session → profile join
#[derive(sqlx::FromRow)]
struct SessionRow {
    id: PrimaryKey,
    token: String,
    expires_at: DateTime<Utc>,
    profile_id: PrimaryKey,
    username: String,
    email: String,
    password: String,
    display_name: String,
    role: Role,
    status: AccountStatus,
    society_id: Option<PrimaryKey>,
}

impl SessionRow {
    fn into_data(self) -> SessionData {
        SessionData {
            id: self.id,
            token: self.token,
            expires_at: self.expires_at,
            profile: ProfileData {
                id: self.profile_id,
                username: self.username,
                email: self.email,
                password: self.password,
                display_name: self.display_name,
                role: self.role,
                status: self.status,
                society_id: self.society_id,
            },
        }
    }
}

/// Flat row for a society's event listing with its registration count
#[derive(sqlx::FromRow)]
struct EventEntryRow {
    #[sqlx(flatten)]
    event: EventData,
    registration_count: i64,
}

const EVENT_COLUMNS: &str = "events.*, societies.name AS society_name";

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))?;

        Ok(Self { pool })
    }

    /// Applies the schema migrations bundled with this crate
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Internal(Box::new(e)))
    }
}

#[async_trait]
impl Database for PgDatabase {
    async fn profile_by_id(&self, profile_id: PrimaryKey) -> Result<ProfileData> {
        query_as::<_, ProfileData>("SELECT * FROM profiles WHERE id = $1")
            .bind(profile_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("profile", "id"))
    }

    async fn profile_by_username(&self, username: &str) -> Result<ProfileData> {
        query_as::<_, ProfileData>("SELECT * FROM profiles WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("profile", "username"))
    }

    async fn profile_by_email(&self, email: &str) -> Result<ProfileData> {
        query_as::<_, ProfileData>("SELECT * FROM profiles WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("profile", "email"))
    }

    async fn create_profile(&self, new_profile: NewProfile) -> Result<ProfileData> {
        self.profile_by_username(&new_profile.username)
            .await
            .conflict_or_ok("profile", "username", &new_profile.username)?;

        self.profile_by_email(&new_profile.email)
            .await
            .conflict_or_ok("profile", "email", &new_profile.email)?;

        query_as::<_, ProfileData>(
            "INSERT INTO profiles (username, email, password, display_name, role, status, society_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING *",
        )
        .bind(&new_profile.username)
        .bind(&new_profile.email)
        .bind(&new_profile.password)
        .bind(&new_profile.display_name)
        .bind(new_profile.kind.role())
        .bind(new_profile.kind.initial_status())
        .bind(new_profile.kind.society_id())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn update_profile_status(
        &self,
        profile_id: PrimaryKey,
        status: AccountStatus,
    ) -> Result<ProfileData> {
        // Ensure profile exists
        let _ = self.profile_by_id(profile_id).await?;

        query("UPDATE profiles SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.profile_by_id(profile_id).await
    }

    async fn delete_profile(&self, profile_id: PrimaryKey) -> Result<()> {
        // Ensure profile exists
        let _ = self.profile_by_id(profile_id).await?;

        query("DELETE FROM profiles WHERE id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn list_pending_societies(&self) -> Result<Vec<ProfileData>> {
        query_as::<_, ProfileData>(
            "SELECT * FROM profiles WHERE role = 'society' AND status = 'pending'",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row = query_as::<_, SessionRow>(
            "SELECT
                sessions.id,
                sessions.token,
                sessions.expires_at,
                profiles.id AS profile_id,
                profiles.username,
                profiles.email,
                profiles.password,
                profiles.display_name,
                profiles.role,
                profiles.status,
                profiles.society_id
            FROM sessions
                INNER JOIN profiles ON sessions.profile_id = profiles.id
            WHERE sessions.token = $1 AND sessions.expires_at > now()",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("session", "token"))?;

        Ok(row.into_data())
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        let token: String = query_scalar(
            "INSERT INTO sessions (token, profile_id, expires_at) VALUES ($1, $2, $3) RETURNING token",
        )
        .bind(&new_session.token)
        .bind(new_session.profile_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn delete_sessions_for_profile(&self, profile_id: PrimaryKey) -> Result<()> {
        query("DELETE FROM sessions WHERE profile_id = $1")
            .bind(profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        query("DELETE FROM sessions WHERE now() > expires_at")
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn society_by_id(&self, society_id: PrimaryKey) -> Result<SocietyData> {
        query_as::<_, SocietyData>("SELECT * FROM societies WHERE id = $1")
            .bind(society_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("society", "id"))
    }

    async fn create_society(&self, new_society: NewSociety) -> Result<SocietyData> {
        query_as::<_, SocietyData>("INSERT INTO societies (name) VALUES ($1) RETURNING *")
            .bind(&new_society.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn delete_society(&self, society_id: PrimaryKey) -> Result<()> {
        // Ensure society exists
        let _ = self.society_by_id(society_id).await?;

        query("DELETE FROM societies WHERE id = $1")
            .bind(society_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn list_societies(&self) -> Result<Vec<SocietyData>> {
        query_as::<_, SocietyData>("SELECT * FROM societies ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData> {
        query_as::<_, EventData>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
                INNER JOIN societies ON events.society_id = societies.id
            WHERE events.id = $1",
        ))
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("event", "id"))
    }

    async fn create_event(&self, new_event: NewEvent) -> Result<EventData> {
        // Ensure the owning society exists
        let _ = self.society_by_id(new_event.society_id).await?;

        let id: PrimaryKey = query_scalar(
            "INSERT INTO events
                (title, description, event_date, start_time, end_time, venue, poster_url, society_id, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending')
             RETURNING id",
        )
        .bind(&new_event.title)
        .bind(&new_event.description)
        .bind(new_event.event_date)
        .bind(new_event.start_time)
        .bind(new_event.end_time)
        .bind(&new_event.venue)
        .bind(&new_event.poster_url)
        .bind(new_event.society_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.event_by_id(id).await
    }

    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData> {
        let event = self.event_by_id(updated_event.id).await?;

        query(
            "UPDATE events SET
                title = $1,
                description = $2,
                event_date = $3,
                start_time = $4,
                end_time = $5,
                venue = $6,
                poster_url = $7
            WHERE id = $8",
        )
        .bind(updated_event.title.unwrap_or(event.title))
        .bind(updated_event.description.unwrap_or(event.description))
        .bind(updated_event.event_date.unwrap_or(event.event_date))
        .bind(updated_event.start_time.unwrap_or(event.start_time))
        .bind(updated_event.end_time.unwrap_or(event.end_time))
        .bind(updated_event.venue.unwrap_or(event.venue))
        .bind(updated_event.poster_url.or(event.poster_url))
        .bind(updated_event.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.event_by_id(updated_event.id).await
    }

    async fn update_event_status(
        &self,
        event_id: PrimaryKey,
        status: EventStatus,
    ) -> Result<EventData> {
        // Ensure event exists
        let _ = self.event_by_id(event_id).await?;

        query("UPDATE events SET status = $1 WHERE id = $2")
            .bind(status)
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.event_by_id(event_id).await
    }

    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()> {
        // Ensure event exists; registrations cascade via the foreign key
        let _ = self.event_by_id(event_id).await?;

        query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn events_by_status(&self, status: EventStatus) -> Result<Vec<EventData>> {
        query_as::<_, EventData>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
                INNER JOIN societies ON events.society_id = societies.id
            WHERE events.status = $1
            ORDER BY events.event_date",
        ))
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn events_by_society(&self, society_id: PrimaryKey) -> Result<Vec<EventEntryData>> {
        let rows = query_as::<_, EventEntryRow>(&format!(
            "SELECT {EVENT_COLUMNS}, COUNT(registrations.id) AS registration_count
            FROM events
                INNER JOIN societies ON events.society_id = societies.id
                LEFT JOIN registrations ON registrations.event_id = events.id
            WHERE events.society_id = $1
            GROUP BY events.id, societies.name
            ORDER BY events.created_at DESC",
        ))
        .bind(society_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())?;

        let entries = rows
            .into_iter()
            .map(|r| EventEntryData {
                event: r.event,
                registration_count: r.registration_count,
            })
            .collect();

        Ok(entries)
    }

    async fn registration_by_pair(
        &self,
        event_id: PrimaryKey,
        student_id: PrimaryKey,
    ) -> Result<RegistrationData> {
        query_as::<_, RegistrationData>(
            "SELECT * FROM registrations WHERE event_id = $1 AND student_id = $2",
        )
        .bind(event_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("registration", "event:student"))
    }

    async fn create_registration(
        &self,
        new_registration: NewRegistration,
    ) -> Result<RegistrationData> {
        // The UNIQUE(event_id, student_id) constraint backs this check up
        self.registration_by_pair(new_registration.event_id, new_registration.student_id)
            .await
            .conflict_or_ok(
                "registration",
                "event:student",
                format!(
                    "{}:{}",
                    new_registration.event_id, new_registration.student_id
                )
                .as_str(),
            )?;

        query_as::<_, RegistrationData>(
            "INSERT INTO registrations
                (event_id, student_id, full_name, roll_number, phone_number, department)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING *",
        )
        .bind(new_registration.event_id)
        .bind(new_registration.student_id)
        .bind(&new_registration.full_name)
        .bind(&new_registration.roll_number)
        .bind(&new_registration.phone_number)
        .bind(&new_registration.department)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn delete_registration(
        &self,
        event_id: PrimaryKey,
        student_id: PrimaryKey,
    ) -> Result<()> {
        // Ensure registration exists
        let _ = self.registration_by_pair(event_id, student_id).await?;

        query("DELETE FROM registrations WHERE event_id = $1 AND student_id = $2")
            .bind(event_id)
            .bind(student_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn registrations_for_event(
        &self,
        event_id: PrimaryKey,
    ) -> Result<Vec<RegistrationData>> {
        query_as::<_, RegistrationData>(
            "SELECT * FROM registrations WHERE event_id = $1 ORDER BY created_at DESC",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.any())
    }

    async fn registration_event_ids(&self, student_id: PrimaryKey) -> Result<Vec<PrimaryKey>> {
        query_scalar("SELECT event_id FROM registrations WHERE student_id = $1")
            .bind(student_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
