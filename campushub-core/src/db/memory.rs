//! In-memory [Database] used by the state machine tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
    AccountStatus, Database, DatabaseError, DatabaseResult, EventData, EventEntryData, EventStatus,
    NewEvent, NewProfile, NewRegistration, NewSession, NewSociety, PrimaryKey, ProfileData,
    RegistrationData, Result, Role, SessionData, SocietyData, UpdatedEvent,
};

#[derive(Debug, Clone)]
struct SessionRecord {
    id: PrimaryKey,
    token: String,
    profile_id: PrimaryKey,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct State {
    profiles: Vec<ProfileData>,
    sessions: Vec<SessionRecord>,
    societies: Vec<SocietyData>,
    events: Vec<EventData>,
    registrations: Vec<RegistrationData>,
    next_id: PrimaryKey,
}

impl State {
    fn next_id(&mut self) -> PrimaryKey {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<State>,
}

fn not_found(resource: &'static str, identifier: &'static str) -> DatabaseError {
    DatabaseError::NotFound {
        resource,
        identifier,
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn profile_by_id(&self, profile_id: PrimaryKey) -> Result<ProfileData> {
        self.state
            .lock()
            .profiles
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or(not_found("profile", "id"))
    }

    async fn profile_by_username(&self, username: &str) -> Result<ProfileData> {
        self.state
            .lock()
            .profiles
            .iter()
            .find(|p| p.username == username)
            .cloned()
            .ok_or(not_found("profile", "username"))
    }

    async fn profile_by_email(&self, email: &str) -> Result<ProfileData> {
        self.state
            .lock()
            .profiles
            .iter()
            .find(|p| p.email == email)
            .cloned()
            .ok_or(not_found("profile", "email"))
    }

    async fn create_profile(&self, new_profile: NewProfile) -> Result<ProfileData> {
        self.profile_by_username(&new_profile.username)
            .await
            .conflict_or_ok("profile", "username", &new_profile.username)?;

        self.profile_by_email(&new_profile.email)
            .await
            .conflict_or_ok("profile", "email", &new_profile.email)?;

        let mut state = self.state.lock();
        let profile = ProfileData {
            id: state.next_id(),
            username: new_profile.username,
            email: new_profile.email,
            password: new_profile.password,
            display_name: new_profile.display_name,
            role: new_profile.kind.role(),
            status: new_profile.kind.initial_status(),
            society_id: new_profile.kind.society_id(),
        };

        state.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile_status(
        &self,
        profile_id: PrimaryKey,
        status: AccountStatus,
    ) -> Result<ProfileData> {
        let mut state = self.state.lock();
        let profile = state
            .profiles
            .iter_mut()
            .find(|p| p.id == profile_id)
            .ok_or(not_found("profile", "id"))?;

        profile.status = status;
        Ok(profile.clone())
    }

    async fn delete_profile(&self, profile_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.profiles.iter().any(|p| p.id == profile_id) {
            return Err(not_found("profile", "id"));
        }

        state.profiles.retain(|p| p.id != profile_id);
        state.sessions.retain(|s| s.profile_id != profile_id);
        Ok(())
    }

    async fn list_pending_societies(&self) -> Result<Vec<ProfileData>> {
        Ok(self
            .state
            .lock()
            .profiles
            .iter()
            .filter(|p| p.role == Role::Society && p.status == AccountStatus::Pending)
            .cloned()
            .collect())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let state = self.state.lock();

        let record = state
            .sessions
            .iter()
            .find(|s| s.token == token && s.expires_at > Utc::now())
            .cloned()
            .ok_or(not_found("session", "token"))?;

        let profile = state
            .profiles
            .iter()
            .find(|p| p.id == record.profile_id)
            .cloned()
            .ok_or(not_found("session", "token"))?;

        Ok(SessionData {
            id: record.id,
            token: record.token,
            expires_at: record.expires_at,
            profile,
        })
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        self.session_by_token(&new_session.token)
            .await
            .conflict_or_ok("session", "token", &new_session.token)?;

        {
            let mut state = self.state.lock();
            let id = state.next_id();
            state.sessions.push(SessionRecord {
                id,
                token: new_session.token.clone(),
                profile_id: new_session.profile_id,
                expires_at: new_session.expires_at,
            });
        }

        self.session_by_token(&new_session.token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        let _ = self.session_by_token(token).await?;

        self.state.lock().sessions.retain(|s| s.token != token);
        Ok(())
    }

    async fn delete_sessions_for_profile(&self, profile_id: PrimaryKey) -> Result<()> {
        self.state
            .lock()
            .sessions
            .retain(|s| s.profile_id != profile_id);
        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<()> {
        self.state
            .lock()
            .sessions
            .retain(|s| s.expires_at > Utc::now());
        Ok(())
    }

    async fn society_by_id(&self, society_id: PrimaryKey) -> Result<SocietyData> {
        self.state
            .lock()
            .societies
            .iter()
            .find(|s| s.id == society_id)
            .cloned()
            .ok_or(not_found("society", "id"))
    }

    async fn create_society(&self, new_society: NewSociety) -> Result<SocietyData> {
        let mut state = self.state.lock();
        let society = SocietyData {
            id: state.next_id(),
            name: new_society.name,
        };

        state.societies.push(society.clone());
        Ok(society)
    }

    async fn delete_society(&self, society_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.societies.iter().any(|s| s.id == society_id) {
            return Err(not_found("society", "id"));
        }

        state.societies.retain(|s| s.id != society_id);
        Ok(())
    }

    async fn list_societies(&self) -> Result<Vec<SocietyData>> {
        let mut societies = self.state.lock().societies.clone();
        societies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(societies)
    }

    async fn event_by_id(&self, event_id: PrimaryKey) -> Result<EventData> {
        self.state
            .lock()
            .events
            .iter()
            .find(|e| e.id == event_id)
            .cloned()
            .ok_or(not_found("event", "id"))
    }

    async fn create_event(&self, new_event: NewEvent) -> Result<EventData> {
        let society = self.society_by_id(new_event.society_id).await?;

        let mut state = self.state.lock();
        let event = EventData {
            id: state.next_id(),
            title: new_event.title,
            description: new_event.description,
            event_date: new_event.event_date,
            start_time: new_event.start_time,
            end_time: new_event.end_time,
            venue: new_event.venue,
            poster_url: new_event.poster_url,
            society_id: society.id,
            society_name: society.name,
            status: EventStatus::Pending,
            created_at: Utc::now(),
        };

        state.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(&self, updated_event: UpdatedEvent) -> Result<EventData> {
        let mut state = self.state.lock();
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == updated_event.id)
            .ok_or(not_found("event", "id"))?;

        if let Some(title) = updated_event.title {
            event.title = title;
        }
        if let Some(description) = updated_event.description {
            event.description = description;
        }
        if let Some(event_date) = updated_event.event_date {
            event.event_date = event_date;
        }
        if let Some(start_time) = updated_event.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = updated_event.end_time {
            event.end_time = end_time;
        }
        if let Some(venue) = updated_event.venue {
            event.venue = venue;
        }
        if let Some(poster_url) = updated_event.poster_url {
            event.poster_url = Some(poster_url);
        }

        Ok(event.clone())
    }

    async fn update_event_status(
        &self,
        event_id: PrimaryKey,
        status: EventStatus,
    ) -> Result<EventData> {
        let mut state = self.state.lock();
        let event = state
            .events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or(not_found("event", "id"))?;

        event.status = status;
        Ok(event.clone())
    }

    async fn delete_event(&self, event_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.lock();

        if !state.events.iter().any(|e| e.id == event_id) {
            return Err(not_found("event", "id"));
        }

        state.events.retain(|e| e.id != event_id);
        state.registrations.retain(|r| r.event_id != event_id);
        Ok(())
    }

    async fn events_by_status(&self, status: EventStatus) -> Result<Vec<EventData>> {
        let mut events: Vec<_> = self
            .state
            .lock()
            .events
            .iter()
            .filter(|e| e.status == status)
            .cloned()
            .collect();

        events.sort_by_key(|e| e.event_date);
        Ok(events)
    }

    async fn events_by_society(&self, society_id: PrimaryKey) -> Result<Vec<EventEntryData>> {
        let state = self.state.lock();

        let mut events: Vec<_> = state
            .events
            .iter()
            .filter(|e| e.society_id == society_id)
            .cloned()
            .collect();

        events.sort_by_key(|e| std::cmp::Reverse(e.created_at));

        Ok(events
            .into_iter()
            .map(|event| {
                let registration_count = state
                    .registrations
                    .iter()
                    .filter(|r| r.event_id == event.id)
                    .count() as i64;

                EventEntryData {
                    event,
                    registration_count,
                }
            })
            .collect())
    }

    async fn registration_by_pair(
        &self,
        event_id: PrimaryKey,
        student_id: PrimaryKey,
    ) -> Result<RegistrationData> {
        self.state
            .lock()
            .registrations
            .iter()
            .find(|r| r.event_id == event_id && r.student_id == student_id)
            .cloned()
            .ok_or(not_found("registration", "event:student"))
    }

    async fn create_registration(
        &self,
        new_registration: NewRegistration,
    ) -> Result<RegistrationData> {
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

        let mut state = self.state.lock();
        let registration = RegistrationData {
            id: state.next_id(),
            event_id: new_registration.event_id,
            student_id: new_registration.student_id,
            full_name: new_registration.full_name,
            roll_number: new_registration.roll_number,
            phone_number: new_registration.phone_number,
            department: new_registration.department,
            created_at: Utc::now(),
        };

        state.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn delete_registration(
        &self,
        event_id: PrimaryKey,
        student_id: PrimaryKey,
    ) -> Result<()> {
        let _ = self.registration_by_pair(event_id, student_id).await?;

        self.state
            .lock()
            .registrations
            .retain(|r| !(r.event_id == event_id && r.student_id == student_id));
        Ok(())
    }

    async fn registrations_for_event(
        &self,
        event_id: PrimaryKey,
    ) -> Result<Vec<RegistrationData>> {
        let mut registrations: Vec<_> = self
            .state
            .lock()
            .registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect();

        registrations.sort_by_key(|r| std::cmp::Reverse(r.created_at));
        Ok(registrations)
    }

    async fn registration_event_ids(&self, student_id: PrimaryKey) -> Result<Vec<PrimaryKey>> {
        Ok(self
            .state
            .lock()
            .registrations
            .iter()
            .filter(|r| r.student_id == student_id)
            .map(|r| r.event_id)
            .collect())
    }
}
