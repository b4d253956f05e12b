use chrono::{NaiveDate, NaiveTime};
use log::info;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    AccountStatus, Database, DatabaseError, EventData, EventEntryData, EventStatus, NewEvent,
    NewRegistration, PrimaryKey, ProfileData, RegistrationData, Role, SocietyData, UpdatedEvent,
};

/// The approval workflow: society signups and event proposals move from
/// pending to a decision here, and registrations are taken against
/// approved events. Role admission is the [crate::AccessEvaluator]'s job;
/// this type enforces the per-record rules that remain.
pub struct Workflow<Db> {
    db: Arc<Db>,
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The caller does not act for an approved society
    #[error("Caller does not act for an approved society")]
    NotASociety,
    /// The target profile is not a society signup
    #[error("Profile is not a society signup")]
    NotASocietySignup,
    /// Only a pending signup can be rejected
    #[error("Society has already been approved")]
    AlreadyApproved,
    /// The event does not accept registrations in its current state
    #[error("Event is not open for registration")]
    EventNotOpen,
    /// The event belongs to a different society
    #[error("Event belongs to a different society")]
    NotOwner,
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// Content fields of a proposed event. The owning society and the pending
/// status are decided by the workflow, not the caller.
#[derive(Debug)]
pub struct EventProposal {
    pub title: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub venue: String,
    pub poster_url: Option<String>,
}

/// Attendee details captured when a student registers
#[derive(Debug)]
pub struct RegistrationDetails {
    pub full_name: String,
    pub roll_number: String,
    pub phone_number: String,
    pub department: String,
}

impl<Db> Workflow<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Approves a pending society signup, enabling login.
    ///
    /// Approving an already-approved society is a no-op, so a repeated
    /// admin action never fails.
    pub async fn approve_society(
        &self,
        profile_id: PrimaryKey,
    ) -> Result<ProfileData, WorkflowError> {
        let profile = self.db.profile_by_id(profile_id).await?;

        if profile.role != Role::Society {
            return Err(WorkflowError::NotASocietySignup);
        }

        if profile.status == AccountStatus::Approved {
            return Ok(profile);
        }

        let approved = self
            .db
            .update_profile_status(profile_id, AccountStatus::Approved)
            .await?;

        info!("society signup {} approved", approved.username);

        Ok(approved)
    }

    /// Rejects a pending society signup by deleting its profile.
    ///
    /// The society row stays behind; nothing references it once the
    /// profile is gone, and only the signup saga ever deletes societies.
    pub async fn reject_society(&self, profile_id: PrimaryKey) -> Result<(), WorkflowError> {
        let profile = self.db.profile_by_id(profile_id).await?;

        if profile.role != Role::Society {
            return Err(WorkflowError::NotASocietySignup);
        }

        if profile.status == AccountStatus::Approved {
            return Err(WorkflowError::AlreadyApproved);
        }

        self.db.delete_profile(profile_id).await?;

        info!("society signup {} rejected", profile.username);

        Ok(())
    }

    /// All society signups awaiting a decision
    pub async fn pending_societies(&self) -> Result<Vec<ProfileData>, DatabaseError> {
        self.db.list_pending_societies().await
    }

    /// Proposes a new event. The caller must be an approved society; the
    /// event always starts out pending.
    pub async fn propose_event(
        &self,
        proposer: &ProfileData,
        proposal: EventProposal,
    ) -> Result<EventData, WorkflowError> {
        let society_id = self.society_of(proposer)?;

        let event = self
            .db
            .create_event(NewEvent {
                title: proposal.title,
                description: proposal.description,
                event_date: proposal.event_date,
                start_time: proposal.start_time,
                end_time: proposal.end_time,
                venue: proposal.venue,
                poster_url: proposal.poster_url,
                society_id,
            })
            .await?;

        info!("event \"{}\" proposed by {}", event.title, event.society_name);

        Ok(event)
    }

    /// Approves a pending event proposal
    pub async fn approve_event(&self, event_id: PrimaryKey) -> Result<EventData, WorkflowError> {
        self.decide_event(event_id, EventStatus::Approved).await
    }

    /// Rejects a pending event proposal
    pub async fn reject_event(&self, event_id: PrimaryKey) -> Result<EventData, WorkflowError> {
        self.decide_event(event_id, EventStatus::Rejected).await
    }

    /// Edits an event's content fields. Works in any status and never
    /// touches the status itself, so fixing a typo does not reset an
    /// approval and an owner cannot decide their own proposal.
    pub async fn update_event(
        &self,
        owner: &ProfileData,
        updated_event: UpdatedEvent,
    ) -> Result<EventData, WorkflowError> {
        let event = self.db.event_by_id(updated_event.id).await?;
        self.ensure_owner(owner, &event)?;

        Ok(self.db.update_event(updated_event).await?)
    }

    /// Deletes an event along with every registration for it
    pub async fn delete_event(
        &self,
        owner: &ProfileData,
        event_id: PrimaryKey,
    ) -> Result<(), WorkflowError> {
        let event = self.db.event_by_id(event_id).await?;
        self.ensure_owner(owner, &event)?;

        self.db.delete_event(event_id).await?;

        info!("event \"{}\" deleted by {}", event.title, event.society_name);

        Ok(())
    }

    /// All event proposals awaiting a decision
    pub async fn pending_events(&self) -> Result<Vec<EventData>, DatabaseError> {
        self.db.events_by_status(EventStatus::Pending).await
    }

    /// The campus feed: approved events in date order
    pub async fn approved_events(&self) -> Result<Vec<EventData>, DatabaseError> {
        self.db.events_by_status(EventStatus::Approved).await
    }

    /// A society's own events, newest first, with registration counts
    pub async fn events_for_society(
        &self,
        owner: &ProfileData,
    ) -> Result<Vec<EventEntryData>, WorkflowError> {
        let society_id = self.society_of(owner)?;

        Ok(self.db.events_by_society(society_id).await?)
    }

    /// The attendee list of an event, visible to its owner only
    pub async fn attendees(
        &self,
        owner: &ProfileData,
        event_id: PrimaryKey,
    ) -> Result<Vec<RegistrationData>, WorkflowError> {
        let event = self.db.event_by_id(event_id).await?;
        self.ensure_owner(owner, &event)?;

        Ok(self.db.registrations_for_event(event_id).await?)
    }

    /// Registers a student for an approved event.
    ///
    /// An event that was deleted or decided between page load and submit
    /// fails here; a repeated submit for the same pair is a conflict
    /// backed by the store's uniqueness constraint, not by the UI.
    pub async fn register(
        &self,
        student: &ProfileData,
        event_id: PrimaryKey,
        details: RegistrationDetails,
    ) -> Result<RegistrationData, WorkflowError> {
        let event = self.db.event_by_id(event_id).await?;

        if event.status != EventStatus::Approved {
            return Err(WorkflowError::EventNotOpen);
        }

        let registration = self
            .db
            .create_registration(NewRegistration {
                event_id,
                student_id: student.id,
                full_name: details.full_name,
                roll_number: details.roll_number,
                phone_number: details.phone_number,
                department: details.department,
            })
            .await?;

        info!(
            "{} registered for \"{}\"",
            student.username, event.title
        );

        Ok(registration)
    }

    /// Cancels the caller's registration for an event
    pub async fn cancel_registration(
        &self,
        student: &ProfileData,
        event_id: PrimaryKey,
    ) -> Result<(), WorkflowError> {
        Ok(self.db.delete_registration(event_id, student.id).await?)
    }

    /// Ids of the events the student is registered for
    pub async fn registered_event_ids(
        &self,
        student: &ProfileData,
    ) -> Result<Vec<PrimaryKey>, DatabaseError> {
        self.db.registration_event_ids(student.id).await
    }

    /// All societies, for filtering the feed
    pub async fn list_societies(&self) -> Result<Vec<SocietyData>, DatabaseError> {
        self.db.list_societies().await
    }

    /// Applies an admin decision to a pending event. Deciding an event
    /// that has already been decided is a no-op returning the current
    /// state, so a repeated admin action never fails.
    async fn decide_event(
        &self,
        event_id: PrimaryKey,
        status: EventStatus,
    ) -> Result<EventData, WorkflowError> {
        let event = self.db.event_by_id(event_id).await?;

        if event.status != EventStatus::Pending {
            return Ok(event);
        }

        let decided = self.db.update_event_status(event_id, status).await?;

        info!("event \"{}\" is now {:?}", decided.title, decided.status);

        Ok(decided)
    }

    fn society_of(&self, profile: &ProfileData) -> Result<PrimaryKey, WorkflowError> {
        if profile.role != Role::Society || profile.status != AccountStatus::Approved {
            return Err(WorkflowError::NotASociety);
        }

        profile.society_id.ok_or(WorkflowError::NotASociety)
    }

    fn ensure_owner(
        &self,
        profile: &ProfileData,
        event: &EventData,
    ) -> Result<(), WorkflowError> {
        if profile.society_id != Some(event.society_id) {
            return Err(WorkflowError::NotOwner);
        }

        Ok(())
    }
}
