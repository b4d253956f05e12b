use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use log::{info, warn};
use rand::rngs::OsRng;
use std::sync::Arc;
use thiserror::Error;

use crate::{
    util::random_string, AccountStatus, Database, DatabaseError, NewProfile, NewSession,
    NewSociety, ProfileData, ProfileKind, Role, SessionData, SocietyData,
};

pub struct Auth<Db> {
    db: Arc<Db>,
    argon: Argon2<'static>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username, email, or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The society account has not been approved by an admin yet
    #[error("Account is pending admin approval")]
    PendingApproval,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const SESSION_DURATION_IN_DAYS: usize = 7;

    pub fn new(db: &Arc<Db>) -> Self {
        Self {
            db: db.clone(),
            argon: Argon2::default(),
        }
    }

    /// Logs in a user, returning a new session.
    ///
    /// The identifier is either a username or an email. A society whose
    /// signup has not been approved yet is refused before any session is
    /// created, so a denial never leaves a live session behind.
    pub async fn login(&self, credentials: Credentials) -> Result<SessionData, AuthError> {
        self.clear_expired().await?;

        let lookup = if credentials.identifier.contains('@') {
            self.db.profile_by_email(&credentials.identifier).await
        } else {
            self.db.profile_by_username(&credentials.identifier).await
        };

        let profile = lookup.map_err(|e| match e {
            DatabaseError::NotFound {
                resource: _,
                identifier: _,
            } => AuthError::InvalidCredentials,
            err => AuthError::Db(err),
        })?;

        let stored_password = PasswordHash::parse(&profile.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if profile.role == Role::Society && profile.status == AccountStatus::Pending {
            return Err(AuthError::PendingApproval);
        }

        let expires_at = Utc::now() + Duration::days(Self::SESSION_DURATION_IN_DAYS as i64);

        let new_session = NewSession {
            token: random_string(32),
            profile_id: profile.id,
            expires_at,
        };

        let new_session = self
            .db
            .create_session(new_session)
            .await
            .map_err(AuthError::Db)?;

        info!("{} logged in", new_session.profile.username);

        Ok(new_session)
    }

    /// Deletes the associated session, if it exists
    pub async fn logout(&self, token: &str) -> Result<(), DatabaseError> {
        self.db.delete_session_by_token(token).await
    }

    /// Creates a student account. Students are approved at creation.
    pub async fn register_student(&self, signup: NewSignup) -> Result<ProfileData, AuthError> {
        self.create_profile(signup, ProfileKind::Student).await
    }

    /// Creates an admin account. Admins do not sign themselves up; this is
    /// reached through the bootstrap override only.
    pub async fn register_admin(&self, signup: NewSignup) -> Result<ProfileData, AuthError> {
        self.create_profile(signup, ProfileKind::Admin).await
    }

    /// Creates a society account pending admin approval.
    ///
    /// This is a two-step create: the society row first, then the profile
    /// linking to it. The steps are not atomic, so a failed profile create
    /// is compensated by deleting the society row again.
    pub async fn register_society(
        &self,
        signup: NewSignup,
    ) -> Result<(SocietyData, ProfileData), AuthError> {
        let society = self
            .db
            .create_society(NewSociety {
                name: signup.display_name.clone(),
            })
            .await
            .map_err(AuthError::Db)?;

        let profile = self
            .create_profile(
                signup,
                ProfileKind::Society {
                    society_id: society.id,
                },
            )
            .await;

        match profile {
            Ok(profile) => Ok((society, profile)),
            Err(e) => {
                if let Err(cleanup) = self.db.delete_society(society.id).await {
                    warn!(
                        "society {} orphaned after failed signup: {}",
                        society.id, cleanup
                    );
                }

                Err(e)
            }
        }
    }

    /// Returns a session if it exists and has not expired
    pub async fn session(&self, token: &str) -> Result<SessionData, DatabaseError> {
        self.db.session_by_token(token).await
    }

    async fn create_profile(
        &self,
        signup: NewSignup,
        kind: ProfileKind,
    ) -> Result<ProfileData, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(signup.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.db
            .create_profile(NewProfile {
                username: signup.username,
                email: signup.email,
                password: hashed_password,
                display_name: signup.display_name,
                kind,
            })
            .await
            .map_err(AuthError::Db)
    }

    async fn clear_expired(&self) -> Result<(), AuthError> {
        self.db
            .clear_expired_sessions()
            .await
            .map_err(AuthError::Db)
    }
}

#[derive(Debug)]
pub struct Credentials {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewSignup {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: String,
}
