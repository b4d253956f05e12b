use log::{info, warn};
use std::sync::Arc;
use thiserror::Error;

use crate::{AccountStatus, Database, DatabaseError, ProfileData, Role, SessionData};

/// How a caller is authenticated, decided once per request and passed in
/// explicitly instead of being read from ambient state.
#[derive(Debug)]
pub enum AuthContext {
    /// No session was presented
    Anonymous,
    /// A live session backed by the session store
    Session(SessionData),
    /// The operator bootstrap override, granted outside the session store
    /// entirely. It exists so an instance can be administered before any
    /// admin profile has been created, and is confined to a single match
    /// arm in [AccessEvaluator::evaluate] so it can be deleted wholesale.
    LocalOverride,
}

/// A granted admission, carrying whatever identity backs it
#[derive(Debug)]
pub enum Pass {
    Profile(ProfileData),
    /// Admission through the bootstrap override; no profile exists
    Override,
}

impl Pass {
    pub fn profile(&self) -> Option<&ProfileData> {
        match self {
            Self::Profile(profile) => Some(profile),
            Self::Override => None,
        }
    }

    pub fn into_profile(self) -> Option<ProfileData> {
        match self {
            Self::Profile(profile) => Some(profile),
            Self::Override => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Not signed in")]
    NotAuthenticated,
    /// The session points at a profile that no longer exists
    #[error("No profile exists for this account")]
    UnknownProfile,
    #[error("This operation requires the {required:?} role")]
    RoleMismatch { required: Role },
    /// The society account is still awaiting admin approval
    #[error("Account is pending admin approval")]
    PendingApproval,
    /// The store could not be reached. Not a denial; callers may retry.
    #[error(transparent)]
    Store(DatabaseError),
}

/// Decides whether a caller is admitted to a role-gated operation.
pub struct AccessEvaluator<Db> {
    db: Arc<Db>,
}

impl<Db> AccessEvaluator<Db>
where
    Db: Database,
{
    pub fn new(db: &Arc<Db>) -> Self {
        Self { db: db.clone() }
    }

    /// Admits or refuses a caller for the given role.
    ///
    /// The profile is re-read from the store so the decision reflects its
    /// current state rather than the row captured at login. A society that
    /// is still pending is refused and forcibly signed out, which means an
    /// approval only ever takes effect through a fresh login.
    pub async fn evaluate(
        &self,
        context: &AuthContext,
        required: Role,
    ) -> Result<Pass, AccessError> {
        let session = match context {
            AuthContext::Anonymous => return Err(AccessError::NotAuthenticated),
            AuthContext::LocalOverride => {
                return if required == Role::Admin {
                    Ok(Pass::Override)
                } else {
                    Err(AccessError::RoleMismatch { required })
                }
            }
            AuthContext::Session(session) => session,
        };

        let profile = match self.db.profile_by_id(session.profile.id).await {
            Ok(profile) => profile,
            Err(DatabaseError::NotFound { .. }) => return Err(AccessError::UnknownProfile),
            Err(e) => return Err(AccessError::Store(e)),
        };

        if profile.role != required {
            return Err(AccessError::RoleMismatch { required });
        }

        if profile.role == Role::Society && profile.status == AccountStatus::Pending {
            // The denial must not be re-checkable against a stale session
            if let Err(e) = self.db.delete_sessions_for_profile(profile.id).await {
                warn!("failed to sign out pending society {}: {}", profile.id, e);
            }

            info!("signed out pending society {}", profile.username);

            return Err(AccessError::PendingApproval);
        }

        Ok(Pass::Profile(profile))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::memory::MemoryDatabase;
    use crate::{NewProfile, NewSession, NewSociety, ProfileKind};
    use chrono::{Duration, Utc};

    fn setup() -> (Arc<MemoryDatabase>, AccessEvaluator<MemoryDatabase>) {
        let db = Arc::new(MemoryDatabase::default());
        let evaluator = AccessEvaluator::new(&db);

        (db, evaluator)
    }

    async fn seed_profile(db: &MemoryDatabase, name: &str, kind: ProfileKind) -> ProfileData {
        db.create_profile(NewProfile {
            username: name.to_string(),
            email: format!("{name}@campus.edu"),
            password: "not a real hash".to_string(),
            display_name: name.to_string(),
            kind,
        })
        .await
        .unwrap()
    }

    async fn seed_session(db: &MemoryDatabase, profile: &ProfileData) -> SessionData {
        db.create_session(NewSession {
            token: format!("token-{}", profile.id),
            profile_id: profile.id,
            expires_at: Utc::now() + Duration::days(1),
        })
        .await
        .unwrap()
    }

    async fn seed_society(db: &MemoryDatabase, name: &str) -> ProfileData {
        let society = db
            .create_society(NewSociety {
                name: name.to_string(),
            })
            .await
            .unwrap();

        seed_profile(
            db,
            name,
            ProfileKind::Society {
                society_id: society.id,
            },
        )
        .await
    }

    #[tokio::test]
    async fn role_matrix() {
        let (db, evaluator) = setup();

        let student = seed_profile(&db, "student", ProfileKind::Student).await;
        let admin = seed_profile(&db, "admin", ProfileKind::Admin).await;

        let society = seed_society(&db, "roboclub").await;
        db.update_profile_status(society.id, AccountStatus::Approved)
            .await
            .unwrap();

        for (profile, role) in [
            (&student, Role::Student),
            (&society, Role::Society),
            (&admin, Role::Admin),
        ] {
            let context = AuthContext::Session(seed_session(&db, profile).await);

            for required in [Role::Student, Role::Society, Role::Admin] {
                let result = evaluator.evaluate(&context, required).await;

                if required == role {
                    assert!(result.is_ok(), "{role:?} should reach {required:?}");
                } else {
                    assert!(
                        matches!(result, Err(AccessError::RoleMismatch { .. })),
                        "{role:?} should not reach {required:?}"
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn anonymous_is_refused() {
        let (_, evaluator) = setup();

        let result = evaluator.evaluate(&AuthContext::Anonymous, Role::Student).await;
        assert!(matches!(result, Err(AccessError::NotAuthenticated)));
    }

    #[tokio::test]
    async fn pending_society_is_refused_and_signed_out() {
        let (db, evaluator) = setup();

        let profile = seed_society(&db, "roboclub").await;
        let session = seed_session(&db, &profile).await;
        let token = session.token.clone();

        let result = evaluator
            .evaluate(&AuthContext::Session(session), Role::Society)
            .await;

        assert!(matches!(result, Err(AccessError::PendingApproval)));
        assert!(db.session_by_token(&token).await.is_err(), "session survived");
    }

    #[tokio::test]
    async fn deleted_profile_behind_session_is_refused() {
        let (db, evaluator) = setup();

        let profile = seed_profile(&db, "student", ProfileKind::Student).await;
        let session = seed_session(&db, &profile).await;

        // Simulate deletion after login; the session row is gone with the
        // profile, but the caller still holds the old session data
        db.delete_profile(profile.id).await.unwrap();

        let result = evaluator
            .evaluate(&AuthContext::Session(session), Role::Student)
            .await;

        assert!(matches!(result, Err(AccessError::UnknownProfile)));
    }

    #[tokio::test]
    async fn override_admits_admin_only() {
        let (_, evaluator) = setup();

        let admin = evaluator
            .evaluate(&AuthContext::LocalOverride, Role::Admin)
            .await;
        assert!(matches!(admin, Ok(Pass::Override)));

        let student = evaluator
            .evaluate(&AuthContext::LocalOverride, Role::Student)
            .await;
        assert!(matches!(student, Err(AccessError::RoleMismatch { .. })));
    }

    #[tokio::test]
    async fn approval_takes_effect_on_a_fresh_session() {
        let (db, evaluator) = setup();

        let profile = seed_society(&db, "roboclub").await;

        let pending = evaluator
            .evaluate(
                &AuthContext::Session(seed_session(&db, &profile).await),
                Role::Society,
            )
            .await;
        assert!(matches!(pending, Err(AccessError::PendingApproval)));

        db.update_profile_status(profile.id, AccountStatus::Approved)
            .await
            .unwrap();

        let approved = evaluator
            .evaluate(
                &AuthContext::Session(seed_session(&db, &profile).await),
                Role::Society,
            )
            .await;
        assert!(approved.is_ok());
    }
}
