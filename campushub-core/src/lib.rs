mod access;
mod auth;
mod db;
mod storage;
mod util;
mod workflow;

use std::sync::Arc;

pub use access::*;
pub use auth::*;
pub use db::*;
pub use storage::*;
pub use workflow::*;

/// The campushub domain system, facilitating authentication, access
/// control, and the approval workflow over a shared database.
pub struct CampusHub<Db> {
    pub auth: Auth<Db>,
    pub access: AccessEvaluator<Db>,
    pub workflow: Workflow<Db>,
}

impl<Db> CampusHub<Db>
where
    Db: Database,
{
    pub fn new(database: Db) -> Self {
        let database = Arc::new(database);

        Self {
            auth: Auth::new(&database),
            access: AccessEvaluator::new(&database),
            workflow: Workflow::new(&database),
        }
    }
}
