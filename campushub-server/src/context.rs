use std::{convert::Infallible, sync::Arc};

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use campushub_core::{CampusHub, DiskPosterStore, PgDatabase};

/// The hub type the server runs against
pub type Hub = CampusHub<PgDatabase>;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub hub: Arc<Hub>,
    pub posters: Arc<DiskPosterStore>,
    /// Key that unlocks the bootstrap override, if configured
    pub bootstrap_key: Option<Arc<str>>,
}

#[async_trait]
impl FromRequestParts<ServerContext> for ServerContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &ServerContext,
    ) -> Result<Self, Self::Rejection> {
        Ok(state.clone())
    }
}
