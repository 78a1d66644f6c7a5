//! Session snapshot handed to every resolver call
//!
//! A `Session` is immutable. The provider replaces it wholesale when a fetch
//! settles, so a reader holding an `Arc<Session>` never sees a half-built map.

use std::sync::Arc;

use serde::Serialize;

use crate::error::GateError;
use crate::map::PermissionMap;
use crate::record::UserRecord;

/// Fetch status of the user record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadState {
    /// Nothing has been attempted yet
    Unknown,
    Fetching,
    Settled,
}

/// Provider lifecycle: `NoToken -> Loading -> Ready | Error`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    NoToken,
    Loading,
    Ready,
    Error,
}

/// What the resolver can rely on in a given snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    /// No usable data; every non-admin check fails closed
    Unloaded,
    /// A user record is present but its map is empty; Read is answered from the raw modules
    Degraded,
    /// The map is usable, even if a refetch is still marked in flight
    Ready,
}

#[derive(Debug, Clone)]
pub struct Session {
    user: Option<Arc<UserRecord>>,
    permissions: Arc<PermissionMap>,
    load: LoadState,
    phase: Phase,
    has_token: bool,
    error: Option<GateError>,
}

impl Default for Session {
    fn default() -> Self {
        Session::anonymous()
    }
}

impl Session {
    /// Logged out: no credential, nothing to fetch
    pub fn anonymous() -> Self {
        Session {
            user: None,
            permissions: Arc::new(PermissionMap::default()),
            load: LoadState::Settled,
            phase: Phase::NoToken,
            has_token: false,
            error: None,
        }
    }

    /// Credential present, fetch not started yet
    pub fn pending() -> Self {
        Session { load: LoadState::Unknown, phase: Phase::Loading, has_token: true, ..Session::anonymous() }
    }

    /// Settled session for a user record, map built from it
    pub fn new(user: UserRecord) -> Self {
        let permissions = Arc::new(PermissionMap::build(Some(&user)));
        Session {
            user: Some(Arc::new(user)),
            permissions,
            load: LoadState::Settled,
            phase: Phase::Ready,
            has_token: true,
            error: None,
        }
    }

    /// Mark the snapshot as still (or again) fetching
    pub fn with_loading(mut self, loading: bool) -> Self {
        if loading {
            self.load = LoadState::Fetching;
            self.phase = Phase::Loading;
        } else {
            self.load = LoadState::Settled;
            self.phase = if self.user.is_some() { Phase::Ready } else if self.has_token { Phase::Error } else { Phase::NoToken };
        }
        self
    }

    /// Replace the derived map, e.g. with one that has not been built yet
    pub fn with_permissions(mut self, permissions: PermissionMap) -> Self {
        self.permissions = Arc::new(permissions);
        self
    }

    pub fn with_token(mut self, has_token: bool) -> Self {
        self.has_token = has_token;
        self
    }

    /// Same data, now refetching
    pub(crate) fn refetching(&self) -> Self {
        Session { load: LoadState::Fetching, phase: Phase::Loading, has_token: true, error: None, ..self.clone() }
    }

    /// Fetch settled with an error; previously loaded data stays visible
    pub(crate) fn failed(&self, error: GateError) -> Self {
        Session { load: LoadState::Settled, phase: Phase::Error, error: Some(error), ..self.clone() }
    }

    pub fn user(&self) -> Option<&UserRecord> {
        self.user.as_deref()
    }

    pub fn permissions(&self) -> &PermissionMap {
        &self.permissions
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_admin)
    }

    pub fn load(&self) -> LoadState {
        self.load
    }

    pub fn is_loading(&self) -> bool {
        self.load != LoadState::Settled
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn has_token(&self) -> bool {
        self.has_token
    }

    pub fn error(&self) -> Option<&GateError> {
        self.error.as_ref()
    }

    /// Data availability wins over a stale loading flag
    pub fn data_state(&self) -> DataState {
        let has_map = !self.permissions.is_empty();
        if self.is_loading() && !(self.user.is_some() && has_map) {
            return DataState::Unloaded;
        }
        match (has_map, self.user.is_some()) {
            (true, _) => DataState::Ready,
            (false, true) => DataState::Degraded,
            (false, false) => DataState::Unloaded,
        }
    }
}
