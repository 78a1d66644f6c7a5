//! Session provider: owns the fetch-and-cache lifecycle of the user record
//!
//! Every fetch gets a generation number. A result is published only if its
//! generation is still the latest when it lands, and the check happens under
//! the watch channel's lock, so a superseded fetch can never overwrite a newer
//! snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::cache::UserCache;
use crate::caps::{capabilities, CapabilityBundle};
use crate::config::ProviderConfig;
use crate::error::Result;
use crate::perm::Permission;
use crate::record::UserRecord;
use crate::resolve::resolve;
use crate::session::Session;
use crate::source::UserSource;

pub struct SessionProvider<S> {
    source: S,
    config: ProviderConfig,
    cache: Option<UserCache>,
    credential: Mutex<Option<String>>,
    generation: AtomicU64,
    tx: watch::Sender<Arc<Session>>,
}

impl<S: UserSource> SessionProvider<S> {
    /// Provider with no credential; the snapshot starts anonymous
    pub fn new(source: S, config: ProviderConfig) -> Self {
        let (tx, _) = watch::channel(Arc::new(Session::anonymous()));
        SessionProvider {
            source,
            config,
            cache: None,
            credential: Mutex::new(None),
            generation: AtomicU64::new(0),
            tx,
        }
    }

    /// Provider for `config`, with the snapshot cache opened at `cache_path` when one is set
    pub fn from_config(source: S, config: ProviderConfig) -> Result<Self> {
        let cache = config.cache_path.as_deref().map(UserCache::open).transpose()?;
        let mut provider = Self::new(source, config);
        provider.cache = cache;
        Ok(provider)
    }

    pub fn with_cache(mut self, cache: UserCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Start from a stored credential. Nothing is fetched until [`refetch`](Self::refetch).
    pub fn with_credential(self, credential: Option<String>) -> Self {
        let initial = if credential.is_some() { Session::pending() } else { Session::anonymous() };
        *self.lock_credential() = credential;
        self.tx.send_replace(Arc::new(initial));
        self
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Session> {
        self.tx.borrow().clone()
    }

    /// Receive every snapshot replacement
    pub fn subscribe(&self) -> watch::Receiver<Arc<Session>> {
        self.tx.subscribe()
    }

    pub fn resolve(&self, module: &str, sub_module: &str, permission: Permission) -> bool {
        resolve(&self.snapshot(), module, sub_module, permission)
    }

    pub fn capabilities(&self, module: &str, sub_module: &str) -> CapabilityBundle {
        capabilities(&self.snapshot(), module, sub_module)
    }

    /// Adopt a fresh credential and fetch its user
    pub async fn login(&self, credential: impl Into<String>) -> Arc<Session> {
        *self.lock_credential() = Some(credential.into());
        // Data from the previous credential must not stay visible
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.tx.send_replace(Arc::new(Session::pending()));
        self.refetch().await
    }

    /// Drop the credential and everything derived from it
    pub fn logout(&self) {
        let old = self.lock_credential().take();
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let (Some(cache), Some(cred)) = (&self.cache, old.as_deref()) {
            if let Err(e) = cache.evict(cred) {
                warn!(error = %e, "failed to evict cached user");
            }
        }
        self.tx.send_replace(Arc::new(Session::anonymous()));
        debug!("session cleared");
    }

    /// Fetch the user record again and publish the outcome, unless a newer
    /// fetch or a logout has superseded this one.
    pub async fn refetch(&self) -> Arc<Session> {
        let cred = self.lock_credential().clone();
        let Some(cred) = cred else {
            self.tx.send_replace(Arc::new(Session::anonymous()));
            return self.snapshot();
        };
        let seq = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let current = self.snapshot();
        let loading = match (current.user(), self.cached(&cred)) {
            (None, Some(user)) => {
                debug!("serving cached user while fetching");
                Session::new(user).refetching()
            }
            _ => current.refetching(),
        };
        self.publish(seq, |_| loading);
        debug!(seq, "fetching user");

        match self.fetch_with_retry(&cred, seq).await {
            Ok(user) => {
                if let Some(cache) = &self.cache {
                    if self.is_current(seq) {
                        if let Err(e) = cache.put(&cred, &user) {
                            warn!(error = %e, "failed to cache user");
                        }
                    }
                }
                self.publish(seq, |_| Session::new(user));
            }
            Err(e) => {
                self.publish(seq, |s| s.failed(e));
            }
        }
        self.snapshot()
    }

    async fn fetch_with_retry(&self, cred: &str, seq: u64) -> Result<UserRecord> {
        let mut attempt = 0;
        loop {
            match self.source.fetch_me(cred).await {
                Ok(user) => return Ok(user),
                Err(e) if e.is_server_error() && attempt < self.config.max_retries && self.is_current(seq) => {
                    let delay = self.config.retry_delay(attempt);
                    warn!(attempt, ?delay, error = %e, "user fetch failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(error = %e, "user fetch failed");
                    return Err(e);
                }
            }
        }
    }

    /// Replace the snapshot if `seq` is still the latest fetch
    fn publish(&self, seq: u64, next: impl FnOnce(&Session) -> Session) -> bool {
        let sent = self.tx.send_if_modified(|s| {
            if !self.is_current(seq) {
                return false;
            }
            *s = Arc::new(next(&**s));
            true
        });
        if !sent {
            warn!(seq, latest = self.generation.load(Ordering::SeqCst), "discarding superseded fetch result");
        }
        sent
    }

    fn is_current(&self, seq: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == seq
    }

    fn cached(&self, cred: &str) -> Option<UserRecord> {
        let cache = self.cache.as_ref()?;
        match cache.get(cred, self.config.cache_ttl()) {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable cached user");
                None
            }
        }
    }

    fn lock_credential(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.credential.lock().unwrap_or_else(|p| p.into_inner())
    }
}
