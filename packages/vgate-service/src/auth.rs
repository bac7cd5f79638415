use std::{
	collections::HashMap,
	sync::{Arc, Mutex},
};

use time::{Duration, OffsetDateTime};

use vgate_domain::credential::Credential;

use crate::{CredentialStore, secret};

pub trait Clock
where
	Self: Send + Sync,
{
	fn now(&self) -> OffsetDateTime;
}

pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// Cache of successful authentications.
///
/// Only credentials can be inserted, so a failed attempt is never remembered.
pub trait AuthCache
where
	Self: Send + Sync,
{
	fn get(&self, secret: &str, now: OffsetDateTime) -> Option<Credential>;

	fn insert(&self, secret: &str, credential: Credential, now: OffsetDateTime);
}

/// TTL-bounded map keyed by a digest of the secret. Expired entries are dropped when looked up.
pub struct TtlCache {
	ttl: Duration,
	entries: Mutex<HashMap<[u8; 32], (OffsetDateTime, Credential)>>,
}
impl TtlCache {
	pub fn new(ttl: Duration) -> Self {
		Self { ttl, entries: Mutex::new(HashMap::new()) }
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
impl AuthCache for TtlCache {
	fn get(&self, secret: &str, now: OffsetDateTime) -> Option<Credential> {
		let key = cache_key(secret);
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
		let (stored_at, credential) = entries.get(&key)?;

		if now - *stored_at < self.ttl {
			return Some(credential.clone());
		}

		entries.remove(&key);

		None
	}

	fn insert(&self, secret: &str, credential: Credential, now: OffsetDateTime) {
		let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());

		entries.insert(cache_key(secret), (now, credential));
	}
}

pub struct Authenticator {
	store: Arc<dyn CredentialStore>,
	cache: Arc<dyn AuthCache>,
	clock: Arc<dyn Clock>,
}
impl Authenticator {
	pub fn new(
		store: Arc<dyn CredentialStore>,
		cache: Arc<dyn AuthCache>,
		clock: Arc<dyn Clock>,
	) -> Self {
		Self { store, cache, clock }
	}

	pub fn with_ttl(store: Arc<dyn CredentialStore>, ttl: Duration) -> Self {
		Self::new(store, Arc::new(TtlCache::new(ttl)), Arc::new(SystemClock))
	}

	/// Resolves `secret` to a usable credential.
	///
	/// Any store failure is logged and reported as a plain rejection.
	pub async fn authenticate(&self, secret: &str) -> (bool, Option<Credential>) {
		if secret.is_empty() {
			return (false, None);
		}

		let now = self.clock.now();

		if let Some(credential) = self.cache.get(secret, now)
			&& credential.is_usable(now)
		{
			return (true, Some(credential));
		}

		let candidates = match self.store.fetch_active_credentials(now).await {
			Ok(candidates) => candidates,
			Err(err) => {
				tracing::error!(error = %err, "Credential lookup failed.");

				return (false, None);
			},
		};
		let presented = secret.to_string();
		// Hash verification is CPU bound; keep it off the async workers.
		let matched = tokio::task::spawn_blocking(move || {
			candidates.into_iter().find(|credential| {
				credential.is_usable(now) && secret::verify_secret(&presented, &credential.hashed_secret)
			})
		})
		.await;
		let credential = match matched {
			Ok(Some(credential)) => credential,
			Ok(None) => return (false, None),
			Err(err) => {
				tracing::error!(error = %err, "Credential verification task failed.");

				return (false, None);
			},
		};

		tracing::debug!(credential_id = credential.id, "Credential authenticated.");

		self.cache.insert(secret, credential.clone(), now);

		(true, Some(credential))
	}
}

fn cache_key(secret: &str) -> [u8; 32] {
	*blake3::hash(secret.as_bytes()).as_bytes()
}
