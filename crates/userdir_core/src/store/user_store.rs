use super::sample::sample_users;
use super::{StoreError, StoreResult};
use crate::config::StoreConfig;
use crate::model::user::{User, UserFields, UserId};
use crate::model::validation::validate_fields;
use crate::query::{run_query, PageRequest, QueryPage, UserFilters, UserSort, DEFAULT_PAGE_SIZE};
use crate::storage::{KvStore, StorageResult};
use chrono::Utc;
use log::{error, info, warn};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

type Listener = Arc<dyn Fn(&[User]) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    issued_ids: HashSet<UserId>,
}

impl StoreState {
    fn issue_id(&mut self) -> UserId {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.users.iter().position(|user| user.id == id)
    }
}

/// In-memory user directory mirrored to a key-value surface.
///
/// Construct once per process and share by reference (or `Arc`); all
/// methods take `&self`.
pub struct UserStore<K: KvStore> {
    kv: K,
    storage_key: String,
    default_page_size: usize,
    state: Mutex<StoreState>,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_subscription: AtomicU64,
}

impl<K: KvStore> UserStore<K> {
    /// Creates an empty store persisting under `storage_key`.
    ///
    /// Nothing is loaded until `initialize` runs.
    pub fn new(kv: K, storage_key: impl Into<String>) -> Self {
        Self {
            kv,
            storage_key: storage_key.into(),
            default_page_size: DEFAULT_PAGE_SIZE,
            state: Mutex::new(StoreState::default()),
            listeners: Mutex::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    /// Creates, initializes and (if configured) seeds a store.
    ///
    /// The configured page size becomes the size of `default_page`.
    pub fn open(kv: K, config: &StoreConfig) -> Self {
        let mut store = Self::new(kv, config.storage_key.clone());
        store.default_page_size = config.default_page_size.max(1);
        store.initialize();
        if config.seed_sample_data {
            store.seed_sample_data();
        }
        store
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// First page at the configured page size.
    pub fn default_page(&self) -> PageRequest {
        PageRequest::first(self.default_page_size)
    }

    /// Replaces memory with the persisted collection and notifies
    /// subscribers. Returns the number of records loaded.
    ///
    /// Absent or unreadable data yields an empty collection and a warning.
    /// A malformed blob also yields an empty collection, is logged at error
    /// level, and is overwritten by the next successful mutation. This never
    /// fails.
    pub fn initialize(&self) -> usize {
        let loaded = self.read_persisted();
        let snapshot = {
            let mut state = self.lock_state();
            state
                .issued_ids
                .extend(loaded.iter().map(|user| user.id.clone()));
            state.users = loaded;
            state.users.clone()
        };
        info!(
            "event=store_init module=store status=ok key={} count={}",
            self.storage_key,
            snapshot.len()
        );
        self.publish(&snapshot);
        snapshot.len()
    }

    /// Validates `fields`, stores them under a fresh id and returns the
    /// stored record.
    pub fn create(&self, fields: UserFields) -> StoreResult<User> {
        let now = Utc::now();
        let (user, snapshot) = {
            let mut state = self.lock_state();
            validate_fields(&fields, now.date_naive()).map_err(|err| {
                info!("event=user_create module=store status=rejected reason=validation");
                err
            })?;

            let id = state.issue_id();
            let user = User::from_fields(id, fields, now);
            state.users.push(user.clone());
            self.persist_best_effort(&state.users, "user_create");
            (user, state.users.clone())
        };

        info!(
            "event=user_create module=store status=ok user_id={}",
            user.id
        );
        self.publish(&snapshot);
        Ok(user)
    }

    /// Replaces every mutable field of record `id`.
    ///
    /// `NotFound` takes precedence over `Validation`.
    pub fn update(&self, id: &str, fields: UserFields) -> StoreResult<User> {
        let (user, snapshot) = {
            let mut state = self.lock_state();
            let index = state.position(id).ok_or_else(|| {
                info!("event=user_update module=store status=not_found user_id={id}");
                StoreError::NotFound(id.to_string())
            })?;
            validate_fields(&fields, Utc::now().date_naive()).map_err(|err| {
                info!("event=user_update module=store status=rejected reason=validation user_id={id}");
                err
            })?;

            state.users[index].apply_fields(fields);
            let user = state.users[index].clone();
            self.persist_best_effort(&state.users, "user_update");
            (user, state.users.clone())
        };

        info!("event=user_update module=store status=ok user_id={id}");
        self.publish(&snapshot);
        Ok(user)
    }

    /// Hard-deletes record `id`. The id stays retired for this session.
    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let snapshot = {
            let mut state = self.lock_state();
            let index = state.position(id).ok_or_else(|| {
                info!("event=user_delete module=store status=not_found user_id={id}");
                StoreError::NotFound(id.to_string())
            })?;
            state.users.remove(index);
            self.persist_best_effort(&state.users, "user_delete");
            state.users.clone()
        };

        info!("event=user_delete module=store status=ok user_id={id}");
        self.publish(&snapshot);
        Ok(())
    }

    /// Absence is an expected outcome, not an error.
    pub fn get_by_id(&self, id: &str) -> Option<User> {
        let state = self.lock_state();
        state.position(id).map(|index| state.users[index].clone())
    }

    /// Filters, sorts and paginates the current collection.
    pub fn query(
        &self,
        filters: &UserFilters,
        sort: &UserSort,
        page: &PageRequest,
    ) -> QueryPage<User> {
        let state = self.lock_state();
        run_query(&state.users, filters, sort, page)
    }

    /// All records in insertion order.
    pub fn snapshot(&self) -> Vec<User> {
        self.lock_state().users.clone()
    }

    pub fn len(&self) -> usize {
        self.lock_state().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_state().users.is_empty()
    }

    /// Registers `listener` and immediately hands it the current snapshot.
    /// It is then called after every successful mutation and
    /// re-initialization, on the mutating thread, with no store lock held.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&[User]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        let listener: Listener = Arc::new(listener);
        self.lock_listeners().push((id, Arc::clone(&listener)));

        let snapshot = self.snapshot();
        listener(snapshot.as_slice());
        id
    }

    /// Returns `false` when `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Installs the demo users when the collection is empty.
    ///
    /// Returns `false` (and changes nothing) when records already exist.
    pub fn seed_sample_data(&self) -> bool {
        let snapshot = {
            let mut state = self.lock_state();
            if !state.users.is_empty() {
                return false;
            }
            let users = sample_users(|| state.issue_id());
            state.users = users;
            self.persist_best_effort(&state.users, "sample_seed");
            state.users.clone()
        };

        info!(
            "event=sample_seed module=store status=ok count={}",
            snapshot.len()
        );
        self.publish(&snapshot);
        true
    }

    /// Writes the collection now and reports the outcome.
    ///
    /// Unlike mutation writes, a failure here reaches the caller.
    pub fn flush(&self) -> StoreResult<()> {
        let state = self.lock_state();
        self.write_users(&state.users).map_err(|err| {
            error!(
                "event=store_flush module=store status=error key={} error={err}",
                self.storage_key
            );
            StoreError::Persistence(err)
        })
    }

    /// Loads the persisted collection.
    ///
    /// One record that fails to parse discards the whole blob. The blob is
    /// left as it is, and the first successful mutation replaces it with the
    /// in-memory collection, so the discarded records are lost at that point.
    fn read_persisted(&self) -> Vec<User> {
        let raw = match self.kv.get(&self.storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(err) => {
                warn!(
                    "event=store_init module=store status=fallback reason=read_failed key={} error={err}",
                    self.storage_key
                );
                return Vec::new();
            }
        };

        let parsed: Vec<User> = match serde_json::from_str(&raw) {
            Ok(users) => users,
            Err(err) => {
                error!(
                    "event=store_init module=store status=fallback reason=malformed key={} dropped={} bytes={} error={err}",
                    self.storage_key,
                    blob_entry_count(&raw),
                    raw.len()
                );
                return Vec::new();
            }
        };

        let mut seen = HashSet::new();
        let before = parsed.len();
        let users: Vec<User> = parsed
            .into_iter()
            .filter(|user| seen.insert(user.id.clone()))
            .collect();
        if users.len() != before {
            warn!(
                "event=store_init module=store status=deduplicated key={} dropped={}",
                self.storage_key,
                before - users.len()
            );
        }
        users
    }

    fn write_users(&self, users: &[User]) -> StorageResult<()> {
        let blob = serde_json::to_string(users)?;
        self.kv.set(&self.storage_key, &blob)
    }

    // Memory stays authoritative for the session; the write is best-effort.
    fn persist_best_effort(&self, users: &[User], event: &str) {
        if let Err(err) = self.write_users(users) {
            error!(
                "event={event} module=store status=persist_failed key={} error={err}",
                self.storage_key
            );
        }
    }

    fn publish(&self, snapshot: &[User]) {
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Number of array entries in a blob that failed to parse as users, or
/// `"unknown"` when it is not a JSON array at all.
fn blob_entry_count(raw: &str) -> String {
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(entries) => entries.len().to_string(),
        Err(_) => "unknown".to_string(),
    }
}
