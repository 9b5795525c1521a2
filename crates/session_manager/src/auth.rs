//! AuthService - identity provider adapter.
//!
//! An explicit service object constructed once at application start and
//! shared by handle, preserving the multi-listener subscribe/unsubscribe
//! contract of the upstream identity SDK. Listeners are invoked on the
//! calling task; consumers must tolerate synchronous or asynchronous
//! delivery.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::structs::AuthUser;

/// The sign-in loading flag is force-cleared after this long. The underlying
/// provider attempt is NOT cancelled and may still land later; see DESIGN.md.
pub const SIGN_IN_FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("identity provider error: {0}")]
    Provider(String),

    #[error("no identity provider configured")]
    NoProvider,
}

/// External sign-in flow. Implementations may pop provider UI.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self) -> Result<AuthUser, AuthError>;
}

type Listener = Arc<dyn Fn(Option<&AuthUser>) + Send + Sync>;

struct AuthInner {
    provider: Option<Arc<dyn IdentityProvider>>,
    user: Mutex<Option<AuthUser>>,
    listeners: Mutex<HashMap<u64, Listener>>,
    next_listener_id: AtomicU64,
    signing_in: AtomicBool,
}

/// Handle to the shared auth state.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthInner>,
}

/// Subscription handle; dropping it unsubscribes.
pub struct AuthSubscription {
    inner: Weak<AuthInner>,
    id: u64,
}

impl AuthSubscription {
    pub fn unsubscribe(self) {}
}

impl Drop for AuthSubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.lock().expect("listener map").remove(&self.id);
        }
    }
}

impl AuthService {
    pub fn new(provider: Option<Arc<dyn IdentityProvider>>) -> Self {
        Self {
            inner: Arc::new(AuthInner {
                provider,
                user: Mutex::new(None),
                listeners: Mutex::new(HashMap::new()),
                next_listener_id: AtomicU64::new(1),
                signing_in: AtomicBool::new(false),
            }),
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.inner.user.lock().expect("user state").clone()
    }

    pub fn is_signing_in(&self) -> bool {
        self.inner.signing_in.load(Ordering::SeqCst)
    }

    /// Register a change listener. The listener fires immediately with the
    /// current state, then on every subsequent change until unsubscribed.
    pub fn subscribe<F>(&self, listener: F) -> AuthSubscription
    where
        F: Fn(Option<&AuthUser>) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let listener: Listener = Arc::new(listener);
        self.inner
            .listeners
            .lock()
            .expect("listener map")
            .insert(id, Arc::clone(&listener));

        let current = self.current_user();
        listener(current.as_ref());

        AuthSubscription {
            inner: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Sign in through the configured provider.
    pub async fn sign_in(&self) -> Result<AuthUser, AuthError> {
        let provider = self
            .inner
            .provider
            .clone()
            .ok_or(AuthError::NoProvider)?;

        self.inner.signing_in.store(true, Ordering::SeqCst);

        // Fallback timer: clears the loading flag without cancelling the
        // provider attempt.
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            tokio::time::sleep(SIGN_IN_FALLBACK_TIMEOUT).await;
            if let Some(inner) = weak.upgrade() {
                if inner.signing_in.swap(false, Ordering::SeqCst) {
                    tracing::warn!("sign-in still pending after fallback timeout");
                }
            }
        });

        let result = provider.sign_in().await;
        self.inner.signing_in.store(false, Ordering::SeqCst);

        match result {
            Ok(user) => {
                self.set_user(Some(user.clone()));
                Ok(user)
            }
            Err(err) => {
                tracing::warn!(error = %err, "provider sign-in failed");
                Err(err)
            }
        }
    }

    /// Manual guest identity with a locally generated id and token.
    pub fn sign_in_guest(&self, display_name: &str) -> AuthUser {
        let id = format!("guest-{}", Uuid::new_v4());
        let user = AuthUser {
            email: format!("{id}@guest.local"),
            id,
            display_name: display_name.to_string(),
            avatar_url: None,
            access_token: Uuid::new_v4().to_string(),
        };
        self.set_user(Some(user.clone()));
        user
    }

    pub fn sign_out(&self) {
        self.set_user(None);
    }

    fn set_user(&self, user: Option<AuthUser>) {
        *self.inner.user.lock().expect("user state") = user.clone();
        // Clone listener handles out of the map so delivery happens outside
        // the lock.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .expect("listener map")
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(user.as_ref());
        }
    }
}
