// SPDX-FileCopyrightText: 2026 Hejmo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The session/role resolution state machine.
//!
//! `SessionController` owns the device-wide [`Session`] and is its only
//! mutator. It consumes the remote store's credential-event stream strictly
//! sequentially: role resolution and the navigation side effect of one event
//! fully settle before the next event is taken, so a rapid logout-then-login
//! cannot emit conflicting intents.
//!
//! The imperative operations (`register`, `login`, `logout`) never transition
//! state themselves. The credential-event stream is the single source of
//! truth for transitions, which avoids races between an operation's network
//! ack and the listener firing.

use std::str::FromStr;
use std::sync::Arc;

use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use hejmo_core::{
    CredentialEvent, HejmoError, Navigator, RemoteStore, Role, Route, Session, UserProfile,
};

/// Owns the authentication/role state machine and its event loop.
///
/// Construct with [`SessionController::start`]; the event loop task is
/// aborted when the controller is dropped. Exactly one controller exists per
/// application root.
pub struct SessionController {
    store: Arc<dyn RemoteStore>,
    users_collection: String,
    state_tx: watch::Sender<Session>,
    event_loop: JoinHandle<()>,
}

impl SessionController {
    /// Subscribe to the store's credential stream and start the event loop.
    ///
    /// The initial state has status `Resolving` until the listener fires for
    /// the first time.
    pub fn start(
        store: Arc<dyn RemoteStore>,
        navigator: Arc<dyn Navigator>,
        users_collection: impl Into<String>,
    ) -> Self {
        let users_collection = users_collection.into();
        let (state_tx, _) = watch::channel(Session::resolving());

        let events = store.subscribe_credential();
        let event_loop = tokio::spawn(run_event_loop(
            events,
            Arc::clone(&store),
            navigator,
            users_collection.clone(),
            state_tx.clone(),
        ));

        SessionController {
            store,
            users_collection,
            state_tx,
            event_loop,
        }
    }

    /// Current session snapshot.
    pub fn state(&self) -> Session {
        self.state_tx.borrow().clone()
    }

    /// Observe session state changes.
    ///
    /// State updates are published only after an event has fully settled
    /// (role resolved, navigation intent emitted), so waiting on this channel
    /// is the correct way to assert on transitions; operation completion is
    /// not.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state_tx.subscribe()
    }

    /// Create a new credential and write the profile document `{role, email}`
    /// keyed by the new identity.
    ///
    /// Does not transition state; the credential-event stream drives that.
    /// If the profile write fails the credential still exists profile-less:
    /// recover by retrying profile creation, not by re-registering.
    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        role_choice: Role,
    ) -> Result<(), HejmoError> {
        let uid = self.store.create_credential(email, password).await?;

        let profile = UserProfile {
            role: Some(role_choice),
            email: email.to_string(),
        };
        let fields = serde_json::to_value(&profile)
            .map_err(|e| HejmoError::Internal(format!("profile serialization failed: {e}")))?;

        self.store
            .set_document(&self.users_collection, &uid.0, fields)
            .await
            .map_err(|e| HejmoError::Auth {
                message: format!("profile creation failed for {email} after credential creation"),
                source: Some(Box::new(e)),
            })?;

        info!(email, role = %role_choice, "registered new user");
        Ok(())
    }

    /// Verify an existing credential. On failure the session is untouched;
    /// on success the credential-event stream drives the transition.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), HejmoError> {
        self.store.verify_credential(email, password).await?;
        info!(email, "login accepted, awaiting credential event");
        Ok(())
    }

    /// Invalidate the current credential. The credential-event stream drives
    /// the transition to `Unauthenticated`.
    pub async fn logout(&self) -> Result<(), HejmoError> {
        self.store.invalidate_credential().await?;
        info!("logout requested, awaiting credential event");
        Ok(())
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

/// Consume credential events one at a time until the stream closes.
async fn run_event_loop(
    mut events: mpsc::Receiver<CredentialEvent>,
    store: Arc<dyn RemoteStore>,
    navigator: Arc<dyn Navigator>,
    users_collection: String,
    state_tx: watch::Sender<Session>,
) {
    while let Some(event) = events.recv().await {
        handle_event(event, &*store, &*navigator, &users_collection, &state_tx).await;
    }
}

/// Resolve one credential event into a settled session state plus its
/// navigation side effect. Must never leave the state at `Resolving`.
async fn handle_event(
    event: CredentialEvent,
    store: &dyn RemoteStore,
    navigator: &dyn Navigator,
    users_collection: &str,
    state_tx: &watch::Sender<Session>,
) {
    let Some(credential) = event.credential else {
        info!("no authenticated user");
        state_tx.send_replace(Session::unauthenticated());
        navigator.navigate(Route::SignIn);
        return;
    };

    match store.get_document(users_collection, &credential.0).await {
        Ok(Some(profile)) => match resolve_role(&profile) {
            Some(role) => {
                info!(user = %credential.0, %role, "session authenticated");
                state_tx.send_replace(Session::authenticated(credential, role));
                navigator.navigate(home_route(role));
            }
            None => {
                // Fail closed: an authenticated user without a usable role
                // goes back to sign-in.
                warn!(user = %credential.0, "profile has no valid role");
                state_tx.send_replace(Session::authenticated_no_role(credential));
                navigator.navigate(Route::SignIn);
            }
        },
        Ok(None) => {
            warn!(user = %credential.0, "profile document missing");
            state_tx.send_replace(Session::authenticated_no_role(credential));
            navigator.navigate(Route::SignIn);
        }
        Err(e) => {
            // Background listener error: logged, role cleared, no navigation.
            // The machine still settles; it never stays at Resolving.
            error!(user = %credential.0, error = %e, "profile lookup failed");
            state_tx.send_replace(Session::authenticated_no_role(credential));
        }
    }
}

/// Extract the role from a profile document, tolerating absent or
/// unrecognized values.
fn resolve_role(profile: &Value) -> Option<Role> {
    let raw = profile.get("role").and_then(Value::as_str)?;
    match Role::from_str(raw) {
        Ok(role) => Some(role),
        Err(_) => {
            warn!(role = raw, "unrecognized role on profile");
            None
        }
    }
}

/// Home route for a resolved role.
fn home_route(role: Role) -> Route {
    match role {
        Role::Realtor => Route::RealtorHome,
        Role::Customer => Route::CustomerHome,
    }
}
