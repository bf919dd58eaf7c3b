use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::notify::Navigator;
use super::routes::Route;
use crate::backend::IdentityProvider;
use crate::models::Identity;

/// Keeps a protected page behind a signed-in session.
///
/// Mounting checks the session at once and then follows every change:
/// losing the session sends the user to the sign-in page. Dropping the
/// guard tears the subscription down. Must be mounted inside a tokio runtime.
pub struct SessionGuard {
    session: watch::Receiver<Option<Identity>>,
    task: JoinHandle<()>,
}

impl SessionGuard {
    pub fn mount(provider: &dyn IdentityProvider, navigator: Navigator) -> Self {
        let mut changes = provider.subscribe();
        let session = changes.clone();

        let initial = changes.borrow_and_update().clone();
        on_session_change(initial.as_ref(), &navigator);

        let task = tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let current = changes.borrow_and_update().clone();
                on_session_change(current.as_ref(), &navigator);
            }
            debug!("Identity provider closed, session guard stopping");
        });

        Self { session, task }
    }

    /// The identity recorded for this page, e.g. to stamp listing ownership
    pub fn identity(&self) -> Option<Identity> {
        self.session.borrow().clone()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn on_session_change(identity: Option<&Identity>, navigator: &Navigator) {
    match identity {
        Some(identity) => debug!("Session active for {}", identity.uid),
        None => {
            info!("No signed-in user, redirecting to sign in");
            navigator.navigate(Route::SignIn);
        }
    }
}
