use tracing::{info, warn};

use crate::app::notify::{Navigator, Toasts};
use crate::app::routes::Route;
use crate::app::session::SessionGuard;
use crate::backend::types::{ImageFile, Services};
use crate::error::ListingError;
use crate::form::fields::parse_field;
use crate::form::state::{reduce, Action, FormMode, FormState, PageState, PageStatus};
use crate::form::submit::{submit_listing, SubmitSettings};
use crate::form::upload::CancelToken;
use crate::models::{Identity, Listing, LISTINGS_COLLECTION};

/// The create-listing and edit-listing page.
///
/// Owns its form state exclusively; every change goes through [`reduce`].
/// Errors are reported on the toast channel and, for authorization
/// failures, by navigating away.
pub struct ListingFormPage {
    mode: FormMode,
    state: PageState,
    services: Services,
    settings: SubmitSettings,
    session: SessionGuard,
    toasts: Toasts,
    navigator: Navigator,
    cancel: CancelToken,
}

impl ListingFormPage {
    /// Mount the create page; the empty form is editable right away
    pub fn create(
        services: Services,
        settings: SubmitSettings,
        toasts: Toasts,
        navigator: Navigator,
    ) -> Self {
        let mut page = Self::mount(FormMode::Create, services, settings, toasts, navigator);
        page.dispatch(Action::Opened);
        page
    }

    /// Mount the edit page; call [`ListingFormPage::load`] before editing
    pub fn edit(
        listing_id: impl Into<String>,
        services: Services,
        settings: SubmitSettings,
        toasts: Toasts,
        navigator: Navigator,
    ) -> Self {
        let mode = FormMode::Edit {
            listing_id: listing_id.into(),
        };
        Self::mount(mode, services, settings, toasts, navigator)
    }

    fn mount(
        mode: FormMode,
        services: Services,
        settings: SubmitSettings,
        toasts: Toasts,
        navigator: Navigator,
    ) -> Self {
        let session = SessionGuard::mount(services.identity.as_ref(), navigator.clone());
        Self {
            mode,
            state: PageState::default(),
            services,
            settings,
            session,
            toasts,
            navigator,
            cancel: CancelToken::new(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn status(&self) -> &PageStatus {
        &self.state.status
    }

    pub fn form(&self) -> &FormState {
        &self.state.form
    }

    /// Handle for aborting a running submission from elsewhere, e.g. the shell
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Fetch the listing being edited and check that the session owns it
    pub async fn load(&mut self) -> Result<(), ListingError> {
        let FormMode::Edit { listing_id } = self.mode.clone() else {
            return Ok(());
        };

        self.dispatch(Action::LoadStarted);

        match self.fetch_owned(&listing_id).await {
            Ok(listing) => {
                info!("Loaded listing {} for editing", listing_id);
                self.dispatch(Action::Loaded(Box::new(listing)));
                Ok(())
            }
            Err(err) => {
                self.dispatch(Action::LoadFailed);
                self.report(&err);
                Err(err)
            }
        }
    }

    async fn fetch_owned(&self, listing_id: &str) -> Result<Listing, ListingError> {
        let identity = self.session.identity().ok_or(ListingError::Unauthenticated)?;

        let document = self
            .services
            .documents
            .get(LISTINGS_COLLECTION, listing_id)
            .await?
            .ok_or_else(|| ListingError::NotFound {
                listing_id: listing_id.to_string(),
            })?;

        let listing = Listing::from_document(document)
            .map_err(|err| ListingError::Backend(err.into()))?;

        if !listing.is_owned_by(&identity) {
            warn!(
                "{} tried to edit listing {} owned by {}",
                identity.uid, listing_id, listing.fields.owner_ref
            );
            return Err(ListingError::Forbidden {
                listing_id: listing_id.to_string(),
            });
        }

        Ok(listing)
    }

    /// Apply a raw `(element id, value)` change from the form
    pub fn mutate_field(&mut self, field_id: &str, raw_value: &str) -> Result<(), ListingError> {
        self.ensure_editable()?;
        let update = parse_field(field_id, raw_value)?;
        self.dispatch(Action::FieldChanged(update));
        Ok(())
    }

    /// File input changed; the new selection replaces the old one
    pub fn select_images(&mut self, images: Vec<ImageFile>) -> Result<(), ListingError> {
        self.ensure_editable()?;
        self.dispatch(Action::FilesChanged(images));
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), ListingError> {
        match self.state.status {
            PageStatus::Ready => Ok(()),
            _ => Err(ListingError::Busy),
        }
    }

    /// Validate, upload and persist. On success the user is sent to the listing.
    pub async fn submit(&mut self) -> Result<Route, ListingError> {
        self.ensure_editable()?;

        let Some(owner) = self.session.identity() else {
            let err = ListingError::Unauthenticated;
            self.report(&err);
            return Err(err);
        };

        if let Err(err) = self.check_still_owner(&owner) {
            self.report(&err);
            return Err(err);
        }

        self.dispatch(Action::SubmitStarted);

        let result = submit_listing(
            &self.state.form,
            &self.mode,
            &self.services,
            &self.settings,
            &owner,
            &self.cancel,
        )
        .await;

        match result {
            Ok(route) => {
                self.toasts.success("Listing saved");
                self.dispatch(Action::SubmitSucceeded(route.clone()));
                self.navigator.navigate(route.clone());
                Ok(route)
            }
            Err(err) => {
                if err.is_validation() {
                    info!("Listing submission rejected: {}", err);
                } else {
                    warn!("Listing submission failed: {}", err);
                }
                self.dispatch(Action::SubmitFailed(err.to_string()));
                self.report(&err);
                Err(err)
            }
        }
    }

    /// The session may have changed since the listing was loaded
    fn check_still_owner(&self, identity: &Identity) -> Result<(), ListingError> {
        let FormMode::Edit { listing_id } = &self.mode else {
            return Ok(());
        };
        if self.state.owner_ref.as_deref() == Some(identity.uid.as_str()) {
            return Ok(());
        }

        warn!(
            "{} tried to save listing {} owned by {:?}",
            identity.uid, listing_id, self.state.owner_ref
        );
        Err(ListingError::Forbidden {
            listing_id: listing_id.clone(),
        })
    }

    fn report(&self, err: &ListingError) {
        // The session guard has already sent the user to sign in
        if matches!(err, ListingError::Unauthenticated) {
            return;
        }

        self.toasts.error(err.to_string());
        if let Some(route) = err.redirect() {
            self.navigator.navigate(route);
        }
    }
}

impl Drop for ListingFormPage {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
