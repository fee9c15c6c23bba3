//! Async driver for [`FormSyncEngine`].
//!
//! The controller owns the engine and is its only mutator. Network calls run
//! as spawned tasks that post a completion event to the controller's channel;
//! [`FormController::next_update`] applies one event at a time in arrival
//! order. The engine decides what a late event is worth.

use lampshop_core::{AttributeDefinition, AttributeValue, CategoryId, Product, ProductId};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

use super::backend::CatalogBackend;
use super::engine::{
    EntityResolution, FieldEdit, FormSyncEngine, SchemaRequest, SchemaResolution, SubmitOutcome,
    SubmitRequest,
};
use super::FormError;
use crate::api::ApiError;
use crate::notification::NotificationQueue;

/// Completion of a spawned call.
#[derive(Debug)]
enum FormEvent {
    EntityLoaded {
        id: ProductId,
        result: Result<Product, ApiError>,
    },
    SchemaResolved {
        request: SchemaRequest,
        result: Result<Vec<AttributeDefinition>, ApiError>,
    },
    SubmitFinished {
        result: Result<Product, ApiError>,
    },
}

/// What one call to [`FormController::next_update`] changed.
#[derive(Debug, Clone, PartialEq)]
pub enum FormUpdate {
    /// The edited product was loaded into the draft.
    Loaded,
    /// The edited product could not be loaded; the form is unusable.
    Fatal(FormError),
    /// A schema was applied.
    SchemaApplied,
    /// A schema fetch failed; the form continues with no attributes.
    SchemaFailed(ApiError),
    /// A superseded schema result arrived and was dropped.
    Discarded,
    /// The product was saved; navigate away.
    Saved(Product),
    /// The save was rejected; the draft is kept.
    SubmitFailed(ApiError),
    /// The visible notification timed out.
    NotificationCleared,
    /// A result arrived that the form no longer expected.
    Ignored,
}

/// Drives a product form against a [`CatalogBackend`].
pub struct FormController<B> {
    engine: FormSyncEngine,
    notifications: NotificationQueue,
    backend: B,
    tx: mpsc::UnboundedSender<FormEvent>,
    rx: mpsc::UnboundedReceiver<FormEvent>,
    in_flight: usize,
}

impl<B> std::fmt::Debug for FormController<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("engine", &self.engine)
            .field("notifications", &self.notifications)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<B: CatalogBackend> FormController<B> {
    /// Wrap an engine.
    #[must_use]
    pub fn new(engine: FormSyncEngine, backend: B, notifications: NotificationQueue) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine,
            notifications,
            backend,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// A controller for a new product.
    #[must_use]
    pub fn create(backend: B, notifications: NotificationQueue) -> Self {
        Self::new(FormSyncEngine::create(), backend, notifications)
    }

    /// A controller for an existing product. Call [`mount`](Self::mount) to
    /// start loading it.
    #[must_use]
    pub fn edit(backend: B, id: ProductId, notifications: NotificationQueue) -> Self {
        Self::new(FormSyncEngine::edit(id), backend, notifications)
    }

    #[must_use]
    pub const fn engine(&self) -> &FormSyncEngine {
        &self.engine
    }

    #[must_use]
    pub const fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Number of spawned calls whose completion has not been applied yet.
    #[must_use]
    pub const fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start loading the edited product. Does nothing in create mode.
    #[instrument(skip(self))]
    pub fn mount(&mut self) {
        if let Some(id) = self.engine.start() {
            let backend = self.backend.clone();
            self.spawn(
                async move {
                    let result = backend.load_product(id).await;
                    FormEvent::EntityLoaded { id, result }
                },
                move |err| FormEvent::EntityLoaded { id, result: Err(err) },
            );
        }
    }

    /// Select a category and fetch its schema.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NotReady` before the draft exists.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub fn select_category(&mut self, category_id: CategoryId) -> Result<(), FormError> {
        if let Some(request) = self.engine.select_category(category_id)? {
            self.fetch_schema(request);
        }
        Ok(())
    }

    /// Edit a basic field.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NotReady` before the draft exists.
    pub fn edit_field(&mut self, edit: FieldEdit) -> Result<(), FormError> {
        self.engine.edit_field(edit)
    }

    /// Set a typed attribute value.
    ///
    /// # Errors
    ///
    /// See [`FormSyncEngine::set_attribute`].
    pub fn set_attribute(&mut self, key: &str, value: AttributeValue) -> Result<(), FormError> {
        self.engine.set_attribute(key, value)
    }

    /// Set an attribute from raw input.
    ///
    /// # Errors
    ///
    /// See [`FormSyncEngine::set_attribute_input`].
    pub fn set_attribute_input(&mut self, key: &str, raw: &str) -> Result<(), FormError> {
        self.engine.set_attribute_input(key, raw)
    }

    /// Submit the draft.
    ///
    /// # Errors
    ///
    /// See [`FormSyncEngine::submit`]. A validation failure is also shown as
    /// an error notification.
    #[instrument(skip(self))]
    pub fn submit(&mut self) -> Result<(), FormError> {
        let request = match self.engine.submit() {
            Ok(request) => request,
            Err(err @ FormError::Validation { .. }) => {
                self.notifications.error(err.to_string());
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        let backend = self.backend.clone();
        self.spawn(
            async move {
                let result = match request {
                    SubmitRequest::Create(payload) => backend.create(payload).await,
                    SubmitRequest::Update(id, payload) => backend.update(id, payload).await,
                };
                FormEvent::SubmitFinished { result }
            },
            |err| FormEvent::SubmitFinished { result: Err(err) },
        );
        Ok(())
    }

    fn fetch_schema(&mut self, request: SchemaRequest) {
        let backend = self.backend.clone();
        let failed = request.clone();
        self.spawn(
            async move {
                let result = backend.load_schema(request.category_id.clone()).await;
                FormEvent::SchemaResolved { request, result }
            },
            move |err| FormEvent::SchemaResolved {
                request: failed,
                result: Err(err),
            },
        );
    }

    /// Run `call` on its own task and post its event. A call that panics or
    /// is cancelled posts `failed(..)` instead, so `in_flight` always drains.
    fn spawn<F, E>(&mut self, call: F, failed: E)
    where
        F: Future<Output = FormEvent> + Send + 'static,
        E: FnOnce(ApiError) -> FormEvent + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let event = match tokio::spawn(call).await {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "form task did not complete");
                    failed(ApiError::Unknown(format!("request task failed: {err}")))
                }
            };
            // The receiver lives as long as the controller; a send error means
            // the form was dropped and nobody cares about the result.
            let _ = tx.send(event);
        });
    }

    /// Wait for and apply the next event.
    ///
    /// Returns `None` when nothing is in flight and no notification is
    /// waiting to time out.
    pub async fn next_update(&mut self) -> Option<FormUpdate> {
        let showing = self.notifications.is_visible();
        if self.in_flight == 0 && !showing {
            return None;
        }

        tokio::select! {
            Some(event) = self.rx.recv(), if self.in_flight > 0 => {
                self.in_flight -= 1;
                Some(self.apply(event))
            }
            _ = self.notifications.expired(), if showing => {
                Some(FormUpdate::NotificationCleared)
            }
        }
    }

    /// Apply events until no call is in flight.
    ///
    /// Notification timeouts that fall due meanwhile are applied too; a
    /// notification still visible at the end is left alone.
    pub async fn run_until_settled(&mut self) -> Vec<FormUpdate> {
        let mut updates = Vec::new();
        while self.in_flight > 0 {
            match self.next_update().await {
                Some(update) => updates.push(update),
                None => break,
            }
        }
        updates
    }

    fn apply(&mut self, event: FormEvent) -> FormUpdate {
        match event {
            FormEvent::EntityLoaded { id, result } => match self.engine.entity_loaded(id, result) {
                EntityResolution::Loaded { schema } => {
                    if let Some(request) = schema {
                        self.fetch_schema(request);
                    }
                    FormUpdate::Loaded
                }
                EntityResolution::Failed(err) => {
                    self.notifications.error(err.to_string());
                    FormUpdate::Fatal(err)
                }
                EntityResolution::Ignored => FormUpdate::Ignored,
            },
            FormEvent::SchemaResolved { request, result } => {
                match self.engine.schema_resolved(&request, result) {
                    SchemaResolution::Applied => FormUpdate::SchemaApplied,
                    SchemaResolution::Fallback(err) => {
                        self.notifications
                            .error(format!("Failed to load attributes: {}", err.message()));
                        FormUpdate::SchemaFailed(err)
                    }
                    SchemaResolution::Discarded => {
                        debug!(token = %request.token, "stale schema dropped");
                        FormUpdate::Discarded
                    }
                }
            }
            FormEvent::SubmitFinished { result } => match self.engine.submit_finished(result) {
                SubmitOutcome::Saved(product) => {
                    self.notifications.success("Product saved");
                    FormUpdate::Saved(product)
                }
                SubmitOutcome::Failed(err) => {
                    self.notifications.error(err.message());
                    FormUpdate::SubmitFailed(err)
                }
            },
        }
    }
}
