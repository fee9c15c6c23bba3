//! Product form synchronization state machine.
//!
//! [`FormSyncEngine`] is synchronous and performs no I/O. Operations that
//! need the network return a request describing the call; the caller runs it
//! and feeds the result back (`entity_loaded`, `schema_resolved`,
//! `submit_finished`). [`FormController`](super::FormController) is the async
//! driver that does exactly that.
//!
//! Schema fetches are tagged with a monotonically increasing [`SchemaToken`].
//! Only the most recently issued fetch may be applied; anything else is
//! discarded on arrival.

use lampshop_core::{
    AttributeDefinition, AttributeKind, AttributeValue, AttributeValues, CategoryId, Product,
    ProductDraft, ProductId, UpsertProduct,
};
use tracing::{debug, info, warn};

use super::merge::{merge_attributes, seed_attributes};
use super::state::{FormLoadState, FormMode};
use super::FormError;
use crate::api::ApiError;

/// Identity of one issued schema fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SchemaToken(u64);

impl SchemaToken {
    /// Raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SchemaToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A schema fetch the caller must perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRequest {
    pub token: SchemaToken,
    pub category_id: CategoryId,
}

/// A create or update call the caller must perform.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitRequest {
    Create(UpsertProduct),
    Update(ProductId, UpsertProduct),
}

/// What happened to an entity load result.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityResolution {
    /// Draft populated. `schema` is the follow-up fetch, absent when the
    /// product has no category.
    Loaded { schema: Option<SchemaRequest> },
    /// Load failed; the form is unusable.
    Failed(FormError),
    /// Not for this form, or not expected in the current state.
    Ignored,
}

/// What happened to a schema result.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaResolution {
    /// Definitions installed and attributes reconciled.
    Applied,
    /// Fetch failed; the form is usable with no attributes.
    Fallback(ApiError),
    /// Superseded by a later fetch or category change.
    Discarded,
}

/// Result of a finished submit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved; the caller should navigate away.
    Saved(Product),
    /// Rejected; the draft is kept for a retry.
    Failed(ApiError),
}

/// An edit to one of the basic product fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Sku(String),
    Name(String),
    Description(String),
    Price(f64),
    StockQty(i64),
    ImageUrl(String),
    IsActive(bool),
}

/// State machine behind a product create/edit form.
#[derive(Debug)]
pub struct FormSyncEngine {
    mode: FormMode,
    state: FormLoadState,
    draft: Option<ProductDraft>,
    definitions: Vec<AttributeDefinition>,
    /// Persisted values awaiting the edit-mode schema.
    held: Option<AttributeValues>,
    /// The only schema fetch whose result may still be applied.
    pending: Option<SchemaRequest>,
    last_token: u64,
    submitting: bool,
    submit_error: Option<String>,
    fatal: Option<FormError>,
}

impl FormSyncEngine {
    fn with_mode(mode: FormMode, state: FormLoadState, draft: Option<ProductDraft>) -> Self {
        Self {
            mode,
            state,
            draft,
            definitions: Vec::new(),
            held: None,
            pending: None,
            last_token: 0,
            submitting: false,
            submit_error: None,
            fatal: None,
        }
    }

    /// A form for a new product: `Ready` with the default draft and no schema.
    #[must_use]
    pub fn create() -> Self {
        Self::with_mode(
            FormMode::Create,
            FormLoadState::Ready,
            Some(ProductDraft::default()),
        )
    }

    /// A form for an existing product: `Idle` until [`start`](Self::start).
    #[must_use]
    pub fn edit(id: ProductId) -> Self {
        Self::with_mode(FormMode::Edit(id), FormLoadState::Idle, None)
    }

    /// Begin loading the edited product.
    ///
    /// Returns the id to fetch, or `None` if there is nothing to load (create
    /// mode, already started, or a previous load failed).
    pub fn start(&mut self) -> Option<ProductId> {
        let id = self.mode.product_id()?;
        if self.state != FormLoadState::Idle || self.fatal.is_some() {
            return None;
        }
        self.state = FormLoadState::LoadingEntity;
        debug!(product_id = %id, "loading product");
        Some(id)
    }

    /// Apply the result of the entity fetch started by [`start`](Self::start).
    pub fn entity_loaded(
        &mut self,
        id: ProductId,
        result: Result<Product, ApiError>,
    ) -> EntityResolution {
        if self.mode != FormMode::Edit(id) || self.state != FormLoadState::LoadingEntity {
            debug!(product_id = %id, state = %self.state, "ignoring entity result");
            return EntityResolution::Ignored;
        }

        let product = match result {
            Ok(product) if product.id == id => product,
            Ok(product) => {
                debug!(expected = %id, got = %product.id, "ignoring entity result for another id");
                return EntityResolution::Ignored;
            }
            Err(err) => {
                warn!(product_id = %id, error = %err, "product load failed");
                let error = FormError::EntityLoad(err);
                self.state = FormLoadState::Idle;
                self.fatal = Some(error.clone());
                return EntityResolution::Failed(error);
            }
        };

        let mut draft = ProductDraft::from(product);
        let held = std::mem::take(&mut draft.attributes);
        let category_id = draft.category_id.clone();
        self.draft = Some(draft);

        if category_id.is_empty() {
            self.state = FormLoadState::Ready;
            return EntityResolution::Loaded { schema: None };
        }

        self.held = Some(held);
        self.state = FormLoadState::SchemaStale;
        EntityResolution::Loaded {
            schema: Some(self.issue(category_id)),
        }
    }

    /// Change the selected category.
    ///
    /// Invalidates the current schema and attributes at once. Returns the
    /// fetch to perform, or `None` when no fetch is needed (same category, or
    /// the empty category).
    ///
    /// # Errors
    ///
    /// Returns `FormError::NotReady` before the draft exists.
    pub fn select_category(
        &mut self,
        category_id: CategoryId,
    ) -> Result<Option<SchemaRequest>, FormError> {
        let Some(draft) = self.draft.as_mut() else {
            return Err(FormError::NotReady(self.state));
        };
        if draft.category_id == category_id {
            return Ok(None);
        }

        draft.category_id = category_id.clone();
        draft.attributes.clear();
        self.definitions.clear();
        self.held = None;
        self.pending = None;
        self.submit_error = None;

        if category_id.is_empty() {
            self.state = FormLoadState::Ready;
            return Ok(None);
        }

        self.state = FormLoadState::LoadingSchema;
        Ok(Some(self.issue(category_id)))
    }

    fn issue(&mut self, category_id: CategoryId) -> SchemaRequest {
        self.last_token += 1;
        let request = SchemaRequest {
            token: SchemaToken(self.last_token),
            category_id,
        };
        debug!(token = %request.token, category_id = %request.category_id, "schema fetch issued");
        self.pending = Some(request.clone());
        request
    }

    /// Apply the result of a schema fetch.
    ///
    /// The result is applied only if `request` is the latest issued fetch and
    /// its category is still the selected one.
    pub fn schema_resolved(
        &mut self,
        request: &SchemaRequest,
        result: Result<Vec<AttributeDefinition>, ApiError>,
    ) -> SchemaResolution {
        let selected = self.draft.as_ref().map(|d| &d.category_id);
        if self.pending.as_ref() != Some(request) || selected != Some(&request.category_id) {
            debug!(token = %request.token, category_id = %request.category_id, "discarding stale schema");
            return SchemaResolution::Discarded;
        }
        self.pending = None;

        let held = self.held.take();
        let Some(draft) = self.draft.as_mut() else {
            return SchemaResolution::Discarded;
        };
        self.state = FormLoadState::Ready;

        match result {
            Ok(definitions) => {
                draft.attributes = match held {
                    Some(persisted) => merge_attributes(&definitions, persisted),
                    None => seed_attributes(&definitions),
                };
                self.definitions = definitions;
                SchemaResolution::Applied
            }
            Err(err) => {
                warn!(category_id = %request.category_id, error = %err, "schema load failed");
                draft.attributes.clear();
                self.definitions.clear();
                SchemaResolution::Fallback(err)
            }
        }
    }

    /// Apply an edit to a basic field.
    ///
    /// # Errors
    ///
    /// Returns `FormError::NotReady` before the draft exists.
    pub fn edit_field(&mut self, edit: FieldEdit) -> Result<(), FormError> {
        let Some(draft) = self.draft.as_mut() else {
            return Err(FormError::NotReady(self.state));
        };
        match edit {
            FieldEdit::Sku(v) => draft.sku = v,
            FieldEdit::Name(v) => draft.name = v,
            FieldEdit::Description(v) => draft.description = v,
            FieldEdit::Price(v) => draft.price = v,
            FieldEdit::StockQty(v) => draft.stock_qty = v,
            FieldEdit::ImageUrl(v) => draft.image_url = v,
            FieldEdit::IsActive(v) => draft.is_active = v,
        }
        Ok(())
    }

    /// Set a typed attribute value.
    ///
    /// # Errors
    ///
    /// - `FormError::NotReady` while a load is outstanding
    /// - `FormError::UnknownAttribute` if the schema has no such key
    /// - `FormError::AttributeKind` if the value kind does not match
    pub fn set_attribute(&mut self, key: &str, value: AttributeValue) -> Result<(), FormError> {
        let kind = self.attribute_kind(key)?;
        if value.kind() != kind {
            return Err(FormError::AttributeKind {
                key: key.to_string(),
                expected: kind,
            });
        }
        if let Some(draft) = self.draft.as_mut() {
            draft.attributes.insert(key, value);
        }
        Ok(())
    }

    /// Set an attribute from raw input, parsed per the declared kind.
    ///
    /// # Errors
    ///
    /// As [`set_attribute`](Self::set_attribute), plus
    /// `FormError::InvalidAttribute` if the input does not parse.
    pub fn set_attribute_input(&mut self, key: &str, raw: &str) -> Result<(), FormError> {
        let kind = self.attribute_kind(key)?;
        let value = AttributeValue::parse(kind, raw).map_err(|source| {
            FormError::InvalidAttribute {
                key: key.to_string(),
                source,
            }
        })?;
        self.set_attribute(key, value)
    }

    fn attribute_kind(&self, key: &str) -> Result<AttributeKind, FormError> {
        if self.draft.is_none() || !self.state.is_editable() {
            return Err(FormError::NotReady(self.state));
        }
        self.definitions
            .iter()
            .find(|def| def.key == key)
            .map(|def| def.kind)
            .ok_or_else(|| FormError::UnknownAttribute(key.to_string()))
    }

    /// Start a submit.
    ///
    /// # Errors
    ///
    /// - `FormError::NotReady` before the draft exists or while a schema
    ///   load is outstanding; nothing changes
    /// - `FormError::SubmitInProgress` while a previous submit is running
    /// - `FormError::Validation` naming `category_id` when no category is
    ///   selected; the form moves to `SubmitError`
    pub fn submit(&mut self) -> Result<SubmitRequest, FormError> {
        let Some(draft) = self.draft.as_ref() else {
            return Err(FormError::NotReady(self.state));
        };
        if !self.state.is_editable() {
            return Err(FormError::NotReady(self.state));
        }
        if self.submitting {
            return Err(FormError::SubmitInProgress);
        }
        if draft.category_id.is_empty() {
            let error = FormError::Validation {
                field: "category_id",
                message: "Please select a category".to_string(),
            };
            self.state = FormLoadState::SubmitError;
            self.submit_error = Some(error.to_string());
            return Err(error);
        }

        let payload = draft.to_upsert();
        self.submitting = true;
        Ok(match self.mode {
            FormMode::Create => SubmitRequest::Create(payload),
            FormMode::Edit(id) => SubmitRequest::Update(id, payload),
        })
    }

    /// Apply the result of the submit started by [`submit`](Self::submit).
    pub fn submit_finished(&mut self, result: Result<Product, ApiError>) -> SubmitOutcome {
        self.submitting = false;
        match result {
            Ok(product) => {
                info!(product_id = %product.id, "product saved");
                self.submit_error = None;
                if self.state == FormLoadState::SubmitError {
                    self.state = FormLoadState::Ready;
                }
                SubmitOutcome::Saved(product)
            }
            Err(err) => {
                warn!(error = %err, "product save failed");
                self.submit_error = Some(err.message().to_string());
                // A category change made during the submit keeps its loading state.
                if self.state.is_editable() {
                    self.state = FormLoadState::SubmitError;
                }
                SubmitOutcome::Failed(err)
            }
        }
    }

    #[must_use]
    pub const fn mode(&self) -> FormMode {
        self.mode
    }

    #[must_use]
    pub const fn state(&self) -> FormLoadState {
        self.state
    }

    /// The working copy, once it exists.
    #[must_use]
    pub const fn draft(&self) -> Option<&ProductDraft> {
        self.draft.as_ref()
    }

    /// Definitions for the selected category, in display order.
    #[must_use]
    pub fn definitions(&self) -> &[AttributeDefinition] {
        &self.definitions
    }

    /// The schema fetch still allowed to apply, if any.
    #[must_use]
    pub const fn pending_schema(&self) -> Option<&SchemaRequest> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Message from the last failed submit.
    #[must_use]
    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// The entity load failure that made this form unusable.
    #[must_use]
    pub const fn fatal_error(&self) -> Option<&FormError> {
        self.fatal.as_ref()
    }

    /// Whether attribute keys equal the definition keys.
    #[must_use]
    pub fn attributes_match_schema(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|d| d.attributes.matches_schema(&self.definitions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamps() -> CategoryId {
        CategoryId::new("lamps")
    }

    fn lamp_schema() -> Vec<AttributeDefinition> {
        vec![
            AttributeDefinition::new("power", "Power (W)", AttributeKind::Number),
            AttributeDefinition::new("color", "Color", AttributeKind::Text),
        ]
    }

    fn shade_schema() -> Vec<AttributeDefinition> {
        vec![AttributeDefinition::new("diameter", "Diameter", AttributeKind::Number)]
    }

    fn persisted_lamp(id: i64) -> Product {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "sku": "LMP-1",
            "name": "Desk lamp",
            "category_id": "lamps",
            "price": 49.9,
            "attributes": {"power": 60, "legacy": "x"}
        }))
        .expect("product")
    }

    fn ready_create_form() -> FormSyncEngine {
        let mut engine = FormSyncEngine::create();
        let request = engine.select_category(lamps()).expect("select").expect("fetch");
        assert_eq!(
            engine.schema_resolved(&request, Ok(lamp_schema())),
            SchemaResolution::Applied
        );
        engine
    }

    #[test]
    fn test_create_starts_ready_with_default_draft() {
        let mut engine = FormSyncEngine::create();

        assert_eq!(engine.state(), FormLoadState::Ready);
        assert_eq!(engine.draft(), Some(&ProductDraft::default()));
        assert!(engine.definitions().is_empty());
        assert_eq!(engine.start(), None);
    }

    #[test]
    fn test_category_change_seeds_defaults() {
        let engine = ready_create_form();
        let draft = engine.draft().expect("draft");

        assert_eq!(engine.state(), FormLoadState::Ready);
        assert_eq!(draft.attributes.get("power"), Some(&AttributeValue::Number(0.0)));
        assert_eq!(draft.attributes.get("color"), Some(&AttributeValue::from("")));
        assert!(engine.attributes_match_schema());
    }

    #[test]
    fn test_category_change_invalidates_immediately() {
        let mut engine = ready_create_form();

        let request = engine
            .select_category(CategoryId::new("shades"))
            .expect("select")
            .expect("fetch");

        assert_eq!(engine.state(), FormLoadState::LoadingSchema);
        assert!(engine.definitions().is_empty());
        assert!(engine.draft().expect("draft").attributes.is_empty());
        assert_eq!(engine.pending_schema(), Some(&request));
    }

    #[test]
    fn test_reselecting_same_category_is_noop() {
        let mut engine = ready_create_form();
        let before = engine.draft().cloned();

        assert_eq!(engine.select_category(lamps()), Ok(None));
        assert_eq!(engine.state(), FormLoadState::Ready);
        assert_eq!(engine.draft().cloned(), before);
    }

    #[test]
    fn test_stale_schema_is_discarded() {
        let mut engine = FormSyncEngine::create();
        let first = engine.select_category(lamps()).expect("select").expect("fetch");
        let second = engine
            .select_category(CategoryId::new("shades"))
            .expect("select")
            .expect("fetch");
        assert!(second.token > first.token);

        assert_eq!(
            engine.schema_resolved(&first, Ok(lamp_schema())),
            SchemaResolution::Discarded
        );
        assert_eq!(engine.state(), FormLoadState::LoadingSchema);
        assert!(engine.definitions().is_empty());

        assert_eq!(
            engine.schema_resolved(&second, Ok(shade_schema())),
            SchemaResolution::Applied
        );
        let keys: Vec<_> = engine.draft().expect("draft").attributes.keys().collect();
        assert_eq!(keys, ["diameter"]);
    }

    #[test]
    fn test_late_result_after_switching_back_is_discarded() {
        // A → B → A: the first fetch for A must not apply, only the third.
        let mut engine = FormSyncEngine::create();
        let first = engine.select_category(lamps()).expect("select").expect("fetch");
        engine.select_category(CategoryId::new("shades")).expect("select");
        let third = engine.select_category(lamps()).expect("select").expect("fetch");

        assert_eq!(
            engine.schema_resolved(&first, Ok(lamp_schema())),
            SchemaResolution::Discarded
        );
        assert_eq!(
            engine.schema_resolved(&third, Ok(lamp_schema())),
            SchemaResolution::Applied
        );
    }

    #[test]
    fn test_empty_category_cancels_pending_fetch() {
        let mut engine = FormSyncEngine::create();
        let request = engine.select_category(lamps()).expect("select").expect("fetch");

        assert_eq!(engine.select_category(CategoryId::none()), Ok(None));
        assert_eq!(engine.state(), FormLoadState::Ready);
        assert_eq!(
            engine.schema_resolved(&request, Ok(lamp_schema())),
            SchemaResolution::Discarded
        );
        assert!(engine.draft().expect("draft").attributes.is_empty());
    }

    #[test]
    fn test_schema_failure_falls_back_to_empty_ready() {
        let mut engine = FormSyncEngine::create();
        let request = engine.select_category(lamps()).expect("select").expect("fetch");

        let resolution =
            engine.schema_resolved(&request, Err(ApiError::NotFound("no such category".into())));

        assert!(matches!(resolution, SchemaResolution::Fallback(ApiError::NotFound(_))));
        assert_eq!(engine.state(), FormLoadState::Ready);
        assert!(engine.definitions().is_empty());
        assert!(engine.attributes_match_schema());
    }

    #[test]
    fn test_edit_mode_merges_persisted_values() {
        let id = ProductId::new(7);
        let mut engine = FormSyncEngine::edit(id);
        assert_eq!(engine.state(), FormLoadState::Idle);
        assert_eq!(engine.start(), Some(id));
        assert_eq!(engine.state(), FormLoadState::LoadingEntity);

        let EntityResolution::Loaded { schema: Some(request) } =
            engine.entity_loaded(id, Ok(persisted_lamp(7)))
        else {
            panic!("expected a schema fetch");
        };
        assert_eq!(engine.state(), FormLoadState::SchemaStale);
        assert_eq!(request.category_id, lamps());
        assert_eq!(engine.draft().expect("draft").name, "Desk lamp");

        assert_eq!(
            engine.schema_resolved(&request, Ok(lamp_schema())),
            SchemaResolution::Applied
        );

        let expected: AttributeValues = [
            ("power", AttributeValue::Number(60.0)),
            ("color", AttributeValue::from("")),
        ]
        .into_iter()
        .collect();
        assert_eq!(engine.state(), FormLoadState::Ready);
        assert_eq!(engine.draft().expect("draft").attributes, expected);
    }

    #[test]
    fn test_edit_mode_category_change_drops_held_values() {
        let id = ProductId::new(7);
        let mut engine = FormSyncEngine::edit(id);
        engine.start();
        let EntityResolution::Loaded { schema: Some(original) } =
            engine.entity_loaded(id, Ok(persisted_lamp(7)))
        else {
            panic!("expected a schema fetch");
        };

        let request = engine
            .select_category(CategoryId::new("shades"))
            .expect("select")
            .expect("fetch");
        assert_eq!(
            engine.schema_resolved(&original, Ok(lamp_schema())),
            SchemaResolution::Discarded
        );
        engine.schema_resolved(&request, Ok(shade_schema()));

        let attributes = &engine.draft().expect("draft").attributes;
        assert_eq!(attributes.get("diameter"), Some(&AttributeValue::Number(0.0)));
        assert!(!attributes.contains_key("power"));
    }

    #[test]
    fn test_entity_failure_is_fatal() {
        let id = ProductId::new(3);
        let mut engine = FormSyncEngine::edit(id);
        engine.start();

        let resolution = engine.entity_loaded(id, Err(ApiError::NotFound("gone".into())));

        assert!(matches!(resolution, EntityResolution::Failed(FormError::EntityLoad(_))));
        assert_eq!(engine.state(), FormLoadState::Idle);
        assert!(engine.fatal_error().is_some());
        assert!(engine.draft().is_none());
        assert_eq!(engine.start(), None);
        assert!(matches!(engine.submit(), Err(FormError::NotReady(FormLoadState::Idle))));
    }

    #[test]
    fn test_entity_result_for_other_id_is_ignored() {
        let mut engine = FormSyncEngine::edit(ProductId::new(3));
        engine.start();

        assert_eq!(
            engine.entity_loaded(ProductId::new(4), Ok(persisted_lamp(4))),
            EntityResolution::Ignored
        );
        assert_eq!(
            engine.entity_loaded(ProductId::new(3), Ok(persisted_lamp(4))),
            EntityResolution::Ignored
        );
        assert_eq!(engine.state(), FormLoadState::LoadingEntity);
    }

    #[test]
    fn test_uncategorized_product_is_ready_without_schema() {
        let id = ProductId::new(5);
        let mut engine = FormSyncEngine::edit(id);
        engine.start();
        let product: Product =
            serde_json::from_value(serde_json::json!({"id": 5, "attributes": {"legacy": 1}}))
                .expect("product");

        assert_eq!(
            engine.entity_loaded(id, Ok(product)),
            EntityResolution::Loaded { schema: None }
        );
        assert_eq!(engine.state(), FormLoadState::Ready);
        assert!(engine.attributes_match_schema());
    }

    #[test]
    fn test_basic_fields_editable_while_schema_loads() {
        let mut engine = FormSyncEngine::create();
        engine.select_category(lamps()).expect("select");

        engine
            .edit_field(FieldEdit::Name("Floor lamp".into()))
            .expect("edit");
        engine.edit_field(FieldEdit::Price(89.0)).expect("edit");

        let draft = engine.draft().expect("draft");
        assert_eq!(draft.name, "Floor lamp");
        assert!((draft.price - 89.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_attribute_edits_gated_and_typed() {
        let mut engine = FormSyncEngine::create();
        engine.select_category(lamps()).expect("select");
        assert_eq!(
            engine.set_attribute_input("power", "40"),
            Err(FormError::NotReady(FormLoadState::LoadingSchema))
        );

        let mut engine = ready_create_form();
        engine.set_attribute_input("power", "40").expect("power");
        engine.set_attribute("color", AttributeValue::from("brass")).expect("color");

        assert_eq!(
            engine.set_attribute("power", AttributeValue::from("forty")),
            Err(FormError::AttributeKind {
                key: "power".into(),
                expected: AttributeKind::Number
            })
        );
        assert!(matches!(
            engine.set_attribute_input("power", "forty"),
            Err(FormError::InvalidAttribute { .. })
        ));
        assert_eq!(
            engine.set_attribute("legacy", AttributeValue::from("x")),
            Err(FormError::UnknownAttribute("legacy".into()))
        );

        let attributes = &engine.draft().expect("draft").attributes;
        assert_eq!(attributes.get("power"), Some(&AttributeValue::Number(40.0)));
        assert_eq!(attributes.get("color"), Some(&AttributeValue::from("brass")));
        assert!(engine.attributes_match_schema());
    }

    #[test]
    fn test_submit_without_category_fails_validation() {
        let mut engine = FormSyncEngine::create();

        let err = engine.submit().expect_err("no category");

        assert!(matches!(err, FormError::Validation { field: "category_id", .. }));
        assert_eq!(engine.state(), FormLoadState::SubmitError);
        assert!(engine.submit_error().is_some());
        assert!(!engine.is_submitting());
    }

    #[test]
    fn test_submit_while_loading_is_rejected() {
        let mut engine = FormSyncEngine::create();
        engine.select_category(lamps()).expect("select");

        assert_eq!(
            engine.submit(),
            Err(FormError::NotReady(FormLoadState::LoadingSchema))
        );
        assert_eq!(engine.state(), FormLoadState::LoadingSchema);
    }

    #[test]
    fn test_submit_create_and_update_requests() {
        let mut engine = ready_create_form();
        let SubmitRequest::Create(payload) = engine.submit().expect("submit") else {
            panic!("expected create");
        };
        assert_eq!(payload.category_id, lamps());
        assert_eq!(engine.submit(), Err(FormError::SubmitInProgress));

        let id = ProductId::new(7);
        let mut engine = FormSyncEngine::edit(id);
        engine.start();
        let EntityResolution::Loaded { schema: Some(request) } =
            engine.entity_loaded(id, Ok(persisted_lamp(7)))
        else {
            panic!("expected a schema fetch");
        };
        engine.schema_resolved(&request, Ok(lamp_schema()));

        assert!(matches!(
            engine.submit(),
            Ok(SubmitRequest::Update(pid, _)) if pid == id
        ));
    }

    #[test]
    fn test_submit_failure_keeps_draft() {
        let mut engine = ready_create_form();
        engine.edit_field(FieldEdit::Sku("LMP-9".into())).expect("edit");
        engine.submit().expect("submit");
        let before = engine.draft().cloned();

        let outcome = engine.submit_finished(Err(ApiError::Validation("sku taken".into())));

        assert!(matches!(outcome, SubmitOutcome::Failed(ApiError::Validation(_))));
        assert_eq!(engine.state(), FormLoadState::SubmitError);
        assert_eq!(engine.submit_error(), Some("sku taken"));
        assert_eq!(engine.draft().cloned(), before);

        // Retry is allowed from SubmitError.
        assert!(engine.submit().is_ok());
    }

    #[test]
    fn test_successful_retry_returns_to_ready() {
        let mut engine = ready_create_form();
        engine.submit().expect("submit");
        engine.submit_finished(Err(ApiError::Validation("sku taken".into())));
        assert_eq!(engine.state(), FormLoadState::SubmitError);

        engine.submit().expect("retry");
        let outcome = engine.submit_finished(Ok(persisted_lamp(3)));

        assert!(matches!(outcome, SubmitOutcome::Saved(_)));
        assert_eq!(engine.state(), FormLoadState::Ready);
        assert!(engine.submit_error().is_none());
        assert!(!engine.is_submitting());
    }
}
