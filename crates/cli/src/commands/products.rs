//! Product commands.
//!
//! `create` and `edit` drive the same form controller the admin UI uses, so
//! the command line gets the same schema loading, attribute merging and
//! validation.

use clap::Args;
use lampshop_admin::form::{CatalogBackend, FieldEdit};
use lampshop_admin::{
    ApiGateway, AppError, ClientConfig, FormController, FormUpdate, NotificationQueue,
    ProductListView, Transport,
};
use lampshop_core::{CategoryId, Product, ProductId};

use crate::output;

/// Product fields settable from the command line.
#[derive(Args, Debug, Default)]
pub struct ProductArgs {
    /// Stock keeping unit
    #[arg(long)]
    pub sku: Option<String>,

    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Description
    #[arg(long)]
    pub description: Option<String>,

    /// Category id; loads the category's attribute schema
    #[arg(long)]
    pub category: Option<String>,

    /// Unit price
    #[arg(long)]
    pub price: Option<f64>,

    /// Units in stock
    #[arg(long)]
    pub stock: Option<i64>,

    /// Image URL
    #[arg(long)]
    pub image_url: Option<String>,

    /// Whether the product is listed
    #[arg(long)]
    pub active: Option<bool>,

    /// Attribute value as key=value (repeatable)
    #[arg(long = "attr", value_name = "KEY=VALUE", value_parser = parse_attr)]
    pub attrs: Vec<(String, String)>,
}

impl ProductArgs {
    fn field_edits(&self) -> Vec<FieldEdit> {
        [
            self.sku.clone().map(FieldEdit::Sku),
            self.name.clone().map(FieldEdit::Name),
            self.description.clone().map(FieldEdit::Description),
            self.price.map(FieldEdit::Price),
            self.stock.map(FieldEdit::StockQty),
            self.image_url.clone().map(FieldEdit::ImageUrl),
            self.active.map(FieldEdit::IsActive),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn parse_attr(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing attribute key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Print every product with its category name.
///
/// # Errors
///
/// Returns `AppError::Api` if the list cannot be loaded.
pub async fn list<T: Transport>(
    gateway: &ApiGateway<T>,
    config: &ClientConfig,
) -> Result<(), AppError> {
    let mut view = ProductListView::new(
        gateway.clone(),
        NotificationQueue::new(config.notification_window),
    );
    view.refresh().await?;
    for product in view.products() {
        output::product_row(product, view.category_name(&product.category_id));
    }
    Ok(())
}

/// Print one product.
///
/// # Errors
///
/// Returns `AppError::Api` if the product cannot be loaded.
pub async fn show<T: Transport>(gateway: &ApiGateway<T>, id: ProductId) -> Result<(), AppError> {
    output::product(&gateway.get_product(id).await?);
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns `AppError::Api` if the delete or the reload fails.
pub async fn delete<T: Transport>(
    gateway: &ApiGateway<T>,
    config: &ClientConfig,
    id: ProductId,
) -> Result<(), AppError> {
    let mut view = ProductListView::new(
        gateway.clone(),
        NotificationQueue::new(config.notification_window),
    );
    view.delete(id).await?;
    tracing::info!(product_id = %id, remaining = view.products().len(), "Product deleted");
    Ok(())
}

/// Create a product.
///
/// # Errors
///
/// Returns `AppError::Form` for local validation failures and
/// `AppError::Api` if the server rejects the product.
pub async fn create<T: Transport>(
    gateway: &ApiGateway<T>,
    config: &ClientConfig,
    fields: ProductArgs,
) -> Result<(), AppError> {
    let mut form = FormController::create(
        gateway.clone(),
        NotificationQueue::new(config.notification_window),
    );
    let product = fill_and_submit(&mut form, &fields).await?;
    output::product(&product);
    Ok(())
}

/// Edit a product. Fields not given keep their current value.
///
/// # Errors
///
/// Returns `AppError::Form` if the product cannot be loaded or a field is
/// invalid, and `AppError::Api` if the server rejects the product.
pub async fn edit<T: Transport>(
    gateway: &ApiGateway<T>,
    config: &ClientConfig,
    id: ProductId,
    fields: ProductArgs,
) -> Result<(), AppError> {
    let mut form = FormController::edit(
        gateway.clone(),
        id,
        NotificationQueue::new(config.notification_window),
    );
    form.mount();
    settle(&mut form).await?;

    let product = fill_and_submit(&mut form, &fields).await?;
    output::product(&product);
    Ok(())
}

/// Apply the given fields to a loaded form and save it.
///
/// # Errors
///
/// Returns `AppError::Form` for rejected edits and `AppError::Api` if the
/// save fails.
pub async fn fill_and_submit<B: CatalogBackend>(
    form: &mut FormController<B>,
    fields: &ProductArgs,
) -> Result<Product, AppError> {
    for edit in fields.field_edits() {
        form.edit_field(edit)?;
    }
    if let Some(category) = &fields.category {
        form.select_category(CategoryId::new(category.as_str()))?;
        settle(form).await?;
    }
    for (key, raw) in &fields.attrs {
        form.set_attribute_input(key, raw)?;
    }

    form.submit()?;
    for update in form.run_until_settled().await {
        match update {
            FormUpdate::Saved(product) => return Ok(product),
            FormUpdate::SubmitFailed(err) => return Err(err.into()),
            _ => {}
        }
    }
    Err(AppError::BadRequest("save did not complete".to_string()))
}

/// Wait for outstanding loads, failing on a fatal one.
async fn settle<B: CatalogBackend>(form: &mut FormController<B>) -> Result<(), AppError> {
    for update in form.run_until_settled().await {
        match update {
            FormUpdate::Fatal(err) => return Err(err.into()),
            FormUpdate::SchemaFailed(err) => {
                tracing::warn!(error = %err, "Continuing without attributes");
            }
            _ => {}
        }
    }
    Ok(())
}
