//! Category commands.

use lampshop_admin::{ApiGateway, AppError, SchemaResolver, Transport};
use lampshop_core::CategoryId;

use crate::output;

/// Print every category.
///
/// # Errors
///
/// Returns `AppError::Api` if the categories cannot be loaded.
pub async fn categories<T: Transport>(gateway: &ApiGateway<T>) -> Result<(), AppError> {
    for category in gateway.list_categories().await? {
        output::line(&format!("{:<20} {}", category.id.as_str(), category.name));
    }
    Ok(())
}

/// Print the attribute schema of a category.
///
/// # Errors
///
/// Returns `AppError::Api` for an empty or unknown category.
pub async fn attributes<T: Transport>(
    gateway: &ApiGateway<T>,
    category: &str,
) -> Result<(), AppError> {
    let definitions = SchemaResolver::new(gateway.clone())
        .resolve(&CategoryId::new(category))
        .await?;
    output::definitions(&definitions);
    Ok(())
}
