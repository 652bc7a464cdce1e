// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::tax_id::is_valid_tax_id;
use crate::types::{Client, Product};

/// Validates that a client's field constraints are met.
///
/// # Arguments
///
/// * `client` - The client to validate
///
/// # Errors
///
/// Returns an error if:
/// - The client id or name is blank
/// - A tax id is present and fails CPF/CNPJ validation
pub fn validate_client_fields(client: &Client) -> Result<(), DomainError> {
    if client.id.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Client id cannot be empty",
        )));
    }

    if client.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Client name cannot be empty",
        )));
    }

    // Rule: a tax id is optional, but when present it must carry valid check digits
    match &client.tax_id {
        Some(tax_id) if !is_valid_tax_id(tax_id) => {
            Err(DomainError::InvalidTaxId(tax_id.clone()))
        }
        _ => Ok(()),
    }
}

/// Validates that a product's field constraints are met.
///
/// # Errors
///
/// Returns an error if the product id or name is blank.
pub fn validate_product_fields(product: &Product) -> Result<(), DomainError> {
    if product.id.trim().is_empty() || product.name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Product id and name cannot be empty",
        )));
    }
    Ok(())
}

/// Validates a configuration key.
///
/// Keys are non-empty and limited to ASCII letters, digits, `_`, `.` and `-`.
///
/// # Errors
///
/// Returns `DomainError::InvalidConfigKey` if the key is empty or contains
/// other characters.
pub fn validate_config_key(key: &str) -> Result<(), DomainError> {
    if key.is_empty() {
        return Err(DomainError::InvalidConfigKey(String::from(
            "Key cannot be empty",
        )));
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(DomainError::InvalidConfigKey(format!(
            "Key '{key}' contains unsupported characters"
        )));
    }

    Ok(())
}
