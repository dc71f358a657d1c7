//! Form validation shared by the registration, customer, product and QRIS forms.

use crate::errors::{Error, Result};

/// Minimum password length accepted on sign-up and customer forms.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Highest unit price accepted for a menu item, in Rupiah.
pub const MAX_PRICE: i64 = 1_000_000_000;

/// Checks that a required text field is present after trimming.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Accepts addresses shaped like `local@domain.tld` with no whitespace.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .rsplit_once('.')
        .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Validates an email field.
pub fn validate_email(email: &str) -> Result<()> {
    require("Email", email)?;
    if !is_valid_email(email.trim()) {
        return Err(Error::validation("Email format is invalid"));
    }
    Ok(())
}

/// Validates a new password and its confirmation.
pub fn validate_password(password: &str, confirmation: &str) -> Result<()> {
    require("Password", password)?;
    if password != confirmation {
        return Err(Error::validation("Passwords do not match"));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Validates the sign-up / add-customer form.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirmation: &str,
) -> Result<()> {
    if [name, email, password, confirmation]
        .iter()
        .any(|value| value.trim().is_empty())
    {
        return Err(Error::validation("All fields are required"));
    }
    validate_password(password, confirmation)?;
    validate_email(email)
}

/// Validates the product form fields.
pub fn validate_product(name: &str, price: i64, daily_limit: Option<i32>) -> Result<()> {
    require("Product name", name)?;
    if price <= 0 {
        return Err(Error::validation("Price must be greater than zero"));
    }
    if price > MAX_PRICE {
        return Err(Error::validation(format!(
            "Price cannot exceed {MAX_PRICE}"
        )));
    }
    if daily_limit.is_some_and(|limit| limit < 1) {
        return Err(Error::validation("Daily limit must be at least 1"));
    }
    Ok(())
}

/// Trims an optional text field, mapping blank input to `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
