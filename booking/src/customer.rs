//! Customer contact details collected at checkout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contact field that cannot be submitted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldInvalid {
    /// Name is blank
    #[error("Please enter your name")]
    MissingName,
    /// Email is blank
    #[error("Please enter your email")]
    MissingEmail,
    /// Email has no `@`
    #[error("Please enter a valid email")]
    MalformedEmail,
    /// Phone is blank
    #[error("Please enter your phone number")]
    MissingPhone,
}

/// Which contact field an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomerField {
    /// Full name
    Name,
    /// Email address
    Email,
    /// Phone number
    Phone,
}

/// Name, email and phone as typed by the customer.
///
/// Values are kept exactly as entered; [`CustomerDetails::validate`] and
/// [`CustomerDetails::trimmed`] look at them without surrounding whitespace.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
}

impl CustomerDetails {
    /// Creates customer details from the three fields
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Replace one field
    pub fn set(&mut self, field: CustomerField, value: String) {
        match field {
            CustomerField::Name => self.name = value,
            CustomerField::Email => self.email = value,
            CustomerField::Phone => self.phone = value,
        }
    }

    /// Check the fields in form order; the first problem wins.
    ///
    /// # Errors
    ///
    /// Returns the [`FieldInvalid`] reason for the first field that is blank,
    /// or [`FieldInvalid::MalformedEmail`] if the email lacks an `@`.
    pub fn validate(&self) -> Result<(), FieldInvalid> {
        if self.name.trim().is_empty() {
            return Err(FieldInvalid::MissingName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(FieldInvalid::MissingEmail);
        }
        if !email.contains('@') {
            return Err(FieldInvalid::MalformedEmail);
        }
        if self.phone.trim().is_empty() {
            return Err(FieldInvalid::MissingPhone);
        }
        Ok(())
    }

    /// Copy with surrounding whitespace removed from every field
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.email.trim(), self.phone.trim())
    }
}
