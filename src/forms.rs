//! Contact form and authentication form shells
//!
//! The auth forms only validate; there is no account store behind them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("passwords do not match")]
    PasswordMismatch,
}

fn required(value: &str, name: &'static str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::Missing(name))
    } else {
        Ok(())
    }
}

fn email(value: &str) -> Result<(), FormError> {
    required(value, "email")?;
    let valid = match value.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FormError::InvalidEmail(value.trim().to_string()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), FormError> {
        required(&self.name, "name")?;
        email(&self.email)?;
        required(&self.message, "message")
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        email(&self.email)?;
        required(&self.password, "password")
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(alias = "confirmPassword")]
    pub confirm_password: String,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FormError> {
        required(&self.name, "name")?;
        email(&self.email)?;
        required(&self.password, "password")?;
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        Ok(())
    }
}
