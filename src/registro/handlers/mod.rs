pub mod health;
pub use self::health::health;

pub mod register;
pub use self::register::register;

pub mod settings;
pub use self::settings::{settings, sign_out};

// common functions for the handlers
use regex::Regex;

/// Minimum password length accepted by the registration schema.
pub const MIN_PASSWORD_LENGTH: usize = 8;

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

pub fn valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

pub fn valid_name(name: &str) -> bool {
    !name.trim().is_empty()
}
