//! # Registro
//!
//! `registro` is a small account-registration service. It exposes one
//! action, `POST /register`, which validates a credential payload, hashes
//! the password with bcrypt, and inserts an owner row into Postgres, plus a
//! settings page whose only interactive element is a sign-out form.
//!
//! Registration replies with exactly one of three fixed, user-visible
//! messages: `"Invalid credentials"`, `"User already exists"`, or
//! `"Account created successfully!"`. Validation failures are deliberately
//! opaque; field-level detail would aid account enumeration.

pub mod cli;
pub mod registro;
