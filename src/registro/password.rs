use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tokio::task;

/// bcrypt cost parameter. Every registration attempt pays this work floor.
pub const WORK_FACTOR: u32 = 10;

/// Hash a plaintext password into a salted bcrypt digest.
///
/// The hash is CPU-bound, so it runs on the blocking worker pool rather than
/// the request's event loop.
///
/// # Errors
/// Returns an error if the hasher fails or the worker is cancelled.
pub async fn hash(password: &SecretString) -> Result<String> {
    let plaintext = password.expose_secret().to_owned();

    let digest = task::spawn_blocking(move || bcrypt::hash(plaintext, WORK_FACTOR)).await??;

    Ok(digest)
}

/// Check a plaintext password against a stored digest.
///
/// # Errors
/// Returns an error if the digest is not a valid bcrypt string.
pub fn verify(password: &str, digest: &str) -> Result<bool> {
    Ok(bcrypt::verify(password, digest)?)
}
