use crate::registro::{
    handlers::{valid_email, valid_name, valid_password},
    owners::{CreateOwnerError, DynOwnerStore, NewOwner, OwnerStore},
    password,
};
use anyhow::Result;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use utoipa::ToSchema;

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub const USER_ALREADY_EXISTS: &str = "User already exists";
pub const ACCOUNT_CREATED: &str = "Account created successfully!";

/// Raw registration payload as received from the client. Unknown keys are
/// dropped during deserialization; presence and shape of the known keys are
/// checked by [`Credentials::validate`].
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct RegisterPayload {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Registration reply: exactly one of `success` or `error`, both carrying a
/// fixed user-visible message.
#[derive(ToSchema, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum RegisterResult {
    #[serde(rename = "success")]
    Success(String),
    #[serde(rename = "error")]
    Error(String),
}

/// A payload that passed schema validation. Restricted to exactly the three
/// recognized fields; the plaintext password stays wrapped until hashing.
pub(crate) struct Credentials {
    pub(crate) email: String,
    pub(crate) password: SecretString,
    pub(crate) name: String,
}

impl Credentials {
    /// Validate the declared schema: presence of `email`, `password` and
    /// `name`, email grammar, password floor, non-blank name. Any violation
    /// collapses into the single opaque failure token, field-level detail
    /// would aid enumeration.
    pub(crate) fn validate(payload: RegisterPayload) -> Result<Self, &'static str> {
        let RegisterPayload {
            email,
            password,
            name,
        } = payload;

        let (Some(email), Some(password), Some(name)) = (email, password, name) else {
            return Err(INVALID_CREDENTIALS);
        };

        if !valid_email(&email) || !valid_password(&password) || !valid_name(&name) {
            return Err(INVALID_CREDENTIALS);
        }

        Ok(Self {
            email,
            password: SecretString::from(password),
            name,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Registration {
    Created,
    DuplicateEmail,
}

/// Hash the password, check for an existing owner, insert the new row.
///
/// The hash is computed before the existence check so every attempt pays the
/// same work floor, masking the timing difference between taken and free
/// emails. The digest is discarded on the duplicate branch.
pub(crate) async fn create_account(
    store: &dyn OwnerStore,
    credentials: &Credentials,
) -> Result<Registration> {
    let digest = password::hash(&credentials.password).await?;

    if store.owner_by_email(&credentials.email).await?.is_some() {
        return Ok(Registration::DuplicateEmail);
    }

    match store
        .create_owner(NewOwner {
            email: credentials.email.clone(),
            password: digest,
            name: credentials.name.clone(),
            phone: String::new(),
        })
        .await
    {
        Ok(()) => (),
        // Lost the race against a concurrent registration: the unique
        // constraint on owners.email reports it the same way the pre-check
        // would have.
        Err(CreateOwnerError::DuplicateEmail) => return Ok(Registration::DuplicateEmail),
        Err(CreateOwnerError::Store(e)) => return Err(e),
    }

    // TODO: Send verification email
    Ok(Registration::Created)
}

#[utoipa::path(
    post,
    path= "/register",
    request_body = RegisterPayload,
    responses (
        (status = 201, description = "Registration successful", body = RegisterResult, content_type = "application/json"),
        (status = 400, description = "Payload does not match the registration schema", body = RegisterResult),
        (status = 409, description = "Owner with the specified email already exists", body = RegisterResult),
    ),
    tag= "register"
)]
// axum handler for register
#[instrument(skip(store, payload))]
pub async fn register(
    store: Extension<DynOwnerStore>,
    payload: Option<Json<RegisterPayload>>,
) -> impl IntoResponse {
    let Some(Json(payload)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(RegisterResult::Error(INVALID_CREDENTIALS.to_string())),
        );
    };

    let credentials = match Credentials::validate(payload) {
        Ok(credentials) => credentials,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(RegisterResult::Error(message.to_string())),
            );
        }
    };

    debug!("registering owner {}", credentials.email);

    match create_account(store.0.as_ref(), &credentials).await {
        Ok(Registration::Created) => (
            StatusCode::CREATED,
            Json(RegisterResult::Success(ACCOUNT_CREATED.to_string())),
        ),
        Ok(Registration::DuplicateEmail) => {
            error!("User already exists");
            (
                StatusCode::CONFLICT,
                Json(RegisterResult::Error(USER_ALREADY_EXISTS.to_string())),
            )
        }
        Err(e) => {
            error!("Error creating account: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RegisterResult::Error("Internal server error".to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registro::{
        owners::{MemoryOwnerStore, Owner},
        router,
    };
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request},
    };
    use secrecy::ExposeSecret;
    use serde_json::json;
    use tower::ServiceExt;

    fn payload(email: &str, password: &str, name: &str) -> RegisterPayload {
        RegisterPayload {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_payload() {
        let credentials = Credentials::validate(payload("a@b.com", "hunter2!", "Ada")).unwrap();

        assert_eq!(credentials.email, "a@b.com");
        assert_eq!(credentials.password.expose_secret(), "hunter2!");
        assert_eq!(credentials.name, "Ada");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let missing_name = RegisterPayload {
            email: Some("a@b.com".to_string()),
            password: Some("hunter2!".to_string()),
            name: None,
        };
        assert_eq!(
            Credentials::validate(missing_name).err(),
            Some(INVALID_CREDENTIALS)
        );

        assert_eq!(
            Credentials::validate(RegisterPayload::default()).err(),
            Some(INVALID_CREDENTIALS)
        );
    }

    #[test]
    fn test_validate_rejects_malformed_email() {
        assert_eq!(
            Credentials::validate(payload("not-an-email", "hunter2!", "Ada")).err(),
            Some(INVALID_CREDENTIALS)
        );
    }

    #[test]
    fn test_validate_rejects_empty_and_short_passwords() {
        assert_eq!(
            Credentials::validate(payload("a@b.com", "", "Ada")).err(),
            Some(INVALID_CREDENTIALS)
        );
        assert_eq!(
            Credentials::validate(payload("a@b.com", "short", "Ada")).err(),
            Some(INVALID_CREDENTIALS)
        );
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert_eq!(
            Credentials::validate(payload("a@b.com", "hunter2!", "   ")).err(),
            Some(INVALID_CREDENTIALS)
        );
    }

    #[test]
    fn test_payload_drops_extraneous_keys() {
        let payload: RegisterPayload = serde_json::from_value(json!({
            "email": "a@b.com",
            "password": "hunter2!",
            "name": "Ada",
            "role": "admin",
            "phone": "555-0100",
        }))
        .unwrap();

        assert!(Credentials::validate(payload).is_ok());
    }

    #[tokio::test]
    async fn test_create_account_inserts_owner() {
        let store = MemoryOwnerStore::new();
        let credentials = Credentials::validate(payload("a@b.com", "hunter2!", "Ada")).unwrap();

        let registration = create_account(store.as_ref(), &credentials).await.unwrap();

        assert_eq!(registration, Registration::Created);

        let owners = store.owners();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].email, "a@b.com");
        assert_eq!(owners[0].name, "Ada");
        assert_eq!(owners[0].phone, "");
        assert_ne!(owners[0].password, "hunter2!");
        assert!(bcrypt::verify("hunter2!", &owners[0].password).unwrap());
    }

    #[tokio::test]
    async fn test_create_account_rejects_duplicate_email() {
        let store = MemoryOwnerStore::with_owner(Owner {
            email: "a@b.com".to_string(),
            password: "$2b$10$already.hashed".to_string(),
            name: "Ada".to_string(),
            phone: String::new(),
        });
        let credentials = Credentials::validate(payload("a@b.com", "hunter2!", "Ada")).unwrap();

        let registration = create_account(store.as_ref(), &credentials).await.unwrap();

        assert_eq!(registration, Registration::DuplicateEmail);
        assert_eq!(store.inserts(), 0);
        assert_eq!(store.owners().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_insert_exactly_one_row() {
        let store = MemoryOwnerStore::new();
        let first = Credentials::validate(payload("a@b.com", "hunter2!", "Ada")).unwrap();
        let second = Credentials::validate(payload("a@b.com", "hunter2!", "Ada")).unwrap();

        let (left, right) = tokio::join!(
            create_account(store.as_ref(), &first),
            create_account(store.as_ref(), &second),
        );

        let mut outcomes = [left.unwrap(), right.unwrap()];
        outcomes.sort_by_key(|o| matches!(o, Registration::DuplicateEmail));

        assert_eq!(outcomes[0], Registration::Created);
        assert_eq!(outcomes[1], Registration::DuplicateEmail);
        assert_eq!(store.owners().len(), 1);
    }

    fn register_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/register")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_body(response: axum::response::Response) -> RegisterResult {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_register_handler_missing_field_is_opaque_and_skips_store() {
        let store = MemoryOwnerStore::new();
        let app = router(store.clone());

        let response = app
            .oneshot(register_request(json!({
                "email": "a@b.com",
                "password": "hunter2!",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body(response).await,
            RegisterResult::Error(INVALID_CREDENTIALS.to_string())
        );
        assert_eq!(store.lookups(), 0);
        assert_eq!(store.inserts(), 0);
    }

    #[tokio::test]
    async fn test_register_handler_malformed_email_is_opaque() {
        let store = MemoryOwnerStore::new();
        let app = router(store.clone());

        let response = app
            .oneshot(register_request(json!({
                "email": "not-an-email",
                "password": "hunter2!",
                "name": "Ada",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body(response).await,
            RegisterResult::Error(INVALID_CREDENTIALS.to_string())
        );
        assert_eq!(store.lookups(), 0);
    }

    #[tokio::test]
    async fn test_register_handler_creates_owner() {
        let store = MemoryOwnerStore::new();
        let app = router(store.clone());

        let response = app
            .oneshot(register_request(json!({
                "email": "a@b.com",
                "password": "hunter2!",
                "name": "Ada",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response_body(response).await,
            RegisterResult::Success(ACCOUNT_CREATED.to_string())
        );
        assert_eq!(store.owners().len(), 1);
    }

    #[tokio::test]
    async fn test_register_handler_conflict_on_existing_email() {
        let store = MemoryOwnerStore::with_owner(Owner {
            email: "a@b.com".to_string(),
            password: "$2b$10$already.hashed".to_string(),
            name: "Ada".to_string(),
            phone: String::new(),
        });
        let app = router(store.clone());

        let response = app
            .oneshot(register_request(json!({
                "email": "a@b.com",
                "password": "hunter2!",
                "name": "Ada",
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(
            response_body(response).await,
            RegisterResult::Error(USER_ALREADY_EXISTS.to_string())
        );
        assert_eq!(store.owners().len(), 1);
    }

    #[test]
    fn test_register_result_serializes_to_single_key() {
        let success =
            serde_json::to_value(RegisterResult::Success(ACCOUNT_CREATED.to_string())).unwrap();
        assert_eq!(success, json!({"success": ACCOUNT_CREATED}));

        let error =
            serde_json::to_value(RegisterResult::Error(USER_ALREADY_EXISTS.to_string())).unwrap();
        assert_eq!(error, json!({"error": USER_ALREADY_EXISTS}));
    }
}
