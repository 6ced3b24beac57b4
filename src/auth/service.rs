//! Auth service
//!
//! Login issues one token per account and binds it to the calling
//! device; any previous session for the account stops validating the
//! moment the new one is written. Logout only ever touches the calling
//! device.

use chrono::Utc;
use regex::Regex;
use uuid::Uuid;

use crate::dao::{Account, AccountDao};
use crate::observability::Logger;
use crate::store::DocumentStore;

use super::crypto;
use super::errors::{AuthError, AuthResult};
use super::session::{Session, SessionCache};

/// Accepted phone number shape: digits only, 5 to 20 of them
const PHONE_SHAPE: &str = r"^\d{5,20}$";

/// Per-request client identity, extracted upstream from headers
#[derive(Debug, Clone)]
pub struct ClientContext {
    /// Device identifier from the `Access-UUID` header, if present
    pub device: Option<Uuid>,

    /// Remote address the request arrived from
    pub remote_ip: String,
}

impl ClientContext {
    pub fn new(device: Option<Uuid>, remote_ip: impl Into<String>) -> Self {
        Self {
            device,
            remote_ip: remote_ip.into(),
        }
    }
}

/// Login input
#[derive(Debug, Clone, serde::Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

/// Successful login payload
#[derive(Debug, Clone, serde::Serialize)]
pub struct LoginGrant {
    pub token: String,
}

/// Token issuance and single-device session enforcement
pub struct AuthService<S, C> {
    accounts: AccountDao<S>,
    cache: C,
    phone_shape: Regex,
}

impl<S: DocumentStore, C: SessionCache> AuthService<S, C> {
    pub fn new(accounts: AccountDao<S>, cache: C) -> Self {
        Self {
            accounts,
            cache,
            phone_shape: Regex::new(PHONE_SHAPE).expect("phone pattern is valid"),
        }
    }

    /// Authenticate and issue a token bound to the calling device.
    ///
    /// A missing device id fails before credentials are even looked at.
    /// On success the account's previous session is invalidated no
    /// matter which device held it.
    pub fn login(&self, request: &LoginRequest, client: &ClientContext) -> AuthResult<LoginGrant> {
        let device = client.device.ok_or(AuthError::UnknownDevice)?;
        self.validate_login_input(request)?;

        let account = self
            .accounts
            .get_by_phone(&request.phone)?
            .ok_or(AuthError::AccountNotFound)?;

        if !account.verify_password(&request.password) {
            return Err(AuthError::BadCredentials);
        }

        let token = self.sign_in(&account, device, &client.remote_ip)?;
        Ok(LoginGrant { token })
    }

    /// Invalidate the calling device's session, if any
    pub fn logout(&self, client: &ClientContext) -> AuthResult<()> {
        let device = client.device.ok_or(AuthError::UnknownDevice)?;

        let removed = self.cache.remove_by_device(device)?;
        Logger::info(
            "auth.logout",
            &[
                ("device", &device.to_string()),
                ("removed", if removed { "true" } else { "false" }),
            ],
        );
        Ok(())
    }

    /// Whether the token is the one currently bound to the device
    pub fn validate(&self, device: Uuid, token: &str) -> AuthResult<bool> {
        let session = match self.cache.get(device)? {
            Some(session) => session,
            None => return Ok(false),
        };

        if session.is_expired(Utc::now()) {
            return Ok(false);
        }

        Ok(crypto::constant_time_str_eq(&session.token, token))
    }

    fn validate_login_input(&self, request: &LoginRequest) -> AuthResult<()> {
        if request.phone.is_empty() {
            return Err(AuthError::InvalidInput("phone is required".to_string()));
        }
        if !self.phone_shape.is_match(&request.phone) {
            return Err(AuthError::InvalidInput("phone must be digits".to_string()));
        }
        if request.password.is_empty() {
            return Err(AuthError::InvalidInput("password is required".to_string()));
        }
        Ok(())
    }

    /// Invalidate the previous session, mint the token, write the new
    /// session. The two cache steps are not transactional; see the
    /// session module notes.
    fn sign_in(&self, account: &Account, device: Uuid, ip: &str) -> AuthResult<String> {
        self.cache.remove_by_phone(&account.phone)?;

        let now = Utc::now();
        let token = crypto::login_token(account.id, &account.phone, ip, now);

        self.cache.put(Session {
            phone: account.phone.clone(),
            device,
            token: token.clone(),
            login_ip: ip.to_string(),
            login_time: now,
            duration: 0,
        })?;

        Logger::info(
            "auth.login",
            &[("phone", account.phone.as_str()), ("device", &device.to_string())],
        );

        Ok(token)
    }
}
