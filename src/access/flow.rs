//! Requester, verifier and issuance steps of the code exchange.
//!
//! Flow Overview: the submitter validates input locally and posts the request,
//! yielding a [`VerificationStep`] that carries the email and page forward. The
//! verifier exchanges `(email, code, page_route)` for a token, writes it to the
//! store and only then performs a hard navigation so the next gate evaluation
//! reads the fresh grant. Nothing is written when any step before the store
//! write fails. A failed reload after the write leaves the grant in place and
//! is reported through [`TemporaryAccessToken::reloaded`].

use crate::access::{
    claims::{TemporaryAccessClaims, decode_claims},
    client::{AccessBackend, AccessClient},
    error::AccessError,
    store::{SESSION_TOKEN_KEY, TEMP_ACCESS_TOKEN_KEY, TokenStore},
    types::{AccessCode, AccessRequest, VerifyCodeRequest},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use std::sync::OnceLock;
use tracing::{debug, info, instrument, warn};

/// Full reload of a route, as opposed to an in-memory route transition.
pub trait Navigator {
    /// # Errors
    /// Returns an error if the navigation cannot be performed.
    fn hard_navigate(&self, page_route: &str) -> Result<(), AccessError>;
}

#[must_use]
pub fn valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

fn validate_email(email: &str) -> Result<(), AccessError> {
    if email.is_empty() {
        return Err(AccessError::Validation("Email is required.".to_string()));
    }
    if !valid_email(email) {
        return Err(AccessError::Validation(
            "Enter a valid email address.".to_string(),
        ));
    }
    Ok(())
}

fn validate_page_route(page_route: &str) -> Result<(), AccessError> {
    if page_route.trim().is_empty() {
        return Err(AccessError::Validation(
            "Page route is required.".to_string(),
        ));
    }
    Ok(())
}

/// Context carried from a successful request into code verification. The
/// email and page are fixed here and cannot be edited by the verifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationStep {
    email: String,
    page_route: String,
}

impl VerificationStep {
    /// Rebuild a step for a request submitted earlier, for example by another
    /// process. Inputs are validated the same way [`AccessRequestSubmitter::submit`]
    /// validates them.
    ///
    /// # Errors
    /// Returns a validation error when the email or page is unusable.
    pub fn resume(email: &str, page_route: &str) -> Result<Self, AccessError> {
        let email = email.trim();
        validate_email(email)?;
        validate_page_route(page_route)?;
        Ok(Self {
            email: email.to_string(),
            page_route: page_route.to_string(),
        })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn page_route(&self) -> &str {
        &self.page_route
    }
}

/// A grant returned by the backend and already persisted.
#[derive(Debug)]
pub struct TemporaryAccessToken {
    raw: SecretString,
    claims: Option<TemporaryAccessClaims>,
    reloaded: bool,
}

impl TemporaryAccessToken {
    #[must_use]
    pub fn raw(&self) -> &SecretString {
        &self.raw
    }

    /// Decoded claims, if the token is readable by the client.
    #[must_use]
    pub const fn claims(&self) -> Option<&TemporaryAccessClaims> {
        self.claims.as_ref()
    }

    /// `false` when the grant was stored but the page reload failed; the grant
    /// is still usable on the next navigation.
    #[must_use]
    pub const fn reloaded(&self) -> bool {
        self.reloaded
    }
}

pub struct AccessRequestSubmitter<'a, B = AccessClient> {
    client: &'a B,
}

impl<'a, B: AccessBackend> AccessRequestSubmitter<'a, B> {
    #[must_use]
    pub const fn new(client: &'a B) -> Self {
        Self { client }
    }

    /// # Errors
    /// Returns a validation error without touching the network when the email
    /// or page is unusable, otherwise any error reported by the backend.
    #[instrument(skip(self, email))]
    pub async fn submit(
        &self,
        email: &str,
        page_route: &str,
    ) -> Result<VerificationStep, AccessError> {
        let step = VerificationStep::resume(email, page_route)?;

        let request = AccessRequest {
            email: step.email.clone(),
            page_route: step.page_route.clone(),
        };
        self.client.submit_request(&request).await?;

        info!("access requested");
        Ok(step)
    }
}

pub struct CodeVerifier<'a, S, N, B = AccessClient> {
    client: &'a B,
    store: S,
    navigator: N,
}

impl<'a, S: TokenStore, N: Navigator, B: AccessBackend> CodeVerifier<'a, S, N, B> {
    pub const fn new(client: &'a B, store: S, navigator: N) -> Self {
        Self {
            client,
            store,
            navigator,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Verify a code for a step produced by [`AccessRequestSubmitter::submit`].
    ///
    /// # Errors
    /// See [`CodeVerifier::verify`].
    pub async fn verify_step(
        &self,
        step: &VerificationStep,
        code: &str,
    ) -> Result<TemporaryAccessToken, AccessError> {
        self.verify(&step.email, code, &step.page_route).await
    }

    /// Exchange a code, persist the returned token, then reload `page_route`.
    ///
    /// The code is sent exactly as given; only emptiness is checked here.
    ///
    /// # Errors
    /// Returns a validation error for empty input, the backend detail for a
    /// rejected code, [`AccessError::MalformedGrant`] when no token came back,
    /// or a store error. The store is untouched on every failure. A failed
    /// reload is not an error once the grant is stored; see
    /// [`TemporaryAccessToken::reloaded`].
    #[instrument(skip(self, email, code))]
    pub async fn verify(
        &self,
        email: &str,
        code: &str,
        page_route: &str,
    ) -> Result<TemporaryAccessToken, AccessError> {
        let email = email.trim();
        validate_email(email)?;
        validate_page_route(page_route)?;
        if code.is_empty() {
            return Err(AccessError::Validation("Code is required.".to_string()));
        }

        let request = VerifyCodeRequest {
            email: email.to_string(),
            code: code.to_string(),
            page_route: page_route.to_string(),
        };
        let raw = self.client.exchange_code(&request).await?;

        let claims = match decode_claims::<TemporaryAccessClaims>(raw.expose_secret()) {
            Ok(claims) => Some(claims),
            Err(err) => {
                warn!("issued token is not readable by the client: {}", err);
                None
            }
        };

        self.store.set(TEMP_ACCESS_TOKEN_KEY, raw.expose_secret())?;
        debug!("grant persisted");

        let reloaded = match self.navigator.hard_navigate(page_route) {
            Ok(()) => true,
            Err(err) => {
                warn!("grant stored but reload failed: {}", err);
                false
            }
        };

        Ok(TemporaryAccessToken {
            raw,
            claims,
            reloaded,
        })
    }
}

/// Operator view of pending requests and their codes.
pub struct CodeIssuancePanel<'a, S, B = AccessClient> {
    client: &'a B,
    store: S,
    entries: Vec<AccessCode>,
}

impl<'a, S: TokenStore, B: AccessBackend> CodeIssuancePanel<'a, S, B> {
    /// `store` supplies the operator's session token, if any.
    pub const fn new(client: &'a B, store: S) -> Self {
        Self {
            client,
            store,
            entries: Vec::new(),
        }
    }

    /// Fetch the current pending codes without changing the snapshot.
    ///
    /// # Errors
    /// Returns any error reported by the backend.
    pub async fn list(&self) -> Result<Vec<AccessCode>, AccessError> {
        let session = match self.store.get(SESSION_TOKEN_KEY) {
            Ok(token) => token.map(SecretString::from),
            Err(err) => {
                warn!("failed to read session slot: {}", err);
                None
            }
        };
        self.client.pending_codes(session.as_ref()).await
    }

    /// Replace the snapshot with the backend's current list. The previous
    /// snapshot is kept when the fetch fails.
    ///
    /// # Errors
    /// Returns any error reported by the backend.
    pub async fn refresh(&mut self) -> Result<&[AccessCode], AccessError> {
        self.entries = self.list().await?;
        Ok(&self.entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[AccessCode] {
        &self.entries
    }

    /// Plaintext code for relaying out of band.
    #[must_use]
    pub fn code_for(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.id_text() == id)
            .map(|entry| entry.code.as_str())
    }
}
