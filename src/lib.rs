//! # pagegate
//!
//! Out-of-band access grants for protected pages.
//!
//! Some routes are normally restricted. A visitor can ask for temporary access,
//! an administrator relays a one-time code through a side channel, and the
//! visitor exchanges that code for a short-lived signed token scoped to exactly
//! one page. The [`access::AccessGate`] decides on every navigation whether the
//! page may be shown or the request flow must be shown instead.
//!
//! ## Flow
//!
//! 1. **Request:** [`access::AccessRequestSubmitter`] posts `{email, page_route}`
//!    to `/access-requests` and hands back a [`access::VerificationStep`].
//! 2. **Issue:** the backend creates a code; [`access::CodeIssuancePanel`] lists
//!    pending codes so an operator can relay them.
//! 3. **Verify:** [`access::CodeVerifier`] posts `{email, code, page_route}` to
//!    `/access-verify`, persists the returned token in the
//!    [`access::TokenStore`] and only then performs a hard navigation.
//! 4. **Gate:** [`access::AccessGate`] grants the page to administrators, or to
//!    holders of an unexpired token whose `page_route` matches exactly.
//!
//! Stale tokens (undecodable, scoped to another page, or expired) are removed
//! lazily when the gate reads them. There is no background timer.

pub mod access;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
