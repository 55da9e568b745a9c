pub mod claims;
pub mod client;
pub mod error;
pub mod flow;
pub mod gate;
pub mod state;
pub mod store;
pub mod types;

#[cfg(test)]
mod testing;

pub use claims::{SessionClaims, TemporaryAccessClaims, decode_claims};
pub use client::{AccessBackend, AccessClient, ClientConfig};
pub use error::{AccessError, ClaimsError, StoreError};
pub use flow::{
    AccessRequestSubmitter, CodeIssuancePanel, CodeVerifier, Navigator, TemporaryAccessToken,
    VerificationStep,
};
pub use gate::{AccessGate, GateDecision, Guarded};
pub use state::{FlowEvent, FlowState};
pub use store::{
    FileTokenStore, MemoryTokenStore, SESSION_TOKEN_KEY, TEMP_ACCESS_TOKEN_KEY, TokenStore,
};
pub use types::{AccessCode, AccessRequest, VerifyCodeRequest};
