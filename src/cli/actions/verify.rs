use crate::{
    access::{
        AccessError, AccessGate, CodeVerifier, FlowEvent, FlowState, GateDecision, Navigator,
        VerificationStep,
    },
    cli::globals::GlobalArgs,
};
use anyhow::{Result, anyhow};
use tracing::{debug, error, info};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub page_route: String,
    pub code: String,
}

/// Reloads a page by evaluating a brand new gate over a fresh store handle,
/// the way a full page load re-reads persisted storage.
struct ReloadNavigator<'a> {
    globals: &'a GlobalArgs,
}

impl Navigator for ReloadNavigator<'_> {
    fn hard_navigate(&self, page_route: &str) -> Result<(), AccessError> {
        let gate = AccessGate::new(self.globals.store());
        match gate.evaluate(page_route) {
            GateDecision::Allow => {
                info!(page_route, "reloaded with grant");
                println!("Access granted: {page_route}");
            }
            GateDecision::RequireRequest => {
                println!("Access to {page_route} still requires a request.");
            }
        }
        Ok(())
    }
}

/// Exchange a code for a page grant, persist it and reload the page.
/// # Errors
/// Returns the user-facing message when validation, the exchange, or the
/// store write fails.
pub async fn execute(args: Args) -> Result<()> {
    let step = VerificationStep::resume(&args.email, &args.page_route)
        .map_err(|err| anyhow!(err.user_message()))?;

    let client = args.globals.client()?;
    let navigator = ReloadNavigator {
        globals: &args.globals,
    };
    let verifier = CodeVerifier::new(&client, args.globals.store(), navigator);

    let state = FlowState::RequestPending(step.clone()).transition(FlowEvent::CodeSubmitted)?;
    let token = match verifier.verify_step(&step, &args.code).await {
        Ok(token) => token,
        Err(err) => {
            let state = state.transition(FlowEvent::CodeRejected)?;
            error!(state = state.name(), "verification failed: {}", err);
            return Err(anyhow!(err.user_message()));
        }
    };
    let state = state.transition(FlowEvent::CodeAccepted)?;
    debug!(state = state.name(), "code accepted");

    if !token.reloaded() {
        println!("Access granted: {}. Reload the page to continue.", step.page_route());
    }
    if let Some(claims) = token.claims() {
        println!("Grant for {} expires at {} (unix).", claims.page_route, claims.exp);
    }

    Ok(())
}
