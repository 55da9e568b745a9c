use crate::{
    access::{AccessRequestSubmitter, FlowEvent, FlowState},
    cli::globals::GlobalArgs,
};
use anyhow::{Result, anyhow};
use tracing::{debug, error};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub page_route: String,
}

/// Submit an access request and print the pre-filled verification command.
/// # Errors
/// Returns the user-facing message when validation or the request fails.
pub async fn execute(args: Args) -> Result<()> {
    let client = args.globals.client()?;

    let step = AccessRequestSubmitter::new(&client)
        .submit(&args.email, &args.page_route)
        .await
        .map_err(|err| {
            error!("access request failed: {}", err);
            anyhow!(err.user_message())
        })?;

    let state = FlowState::Unauthenticated.transition(FlowEvent::RequestAccepted(step.clone()))?;
    debug!(state = state.name(), "request accepted");

    println!(
        "Access requested for {} on {}.",
        step.email(),
        step.page_route()
    );
    println!("Once an administrator relays your code, run:");
    println!(
        "  pagegate verify --email '{}' --page '{}' --code <CODE>",
        step.email(),
        step.page_route()
    );

    Ok(())
}
