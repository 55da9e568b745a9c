use crate::cli::actions::{Action, check, clear, pending, request, session, verify};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Request(args) => request::execute(args).await,
        Action::Verify(args) => verify::execute(args).await,
        Action::Pending(args) => pending::execute(args).await,
        Action::Check(args) => check::execute(&args),
        Action::Session(args) => session::execute(&args),
        Action::Clear(globals) => clear::execute(&globals),
    }
}
