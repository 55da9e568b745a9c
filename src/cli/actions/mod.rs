pub mod check;
pub mod clear;
pub mod pending;
pub mod request;
pub mod session;
pub mod verify;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Request(request::Args),
    Verify(verify::Args),
    Pending(pending::Args),
    Check(check::Args),
    Session(session::Args),
    Clear(GlobalArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
