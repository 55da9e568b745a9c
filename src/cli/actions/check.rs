use crate::{
    access::{AccessGate, GateDecision},
    cli::globals::GlobalArgs,
};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub page_route: String,
}

/// Evaluate the gate for one page and print the decision.
/// # Errors
/// Never fails; stale grants are cleaned up silently.
pub fn execute(args: &Args) -> Result<()> {
    let gate = AccessGate::new(args.globals.store());
    match gate.evaluate(&args.page_route) {
        GateDecision::Allow => println!("allow"),
        GateDecision::RequireRequest => println!("request-access"),
    }
    Ok(())
}
