use crate::cli::{
    actions::{Action, check, pending, request, session, verify},
    globals::GlobalArgs,
};
use anyhow::{Context, Result, anyhow};
use std::time::Duration;

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let store = matches
        .get_one::<String>("store")
        .context("missing required argument: --store")?;
    let mut globals = GlobalArgs::new(store);

    if let Some(api_url) = matches.get_one::<String>("api-url") {
        globals.set_api_url(api_url)?;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        globals.timeout = Duration::from_secs(*timeout);
    }

    Ok(globals)
}

fn required(matches: &clap::ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .ok_or_else(|| anyhow!("missing subcommand"))?;

    // Global args are read from the subcommand so they may appear on either side.
    let globals = globals(sub_m)?;

    let action = match name {
        "request" => Action::Request(request::Args {
            globals,
            email: required(sub_m, "email")?,
            page_route: required(sub_m, "page")?,
        }),
        "verify" => Action::Verify(verify::Args {
            globals,
            email: required(sub_m, "email")?,
            page_route: required(sub_m, "page")?,
            code: required(sub_m, "code")?,
        }),
        "pending" => Action::Pending(pending::Args {
            globals,
            copy: sub_m.get_one::<String>("copy").cloned(),
        }),
        "check" => Action::Check(check::Args {
            globals,
            page_route: required(sub_m, "page")?,
        }),
        "session" => Action::Session(session::Args {
            globals,
            token: sub_m.get_one::<String>("token").cloned(),
            clear: sub_m.get_flag("clear"),
        }),
        "clear" => Action::Clear(globals),
        other => return Err(anyhow!("unknown subcommand: {other}")),
    };

    Ok(action)
}
