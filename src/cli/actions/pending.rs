use crate::{access::CodeIssuancePanel, cli::globals::GlobalArgs};
use anyhow::{Result, anyhow};
use tracing::error;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub copy: Option<String>,
}

/// List pending requests, or print a single code for relaying.
/// # Errors
/// Returns the user-facing message when the list cannot be fetched, or an
/// error when `--copy` names an unknown request.
pub async fn execute(args: Args) -> Result<()> {
    let client = args.globals.client()?;
    let mut panel = CodeIssuancePanel::new(&client, args.globals.store());

    panel.refresh().await.map_err(|err| {
        error!("failed to load pending codes: {}", err);
        anyhow!(err.user_message())
    })?;

    if let Some(id) = args.copy.as_deref() {
        let code = panel
            .code_for(id)
            .ok_or_else(|| anyhow!("no pending request with id {id}"))?;
        println!("{code}");
        return Ok(());
    }

    if panel.entries().is_empty() {
        println!("No pending access requests.");
        return Ok(());
    }

    let id_width = panel
        .entries()
        .iter()
        .map(|entry| entry.id_text().len())
        .max()
        .unwrap_or(2)
        .max(2);
    let email_width = panel
        .entries()
        .iter()
        .map(|entry| entry.email.len())
        .max()
        .unwrap_or(5)
        .max(5);
    let page_width = panel
        .entries()
        .iter()
        .map(|entry| entry.page_route.len())
        .max()
        .unwrap_or(4)
        .max(4);

    println!("{:id_width$}  {:email_width$}  {:page_width$}  CODE", "ID", "EMAIL", "PAGE");
    for entry in panel.entries() {
        println!(
            "{:id_width$}  {:email_width$}  {:page_width$}  {}",
            entry.id_text(),
            entry.email,
            entry.page_route,
            entry.code
        );
    }

    Ok(())
}
