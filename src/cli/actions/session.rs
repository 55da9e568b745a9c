use crate::{
    access::{SESSION_TOKEN_KEY, TokenStore},
    cli::globals::GlobalArgs,
};
use anyhow::{Context, Result};
use tracing::info;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub token: Option<String>,
    pub clear: bool,
}

/// Store or remove the long-lived login token.
/// # Errors
/// Returns an error if the store cannot be written.
pub fn execute(args: &Args) -> Result<()> {
    let store = args.globals.store();

    if args.clear {
        store
            .remove(SESSION_TOKEN_KEY)
            .context("failed to clear login token")?;
        info!("login token cleared");
        return Ok(());
    }

    if let Some(token) = args.token.as_deref() {
        store
            .set(SESSION_TOKEN_KEY, token.trim())
            .context("failed to store login token")?;
        info!("login token stored");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};
    use uuid::Uuid;

    #[test]
    fn test_store_and_clear_session() -> Result<()> {
        let dir = env::temp_dir().join(format!("pagegate-session-{}", Uuid::new_v4()));
        let globals = GlobalArgs::new(dir.join("origin.json"));

        execute(&Args {
            globals: globals.clone(),
            token: Some(" header.payload.sig \n".to_string()),
            clear: false,
        })?;
        assert_eq!(
            globals.store().get(SESSION_TOKEN_KEY)?.as_deref(),
            Some("header.payload.sig")
        );

        execute(&Args {
            globals: globals.clone(),
            token: None,
            clear: true,
        })?;
        assert_eq!(globals.store().get(SESSION_TOKEN_KEY)?, None);

        fs::remove_dir_all(dir)?;
        Ok(())
    }
}
