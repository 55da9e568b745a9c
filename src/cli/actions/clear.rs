use crate::{
    access::{TEMP_ACCESS_TOKEN_KEY, TokenStore},
    cli::globals::GlobalArgs,
};
use anyhow::{Context, Result};

/// Drop the temporary page grant.
/// # Errors
/// Returns an error if the store cannot be written.
pub fn execute(globals: &GlobalArgs) -> Result<()> {
    globals
        .store()
        .remove(TEMP_ACCESS_TOKEN_KEY)
        .context("failed to clear page grant")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::SESSION_TOKEN_KEY;
    use std::{env, fs};
    use uuid::Uuid;

    #[test]
    fn test_clear_keeps_session() -> Result<()> {
        let dir = env::temp_dir().join(format!("pagegate-clear-{}", Uuid::new_v4()));
        let globals = GlobalArgs::new(dir.join("origin.json"));
        let store = globals.store();
        store.set(SESSION_TOKEN_KEY, "session")?;
        store.set(TEMP_ACCESS_TOKEN_KEY, "grant")?;

        execute(&globals)?;
        execute(&globals)?;

        assert_eq!(store.get(TEMP_ACCESS_TOKEN_KEY)?, None);
        assert_eq!(store.get(SESSION_TOKEN_KEY)?.as_deref(), Some("session"));

        fs::remove_dir_all(dir)?;
        Ok(())
    }
}
