//! Command implementations

pub mod create;
pub mod inspect;
pub mod list;
pub mod prune;
pub mod restore;
pub mod status;

use anyhow::{Context, Result};
use camino::Utf8Path;
use dialoguer::Password;
use ocbak_backup::MIN_PASSPHRASE_LEN;
use ocbak_core::BackupConfig;
use zeroize::Zeroizing;

/// Default environment variable consulted for the passphrase.
pub const PASSPHRASE_ENV: &str = "OCBAK_PASSPHRASE";

/// Loads the configuration from `--config` or the search path.
pub fn load_config(path: Option<&Utf8Path>) -> Result<BackupConfig> {
    BackupConfig::load(path).context("Failed to load configuration")
}

/// Reads the passphrase from `env_var` or prompts for it.
///
/// New passphrases (`confirm`) are prompted twice and must meet the
/// minimum length.
pub fn read_passphrase(env_var: &str, confirm: bool) -> Result<Zeroizing<String>> {
    let passphrase = match std::env::var(env_var) {
        Ok(value) if !value.is_empty() => Zeroizing::new(value),
        _ => {
            let mut prompt = Password::new().with_prompt("Passphrase");
            if confirm {
                prompt = prompt.with_confirmation("Confirm passphrase", "Passphrases do not match");
            }
            Zeroizing::new(prompt.interact().context("Failed to read passphrase")?)
        }
    };

    if confirm {
        check_new_passphrase(&passphrase)?;
    }
    Ok(passphrase)
}

/// Enforces the minimum length for passphrases that protect new archives.
pub fn check_new_passphrase(passphrase: &str) -> Result<()> {
    let len = passphrase.chars().count();
    if len < MIN_PASSPHRASE_LEN {
        anyhow::bail!(
            "Passphrase must be at least {} characters (got {})",
            MIN_PASSPHRASE_LEN,
            len
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_check_new_passphrase() {
        assert!(check_new_passphrase("short").is_err());
        assert!(check_new_passphrase("1234567").is_err());
        assert!(check_new_passphrase("12345678").is_ok());
        // counted in characters, not bytes
        assert!(check_new_passphrase("ééééééé").is_err());
    }

    #[test]
    #[serial]
    fn test_read_passphrase_from_env() {
        let var = "OCBAK_TEST_PASSPHRASE";
        std::env::set_var(var, "long enough secret");
        let passphrase = read_passphrase(var, true).unwrap();
        assert_eq!(passphrase.as_str(), "long enough secret");

        std::env::set_var(var, "short");
        assert!(read_passphrase(var, true).is_err());
        // existing archives may have been created with any passphrase
        assert_eq!(read_passphrase(var, false).unwrap().as_str(), "short");
        std::env::remove_var(var);
    }
}
