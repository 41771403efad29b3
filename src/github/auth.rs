use crate::error::{PrRecapError, Result};
use std::process::Command;

/// Pick the GitHub token to use.
///
/// An explicit token (flag or `GITHUB_TOKEN`) wins over the config file;
/// without either, the token of the logged-in `gh` CLI is used.
pub fn resolve_token(explicit: Option<&str>, configured: Option<&str>) -> Result<String> {
    let preferred = [explicit, configured]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|token| !token.is_empty());

    match preferred {
        Some(token) => Ok(token.to_string()),
        None => gh_auth_token(),
    }
}

/// Ask the `gh` CLI for its token
fn gh_auth_token() -> Result<String> {
    tracing::debug!("requesting GitHub token from `gh auth token`");

    let output = Command::new("gh").args(["auth", "token"]).output().map_err(|e| {
        PrRecapError::auth(format!(
            "failed to run gh CLI: {} (install it and log in with 'gh auth login')",
            e
        ))
    })?;

    if !output.status.success() {
        return Err(PrRecapError::auth(format!(
            "gh CLI exited with {}\nStderr: {}\nMake sure you're logged in with 'gh auth login'",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(PrRecapError::auth("empty token received from gh CLI"));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_token_wins() {
        let token = resolve_token(Some("ghp_flag"), Some("ghp_config")).unwrap();
        assert_eq!(token, "ghp_flag");
    }

    #[test]
    fn test_configured_token_used_when_no_explicit() {
        let token = resolve_token(None, Some(" ghp_config \n")).unwrap();
        assert_eq!(token, "ghp_config");
    }

    #[test]
    fn test_blank_explicit_token_is_ignored() {
        let token = resolve_token(Some("   "), Some("ghp_config")).unwrap();
        assert_eq!(token, "ghp_config");
    }
}
