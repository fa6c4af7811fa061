use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the server home directory into an absolute path.
///
/// - `None` → platform default: `%APPDATA%/<subdir>` on Windows, `$HOME/<subdir>` elsewhere.
/// - A leading `~` is expanded to the user's home directory.
/// - Relative paths are anchored at the current working directory.
pub fn resolve_home_dir(raw: Option<String>, default_subdir: &str, create: bool) -> Result<PathBuf> {
    let path = match raw {
        Some(p) => expand_tilde(p.trim())?,
        None => platform_base()?.join(default_subdir),
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .context("current directory is not accessible")?
            .join(path)
    };

    if create {
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create home dir {}", path.display()))?;
    }
    Ok(path)
}

fn expand_tilde(p: &str) -> Result<PathBuf> {
    if p == "~" {
        return user_home();
    }
    if let Some(rest) = p.strip_prefix("~/").or_else(|| p.strip_prefix("~\\")) {
        return Ok(user_home()?.join(rest));
    }
    Ok(Path::new(p).to_path_buf())
}

fn user_home() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow!("unable to determine user home directory"))
}

#[cfg(target_os = "windows")]
fn platform_base() -> Result<PathBuf> {
    dirs::config_dir().ok_or_else(|| anyhow!("unable to determine %APPDATA%"))
}

#[cfg(not(target_os = "windows"))]
fn platform_base() -> Result<PathBuf> {
    user_home()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn absolute_path_is_kept_and_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("a/b");
        let out = resolve_home_dir(Some(target.to_string_lossy().to_string()), ".x", true).unwrap();
        assert_eq!(out, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_is_expanded() {
        let out = resolve_home_dir(Some("~/.sos-test-home".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with(".sos-test-home"));
    }

    #[test]
    fn relative_path_is_anchored_at_cwd() {
        let out = resolve_home_dir(Some("relative/home".into()), ".x", false).unwrap();
        assert!(out.is_absolute());
        assert!(out.ends_with("relative/home"));
    }
}
