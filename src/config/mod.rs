use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level xdial config file structure.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct XdialConfig {
    pub base_url: Option<String>,
    pub auth: Option<AuthConfig>,
}

/// Credentials block from config.toml.
#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_command: Option<String>,
}

impl XdialConfig {
    /// Load config from ~/.xdial/config.toml. Returns default if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(XdialConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: XdialConfig =
            toml::from_str(&content).with_context(|| "Failed to parse config.toml")?;
        Ok(config)
    }

    /// Display config with secrets redacted.
    pub fn display_redacted(&self) -> String {
        let mut lines = Vec::new();
        if let Some(ref url) = self.base_url {
            lines.push(format!("base_url = \"{}\"", url));
        }
        if let Some(ref auth) = self.auth {
            lines.push("[auth]".to_string());
            if let Some(ref user) = auth.username {
                lines.push(format!("  username = \"{}\"", user));
            }
            if let Some(ref pass) = auth.password {
                lines.push(format!("  password = \"{}\"", redact(pass)));
            }
            if let Some(ref cmd) = auth.password_command {
                lines.push(format!("  password_command = \"{}\"", cmd));
            }
        }
        if lines.is_empty() {
            lines.push("(empty config)".to_string());
        }
        lines.join("\n")
    }
}

/// Keep the first and last two characters of a long secret. Works on char
/// boundaries, so multibyte passwords redact instead of panicking.
fn redact(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() > 8 {
        format!(
            "{}{}...{}{}",
            chars[0],
            chars[1],
            chars[chars.len() - 2],
            chars[chars.len() - 1]
        )
    } else {
        "****".to_string()
    }
}

/// Resolve the login password through the chain: CLI flag > env var >
/// config password > config command.
pub fn resolve_password(cli_flag: Option<&str>, config: Option<&AuthConfig>) -> Result<String> {
    // 1. CLI flag
    if let Some(pass) = cli_flag {
        if !pass.is_empty() {
            return Ok(pass.to_string());
        }
    }

    // 2. Environment variable
    if let Ok(val) = std::env::var("XDIAL_PASSWORD") {
        if !val.is_empty() {
            return Ok(val);
        }
    }

    if let Some(auth) = config {
        // 3. Config file password
        if let Some(ref pass) = auth.password {
            if !pass.is_empty() {
                return Ok(pass.clone());
            }
        }

        // 4. External command
        if let Some(ref cmd) = auth.password_command {
            if !cmd.is_empty() {
                let output = std::process::Command::new("sh")
                    .arg("-c")
                    .arg(cmd)
                    .output()
                    .with_context(|| format!("Failed to run password_command: {cmd}"))?;

                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    bail!(
                        "password_command failed (exit {}): {}",
                        output.status.code().unwrap_or(-1),
                        stderr.trim()
                    );
                }

                let secret = String::from_utf8(output.stdout)
                    .context("password_command output is not valid UTF-8")?
                    .trim()
                    .to_string();

                if !secret.is_empty() {
                    return Ok(secret);
                }
            }
        }
    }

    bail!("No password found. Provide via --password, XDIAL_PASSWORD env var, or ~/.xdial/config.toml");
}

/// Path to the config file: ~/.xdial/config.toml
pub fn config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".xdial").join("config.toml"))
}

/// Default config template content.
pub fn default_config_template() -> &'static str {
    r#"# ~/.xdial/config.toml
# Password resolution order: CLI flag > XDIAL_PASSWORD > password > password_command

# base_url = "https://api.xlitecore.xdialnetworks.com/api/v1"

[auth]
# username = "your-username"
# password = "your-password"
# password_command = "your-secrets-manager-command-here"
"#
}

/// Create the default config file if it doesn't already exist.
pub fn init_config() -> Result<bool> {
    let path = config_path()?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, default_config_template())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: XdialConfig = toml::from_str(
            r#"
            base_url = "https://example.test/api/v1"

            [auth]
            username = "agent"
            password = "hunter2hunter2"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://example.test/api/v1"));
        let auth = config.auth.unwrap();
        assert_eq!(auth.username.as_deref(), Some("agent"));
    }

    #[test]
    fn cli_flag_wins_the_chain() {
        let auth = AuthConfig {
            username: None,
            password: Some("from-config".into()),
            password_command: None,
        };
        let resolved = resolve_password(Some("from-flag"), Some(&auth)).unwrap();
        assert_eq!(resolved, "from-flag");
    }

    #[test]
    fn config_password_used_when_no_flag() {
        let auth = AuthConfig {
            username: None,
            password: Some("from-config".into()),
            password_command: None,
        };
        let resolved = resolve_password(None, Some(&auth)).unwrap();
        assert_eq!(resolved, "from-config");
    }

    #[test]
    fn redaction_handles_multibyte_passwords() {
        // 3-byte chars used to trip the byte-index slice.
        assert_eq!(redact("€€€€"), "****");
        assert_eq!(redact("€€€€€€€€€€"), "€€...€€");
        assert_eq!(redact("hunter2hunter2"), "hu...r2");

        let config = XdialConfig {
            base_url: None,
            auth: Some(AuthConfig {
                username: None,
                password: Some("€€€€".into()),
                password_command: None,
            }),
        };
        assert!(config.display_redacted().contains("****"));
    }

    #[test]
    fn redacted_display_hides_password() {
        let config = XdialConfig {
            base_url: None,
            auth: Some(AuthConfig {
                username: Some("agent".into()),
                password: Some("hunter2hunter2".into()),
                password_command: None,
            }),
        };
        let shown = config.display_redacted();
        assert!(!shown.contains("hunter2hunter2"));
        assert!(shown.contains("agent"));
    }
}
