use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.leveropen.com/";
pub(crate) const DEFAULT_VERSION: &str = "v1";

/// Connection settings for a [`crate::Lever`] catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeverConfig {
    /// Personal access token, sent as the `token` query parameter.
    pub access_token: String,
    /// API root including the trailing slash, e.g. `https://api.leveropen.com/`.
    pub base_url: String,
    /// API version path segment, e.g. `v1`.
    pub version: String,
}

#[derive(Debug, Default)]
struct RcConfig {
    token: Option<String>,
    url: Option<String>,
    version: Option<String>,
}

/// Resolves settings from `LEVEROPEN_*` environment variables, then the
/// first rc file found, then the built-in defaults.
pub(crate) fn load_config() -> Result<LeverConfig> {
    let mut settings = RcConfig {
        token: env_value("LEVEROPEN_ACCESS_TOKEN"),
        url: env_value("LEVEROPEN_URL"),
        version: env_value("LEVEROPEN_VERSION"),
    };

    let rc_candidates = rc_candidates();

    if !settings.is_complete() {
        if let Some(rc_path) = rc_candidates.iter().find(|p| p.exists()) {
            let rc = read_rc(rc_path).with_context(|| {
                format!("failed to read configuration file {}", rc_path.display())
            })?;
            log::debug!("loaded settings from {}", rc_path.display());
            settings = settings.or(rc);
        }
    }

    settings.finish(&rc_candidates)
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_rc(&text))
}

fn parse_rc(text: &str) -> RcConfig {
    let mut cfg = RcConfig::default();

    // A key with an empty value takes its value from the next line.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let is_key_line = line
            .split_once(':')
            .is_some_and(|(k, _)| is_rc_key(k.trim()));

        if let Some(pk) = pending_key.take() {
            if !is_key_line {
                cfg.set(pk, strip_quotes(line));
                continue;
            }
        }

        if !is_key_line {
            continue;
        }
        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v);
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                cfg.set(k, v);
            }
        }
    }

    cfg
}

fn is_rc_key(k: &str) -> bool {
    matches!(k, "token" | "url" | "version")
}

impl RcConfig {
    fn is_complete(&self) -> bool {
        self.token.is_some() && self.url.is_some() && self.version.is_some()
    }

    /// Fills unset values from `fallback`; values already set win.
    fn or(self, fallback: RcConfig) -> RcConfig {
        RcConfig {
            token: self.token.or(fallback.token),
            url: self.url.or(fallback.url),
            version: self.version.or(fallback.version),
        }
    }

    /// Applies defaults; a missing token is an error naming where it was looked for.
    fn finish(self, rc_candidates: &[PathBuf]) -> Result<LeverConfig> {
        let Some(access_token) = self.token else {
            if rc_candidates.is_empty() {
                bail!(
                    "Missing configuration: token (set LEVEROPEN_ACCESS_TOKEN or create .leveropenrc)"
                );
            }
            bail!(
                "Missing configuration: token (set LEVEROPEN_ACCESS_TOKEN or put `token:` in one of: {})",
                rc_candidates
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        };

        Ok(LeverConfig {
            access_token,
            base_url: self.url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            version: self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        })
    }

    fn set(&mut self, key: &str, value: &str) {
        let value = Some(value.to_string());
        match key {
            "token" => self.token = value,
            "url" => self.url = value,
            "version" => self.version = value,
            _ => {}
        }
    }
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) LEVEROPEN_RC (explicit)
    // 2) ./.leveropenrc
    // 3) ~/.leveropenrc
    if let Ok(p) = std::env::var("LEVEROPEN_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".leveropenrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".leveropenrc"));
    }
    v
}
