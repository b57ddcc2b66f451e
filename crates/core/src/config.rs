use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::colour::Palette;
use crate::error::{Result, TraceWebError};
use crate::humanize::DEFAULT_STALE_AFTER_MINUTES;
use crate::time::parse_duration_str;
use crate::view::{ABSENT_SERVICE, RenderConfig};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub listen_addr: String,
    pub backend_url: String,
    pub backend_timeout: Duration,
    pub base_path: String,
    pub search_limit: usize,
    pub palette: Palette,
    pub stale_after: Duration,
    pub absent_service: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8082".to_string(),
            backend_url: "http://127.0.0.1:8081/trace".to_string(),
            backend_timeout: Duration::from_secs(5),
            base_path: "/".to_string(),
            search_limit: 100,
            palette: Palette::default(),
            stale_after: Duration::from_secs((DEFAULT_STALE_AFTER_MINUTES as u64) * 60),
            absent_service: ABSENT_SERVICE.to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut cfg = Self::default();
        let config_path = config_file_path();
        if let Some(file_overrides) = load_file_overrides(&config_path)? {
            apply_overrides(&mut cfg, file_overrides, "config file")?;
        }
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        let env_overrides = load_env_overrides()?;
        apply_overrides(&mut cfg, env_overrides, "environment")?;
        Ok(cfg)
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            palette: self.palette.clone(),
            stale_after_minutes: self.stale_after.as_secs_f64() / 60.0,
            absent_service: self.absent_service.clone(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigOverrides {
    listen_addr: Option<String>,
    backend_url: Option<String>,
    backend_timeout: Option<String>,
    base_path: Option<String>,
    search_limit: Option<usize>,
    palette: Option<String>,
    stale_after: Option<String>,
    absent_service: Option<String>,
}

fn config_file_path() -> PathBuf {
    if let Ok(path) = env::var("TRACEWEB_CONFIG") {
        return PathBuf::from(path);
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let config_home = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(home).join(".config"));
    config_home.join("traceweb/config.toml")
}

fn load_file_overrides(path: &Path) -> Result<Option<ConfigOverrides>> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| TraceWebError::Config(format!("failed reading {}: {e}", path.display())))?;
    let parsed: ConfigOverrides = toml::from_str(&raw)
        .map_err(|e| TraceWebError::Config(format!("failed parsing {}: {e}", path.display())))?;
    Ok(Some(parsed))
}

fn load_env_overrides() -> Result<ConfigOverrides> {
    let search_limit = match env::var("TRACEWEB_SEARCH_LIMIT") {
        Ok(v) => Some(v.parse::<usize>().map_err(|e| {
            TraceWebError::Config(format!("bad TRACEWEB_SEARCH_LIMIT in environment: {e}"))
        })?),
        Err(_) => None,
    };

    Ok(ConfigOverrides {
        listen_addr: env::var("TRACEWEB_LISTEN_ADDR").ok(),
        backend_url: env::var("TRACEWEB_BACKEND_URL").ok(),
        backend_timeout: env::var("TRACEWEB_BACKEND_TIMEOUT").ok(),
        base_path: env::var("TRACEWEB_BASE_PATH").ok(),
        search_limit,
        palette: env::var("TRACEWEB_PALETTE").ok(),
        stale_after: env::var("TRACEWEB_STALE_AFTER").ok(),
        absent_service: env::var("TRACEWEB_ABSENT_SERVICE").ok(),
    })
}

fn apply_overrides(cfg: &mut Config, overrides: ConfigOverrides, source: &str) -> Result<()> {
    if let Some(v) = overrides.listen_addr {
        cfg.listen_addr = v;
    }
    if let Some(v) = overrides.backend_url {
        cfg.backend_url = v.trim_end_matches('/').to_string();
    }
    if let Some(v) = overrides.backend_timeout {
        cfg.backend_timeout = parse_duration_str(&v)
            .map_err(|e| TraceWebError::Config(format!("bad backend_timeout in {source}: {e}")))?;
    }
    if let Some(v) = overrides.base_path {
        cfg.base_path = normalize_base_path(&v);
    }
    if let Some(v) = overrides.search_limit {
        if v == 0 {
            return Err(TraceWebError::Config(format!(
                "search_limit in {source} must be positive"
            )));
        }
        cfg.search_limit = v;
    }
    if let Some(v) = overrides.palette {
        cfg.palette = Palette::parse(&v).map_err(|e| {
            TraceWebError::Config(format!("bad palette in {source}: {e} (value={v})"))
        })?;
    }
    if let Some(v) = overrides.stale_after {
        cfg.stale_after = parse_duration_str(&v)
            .map_err(|e| TraceWebError::Config(format!("bad stale_after in {source}: {e}")))?;
    }
    if let Some(v) = overrides.absent_service {
        cfg.absent_service = v;
    }
    Ok(())
}

/// Base paths always start and end with `/`.
pub fn normalize_base_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}/")
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn default_render_config_matches_constants() {
        let rc = Config::default().render_config();
        assert_eq!(rc.stale_after_minutes, DEFAULT_STALE_AFTER_MINUTES);
        assert_eq!(rc.absent_service, "n/a");
        assert_eq!(rc.palette, Palette::default());
    }

    #[test]
    fn normalizes_base_paths() {
        assert_eq!(normalize_base_path(""), "/");
        assert_eq!(normalize_base_path("/"), "/");
        assert_eq!(normalize_base_path("trace"), "/trace/");
        assert_eq!(normalize_base_path("/debug/trace/"), "/debug/trace/");
    }

    #[test]
    fn apply_overrides_updates_fields() {
        let mut cfg = Config::default();
        let overrides = ConfigOverrides {
            backend_url: Some("http://trace-srv:9000/trace/".to_string()),
            backend_timeout: Some("250ms".to_string()),
            base_path: Some("debug".to_string()),
            palette: Some("red,green,blue,black".to_string()),
            stale_after: Some("1day".to_string()),
            ..ConfigOverrides::default()
        };

        apply_overrides(&mut cfg, overrides, "config file").unwrap();

        assert_eq!(cfg.backend_url, "http://trace-srv:9000/trace");
        assert_eq!(cfg.backend_timeout, Duration::from_millis(250));
        assert_eq!(cfg.base_path, "/debug/");
        assert_eq!(cfg.palette.entries().len(), 4);
        assert_eq!(cfg.render_config().stale_after_minutes, 1440.0);
    }

    #[test]
    fn apply_overrides_rejects_bad_values() {
        let mut cfg = Config::default();
        let bad_palette = ConfigOverrides {
            palette: Some("red".to_string()),
            ..ConfigOverrides::default()
        };
        assert!(apply_overrides(&mut cfg, bad_palette, "environment").is_err());

        let bad_limit = ConfigOverrides {
            search_limit: Some(0),
            ..ConfigOverrides::default()
        };
        assert!(apply_overrides(&mut cfg, bad_limit, "environment").is_err());

        let bad_timeout = ConfigOverrides {
            backend_timeout: Some("soon".to_string()),
            ..ConfigOverrides::default()
        };
        let err = apply_overrides(&mut cfg, bad_timeout, "environment").unwrap_err();
        assert!(matches!(&err, TraceWebError::Config(msg) if msg.contains("backend_timeout")));
        assert!(err.to_string().contains("invalid duration soon"));
    }

    #[test]
    #[serial]
    fn load_reads_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "listen_addr = \"0.0.0.0:9999\"\nsearch_limit = 25\nabsent_service = \"unknown\"\n",
        )
        .unwrap();

        // SAFETY: serialized with the other env-mutating tests.
        unsafe {
            env::set_var("TRACEWEB_CONFIG", &path);
            env::set_var("TRACEWEB_SEARCH_LIMIT", "50");
        }
        let cfg = Config::load();
        unsafe {
            env::remove_var("TRACEWEB_CONFIG");
            env::remove_var("TRACEWEB_SEARCH_LIMIT");
        }

        let cfg = cfg.unwrap();
        assert_eq!(cfg.listen_addr, "0.0.0.0:9999");
        assert_eq!(cfg.search_limit, 50);
        assert_eq!(cfg.absent_service, "unknown");
    }

    #[test]
    #[serial]
    fn env_rejects_bad_limit() {
        unsafe {
            env::set_var("TRACEWEB_SEARCH_LIMIT", "lots");
        }
        let cfg = Config::from_env();
        unsafe {
            env::remove_var("TRACEWEB_SEARCH_LIMIT");
        }
        assert!(cfg.is_err());
    }
}
