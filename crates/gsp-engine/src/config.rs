//! Server and client configuration.
//!
//! Environment variables override the Java-style `.properties` file, which
//! overrides the defaults.

use crate::error::{GspError, Result};
use std::collections::HashMap;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 50051;

const KEY_SERVER: &str = "GSP.server";
const KEY_PORT: &str = "GSP.server.port";
const KEY_LOG_FILE: &str = "GSP.log.file";

const ENV_SERVER: &str = "GSP_SERVER";
const ENV_PORT: &str = "GSP_SERVER_PORT";
const ENV_LOG_FILE: &str = "GSP_LOG_FILE";

/// Flat key/value pairs parsed from a `.properties` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    /// Parse `key=value`, `key: value` or `key value` lines.
    /// Blank lines and lines starting with `#` or `!` are ignored.
    pub fn parse(content: &str) -> Self {
        let mut values = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let split = line
                .find(|c: char| c == '=' || c == ':' || c.is_whitespace())
                .unwrap_or(line.len());
            let key = line[..split].trim_end();
            let rest = line[split..].trim_start();
            let value = rest
                .strip_prefix(|c: char| c == '=' || c == ':')
                .unwrap_or(rest)
                .trim();

            values.insert(key.to_string(), value.to_string());
        }
        Self { values }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            GspError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(Self::parse(&content))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn parse_port(raw: &str, source: &str) -> Result<u16> {
    raw.trim()
        .parse()
        .map_err(|_| GspError::Config(format!("invalid port '{}' in {}", raw, source)))
}

/// Reads the process environment.
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve one setting: env var, then properties, then nothing.
/// Returns the value and where it came from.
fn lookup<E>(props: &Properties, env: &E, key: &str, var: &str) -> Option<(String, String)>
where
    E: Fn(&str) -> Option<String>,
{
    if let Some(value) = env(var).filter(|v| !v.trim().is_empty()) {
        return Some((value, var.to_string()));
    }
    props.get(key).map(|v| (v.to_string(), key.to_string()))
}

fn read_properties(path: Option<&Path>) -> Result<Properties> {
    match path {
        Some(p) => Properties::load(p),
        None => Ok(Properties::default()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Log file; stderr when unset
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_file: None,
        }
    }
}

impl ServerConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        Self::from_sources(props, process_env)
    }

    /// Build from properties with `env` supplying the `GSP_*` overrides.
    pub fn from_sources<E>(props: &Properties, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some((host, _)) = lookup(props, &env, KEY_SERVER, ENV_SERVER) {
            config.host = host;
        }
        if let Some((port, source)) = lookup(props, &env, KEY_PORT, ENV_PORT) {
            config.port = parse_port(&port, &source)?;
        }
        if let Some((path, _)) = lookup(props, &env, KEY_LOG_FILE, ENV_LOG_FILE) {
            config.log_file = Some(PathBuf::from(path));
        }
        Ok(config)
    }

    /// Load from an optional properties file, applying env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_properties(&read_properties(path)?)
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = self.host.trim_matches(|c: char| c == '[' || c == ']');
        let target = format!("{}:{}", host, self.port);
        (host, self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or(GspError::InvalidAddress(target))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ClientConfig {
    pub fn from_properties(props: &Properties) -> Result<Self> {
        Self::from_sources(props, process_env)
    }

    pub fn from_sources<E>(props: &Properties, env: E) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some((host, _)) = lookup(props, &env, KEY_SERVER, ENV_SERVER) {
            config.host = host;
        }
        if let Some((port, source)) = lookup(props, &env, KEY_PORT, ENV_PORT) {
            config.port = parse_port(&port, &source)?;
        }
        Ok(config)
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::from_properties(&read_properties(path)?)
    }

    pub fn endpoint(&self) -> String {
        crate::client::endpoint(&self.host, self.port)
    }
}
