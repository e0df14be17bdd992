//! Database URI parsing
//!
//! Understands the common `scheme://[user[:pass]@]host[:port][,host…][/path][?query]`
//! shape used by MongoDB, PostgreSQL, MySQL and friends, plus `sqlite:` and
//! `file:` URIs naming a local database file.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::error::DatabaseError;

/// One `host[:port]` entry of a URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: Option<u16>,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        match self.port {
            Some(port) => write!(f, "{}:{}", host, port),
            None => write!(f, "{}", host),
        }
    }
}

/// Parsed database URI
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseUri {
    pub scheme: String,
    pub username: Option<String>,
    password: Option<String>,
    pub hosts: Vec<HostPort>,
    /// Path without the leading slash (database name for network URIs)
    pub path: Option<String>,
    pub query: Option<String>,
}

// Keeps the password out of logs
impl fmt::Debug for DatabaseUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseUri")
            .field("scheme", &self.scheme)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("hosts", &self.hosts)
            .field("path", &self.path)
            .field("query", &self.query)
            .finish()
    }
}

fn network_uri() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*)://(?:(?P<user>[^:@/]*)(?::(?P<pass>[^@/]*))?@)?(?P<hosts>[^/?#]*)(?:/(?P<path>[^?#]*))?(?:\?(?P<query>[^#]*))?$",
        )
        .expect("network URI pattern is valid")
    })
}

impl DatabaseUri {
    /// Parse a URI
    pub fn parse(raw: &str) -> Result<Self, DatabaseError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DatabaseError::MissingUri);
        }

        if let Some(uri) = Self::parse_file(raw) {
            return Ok(uri);
        }

        let caps = network_uri().captures(raw).ok_or_else(|| {
            DatabaseError::InvalidUri(format!("unrecognized URI shape: {}", redact(raw)))
        })?;

        let hosts = caps
            .name("hosts")
            .map(|m| m.as_str())
            .unwrap_or_default()
            .split(',')
            .filter(|h| !h.is_empty())
            .map(parse_host_port)
            .collect::<Result<Vec<_>, _>>()?;

        if hosts.is_empty() {
            return Err(DatabaseError::InvalidUri(format!("no host in {}", redact(raw))));
        }

        let non_empty = |name: &str| {
            caps.name(name)
                .map(|m| m.as_str().to_string())
                .filter(|s| !s.is_empty())
        };

        Ok(Self {
            scheme: caps["scheme"].to_ascii_lowercase(),
            username: non_empty("user"),
            password: non_empty("pass"),
            hosts,
            path: non_empty("path"),
            query: non_empty("query"),
        })
    }

    /// `sqlite:` / `file:` URIs name a local file rather than a host
    fn parse_file(raw: &str) -> Option<Self> {
        let (scheme, rest) = raw.split_once(':')?;
        let scheme = scheme.to_ascii_lowercase();
        if scheme != "sqlite" && scheme != "file" {
            return None;
        }

        let rest = rest.strip_prefix("//").unwrap_or(rest);
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, Some(query.to_string())),
            None => (rest, None),
        };

        Some(Self {
            scheme,
            username: None,
            password: None,
            hosts: Vec::new(),
            path: Some(path.to_string()).filter(|p| !p.is_empty()),
            query,
        })
    }

    /// Whether the hosts are DNS SRV names rather than dialable addresses
    pub fn is_srv(&self) -> bool {
        self.scheme.ends_with("+srv")
    }

    /// Whether this URI names a local SQLite file
    pub fn is_sqlite(&self) -> bool {
        self.scheme == "sqlite" || self.scheme == "file"
    }

    /// Well-known port for the scheme
    pub fn default_port(&self) -> Option<u16> {
        match self.scheme.as_str() {
            "mongodb" => Some(27017),
            "postgres" | "postgresql" => Some(5432),
            "mysql" | "mariadb" => Some(3306),
            "redis" | "rediss" => Some(6379),
            _ => None,
        }
    }

    /// First host to dial, with the scheme's default port filled in
    pub fn socket_target(&self) -> Option<(String, u16)> {
        let first = self.hosts.first()?;
        let port = first.port.or_else(|| self.default_port())?;
        Some((first.host.clone(), port))
    }

    /// The URI with the password masked
    pub fn redacted(&self) -> String {
        if self.is_sqlite() {
            let mut out = format!("{}:{}", self.scheme, self.path.as_deref().unwrap_or_default());
            if let Some(query) = &self.query {
                out.push('?');
                out.push_str(query);
            }
            return out;
        }

        let mut out = format!("{}://", self.scheme);
        if let Some(user) = &self.username {
            out.push_str(user);
            if self.password.is_some() {
                out.push_str(":***");
            }
            out.push('@');
        }
        let hosts: Vec<String> = self.hosts.iter().map(|h| h.to_string()).collect();
        out.push_str(&hosts.join(","));
        if let Some(path) = &self.path {
            out.push('/');
            out.push_str(path);
        }
        if let Some(query) = &self.query {
            out.push('?');
            out.push_str(query);
        }
        out
    }

    /// Host description safe to log
    pub fn display_host(&self) -> String {
        if self.is_sqlite() {
            return self.path.clone().unwrap_or_else(|| "sqlite".to_string());
        }

        match self.socket_target() {
            Some((host, port)) => HostPort {
                host,
                port: Some(port),
            }
            .to_string(),
            None => self
                .hosts
                .first()
                .map(|h| h.to_string())
                .unwrap_or_default(),
        }
    }
}

fn parse_host_port(entry: &str) -> Result<HostPort, DatabaseError> {
    // Bracketed IPv6 literal
    if let Some(rest) = entry.strip_prefix('[') {
        let (host, after) = rest.split_once(']').ok_or_else(|| {
            DatabaseError::InvalidUri(format!("unterminated IPv6 host: {}", entry))
        })?;
        let port = match after.strip_prefix(':') {
            Some(p) => Some(parse_port(p)?),
            None if after.is_empty() => None,
            None => return Err(DatabaseError::InvalidUri(format!("bad host: {}", entry))),
        };
        return Ok(HostPort {
            host: host.to_string(),
            port,
        });
    }

    match entry.rsplit_once(':') {
        Some((host, port)) => Ok(HostPort {
            host: host.to_string(),
            port: Some(parse_port(port)?),
        }),
        None => Ok(HostPort {
            host: entry.to_string(),
            port: None,
        }),
    }
}

fn parse_port(port: &str) -> Result<u16, DatabaseError> {
    port.parse()
        .map_err(|_| DatabaseError::InvalidUri(format!("bad port: {}", port)))
}

/// Strip credentials from a raw URI for error messages
fn redact(raw: &str) -> String {
    match (raw.find("://"), raw.rfind('@')) {
        (Some(start), Some(at)) if at > start => {
            format!("{}://***@{}", &raw[..start], &raw[at + 1..])
        }
        _ => raw.to_string(),
    }
}
