//! Earthdata Login credential file (`.netrc` convention)

use crate::types::{InsarError, InsarResult};
use std::fs;
use std::io::Write;
use std::path::Path;

pub const EARTHDATA_MACHINE: &str = "urs.earthdata.nasa.gov";

/// Login for a single `.netrc` machine entry
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub machine: String,
    pub login: String,
    pub password: String,
}

impl Credentials {
    pub fn earthdata(login: &str, password: &str) -> Self {
        Self {
            machine: EARTHDATA_MACHINE.to_string(),
            login: login.to_string(),
            password: password.to_string(),
        }
    }

    /// The single `.netrc` line for this entry
    pub fn netrc_line(&self) -> String {
        format!("machine {} login {} password {}", self.machine, self.login, self.password)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("machine", &self.machine)
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

/// Write the credential file, replacing any existing one
pub fn write_netrc<P: AsRef<Path>>(path: P, credentials: &Credentials) -> InsarResult<()> {
    let path = path.as_ref();
    log::info!("Writing credentials for {} to {}", credentials.machine, path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(credentials.netrc_line().as_bytes())?;
    Ok(())
}

/// Look up `machine` in a `.netrc` file
pub fn read_netrc<P: AsRef<Path>>(path: P, machine: &str) -> InsarResult<Option<Credentials>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    parse_netrc(&content, machine)
}

/// Earthdata login from command-line values, completed from a stored `.netrc`.
///
/// Returns `None` when a value is still missing and the caller has to ask for
/// it. A stored entry for a different login is ignored.
pub fn resolve_credentials<P: AsRef<Path>>(
    netrc_path: P,
    username: Option<&str>,
    password: Option<&str>,
) -> InsarResult<Option<Credentials>> {
    if let (Some(username), Some(password)) = (username, password) {
        return Ok(Some(Credentials::earthdata(username, password)));
    }

    let stored = match read_netrc(netrc_path, EARTHDATA_MACHINE)? {
        Some(stored) => stored,
        None => return Ok(None),
    };
    if username.map_or(false, |u| u != stored.login) {
        return Ok(None);
    }

    log::info!("Using stored Earthdata Login for {}", stored.login);
    Ok(Some(Credentials {
        password: password.map_or(stored.password.clone(), str::to_string),
        ..stored
    }))
}

fn parse_netrc(content: &str, machine: &str) -> InsarResult<Option<Credentials>> {
    let tokens: Vec<&str> = content.split_whitespace().collect();
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i] == "machine" && tokens.get(i + 1) == Some(&machine) {
            let mut login = None;
            let mut password = None;
            i += 2;
            while i < tokens.len() && tokens[i] != "machine" && tokens[i] != "default" {
                let value = tokens
                    .get(i + 1)
                    .ok_or_else(|| InsarError::Config(format!("dangling '{}' in .netrc", tokens[i])))?;
                match tokens[i] {
                    "login" => login = Some(value.to_string()),
                    "password" => password = Some(value.to_string()),
                    _ => {}
                }
                i += 2;
            }
            return match (login, password) {
                (Some(login), Some(password)) => Ok(Some(Credentials {
                    machine: machine.to_string(),
                    login,
                    password,
                })),
                _ => Err(InsarError::Config(format!("incomplete .netrc entry for {}", machine))),
            };
        }
        i += 1;
    }

    Ok(None)
}
