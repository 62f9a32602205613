use crate::io::credentials::Credentials;
use crate::types::{InsarError, InsarResult};
use reqwest::blocking::Client;
use reqwest::header::LOCATION;
use reqwest::Url;
use std::fs::File;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

const MAX_REDIRECTS: usize = 10;

/// Blocking HTTP GET seam shared by the catalog client, orbit resolver and fetcher
pub trait HttpTransport {
    /// Issue a GET with the given query parameters and return the response body.
    ///
    /// Non-success statuses must be reported as `InsarError::Transport`.
    fn get(&self, url: &str, query: &[(String, String)]) -> InsarResult<Box<dyn Read>>;
}

/// `reqwest` transport following redirects manually so Earthdata Login
/// credentials are only ever sent to the login host
pub struct ReqwestTransport {
    client: Client,
    credentials: Option<Credentials>,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, credentials: Option<Credentials>) -> InsarResult<Self> {
        // No request timeout: large granule downloads may legitimately take hours
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(None::<std::time::Duration>)
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| InsarError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, credentials })
    }

    fn auth_for(&self, url: &Url) -> Option<&Credentials> {
        self.credentials
            .as_ref()
            .filter(|c| url.host_str() == Some(c.machine.as_str()))
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(String, String)]) -> InsarResult<Box<dyn Read>> {
        let mut current = Url::parse_with_params(url, query)
            .map_err(|e| InsarError::Http(format!("Invalid URL {}: {}", url, e)))?;

        for _ in 0..=MAX_REDIRECTS {
            log::debug!("GET {}", current);

            let mut request = self.client.get(current.clone());
            if let Some(creds) = self.auth_for(&current) {
                request = request.basic_auth(&creds.login, Some(&creds.password));
            }
            let response = request.send()?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| InsarError::Http(format!("Redirect without Location from {}", current)))?;
                current = current
                    .join(location)
                    .map_err(|e| InsarError::Http(format!("Invalid redirect target {}: {}", location, e)))?;
                continue;
            }

            if !status.is_success() {
                return Err(InsarError::Transport {
                    url: current.to_string(),
                    status: status.as_u16(),
                });
            }

            return Ok(Box::new(response));
        }

        Err(InsarError::Http(format!("Too many redirects for {}", url)))
    }
}

/// Local file name for a download: the URL's final path segment
pub fn file_name_from_url(url: &str) -> InsarResult<String> {
    let without_query = url.split(['?', '#']).next().unwrap_or(url);
    match without_query.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(InsarError::Http(format!("Cannot derive a file name from {}", url))),
    }
}

/// Streams remote resources to disk in bounded chunks
pub struct Fetcher<'a> {
    transport: &'a dyn HttpTransport,
    dest_dir: PathBuf,
    chunk_size: usize,
}

impl<'a> Fetcher<'a> {
    pub fn new<P: AsRef<Path>>(transport: &'a dyn HttpTransport, dest_dir: P, chunk_size: usize) -> Self {
        Self {
            transport,
            dest_dir: dest_dir.as_ref().to_path_buf(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Download `url` to `<dest_dir>/<last path segment>` and return the path
    pub fn fetch(&self, url: &str) -> InsarResult<PathBuf> {
        log::info!("Downloading {}", url);

        let output_path = self.dest_dir.join(file_name_from_url(url)?);
        let mut body = self.transport.get(url, &[])?;

        let mut writer = BufWriter::new(File::create(&output_path)?);
        let mut buffer = vec![0u8; self.chunk_size];
        let mut total: u64 = 0;

        loop {
            let n = read_chunk(&mut body, &mut buffer)?;
            if n == 0 {
                break;
            }
            writer.write_all(&buffer[..n])?;
            total += n as u64;
            log::debug!("{}: {} bytes received", output_path.display(), total);
        }
        writer.flush()?;

        log::info!("Saved {} ({} bytes)", output_path.display(), total);
        Ok(output_path)
    }
}

/// Fill `buffer` as far as the stream allows; returns 0 only at end of stream
fn read_chunk(reader: &mut dyn Read, buffer: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
