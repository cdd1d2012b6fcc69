//! Blocking HTTP transfer: client construction, checked GETs and streamed
//! downloads with progress reporting

use crate::error::{DriverError, Result};
use reqwest::blocking::{Client, Response};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default request timeout (5 minutes, archives are fetched in one request)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// User agent sent to the mirror
pub const USER_AGENT: &str = concat!("cdm/", env!("CARGO_PKG_VERSION"));

/// Progress callback: `(bytes_downloaded, total_bytes)`
///
/// `total_bytes` is 0 when the server sent no `Content-Length`.
pub type ProgressFn = fn(u64, u64);

const CHUNK_SIZE: usize = 8192;

/// Builds the HTTP client used for index and archive requests
///
/// # Errors
///
/// Returns `HttpClient` if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(DriverError::HttpClient)
}

/// Sends a GET and fails on transport errors and non-2xx statuses
pub fn get_checked(client: &Client, url: &Url) -> Result<Response> {
    let response = client
        .get(url.as_str())
        .send()
        .map_err(|e| DriverError::Transfer {
            url: url.clone(),
            source: e,
        })?;

    response
        .error_for_status()
        .map_err(|e| DriverError::Transfer {
            url: url.clone(),
            source: e.without_url(),
        })
}

/// Fetches a response body as text
pub fn fetch_text(client: &Client, url: &Url) -> Result<String> {
    get_checked(client, url)?
        .text()
        .map_err(|e| DriverError::Transfer {
            url: url.clone(),
            source: e,
        })
}

/// Streams a response body into `dest`, creating or truncating it
///
/// # Arguments
///
/// * `client` - HTTP client to use
/// * `url` - URL to download from
/// * `dest` - File to write
/// * `progress` - Optional callback invoked after every chunk
///
/// # Returns
///
/// Number of bytes written
///
/// # Errors
///
/// Returns `Transfer` on transport failure or non-2xx status,
/// `TransferBody` if the connection fails while the body streams, and `Io` if
/// the file cannot be written.
pub fn download_to_file(
    client: &Client,
    url: &Url,
    dest: &Path,
    progress: Option<ProgressFn>,
) -> Result<u64> {
    let mut response = get_checked(client, url)?;
    let total = response.content_length().unwrap_or(0);

    let file = File::create(dest)
        .map_err(|e| DriverError::io(format!("create {}", dest.display()), e))?;
    let mut writer = BufWriter::new(file);

    let mut downloaded: u64 = 0;
    let mut buffer = [0; CHUNK_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| DriverError::TransferBody {
                url: url.clone(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| DriverError::io(format!("write {}", dest.display()), e))?;

        downloaded += bytes_read as u64;

        if let Some(callback) = progress {
            callback(downloaded, total);
        }
    }

    let file = writer
        .into_inner()
        .map_err(|e| DriverError::io(format!("flush {}", dest.display()), e.into_error()))?;
    file.sync_all()
        .map_err(|e| DriverError::io(format!("sync {}", dest.display()), e))?;

    tracing::debug!("downloaded {} bytes from {}", downloaded, url);
    Ok(downloaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::fs;
    use std::net::TcpListener;
    use std::thread;

    /// Serves one response that promises more body than it sends
    fn serve_truncated_body(path: &str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\npartial")
                .unwrap();
        });

        Url::parse(&format!("http://{}{}", addr, path)).unwrap()
    }

    #[test]
    fn test_build_client() {
        let client = build_client(Duration::from_secs(5));
        assert!(client.is_ok(), "Client should build with rustls");
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("cdm/"));
    }

    #[test]
    fn test_fetch_text_success() {
        let mut server = Server::new();
        let mock = server
            .mock("GET", "/-/binary/chromedriver/")
            .with_status(200)
            .with_body("[]")
            .create();

        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let url = Url::parse(&format!("{}/-/binary/chromedriver/", server.url())).unwrap();
        let body = fetch_text(&client, &url).unwrap();

        mock.assert();
        assert_eq!(body, "[]");
    }

    #[test]
    fn test_non_2xx_is_transfer_error() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/missing.zip").with_status(404).create();

        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let url = Url::parse(&format!("{}/missing.zip", server.url())).unwrap();
        let err = fetch_text(&client, &url).unwrap_err();

        match err {
            DriverError::Transfer { url: failed, source } => {
                assert_eq!(failed, url);
                assert_eq!(source.status().map(|s| s.as_u16()), Some(404));
            }
            other => panic!("Expected Transfer error, got: {:?}", other),
        }
    }

    #[test]
    fn test_download_to_file_writes_body() {
        let mut server = Server::new();
        let body = vec![b'x'; 20_000];
        let mock = server
            .mock("GET", "/chromedriver_linux64.zip")
            .with_status(200)
            .with_body(&body)
            .create();

        let temp = cdm_testkit::temp_dir_in_workspace();
        let dest = temp.path().join("chromedriver_linux64.zip");
        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let url = Url::parse(&format!("{}/chromedriver_linux64.zip", server.url())).unwrap();

        let written = download_to_file(&client, &url, &dest, None).unwrap();

        mock.assert();
        assert_eq!(written, 20_000);
        assert_eq!(fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn test_download_reports_progress() {
        use std::sync::{Mutex, OnceLock};

        // fn pointers cannot capture, so record into a static
        static PROGRESS_CALLS: OnceLock<Mutex<Vec<(u64, u64)>>> = OnceLock::new();

        fn track_progress(downloaded: u64, total: u64) {
            PROGRESS_CALLS
                .get_or_init(|| Mutex::new(Vec::new()))
                .lock()
                .unwrap()
                .push((downloaded, total));
        }

        let mut server = Server::new();
        let body = vec![b'z'; 1000];
        let _mock = server
            .mock("GET", "/progress.zip")
            .with_status(200)
            .with_body(&body)
            .create();

        let temp = cdm_testkit::temp_dir_in_workspace();
        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let url = Url::parse(&format!("{}/progress.zip", server.url())).unwrap();
        download_to_file(&client, &url, &temp.path().join("p.zip"), Some(track_progress))
            .unwrap();

        let calls = PROGRESS_CALLS.get().unwrap().lock().unwrap();
        assert!(!calls.is_empty(), "Progress callback should be invoked");
        assert_eq!(*calls.last().unwrap(), (1000, 1000));
    }

    #[test]
    fn test_download_failure_leaves_no_file() {
        let mut server = Server::new();
        let _mock = server.mock("GET", "/gone.zip").with_status(500).create();

        let temp = cdm_testkit::temp_dir_in_workspace();
        let dest = temp.path().join("gone.zip");
        let client = build_client(DEFAULT_TIMEOUT).unwrap();
        let url = Url::parse(&format!("{}/gone.zip", server.url())).unwrap();

        let result = download_to_file(&client, &url, &dest, None);

        assert!(matches!(result, Err(DriverError::Transfer { .. })));
        assert!(!dest.exists(), "Status is checked before the file is created");
    }

    #[test]
    fn test_connection_lost_mid_body_is_transfer_error() {
        let url = serve_truncated_body("/chromedriver_linux64.zip");
        let temp = cdm_testkit::temp_dir_in_workspace();
        let client = build_client(DEFAULT_TIMEOUT).unwrap();

        let err = download_to_file(&client, &url, &temp.path().join("cut.zip"), None).unwrap_err();

        match &err {
            DriverError::TransferBody { url: failed, .. } => assert_eq!(failed, &url),
            other => panic!("Expected TransferBody error, got: {:?}", other),
        }
        assert!(err.to_string().starts_with("TRANSFER_FAILED:"));
    }
}
