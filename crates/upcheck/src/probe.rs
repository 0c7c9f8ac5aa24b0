use std::time::Duration;

use log::debug;
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use upcheck_core::ConnectivityReporter;

/// Host and port the version endpoint is served from.
fn endpoint_address(endpoint: &str) -> Option<(String, u16)> {
    let url = Url::parse(endpoint).ok()?;
    let host = url.host_str()?.to_string();
    let port = url.port_or_known_default()?;
    Some((host, port))
}

/// Report whether the endpoint host accepts a TCP connection.
///
/// Runs in the background and publishes exactly one status to `reporter`.
pub fn spawn_reachability_probe(
    endpoint: &str,
    timeout: Duration,
    reporter: ConnectivityReporter,
) -> JoinHandle<()> {
    let address = endpoint_address(endpoint);
    tokio::spawn(async move {
        let connected = match address {
            Some((host, port)) => {
                let attempt =
                    tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await;
                match attempt {
                    Ok(Ok(_)) => true,
                    Ok(Err(error)) => {
                        debug!("Connectivity probe to {host}:{port} failed: {error}");
                        false
                    }
                    Err(_) => {
                        debug!("Connectivity probe to {host}:{port} timed out");
                        false
                    }
                }
            }
            None => {
                debug!("Version endpoint has no host, treating as offline");
                false
            }
        };
        reporter.set_connected(connected);
    })
}
