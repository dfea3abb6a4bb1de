//! Internet connectivity preflight
//!
//! The run aborts early with a clear message when there is no network
//! path at all, instead of failing over and over per request.

use std::time::Duration;

use tokio::net::TcpStream;
use tokio::time::timeout;

/// Well-known public DNS resolvers; reaching any one of them counts.
const TEST_ENDPOINTS: &[&str] = &["8.8.8.8:53", "1.1.1.1:53", "208.67.222.222:53"];

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Test connectivity against multiple endpoints.
pub async fn check_internet_connection() -> bool {
    for endpoint in TEST_ENDPOINTS {
        match timeout(CONNECT_TIMEOUT, TcpStream::connect(endpoint)).await {
            Ok(Ok(_)) => return true,
            _ => continue,
        }
    }
    false
}
