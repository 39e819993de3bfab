//! Startup access helpers: LAN address discovery and browser launch.

use std::net::{IpAddr, UdpSocket};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Any routable address works; no packet is sent by a UDP connect
const PROBE_ADDR: &str = "8.8.8.8:80";

/// Address of the interface used for outbound traffic, if any
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(PROBE_ADDR).ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// URLs the dashboard can be reached on
pub fn access_urls(port: u16, lan_ip: Option<IpAddr>) -> Vec<String> {
    let mut urls = vec![format!("http://localhost:{}", port)];
    if let Some(ip) = lan_ip.filter(|ip| !ip.is_loopback() && !ip.is_unspecified()) {
        let host = match ip {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{}]", v6),
        };
        urls.push(format!("http://{}:{}", host, port));
    }
    urls
}

/// Log where the dashboard and its API are reachable
pub fn announce(port: u16) {
    let urls = access_urls(port, local_ip());
    info!("Dashboard server listening");
    info!("  Local access:   {}", urls[0]);
    if let Some(lan) = urls.get(1) {
        info!("  Network access: {}", lan);
    }
    let base = urls.last().map(String::as_str).unwrap_or_default();
    info!("  API endpoints:  {}/api/status, {}/api/system", base, base);
}

/// Open `url` in the desktop browser without waiting for it
pub fn open_browser(url: &str) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    match Command::new(opener)
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => info!("Opened browser at {}", url),
        Err(e) => warn!("Could not launch {} for {}: {}", opener, url, e),
    }
}
