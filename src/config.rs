//! Bind/connect configuration (§6.1, §6.2, expansion). Small structs with a
//! `Default` matching the protocol's fixed ports — there's no config file
//! format specified, so this follows the pack's plain-struct pattern rather
//! than introducing one.

use std::net::IpAddr;
use std::time::Duration;

pub const TCP_PORT: u16 = 27000;
pub const UDP_DISCOVERY_PORT: u16 = 28000;
pub const DISCOVERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Address to bind the TCP listener on. `0.0.0.0` to accept on any
    /// interface.
    pub bind_addr: IpAddr,
    pub tcp_port: u16,
    /// Reported in the channel-1 handshake.
    pub lang: String,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".parse().unwrap(),
            tcp_port: TCP_PORT,
            lang: "en".to_owned(),
            version: "1.1.30.0".to_owned(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub server_addr: IpAddr,
    pub tcp_port: u16,
}

impl ClientConfig {
    pub fn new(server_addr: IpAddr) -> Self {
        ClientConfig {
            server_addr,
            tcp_port: TCP_PORT,
        }
    }
}
