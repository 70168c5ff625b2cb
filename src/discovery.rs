//! ## UDP autodiscovery (§6.2, expansion)
//!
//! A one-shot broadcast/reply exchange, out of scope for engineering depth
//! but still implemented and tested per the ambient-stack rule: a client
//! broadcasts `{"cmd":"autodiscover"}` and collects whatever JSON objects
//! answer within a timeout window, each stamped with the responder's
//! source address; a server answers any such datagram once.

use crate::config::{DISCOVERY_TIMEOUT, UDP_DISCOVERY_PORT};
use crate::error::Result;
use serde_json::json;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

const RECV_BUFFER_SIZE: usize = 4096;

/// Broadcast an autodiscover ping to the LAN and collect every reply that
/// arrives within `timeout` (scenario 6).
pub fn discover() -> Result<Vec<serde_json::Value>> {
    let broadcast_addr = SocketAddr::from((Ipv4Addr::BROADCAST, UDP_DISCOVERY_PORT));
    discover_to(broadcast_addr, DISCOVERY_TIMEOUT)
}

/// Same as `discover`, but sends to an arbitrary target (broadcast or a
/// specific host) and uses a caller-supplied collection window — this is
/// what the unit tests drive against a loopback responder.
pub fn discover_to(target: SocketAddr, timeout: Duration) -> Result<Vec<serde_json::Value>> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.set_broadcast(true)?;
    socket.set_read_timeout(Some(timeout))?;

    let ping = serde_json::to_vec(&json!({"cmd": "autodiscover"}))?;
    socket.send_to(&ping, target)?;

    let mut responses = Vec::new();
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) => {
                if let Ok(mut parsed) = serde_json::from_slice::<serde_json::Value>(&buf[..len]) {
                    if let serde_json::Value::Object(ref mut map) = parsed {
                        map.insert("IpAddr".to_owned(), json!(from.ip().to_string()));
                    }
                    responses.push(parsed);
                }
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::ConnectionRefused =>
            {
                // ConnectionRefused surfaces here on some platforms as a
                // delayed ICMP port-unreachable for a non-listening target;
                // treat it the same as "nobody answered in time".
                break
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(responses)
}

/// Answer the next autodiscover ping received on `bind_addr` with `payload`,
/// then return. A long-running server would call this in a loop.
pub fn respond_once(bind_addr: SocketAddr, payload: &serde_json::Value) -> Result<()> {
    let socket = UdpSocket::bind(bind_addr)?;
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    loop {
        let (len, from) = socket.recv_from(&mut buf)?;
        let Ok(request) = serde_json::from_slice::<serde_json::Value>(&buf[..len]) else {
            continue;
        };
        if request.get("cmd").and_then(|c| c.as_str()) == Some("autodiscover") {
            let body = serde_json::to_vec(payload)?;
            socket.send_to(&body, from)?;
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn discover_collects_a_stamped_reply_from_a_responder() {
        let responder = UdpSocket::bind(("127.0.0.1", 0)).unwrap();
        let responder_addr = responder.local_addr().unwrap();
        drop(responder); // free the port for respond_once to rebind

        let (ready_tx, ready_rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let payload = json!({"name": "test-server"});
            ready_tx.send(()).unwrap();
            respond_once(responder_addr, &payload).unwrap();
        });
        ready_rx.recv().unwrap();
        thread::sleep(Duration::from_millis(50));

        let responses = discover_to(responder_addr, Duration::from_secs(2)).unwrap();
        handle.join().unwrap();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["name"], "test-server");
        assert!(responses[0]["IpAddr"].is_string());
    }

    #[test]
    fn discover_times_out_with_no_responder() {
        // An ephemeral loopback port nothing is bound to.
        let unused = SocketAddr::from(([127, 0, 0, 1], 54_321));
        let responses = discover_to(unused, Duration::from_millis(200)).unwrap();
        assert!(responses.is_empty());
    }
}
