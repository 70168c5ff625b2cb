//! Connects to a server at the address given on the command line (default
//! `127.0.0.1`), prints the handshake, and logs every update batch.

use companion_mirror::client::Client;
use companion_mirror::config::ClientConfig;
use companion_mirror::model::Model;

fn main() {
    env_logger::init();

    let server_addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "127.0.0.1".to_owned())
        .parse()
        .expect("expected an IP address as the first argument");

    let model = Model::new();
    model.on_update(|changed| log::info!("update: {} id(s) changed: {changed:?}", changed.len()));

    let client = Client::new(ClientConfig::new(server_addr), model);
    if let Err(e) = client.run() {
        log::error!("client exited: {e}");
        std::process::exit(1);
    }
}
