//! Boots a `Model` from the startup template and serves a single client on
//! TCP 27000, applying the default `ServerConfig`.

use companion_mirror::codec::native_format;
use companion_mirror::config::ServerConfig;
use companion_mirror::model::Model;
use companion_mirror::server::Server;
use companion_mirror::startup;

fn main() {
    env_logger::init();

    let model = Model::new();
    model.load(native_format::flatten(&startup::template()));

    let server = Server::new(ServerConfig::default(), model);
    if let Err(e) = server.run() {
        log::error!("server exited: {e}");
        std::process::exit(1);
    }
}
