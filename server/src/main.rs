//! Demo TCP server: accepts PostgreSQL-wire-protocol connections
//! against a single in-process `Engine`, synchronously, one connection at a
//! time (§5's single-threaded cooperative model — no tokio here, unlike the
//! rest of this workspace's binaries).

mod demo;

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};

use clap::Parser;

use common::config::{read_config, EngineConfig};
use engine::Engine;
use wire::{WireOutcome, WireSession};

const READ_CHUNK: usize = 8192;
const OUT_CAPACITY: usize = 1 << 20;

#[derive(Parser, Debug)]
#[command(name = "rta-server", about = "Demo frontend for the embedded row-table SQL engine")]
struct CliArgs {
    /// Path to a TOML config file (§4.11). Defaults come from `EngineConfig`
    /// when omitted.
    #[arg(long)]
    config: Option<String>,

    /// Overrides the config file's (or default) listen address.
    #[arg(long)]
    listen: Option<String>,
}

fn main() {
    let args = CliArgs::parse();

    let config = match &args.config {
        Some(path) => match read_config(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                eprintln!("failed to read config {}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    let listen_addr = args.listen.unwrap_or_else(|| config.server.listen.clone());

    let mut engine = match Engine::from_config(&config) {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("failed to initialize engine: {}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = engine.add_table(demo::build_mytable()) {
        eprintln!("failed to register demo table: {}", err);
        std::process::exit(1);
    }

    let listener = match TcpListener::bind(listen_addr.as_str()) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to bind {}: {}", listen_addr, err);
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %listen_addr, "listening");

    for stream in listener.incoming() {
        match stream {
            Ok(stream) => serve_connection(&engine, stream),
            Err(err) => tracing::warn!(error = %err, "accept failed"),
        }
    }
}

/// Drives one connection to completion before accepting the next (§5): reads
/// whatever bytes are available, feeds them to the framer, writes back
/// whatever packets it produced, and repeats until the framer asks to close
/// or the socket errors out.
fn serve_connection(engine: &Engine, mut stream: TcpStream) {
    let peer = stream.peer_addr().map(|a| a.to_string()).unwrap_or_default();
    let mut session = WireSession::new(engine);
    let mut in_buf: Vec<u8> = Vec::new();
    let mut read_chunk = [0u8; READ_CHUNK];

    loop {
        let n = match stream.read(&mut read_chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                tracing::warn!(peer = %peer, error = %err, "read failed");
                break;
            }
        };
        in_buf.extend_from_slice(&read_chunk[..n]);

        loop {
            let mut out = Vec::new();
            match session.feed_wire(&in_buf, &mut out, OUT_CAPACITY) {
                Ok(WireOutcome::Success { consumed }) => {
                    in_buf.drain(..consumed);
                    if !out.is_empty() && stream.write_all(&out).is_err() {
                        return;
                    }
                    if in_buf.is_empty() {
                        break;
                    }
                }
                Ok(WireOutcome::NoCompleteCommand) => break,
                Ok(WireOutcome::Close) => {
                    let _ = stream.write_all(&out);
                    return;
                }
                Ok(WireOutcome::NoBuf) => {
                    tracing::warn!(peer = %peer, "output buffer exhausted, closing connection");
                    return;
                }
                Err(err) => {
                    tracing::warn!(peer = %peer, error = %err, "framer error, closing connection");
                    return;
                }
            }
        }
    }
}
