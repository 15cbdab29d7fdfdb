use std::net::SocketAddr;
use std::process;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tracing::info;

use crate::error::{PluginError, Result};
use crate::provider::Provider;

use super::{PluginServer, ServeOpts};

/// Handshake version of the plugin launch protocol itself.
const CORE_PROTOCOL_VERSION: u32 = 1;
/// Provider protocol version spoken over the connection.
const PROTOCOL_VERSION: u32 = 6;

/// Concrete host-facing server. Binds an ephemeral loopback listener,
/// announces it to the host, and fields newline-delimited JSON-RPC until
/// the host disconnects or requests shutdown.
pub struct HostServer;

impl HostServer {
    pub fn new() -> Self {
        Self
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr)> {
        let listener = TcpListener::bind("127.0.0.1:0").await.map_err(|e| {
            PluginError::Handshake(format!("failed to bind loopback listener: {e}"))
        })?;
        let addr = listener.local_addr()?;
        Ok((listener, addr))
    }

    async fn serve_host(&self, listener: TcpListener, opts: &ServeOpts) -> Result<()> {
        let (stream, peer) = listener
            .accept()
            .await
            .map_err(|e| PluginError::Serve(format!("failed to accept host connection: {e}")))?;
        info!("Host connected from {}", peer);

        let provider = (opts.provider)();
        serve_connection(stream, opts, &provider).await
    }
}

#[async_trait]
impl PluginServer for HostServer {
    async fn serve(&self, opts: &ServeOpts) -> Result<()> {
        let (listener, addr) = self.bind().await?;

        // The handshake line on stdout is how the host finds the RPC
        // channel; logs go to stderr so this stays machine-readable.
        let mut stdout = tokio::io::stdout();
        stdout.write_all(handshake_line(&addr).as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;

        info!("Serving {} v{} on {}", opts.provider_addr, opts.version, addr);
        self.serve_host(listener, opts).await
    }

    async fn debug_attach(&self, opts: &ServeOpts) -> Result<()> {
        let (listener, addr) = self.bind().await?;

        let reattach = serde_json::to_string(&reattach_descriptor(opts.provider_addr, &addr))?;
        let banner = format!(
            "Provider started. To attach the host CLI, set the TF_REATTACH_PROVIDERS \
             environment variable:\n\n\tTF_REATTACH_PROVIDERS='{reattach}'\n"
        );
        let mut stdout = tokio::io::stdout();
        stdout.write_all(banner.as_bytes()).await?;
        stdout.flush().await?;

        info!("Debug mode enabled, waiting for host on {}", addr);
        tokio::select! {
            result = self.serve_host(listener, opts) => result,
            _ = signal::ctrl_c() => {
                info!("Received Ctrl+C, leaving debug mode");
                Ok(())
            }
        }
    }
}

async fn serve_connection(stream: TcpStream, opts: &ServeOpts, provider: &Provider) -> Result<()> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Host disconnected, shutting down");
                break;
            }
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let (response, shutdown) = match serde_json::from_str::<Value>(trimmed) {
                    Ok(request) => handle_message(&request, opts, provider),
                    Err(e) => (parse_error_response(&e), false),
                };

                let frame = serde_json::to_string(&response)?;
                write_half.write_all(frame.as_bytes()).await?;
                write_half.write_all(b"\n").await?;
                write_half.flush().await?;

                if shutdown {
                    info!("Host requested shutdown");
                    break;
                }
            }
            Err(e) => {
                return Err(PluginError::Serve(format!("failed to read from host: {e}")));
            }
        }
    }

    Ok(())
}

/// Lifecycle methods owned by this layer. Everything else belongs to the
/// provider implementation and is answered with a method-not-found error.
fn handle_message(request: &Value, opts: &ServeOpts, provider: &Provider) -> (Value, bool) {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request
        .get("method")
        .and_then(Value::as_str)
        .unwrap_or_default();

    match method {
        "initialize" => (
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": {
                    "protocolVersion": PROTOCOL_VERSION,
                    "providerAddr": opts.provider_addr,
                    "serverInfo": {
                        "name": provider.name(),
                        "version": provider.version(),
                    }
                }
            }),
            false,
        ),
        "plugin/shutdown" => (
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": null
            }),
            true,
        ),
        other => (
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": -32601,
                    "message": format!("Method not found: {other}")
                }
            }),
            false,
        ),
    }
}

fn parse_error_response(e: &serde_json::Error) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": null,
        "error": {
            "code": -32700,
            "message": format!("Parse error: {e}")
        }
    })
}

/// `core-version|protocol-version|network|address|wire-protocol`, printed
/// once on stdout so the host can locate the RPC channel.
fn handshake_line(addr: &SocketAddr) -> String {
    format!("{CORE_PROTOCOL_VERSION}|{PROTOCOL_VERSION}|tcp|{addr}|jsonrpc")
}

/// Reattach descriptor printed in debug mode so the host can connect to an
/// already-running, debugger-attached process.
fn reattach_descriptor(provider_addr: &str, addr: &SocketAddr) -> Value {
    let mut descriptor = serde_json::Map::new();
    descriptor.insert(
        provider_addr.to_string(),
        json!({
            "Protocol": "jsonrpc",
            "Addr": {
                "Network": "tcp",
                "String": addr.to_string(),
            },
            "Pid": process::id(),
        }),
    );
    Value::Object(descriptor)
}
