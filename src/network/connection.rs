use std::sync::Arc;

use metrics::{counter, gauge};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::interpreter::{Interpreter, Session};
use crate::observability::metrics::{METRIC_ACTIVE_CONNECTIONS, METRIC_CONNECTIONS_TOTAL};

// Longest request line accepted before the connection is dropped.
const MAX_LINE_BYTES: usize = 8 * 1024;

const WELCOME_BANNER: &str =
    "Welcome to the Network Clock Server!\nType nc --help to see available commands.\n";

struct ConnectionGuard;

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        gauge!(METRIC_ACTIVE_CONNECTIONS).decrement(1.0);
    }
}

/// Serve one client connection: newline-terminated UTF-8 requests in,
/// newline-terminated replies out, one session for the connection lifetime.
#[instrument(skip(stream, interpreter), fields(connection_id = %Uuid::new_v4()))]
pub async fn handle_client(stream: TcpStream, interpreter: Arc<Interpreter>) {
    counter!(METRIC_CONNECTIONS_TOTAL).increment(1);
    gauge!(METRIC_ACTIVE_CONNECTIONS).increment(1.0);
    let _guard = ConnectionGuard;

    info!("New connection established");

    let (read_half, mut writer) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut session = Session::new();

    if let Err(e) = writer.write_all(WELCOME_BANNER.as_bytes()).await {
        error!("Failed to send welcome banner: {}", e);
        return;
    }

    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => {
                debug!("Client closed the connection");
                return;
            }
            Ok(_) => {}
            Err(e) => {
                error!("Failed to read from socket: {}", e);
                return;
            }
        }

        if line.len() > MAX_LINE_BYTES {
            error!("Request line too large, closing connection");
            let _ = writer.write_all(b"Error: request line too large\n").await;
            return;
        }

        let request = String::from_utf8_lossy(&line);
        let request = request.trim();
        if request.is_empty() {
            continue;
        }

        let mut response = interpreter.handle(request, &mut session).await;
        response.push('\n');
        if let Err(e) = writer.write_all(response.as_bytes()).await {
            error!("Failed to send response: {}", e);
            return;
        }
    }
}
