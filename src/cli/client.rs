//! Line-protocol client
//!
//! Blocking TCP client for the NetClock socket protocol.

use std::io::{self, BufRead, BufReader, ErrorKind, Write};
use std::net::TcpStream;
use std::time::Duration;

// Replies can span multiple lines (the help text does); the server does not
// frame them, so a short read timeout marks the end of a reply.
const REPLY_WINDOW: Duration = Duration::from_millis(300);

/// Client for the newline-terminated command protocol.
pub struct LineClient {
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl LineClient {
    /// Connect to a NetClock server and consume the welcome banner.
    pub fn connect(host: &str, port: u16, timeout_secs: u64) -> io::Result<(Self, String)> {
        let addr = format!("{}:{}", host, port);
        let stream = TcpStream::connect(&addr)?;

        stream.set_write_timeout(Some(Duration::from_secs(timeout_secs)))?;
        stream.set_read_timeout(Some(REPLY_WINDOW))?;

        let reader = BufReader::new(stream.try_clone()?);
        let mut client = LineClient { stream, reader };
        let banner = client.drain_reply()?;
        Ok((client, banner))
    }

    /// Send one command line and collect the reply.
    pub fn send(&mut self, command: &str) -> io::Result<String> {
        self.stream.write_all(command.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;
        self.drain_reply()
    }

    // Read lines until the reply window closes.
    fn drain_reply(&mut self) -> io::Result<String> {
        let mut reply = String::new();
        loop {
            let mut line = String::new();
            match self.reader.read_line(&mut line) {
                Ok(0) => {
                    if reply.is_empty() {
                        return Err(io::Error::new(
                            ErrorKind::ConnectionReset,
                            "Connection closed",
                        ));
                    }
                    break;
                }
                Ok(_) => reply.push_str(&line),
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(reply.trim_end().to_string())
    }
}
