use std::io::{self, BufRead, BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::{SmtpProbeError, SmtpReply, Stage};

const QUIT_GRACE: Duration = Duration::from_millis(500);

/// Longest reply line accepted, CRLF included (RFC 5321 section 4.5.3.1.5).
pub(crate) const MAX_REPLY_LINE: usize = 512;

/// A plaintext SMTP connection bounded by a single deadline.
///
/// Dropping the session says `QUIT` (when the connection is still usable)
/// and shuts the socket down, so every exit path of a probe closes it.
pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
    deadline: Instant,
    timeout: Duration,
    healthy: bool,
}

impl SmtpSession {
    pub(crate) fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, SmtpProbeError> {
        let deadline = Instant::now() + timeout;
        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|source| SmtpProbeError::Resolve {
                host: host.to_string(),
                source,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(SmtpProbeError::NoAddress {
                host: host.to_string(),
            });
        }

        let mut last_err = None;
        for addr in &addrs {
            let remaining = remaining(deadline)
                .ok_or_else(|| SmtpProbeError::timeout(Stage::Connect, timeout))?;
            match TcpStream::connect_timeout(addr, remaining) {
                Ok(stream) => {
                    debug!(host, %addr, "SMTP connection established");
                    let reader = BufReader::new(
                        stream
                            .try_clone()
                            .map_err(|source| SmtpProbeError::Io {
                                stage: Stage::Connect,
                                source,
                            })?,
                    );
                    return Ok(Self {
                        host: host.to_string(),
                        stream,
                        reader,
                        deadline,
                        timeout,
                        healthy: true,
                    });
                }
                Err(err) => {
                    debug!(host, %addr, error = %err, "SMTP connect attempt failed");
                    last_err = Some(err);
                }
            }
        }

        Err(match last_err {
            Some(err) if is_timeout(&err) => SmtpProbeError::timeout(Stage::Connect, timeout),
            Some(source) => SmtpProbeError::Connect {
                host: host.to_string(),
                source,
            },
            None => SmtpProbeError::NoAddress {
                host: host.to_string(),
            },
        })
    }

    /// Sends `command` and waits for its reply.
    pub(crate) fn command(&mut self, command: &str, stage: Stage) -> Result<SmtpReply, SmtpProbeError> {
        self.send(command, stage)?;
        self.read_reply(stage)
    }

    pub(crate) fn send(&mut self, command: &str, stage: Stage) -> Result<(), SmtpProbeError> {
        trace!(host = %self.host, "C: {command}");
        let result = self.send_inner(command, stage);
        if result.is_err() {
            self.healthy = false;
        }
        result
    }

    fn send_inner(&mut self, command: &str, stage: Stage) -> Result<(), SmtpProbeError> {
        let remaining = self.arm(stage)?;
        let line = format!("{command}\r\n");
        let written = self
            .stream
            .set_write_timeout(Some(remaining))
            .and_then(|()| self.stream.write_all(line.as_bytes()))
            .and_then(|()| self.stream.flush());
        match written {
            Ok(()) => Ok(()),
            Err(err) => Err(io_failure(stage, self.timeout, err)),
        }
    }

    pub(crate) fn read_reply(&mut self, stage: Stage) -> Result<SmtpReply, SmtpProbeError> {
        let result = self.read_reply_inner(stage);
        if result.is_err() {
            self.healthy = false;
        }
        result
    }

    fn read_reply_inner(&mut self, stage: Stage) -> Result<SmtpReply, SmtpProbeError> {
        let mut code = None;
        let mut lines = Vec::new();
        loop {
            let line = self.read_line(stage)?;
            trace!(host = %self.host, "S: {line}");
            if line.len() < 3 {
                return Err(SmtpProbeError::protocol(stage, format!("short line '{line}'")));
            }
            let parsed = line
                .get(..3)
                .and_then(|digits| digits.parse::<u16>().ok())
                .ok_or_else(|| SmtpProbeError::protocol(stage, format!("no status code in '{line}'")))?;
            match code {
                Some(existing) if existing != parsed => {
                    return Err(SmtpProbeError::protocol(
                        stage,
                        format!("inconsistent reply codes {existing} and {parsed}"),
                    ));
                }
                Some(_) => {}
                None => code = Some(parsed),
            }
            let continuation = line.as_bytes().get(3) == Some(&b'-');
            lines.push(line.get(4..).unwrap_or_default().to_string());
            if !continuation {
                break;
            }
        }
        let code = code.ok_or_else(|| SmtpProbeError::protocol(stage, "empty reply"))?;
        Ok(SmtpReply::new(code, lines.join("\n")))
    }

    /// Reads one reply line. The deadline is re-checked before every socket
    /// read, so a server trickling bytes cannot stretch the session.
    fn read_line(&mut self, stage: Stage) -> Result<String, SmtpProbeError> {
        let timeout = self.timeout;
        let mut raw = Vec::new();
        loop {
            let remaining = self.arm(stage)?;
            if let Err(err) = self.stream.set_read_timeout(Some(remaining)) {
                return Err(io_failure(stage, timeout, err));
            }
            let available = match self.reader.fill_buf() {
                Ok(available) => available,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(io_failure(stage, timeout, err)),
            };
            if available.is_empty() {
                return Err(SmtpProbeError::Io {
                    stage,
                    source: io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed by server"),
                });
            }
            let (chunk, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(end) => (&available[..=end], true),
                None => (available, false),
            };
            if raw.len() + chunk.len() > MAX_REPLY_LINE {
                return Err(SmtpProbeError::protocol(
                    stage,
                    format!("reply line longer than {MAX_REPLY_LINE} octets"),
                ));
            }
            raw.extend_from_slice(chunk);
            let used = chunk.len();
            self.reader.consume(used);
            if complete {
                break;
            }
        }
        let text = String::from_utf8_lossy(&raw);
        Ok(text.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Time left before the session deadline, or a timeout error for `stage`.
    fn arm(&self, stage: Stage) -> Result<Duration, SmtpProbeError> {
        remaining(self.deadline).ok_or_else(|| SmtpProbeError::timeout(stage, self.timeout))
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        if self.healthy {
            let _ = self.stream.set_write_timeout(Some(QUIT_GRACE));
            let _ = self.stream.write_all(b"QUIT\r\n");
            let _ = self.stream.flush();
        }
        let _ = self.stream.shutdown(Shutdown::Both);
        debug!(host = %self.host, "SMTP session closed");
    }
}

fn remaining(deadline: Instant) -> Option<Duration> {
    deadline
        .checked_duration_since(Instant::now())
        .filter(|left| !left.is_zero())
}

fn io_failure(stage: Stage, timeout: Duration, err: io::Error) -> SmtpProbeError {
    if is_timeout(&err) {
        SmtpProbeError::timeout(stage, timeout)
    } else {
        SmtpProbeError::Io { stage, source: err }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock)
}
