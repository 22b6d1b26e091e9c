use tracing::{debug, warn};

use super::session::SmtpSession;
use super::{ProbeOptions, SmtpProbeError, SmtpReply, SmtpVerdict, Stage};

/// Asks `mx_host` whether it would accept mail for `recipient`, without
/// sending any message.
///
/// The session runs greeting, `EHLO` (falling back to `HELO`), `MAIL FROM`
/// and `RCPT TO`, then is torn down. Only the RCPT TO reply is classified;
/// every transport or protocol failure becomes
/// [`SmtpVerdict::HandshakeError`]. Nothing is retried.
pub fn probe(recipient: &str, mx_host: &str, options: &ProbeOptions) -> SmtpVerdict {
    match handshake(recipient, mx_host, options) {
        Ok(reply) => {
            let verdict = SmtpVerdict::from_rcpt_reply(reply);
            debug!(mx_host, recipient, code = ?verdict.code(), "RCPT TO classified");
            verdict
        }
        Err(err) => {
            warn!(mx_host, recipient, error = %err, "SMTP handshake failed");
            SmtpVerdict::handshake_error(err.to_string())
        }
    }
}

fn handshake(recipient: &str, mx_host: &str, options: &ProbeOptions) -> Result<SmtpReply, SmtpProbeError> {
    let mut session = SmtpSession::connect(mx_host, options.port, options.timeout)?;

    let greeting = session.read_reply(Stage::Greeting)?;
    if greeting.code != 220 {
        return Err(SmtpProbeError::refused(Stage::Greeting, greeting.code, greeting.flat_message()));
    }

    let helo = options.helo_name();
    let ehlo = session.command(&format!("EHLO {helo}"), Stage::Ehlo)?;
    if !ehlo.is_positive_completion() {
        debug!(mx_host, code = ehlo.code, "EHLO refused, falling back to HELO");
        let reply = session.command(&format!("HELO {helo}"), Stage::Helo)?;
        if !reply.is_positive_completion() {
            return Err(SmtpProbeError::refused(Stage::Helo, reply.code, reply.flat_message()));
        }
    }

    let mail = session.command(&format!("MAIL FROM:<{}>", options.sender()), Stage::MailFrom)?;
    if !mail.is_positive_completion() {
        // RCPT TO is still issued; its reply decides the verdict.
        warn!(mx_host, code = mail.code, "MAIL FROM not accepted");
    }

    session.command(&format!("RCPT TO:<{recipient}>"), Stage::RcptTo)
}

/// Something that can run the RCPT TO probe for the classifier.
pub trait MailboxProber {
    fn probe(&self, recipient: &str, mx_host: &str) -> SmtpVerdict;
}

impl<T: MailboxProber + ?Sized> MailboxProber for &T {
    fn probe(&self, recipient: &str, mx_host: &str) -> SmtpVerdict {
        (**self).probe(recipient, mx_host)
    }
}

/// Live prober speaking SMTP over TCP.
#[derive(Debug, Clone, Default)]
pub struct SmtpProber {
    options: ProbeOptions,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }
}

impl MailboxProber for SmtpProber {
    fn probe(&self, recipient: &str, mx_host: &str) -> SmtpVerdict {
        probe(recipient, mx_host, &self.options)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{self, BufRead, BufReader, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::mpsc;
    use std::thread;
    use std::time::{Duration, Instant};

    use crate::smtp::session::MAX_REPLY_LINE;

    /// Scripted SMTP server on loopback. Returns the port, and a receiver
    /// yielding every line the client sent after the script ran out.
    pub(crate) fn spawn_mock_server(
        greeting: &'static str,
        script: Vec<(&'static str, &'static str)>,
    ) -> (u16, mpsc::Receiver<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock server");
        let port = listener.local_addr().expect("addr").port();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let trailing = handle_session(&mut stream, greeting, script).unwrap_or_default();
                tx.send(trailing).ok();
            }
        });
        (port, rx)
    }

    fn handle_session(
        stream: &mut TcpStream,
        greeting: &str,
        script: Vec<(&'static str, &'static str)>,
    ) -> io::Result<Vec<String>> {
        stream.set_read_timeout(Some(Duration::from_secs(5)))?;
        let mut reader = BufReader::new(stream.try_clone()?);
        stream.write_all(greeting.as_bytes())?;
        stream.flush()?;
        for (expected, response) in script {
            let mut line = String::new();
            reader.read_line(&mut line)?;
            assert!(
                line.starts_with(expected),
                "expected command starting with '{expected}', got '{line}'"
            );
            stream.write_all(response.as_bytes())?;
            stream.flush()?;
        }
        let mut trailing = Vec::new();
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            trailing.push(line.trim_end().to_string());
        }
        Ok(trailing)
    }

    fn options(port: u16) -> ProbeOptions {
        ProbeOptions {
            port,
            timeout: Duration::from_secs(5),
            ..ProbeOptions::default()
        }
    }

    const GREETING: &str = "220 mock.smtp.test ESMTP\r\n";

    #[test]
    fn accepted_recipient() {
        let (port, rx) = spawn_mock_server(
            GREETING,
            vec![
                ("EHLO localhost", "250-mock.smtp.test\r\n250 SIZE 1000000\r\n"),
                ("MAIL FROM:<probe@example.com>", "250 2.1.0 Ok\r\n"),
                ("RCPT TO:<user@example.com>", "250 2.1.5 Ok\r\n"),
            ],
        );
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        assert!(matches!(verdict, SmtpVerdict::Accepted(_)), "{verdict:?}");
        let text = verdict.to_string();
        assert!(text.contains("accepted") && text.contains("250"), "{text}");

        let trailing = rx.recv_timeout(Duration::from_secs(5)).expect("session closed");
        assert_eq!(trailing, vec!["QUIT"]);
    }

    #[test]
    fn rejected_recipient() {
        let (port, rx) = spawn_mock_server(
            GREETING,
            vec![
                ("EHLO", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
                ("RCPT TO:", "550 5.1.1 User unknown\r\n"),
            ],
        );
        let verdict = probe("ghost@example.com", "127.0.0.1", &options(port));
        assert_eq!(verdict.code(), Some(550));
        assert!(matches!(verdict, SmtpVerdict::Rejected(_)));
        assert!(verdict.to_string().contains("rejected"));
        rx.recv_timeout(Duration::from_secs(5)).expect("session closed");
    }

    #[test]
    fn temporary_refusal_is_ambiguous() {
        let (port, _rx) = spawn_mock_server(
            GREETING,
            vec![
                ("EHLO", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:", "250 2.1.0 Ok\r\n"),
                ("RCPT TO:", "421 4.7.0 Try again later\r\n"),
            ],
        );
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        assert!(matches!(verdict, SmtpVerdict::Ambiguous(_)), "{verdict:?}");
        assert_eq!(verdict.message(), "4.7.0 Try again later");
    }

    #[test]
    fn helo_fallback_when_ehlo_unsupported() {
        let (port, _rx) = spawn_mock_server(
            GREETING,
            vec![
                ("EHLO", "502 5.5.2 Command not recognized\r\n"),
                ("HELO localhost", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:", "250 Ok\r\n"),
                ("RCPT TO:", "250 Ok\r\n"),
            ],
        );
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        assert!(matches!(verdict, SmtpVerdict::Accepted(_)), "{verdict:?}");
    }

    #[test]
    fn refused_mail_from_still_classifies_rcpt() {
        let (port, _rx) = spawn_mock_server(
            GREETING,
            vec![
                ("EHLO", "250 mock.smtp.test\r\n"),
                ("MAIL FROM:", "553 5.7.1 Sender rejected\r\n"),
                ("RCPT TO:", "503 5.5.1 Need MAIL first\r\n"),
            ],
        );
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        assert_eq!(verdict.code(), Some(503));
        assert!(matches!(verdict, SmtpVerdict::Ambiguous(_)));
    }

    #[test]
    fn bad_greeting_is_handshake_error() {
        let (port, rx) = spawn_mock_server("554 5.3.2 No service\r\n", Vec::new());
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        assert!(matches!(verdict, SmtpVerdict::HandshakeError { .. }), "{verdict:?}");
        assert!(verdict.message().contains("554"));
        assert_eq!(verdict.code(), None);
        rx.recv_timeout(Duration::from_secs(5)).expect("session closed");
    }

    #[test]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let handle = thread::spawn(move || {
            let accepted = listener.accept();
            thread::sleep(Duration::from_millis(800));
            drop(accepted);
        });
        let opts = ProbeOptions {
            port,
            timeout: Duration::from_millis(200),
            ..ProbeOptions::default()
        };
        let verdict = probe("user@example.com", "127.0.0.1", &opts);
        match &verdict {
            SmtpVerdict::HandshakeError { message } => {
                assert!(message.contains("timed out"), "{message}");
                assert!(message.contains("greeting"), "{message}");
            }
            other => panic!("expected handshake error, got {other:?}"),
        }
        handle.join().expect("server thread");
    }

    #[test]
    fn trickling_server_cannot_outlast_the_deadline() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                for byte in b"220 slow greeting\r\n" {
                    if stream.write_all(&[*byte]).and_then(|()| stream.flush()).is_err() {
                        break;
                    }
                    thread::sleep(Duration::from_millis(300));
                }
            }
        });
        let opts = ProbeOptions {
            port,
            timeout: Duration::from_millis(500),
            ..ProbeOptions::default()
        };
        let started = Instant::now();
        let verdict = probe("user@example.com", "127.0.0.1", &opts);
        let took = started.elapsed();

        assert!(took < Duration::from_millis(1500), "session ran for {took:?}");
        match &verdict {
            SmtpVerdict::HandshakeError { message } => {
                assert!(message.contains("timed out"), "{message}");
                assert!(message.contains("greeting"), "{message}");
            }
            other => panic!("expected handshake error, got {other:?}"),
        }
    }

    #[test]
    fn overlong_reply_line_is_handshake_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let line = format!("220 {}\r\n", "x".repeat(MAX_REPLY_LINE * 2));
                let _ = stream.write_all(line.as_bytes());
                thread::sleep(Duration::from_millis(500));
            }
        });
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        match verdict {
            SmtpVerdict::HandshakeError { message } => {
                assert!(message.contains("longer than 512"), "{message}");
            }
            other => panic!("expected handshake error, got {other:?}"),
        }
    }

    #[test]
    fn connection_refused_is_handshake_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        assert!(matches!(verdict, SmtpVerdict::HandshakeError { .. }), "{verdict:?}");
    }

    #[test]
    fn server_hangup_mid_session_is_handshake_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let _ = stream.write_all(GREETING.as_bytes());
                let mut reader = BufReader::new(stream.try_clone().expect("clone"));
                let mut line = String::new();
                let _ = reader.read_line(&mut line);
            }
        });
        let verdict = probe("user@example.com", "127.0.0.1", &options(port));
        match verdict {
            SmtpVerdict::HandshakeError { message } => assert!(message.contains("EHLO"), "{message}"),
            other => panic!("expected handshake error, got {other:?}"),
        }
    }
}
