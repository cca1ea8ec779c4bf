//! Remote control via Unix socket
//!
//! Each line a client writes is one JSON command array. The command is
//! handed to the frame loop, and the result is written back as one JSON line.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value};

use crate::command::{Command, CommandOutput};
use crate::error::RenderError;
use crate::script::{output_to_json, parse_line};

pub const DEFAULT_SOCKET_PATH: &str = "/tmp/softraster.sock";

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

/// A parsed command waiting to be executed on the frame loop
#[derive(Debug)]
pub struct Request {
    pub command: Command,
    reply: Sender<Value>,
}

impl Request {
    /// Send the execution result back to the client
    pub fn respond(self, result: Result<CommandOutput, RenderError>) {
        let _ = self.reply.send(result_to_json(result));
    }
}

/// `{"ok": value}` or `{"error": message}`
pub fn result_to_json(result: Result<CommandOutput, RenderError>) -> Value {
    match result {
        Ok(out) => json!({ "ok": output_to_json(&out) }),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

/// Controller that listens for commands on a Unix socket
pub struct Controller {
    path: PathBuf,
    receiver: Receiver<Request>,
    _listener_thread: thread::JoinHandle<()>,
}

impl Controller {
    pub fn new() -> Result<Self, String> {
        Self::bind(DEFAULT_SOCKET_PATH)
    }

    /// Listen on `path`, replacing a stale socket file
    pub fn bind(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref().to_path_buf();
        let _ = std::fs::remove_file(&path);

        let listener = UnixListener::bind(&path)
            .map_err(|e| format!("Failed to bind socket {}: {}", path.display(), e))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| format!("Failed to set non-blocking: {}", e))?;

        let (sender, receiver) = mpsc::channel();
        let handle = thread::spawn(move || Self::listener_loop(listener, sender));

        log::info!("control socket listening on {}", path.display());
        Ok(Self {
            path,
            receiver,
            _listener_thread: handle,
        })
    }

    fn listener_loop(listener: UnixListener, sender: Sender<Request>) {
        loop {
            match listener.accept() {
                Ok((stream, _)) => {
                    let sender = sender.clone();
                    thread::spawn(move || Self::handle_client(stream, &sender));
                },
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(50));
                },
                Err(e) => {
                    log::warn!("control socket closed: {}", e);
                    break;
                },
            }
        }
    }

    fn handle_client(stream: UnixStream, sender: &Sender<Request>) {
        // accepted sockets inherit non-blocking mode on some platforms
        let _ = stream.set_nonblocking(false);
        let mut writer = match stream.try_clone() {
            Ok(w) => w,
            Err(e) => {
                log::warn!("control client dropped: {}", e);
                return;
            },
        };
        let reader = BufReader::new(stream);

        for line in reader.lines().map_while(Result::ok) {
            if line.trim().is_empty() {
                continue;
            }
            let reply = match parse_line(&line) {
                Ok(command) => {
                    let (tx, rx) = mpsc::channel();
                    if sender.send(Request { command, reply: tx }).is_err() {
                        break;
                    }
                    rx.recv_timeout(REPLY_TIMEOUT)
                        .unwrap_or_else(|_| json!({ "error": "no reply from frame loop" }))
                },
                Err(e) => {
                    log::warn!("dropped control command {:?}: {}", line, e);
                    json!({ "error": e.to_string() })
                },
            };
            if writeln!(writer, "{}", reply).is_err() {
                break;
            }
        }
    }

    /// Pending requests (non-blocking)
    pub fn poll(&self) -> Vec<Request> {
        self.receiver.try_iter().collect()
    }

    pub fn socket_path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Color;

    #[test]
    fn test_client_roundtrip() {
        let (client, server) = UnixStream::pair().unwrap();
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || Controller::handle_client(server, &tx));

        let mut writer = client.try_clone().unwrap();
        writeln!(writer, r#"["get_pixel", 1, 2]"#).unwrap();

        let req = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(req.command, Command::GetPixel { x: 1, y: 2 });
        req.respond(Ok(CommandOutput::Color(Color::WHITE)));

        let mut lines = BufReader::new(client.try_clone().unwrap()).lines();
        let reply: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
        assert_eq!(reply, json!({"ok": {"r": 255, "g": 255, "b": 255, "a": 255}}));

        writeln!(writer, r#"["bogus_op"]"#).unwrap();
        let reply: Value = serde_json::from_str(&lines.next().unwrap().unwrap()).unwrap();
        assert!(reply["error"].as_str().unwrap().contains("bogus_op"));

        drop(writer);
        drop(lines);
        drop(client);
        worker.join().unwrap();
    }

    #[test]
    fn test_result_json() {
        assert_eq!(result_to_json(Ok(CommandOutput::None)), json!({"ok": null}));
        let err = result_to_json(Err(RenderError::UnknownMesh("m".into())));
        assert_eq!(err, json!({"error": "unknown mesh: m"}));
    }

    #[test]
    fn test_bind_and_cleanup() {
        let path = std::env::temp_dir().join(format!("softraster-ctl-{}.sock", std::process::id()));
        {
            let ctl = Controller::bind(&path).unwrap();
            assert!(ctl.socket_path().exists());
            assert!(ctl.poll().is_empty());
        }
        assert!(!path.exists());
    }
}
