//! mpv player backend
//!
//! Spawns `mpv` with a JSON IPC socket and drives it with property reads and
//! writes. mpv resolves YouTube URLs through its ytdl hook, so load failures
//! arrive as ytdl log messages followed by an `end-file` event.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::UnixStream;
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::process::{Child, Command};

use super::error::WidgetFault;
use super::id::VideoId;
use super::widget::{VideoWidget, WidgetFactory, WidgetStatus};

/// How long to wait for the IPC socket to appear
const CONNECT_ATTEMPTS: usize = 50;
const CONNECT_BACKOFF: Duration = Duration::from_millis(100);
/// Upper bound for a single IPC reply
const REPLY_TIMEOUT: Duration = Duration::from_secs(2);
/// Grace period for mpv to exit after `quit`
const QUIT_TIMEOUT: Duration = Duration::from_secs(2);

/// One line received on the IPC socket: either a reply or an event
#[derive(Debug, Default, Deserialize)]
struct IpcMessage {
    request_id: Option<u64>,
    error: Option<String>,
    data: Option<Value>,
    event: Option<String>,
    reason: Option<String>,
    file_error: Option<String>,
    prefix: Option<String>,
    level: Option<String>,
    text: Option<String>,
}

/// Map ytdl/mpv failure text to a widget error code
pub fn classify_load_error(text: &str) -> i32 {
    let text = text.to_lowercase();

    const RESTRICTED: &[&str] = &[
        "sign in to confirm your age",
        "age-restricted",
        "embedding",
        "not made this video available in your country",
        "blocked it in your country",
        "members-only",
    ];
    const UNAVAILABLE: &[&str] = &[
        "video unavailable",
        "private video",
        "has been removed",
        "does not exist",
        "is not available",
        "account associated with this video has been terminated",
    ];

    if RESTRICTED.iter().any(|needle| text.contains(needle)) {
        WidgetFault::EMBED_RESTRICTED
    } else if UNAVAILABLE.iter().any(|needle| text.contains(needle)) {
        WidgetFault::NOT_FOUND
    } else {
        WidgetFault::PLAYER_FAULT
    }
}

/// Reply payload or mpv's error string
type Reply = Result<Value, String>;

/// A running mpv process bound to one video
pub struct MpvWidget {
    child: Child,
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
    socket_path: PathBuf,
    next_request_id: u64,
    /// Most recent ytdl/mpv error text, used to classify a load failure
    last_error_text: Option<String>,
    fault: Option<WidgetFault>,
    last_time: f64,
}

impl MpvWidget {
    async fn launch(binary: &str, video_id: &VideoId) -> Result<Self, WidgetFault> {
        let socket_path = std::env::temp_dir()
            .join(format!("tubequiz-mpv-{}-{}.sock", std::process::id(), video_id));
        let _ = std::fs::remove_file(&socket_path);

        let mut child = Command::new(binary)
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .arg("--idle=yes")
            .arg("--keep-open=yes")
            .arg("--force-window=immediate")
            .arg("--no-terminal")
            .arg(format!("--title=tubequiz: {}", video_id))
            .arg(video_id.watch_url())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                WidgetFault::new(WidgetFault::PLAYER_FAULT, format!("failed to start {binary}: {e}"))
            })?;

        let stream = Self::connect(&mut child, &socket_path).await?;
        Self::from_stream(child, stream, socket_path).handshake().await
    }

    fn from_stream(child: Child, stream: UnixStream, socket_path: PathBuf) -> Self {
        let (read_half, writer) = stream.into_split();
        Self {
            child,
            lines: BufReader::new(read_half).lines(),
            writer,
            socket_path,
            next_request_id: 1,
            last_error_text: None,
            fault: None,
            last_time: 0.0,
        }
    }

    /// Subscribe to mpv's log so load failures can be classified.
    /// On failure the socket file is removed; `kill_on_drop` takes the process.
    async fn handshake(mut self) -> Result<Self, WidgetFault> {
        let subscribed =
            self.request(json!(["request_log_messages", "warn"])).await.and_then(|reply| reply);
        if let Err(e) = subscribed {
            let _ = std::fs::remove_file(&self.socket_path);
            return Err(WidgetFault::new(WidgetFault::PLAYER_FAULT, e));
        }
        Ok(self)
    }

    async fn connect(child: &mut Child, socket_path: &Path) -> Result<UnixStream, WidgetFault> {
        for _ in 0..CONNECT_ATTEMPTS {
            if let Ok(stream) = UnixStream::connect(socket_path).await {
                return Ok(stream);
            }
            if let Ok(Some(status)) = child.try_wait() {
                return Err(WidgetFault::new(
                    WidgetFault::PLAYER_FAULT,
                    format!("mpv exited before opening IPC ({status})"),
                ));
            }
            tokio::time::sleep(CONNECT_BACKOFF).await;
        }
        let _ = child.start_kill();
        Err(WidgetFault::new(WidgetFault::PLAYER_FAULT, "mpv IPC socket never appeared"))
    }

    /// Send a command and wait for its reply. The outer error is transport
    /// failure; the inner one is mpv rejecting the command.
    async fn request(&mut self, command: Value) -> Result<Reply, String> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;

        let mut line = json!({ "command": command, "request_id": request_id }).to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.map_err(|e| e.to_string())?;

        loop {
            let next = tokio::time::timeout(REPLY_TIMEOUT, self.lines.next_line())
                .await
                .map_err(|_| "mpv IPC reply timed out".to_string())?
                .map_err(|e| e.to_string())?;

            let Some(raw) = next else {
                return Err("mpv IPC connection closed".to_string());
            };

            let message: IpcMessage = match serde_json::from_str(&raw) {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!("Ignoring unparseable mpv message {:?}: {}", raw, e);
                    continue;
                }
            };

            if message.event.is_some() {
                self.observe_event(message);
                continue;
            }

            if message.request_id == Some(request_id) {
                return Ok(match message.error.as_deref() {
                    Some("success") | None => Ok(message.data.unwrap_or(Value::Null)),
                    Some(other) => Err(other.to_string()),
                });
            }
        }
    }

    fn observe_event(&mut self, message: IpcMessage) {
        match message.event.as_deref() {
            Some("log-message") => {
                let is_error = matches!(message.level.as_deref(), Some("error" | "fatal"));
                if is_error || message.prefix.as_deref() == Some("ytdl_hook") {
                    if let Some(text) = message.text {
                        tracing::debug!("mpv [{:?}] {}", message.prefix, text.trim_end());
                        self.last_error_text = Some(text);
                    }
                }
            }
            Some("end-file") if message.reason.as_deref() == Some("error") => {
                let text = self
                    .last_error_text
                    .clone()
                    .or(message.file_error)
                    .unwrap_or_else(|| "playback failed".to_string());
                self.fault = Some(WidgetFault::new(classify_load_error(&text), text));
            }
            Some(other) => tracing::trace!("mpv event {}", other),
            None => {}
        }
    }

    fn transport_fault(detail: String) -> WidgetFault {
        WidgetFault::new(WidgetFault::PLAYER_FAULT, detail)
    }

    async fn set_pause(&mut self, pause: bool) -> Result<(), WidgetFault> {
        self.request(json!(["set_property", "pause", pause]))
            .await
            .map_err(Self::transport_fault)?
            .map(|_| ())
            .map_err(Self::transport_fault)
    }
}

#[async_trait]
impl VideoWidget for MpvWidget {
    async fn status(&mut self) -> WidgetStatus {
        if let Ok(Some(status)) = self.child.try_wait() {
            return WidgetStatus::Failed(
                self.fault.clone().unwrap_or_else(|| {
                    WidgetFault::new(WidgetFault::PLAYER_FAULT, format!("mpv exited ({status})"))
                }),
            );
        }

        let reply = self.request(json!(["get_property", "duration"])).await;
        if let Some(fault) = &self.fault {
            return WidgetStatus::Failed(fault.clone());
        }

        match reply {
            Ok(Ok(value)) => match value.as_f64() {
                Some(duration) => WidgetStatus::Ready { duration },
                None => WidgetStatus::Loading,
            },
            // "property unavailable" until the stream is opened
            Ok(Err(_)) => WidgetStatus::Loading,
            Err(e) => WidgetStatus::Failed(Self::transport_fault(e)),
        }
    }

    async fn current_time(&mut self) -> Result<f64, WidgetFault> {
        match self.request(json!(["get_property", "time-pos"])).await {
            Ok(Ok(value)) => {
                if let Some(t) = value.as_f64() {
                    self.last_time = t;
                }
                Ok(self.last_time)
            }
            Ok(Err(_)) => Ok(self.last_time),
            Err(e) => Err(Self::transport_fault(e)),
        }
    }

    async fn pause(&mut self) -> Result<(), WidgetFault> {
        self.set_pause(true).await
    }

    async fn resume(&mut self) -> Result<(), WidgetFault> {
        self.set_pause(false).await
    }

    async fn destroy(&mut self) {
        let _ = self.request(json!(["quit"])).await;
        match tokio::time::timeout(QUIT_TIMEOUT, self.child.wait()).await {
            Ok(Ok(status)) => tracing::debug!("mpv exited with {}", status),
            _ => {
                tracing::warn!("mpv did not quit in time, killing it");
                let _ = self.child.kill().await;
            }
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

/// Launches one mpv process per video
#[derive(Debug, Clone)]
pub struct MpvFactory {
    binary: String,
}

impl MpvFactory {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }
}

#[async_trait]
impl WidgetFactory for MpvFactory {
    async fn create(&self, video_id: &VideoId) -> Result<Box<dyn VideoWidget>, WidgetFault> {
        let widget = MpvWidget::launch(&self.binary, video_id).await?;
        Ok(Box::new(widget))
    }

    fn name(&self) -> &'static str {
        "mpv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_ytdl_messages() {
        assert_eq!(
            classify_load_error("ERROR: [youtube] abc: Video unavailable. This video is private"),
            WidgetFault::NOT_FOUND
        );
        assert_eq!(
            classify_load_error("ERROR: [youtube] abc: Sign in to confirm your age."),
            WidgetFault::EMBED_RESTRICTED
        );
        assert_eq!(classify_load_error("loading failed"), WidgetFault::PLAYER_FAULT);
    }

    #[test]
    fn parses_reply_and_event_lines() {
        let reply: IpcMessage =
            serde_json::from_str(r#"{"data":12.5,"request_id":3,"error":"success"}"#).unwrap();
        assert_eq!(reply.request_id, Some(3));
        assert_eq!(reply.data.and_then(|v| v.as_f64()), Some(12.5));

        let event: IpcMessage = serde_json::from_str(
            r#"{"event":"end-file","reason":"error","playlist_entry_id":1,"file_error":"loading failed"}"#,
        )
        .unwrap();
        assert_eq!(event.event.as_deref(), Some("end-file"));
        assert_eq!(event.file_error.as_deref(), Some("loading failed"));
    }

    #[tokio::test]
    async fn failed_handshake_removes_socket_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let socket_path = dir.path().join("mpv.sock");
        std::fs::write(&socket_path, "").unwrap();

        let child = Command::new("true").kill_on_drop(true).spawn().unwrap();
        let (ours, theirs) = UnixStream::pair().unwrap();
        drop(theirs);

        let fault = MpvWidget::from_stream(child, ours, socket_path.clone())
            .handshake()
            .await
            .err()
            .unwrap();
        assert_eq!(fault.code, WidgetFault::PLAYER_FAULT);
        assert!(!socket_path.exists());
    }

    #[tokio::test]
    async fn missing_binary_is_a_player_fault() {
        let factory = MpvFactory::new("/nonexistent/tubequiz-mpv");
        let video = VideoId::parse("dQw4w9WgXcQ").unwrap();
        let fault = factory.create(&video).await.err().unwrap();
        assert_eq!(fault.code, WidgetFault::PLAYER_FAULT);
    }
}
