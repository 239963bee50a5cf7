//! Shared test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use serde_json::{Value, json};
use tempfile::TempDir;

/// Environment variables the binary reads; cleared so the host never leaks in
const APP_ENV_VARS: &[&str] = &[
    "CHAT_ARCHIVE_ENV",
    "CHAT_ARCHIVE_TIMELINE_URL",
    "CHAT_ARCHIVE_TIMELINE_FILE",
    "CHAT_ARCHIVE_SUMMARY_ENDPOINT",
    "CHAT_ARCHIVE_SUMMARY_MODEL",
    "GROQ_API_KEY",
    "RUST_LOG",
];

/// Builder for timeline documents
pub struct TimelineBuilder {
    days: Vec<Value>,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self { days: Vec::new() }
    }

    /// Add a day with the given messages
    pub fn day(mut self, date: &str, messages: &[MessageBuilder]) -> Self {
        let messages: Vec<Value> = messages.iter().map(MessageBuilder::to_value).collect();
        self.days.push(json!({ "date": date, "messages": messages }));
        self
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.days).expect("Failed to serialize timeline")
    }

    /// Write the document to `dir/timeline.json` and return its path
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("timeline.json");
        fs::write(&path, self.to_json()).expect("Failed to write timeline");
        path
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one timeline message
pub struct MessageBuilder {
    sender: String,
    time: String,
    message_type: String,
    content: String,
    video_url: Option<String>,
}

impl MessageBuilder {
    pub fn text(sender: &str, time: &str, content: &str) -> Self {
        Self {
            sender: sender.to_string(),
            time: time.to_string(),
            message_type: "text".to_string(),
            content: content.to_string(),
            video_url: None,
        }
    }

    pub fn image(sender: &str, time: &str, path: &str) -> Self {
        Self { message_type: "image".to_string(), ..Self::text(sender, time, path) }
    }

    pub fn transcript(content: &str) -> Self {
        Self { message_type: "transcript".to_string(), ..Self::text("Archive Bot", "", content) }
    }

    pub fn video_url(mut self, url: &str) -> Self {
        self.video_url = Some(url.to_string());
        self
    }

    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "sender": self.sender,
            "time": self.time,
            "type": self.message_type,
            "content": self.content,
        });
        if let Some(url) = &self.video_url {
            value["video_url"] = json!(url);
        }
        value
    }
}

/// Small archive covering every message kind
pub fn sample_timeline() -> TimelineBuilder {
    let long_text = format!("Sleep hygiene notes. {}", "Keep a regular schedule. ".repeat(40));
    TimelineBuilder::new()
        .day(
            "09/28/2025",
            &[
                MessageBuilder::text("Amy", "5:59:40 PM", "Hello everyone"),
                MessageBuilder::text("Bob", "6:00:00 PM", "Morning run done"),
                MessageBuilder::image("Bob", "6:01:02 PM", "/static/00000012-PHOTO.jpg"),
            ],
        )
        .day(
            "09/29/2025",
            &[
                MessageBuilder::text("Amy", "8:15:00 AM", "watch https://youtu.be/abc123")
                    .video_url("https://www.youtube.com/watch?v=abc123"),
                MessageBuilder::transcript("[Video Transcript] Morning routine\nwake up early"),
                MessageBuilder::text("Cleo", "9:00:00 AM", &long_text),
            ],
        )
}

/// Builder for chat export files
pub struct ChatExportBuilder {
    lines: Vec<String>,
    transcripts: Vec<String>,
}

impl ChatExportBuilder {
    pub fn new() -> Self {
        Self { lines: Vec::new(), transcripts: Vec::new() }
    }

    /// Add a chat line, `stamp` like `9/28/25, 5:59:40 PM`
    pub fn line(mut self, stamp: &str, sender: &str, text: &str) -> Self {
        self.lines.push(format!("[{}] {}: {}", stamp, sender, text));
        self
    }

    /// Add a raw line (continuations, malformed input)
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Append a transcript block for `url`
    pub fn transcript(mut self, title: &str, url: &str, body: &str) -> Self {
        self.transcripts.push(format!("[Video Transcript] {}\nURL: {}\n{}", title, url, body));
        self
    }

    pub fn build(&self) -> String {
        let mut out = self.lines.join("\n");
        for block in &self.transcripts {
            out.push('\n');
            out.push_str(&"=".repeat(64));
            out.push('\n');
            out.push_str(block);
        }
        out.push('\n');
        out
    }

    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("_chat.txt");
        fs::write(&path, self.build()).expect("Failed to write chat export");
        path
    }
}

impl Default for ChatExportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Temporary HOME with config, cache and credentials isolated from the host
pub struct IsolatedHome {
    temp_dir: TempDir,
}

impl IsolatedHome {
    pub fn new() -> Self {
        Self { temp_dir: TempDir::new().expect("Failed to create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Command for the binary with HOME and XDG dirs pointing here
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_chat-archive-explorer"));
        for var in APP_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join(".config"))
            .env("XDG_CACHE_HOME", self.path().join(".cache"));
        cmd
    }
}

impl Default for IsolatedHome {
    fn default() -> Self {
        Self::new()
    }
}

/// Serve one canned HTTP response on a local port and return its base URL
///
/// The request head is drained before replying so the client sees a clean
/// exchange.
pub fn serve_once(status: u16, body: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind test server");
    let addr = listener.local_addr().expect("Failed to read local addr");
    let body = body.to_string();

    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut content_length = 0usize;
            let mut line = String::new();
            while reader.read_line(&mut line).map(|n| n > 0).unwrap_or(false) {
                if line == "\r\n" {
                    break;
                }
                if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
                line.clear();
            }
            let mut request_body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut request_body);

            let response = format!(
                "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\
                 Connection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}", addr)
}
