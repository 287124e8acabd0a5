//! Page API traffic recorder.
//!
//! Appends every page request and response (headers, plus JSON bodies when
//! the browser could still produce them) to a plain-text log file. Runs as
//! a network observer, so a write failure is logged and never reaches the
//! flow that registered it.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::warn;

use takeoff_browser::{NetworkObserver, RequestEvent, ResponseEvent};

pub struct ApiLogRecorder {
    path: PathBuf,
    file: Mutex<File>,
}

impl ApiLogRecorder {
    /// Open (or create) the log file in append mode.
    pub fn create(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, entry: &str) {
        let mut file = self.file.lock();
        if let Err(e) = writeln!(file, "{}", entry) {
            warn!(path = %self.path.display(), error = %e, "failed to append API log entry");
        }
    }
}

impl NetworkObserver for ApiLogRecorder {
    fn on_request(&self, event: &RequestEvent) {
        let mut entry = format!("=== Request ===\n{} {}\n", event.method, event.url);
        for (name, value) in &event.headers {
            entry.push_str(&format!("{}: {}\n", name, value));
        }
        if let Some(data) = &event.post_data {
            entry.push_str(&format!("Post data: {}\n", data));
        }
        self.append(&entry);
    }

    fn on_response(&self, event: &ResponseEvent) {
        let mut entry = format!(
            "=== Response ===\n{} {} ({})\n",
            event.status, event.url, event.mime_type
        );
        for (name, value) in &event.headers {
            entry.push_str(&format!("{}: {}\n", name, value));
        }
        if let Some(body) = &event.body {
            entry.push_str(&format!("Body: {}\n", body));
        }
        self.append(&entry);
    }
}
