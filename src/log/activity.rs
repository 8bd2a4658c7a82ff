/// Session activity log
///
/// Records what the user did during a session (files loaded, source
/// switches, exports) in order, with timestamps. Exportable as
/// human-readable text or JSON.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// 1-based position in the session
    pub sequence: usize,
    pub timestamp: DateTime<Local>,
    pub action: String,
    pub detail: String,
}

impl ActivityEntry {
    pub fn to_text(&self) -> String {
        format!(
            "[{:03}] {} | {} | {}",
            self.sequence,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.action,
            self.detail
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    pub session_id: String,
    pub session_start: DateTime<Local>,
    pub data_source: String,
    pub software_version: String,
    pub entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            session_start: Local::now(),
            data_source: String::new(),
            software_version: env!("CARGO_PKG_VERSION").to_string(),
            entries: Vec::new(),
        }
    }

    pub fn set_source(&mut self, source: &str) {
        self.data_source = source.to_string();
    }

    pub fn add_entry(&mut self, action: &str, detail: &str) {
        let seq = self.entries.len() + 1;
        self.entries.push(ActivityEntry {
            sequence: seq,
            timestamp: Local::now(),
            action: action.to_string(),
            detail: detail.to_string(),
        });
        log::info!("[{:03}] {}: {}", seq, action, detail);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Tensile Strength Dashboard - Activity Log\n");
        out.push_str(&format!("Session:  {}\n", self.session_id));
        out.push_str(&format!(
            "Started:  {}\n",
            self.session_start.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Data:     {}\n", self.data_source));
        out.push_str(&format!("Version:  {}\n", self.software_version));
        out.push_str(&format!("Entries:  {}\n\n", self.entries.len()));
        for entry in &self.entries {
            out.push_str(&entry.to_text());
            out.push('\n');
        }
        out
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// Write as JSON when the path ends in `.json`, plain text otherwise
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let is_json = path
            .extension()
            .map(|e| e.to_string_lossy().eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            std::fs::write(path, self.to_json())
        } else {
            std::fs::write(path, self.to_text())
        }
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_sequenced() {
        let mut log = ActivityLog::new();
        assert!(log.is_empty());
        log.add_entry("Load CSV", "data.csv: 120 rows");
        log.add_entry("Maxima Source", "Reference table");
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries[0].sequence, 1);
        assert_eq!(log.entries[1].sequence, 2);
        assert_eq!(log.entries[1].action, "Maxima Source");
    }

    #[test]
    fn test_text_export() {
        let mut log = ActivityLog::new();
        log.set_source("Combined_Sample_Data_Sigfigs.csv");
        log.add_entry("Export Tables", "summary.csv");
        let text = log.to_text();
        assert!(text.contains("Combined_Sample_Data_Sigfigs.csv"));
        assert!(text.contains("[001]"));
        assert!(text.contains("Export Tables | summary.csv"));
    }

    #[test]
    fn test_json_roundtrip() {
        let mut log = ActivityLog::new();
        log.add_entry("Scan Images", "ResearchPics: 8 images");
        let parsed: ActivityLog = serde_json::from_str(&log.to_json()).unwrap();
        assert_eq!(parsed.session_id, log.session_id);
        assert_eq!(parsed.entries.len(), 1);
    }

    #[test]
    fn test_save_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = ActivityLog::new();
        log.add_entry("Load CSV", "x.csv");

        let json_path = dir.path().join("log.json");
        log.save(&json_path).unwrap();
        let json = std::fs::read_to_string(&json_path).unwrap();
        assert!(json.trim_start().starts_with('{'));

        let txt_path = dir.path().join("log.txt");
        log.save(&txt_path).unwrap();
        let txt = std::fs::read_to_string(&txt_path).unwrap();
        assert!(txt.starts_with("Tensile Strength Dashboard"));
    }
}
