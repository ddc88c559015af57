use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

/// Default procfs mount
pub const PROC_ROOT: &str = "/proc";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total_kb: Option<u64>,
    pub available_kb: Option<u64>,
}

impl MemoryInfo {
    /// Share of memory in use, 0..=100
    pub fn used_percent(&self) -> Option<u8> {
        let (total, available) = (self.total_kb?, self.available_kb?);
        if total == 0 {
            return None;
        }
        let used = total.saturating_sub(available);
        Some(((used * 100) / total) as u8)
    }
}

/// One reading. Either half is `None` when its file was missing or unreadable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sample {
    pub load: Option<LoadAverage>,
    pub memory: Option<MemoryInfo>,
}

impl Sample {
    pub fn is_empty(&self) -> bool {
        self.load.is_none() && self.memory.is_none()
    }

    pub fn load_line(&self) -> String {
        match self.load {
            Some(load) => format!("load {:.2} {:.2} {:.2}", load.one, load.five, load.fifteen),
            None => "load n/a".to_string(),
        }
    }

    pub fn memory_line(&self) -> String {
        match self.memory.and_then(|m| m.used_percent().map(|p| (m, p))) {
            Some((memory, percent)) => format!(
                "memory {}% of {} MiB",
                percent,
                memory.total_kb.unwrap_or(0) / 1024
            ),
            None => "memory n/a".to_string(),
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.load_line(), self.memory_line())
    }
}

/// Reads load and memory figures below a procfs root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSampler {
    root: PathBuf,
}

impl Default for SystemSampler {
    fn default() -> Self {
        Self::new(PROC_ROOT)
    }
}

impl SystemSampler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sample(&self) -> Sample {
        Sample {
            load: self.read("loadavg").and_then(|text| parse_loadavg(&text)),
            memory: self.read("meminfo").map(|text| parse_meminfo(&text)),
        }
    }

    fn read(&self, file: &str) -> Option<String> {
        let path = self.root.join(file);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// First three fields of `loadavg`
pub fn parse_loadavg(text: &str) -> Option<LoadAverage> {
    let mut fields = text.split_whitespace().map(|f| f.parse::<f64>());
    let one = fields.next()?.ok()?;
    let five = fields.next()?.ok()?;
    let fifteen = fields.next()?.ok()?;
    Some(LoadAverage { one, five, fifteen })
}

/// `MemTotal` and `MemAvailable` from `meminfo`, in kB. First occurrence wins.
pub fn parse_meminfo(text: &str) -> MemoryInfo {
    let mut info = MemoryInfo::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let number = value.split_whitespace().next().unwrap_or("");
        let slot = match key.trim() {
            "MemTotal" => &mut info.total_kb,
            "MemAvailable" => &mut info.available_kb,
            _ => continue,
        };
        if slot.is_some() {
            continue;
        }
        match number.parse::<u64>() {
            Ok(kb) => *slot = Some(kb),
            Err(e) => warn!("Failed to parse {} value '{}': {}", key.trim(), number, e),
        }
    }
    info
}
