use serde::{Deserialize, Serialize};

/// Named memory block; part of the program's valid address set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryBlockRecord {
    /// Block name (e.g., ".text").
    pub name: String,
    /// First address of the block.
    pub start: u64,
    /// One past the last address of the block.
    pub end: u64,
}

impl MemoryBlockRecord {
    pub fn new(name: impl Into<String>, start: u64, end: u64) -> Self {
        Self { name: name.into(), start, end }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImportRunStatus {
    /// Every processed entry was imported or skipped.
    Succeeded,
    /// At least one entry failed and was logged.
    Partial,
}

impl ImportRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportRunStatus::Succeeded => "succeeded",
            ImportRunStatus::Partial => "partial",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "succeeded" => ImportRunStatus::Succeeded,
            _ => ImportRunStatus::Partial,
        }
    }
}

/// Record describing one import of an entry dump, for bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportRunRecord {
    /// Path of the entry dump, as given on the command line.
    pub source: String,
    /// SHA-256 of the entry dump.
    pub source_hash: Option<String>,
    pub status: ImportRunStatus,
    pub started_at: String,
    pub finished_at: String,
    pub created: u32,
    pub renamed: u32,
    pub skipped: u32,
    pub failed: u32,
}
