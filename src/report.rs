// src/report.rs

//! User-facing message stream
//!
//! A unified interface for the ordered informational/error/comment lines
//! the orchestrator emits while working. Implementations cover the CLI
//! (stdout/stderr), structured logging, and an in-memory recorder so tests
//! can assert on message sequencing, which is part of the installer's
//! contract.

use std::sync::Mutex;
use tracing::{error, info};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
    Comment,
}

/// One recorded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// Core trait for emitting user-facing messages
pub trait Reporter {
    /// Emit an informational line
    fn info(&self, message: &str);

    /// Emit an error line
    fn error(&self, message: &str);

    /// Emit a decorative/contextual line (separators and the like)
    fn comment(&self, message: &str);
}

/// Prints to stdout/stderr
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        println!("{message}");
    }

    fn error(&self, message: &str) {
        eprintln!("{message}");
    }

    fn comment(&self, message: &str) {
        println!("{message}");
    }
}

/// Routes messages through tracing instead of the terminal
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }

    fn comment(&self, message: &str) {
        info!("{message}");
    }
}

/// Records messages in memory for tests
#[derive(Debug, Default)]
pub struct MemoryReporter {
    messages: Mutex<Vec<Message>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded messages, in emission order
    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    /// Just the message texts, in emission order
    pub fn lines(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.text.clone())
            .collect()
    }

    /// Texts of messages at the given level, in emission order
    pub fn lines_at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.level == level)
            .map(|m| m.text.clone())
            .collect()
    }

    fn record(&self, level: Level, text: &str) {
        self.messages.lock().unwrap().push(Message {
            level,
            text: text.to_string(),
        });
    }
}

impl Reporter for MemoryReporter {
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn comment(&self, message: &str) {
        self.record(Level::Comment, message);
    }
}
