//! Thread-safe parser pool for tree-sitter parsers
//!
//! Tree-sitter parsers are not Send + Sync, so each worker thread owns one
//! parser and requests reach it over a channel.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use anyhow::Result;
use tree_sitter::{Language, Parser};

/// Supported file types for parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Rust,
}

impl FileType {
    /// Determine file type from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "rs" => Some(FileType::Rust),
            _ => None,
        }
    }

    pub fn language(&self) -> Language {
        match self {
            FileType::Rust => tree_sitter_rust::LANGUAGE.into(),
        }
    }
}

/// A parsing request sent to the parser pool
#[derive(Debug)]
pub struct ParseRequest {
    pub file_type: FileType,
    pub content: String,
    pub path: PathBuf,
}

/// Result of a parsing operation
#[derive(Debug)]
pub struct ParseResult {
    pub tree: tree_sitter::Tree,
    pub path: PathBuf,
    pub content: String,
}

#[derive(Debug)]
struct WorkerRequest {
    request: ParseRequest,
    response_sender: Sender<Result<ParseResult>>,
}

/// Pool of parser threads. Cloning shares the same workers.
#[derive(Clone)]
pub struct ParserPool {
    sender: Sender<WorkerRequest>,
}

impl ParserPool {
    /// Create a new parser pool with the specified number of worker threads
    pub fn new(num_workers: usize) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel::<WorkerRequest>();
        let receiver = Arc::new(Mutex::new(receiver));

        for i in 0..num_workers.max(1) {
            let receiver = Arc::clone(&receiver);
            std::thread::spawn(move || {
                Self::worker_thread(i, receiver);
            });
        }

        Self { sender }
    }

    fn worker_thread(worker_id: usize, receiver: Arc<Mutex<Receiver<WorkerRequest>>>) {
        tracing::debug!("Parser worker {} started", worker_id);

        let mut parser = Parser::new();

        loop {
            let next = {
                let guard = receiver.lock().unwrap_or_else(|e| e.into_inner());
                guard.recv()
            };
            let Ok(WorkerRequest { request, response_sender }) = next else {
                tracing::debug!("Parser worker {} shutting down", worker_id);
                break;
            };

            let result = Self::parse_one(&mut parser, request);

            if response_sender.send(result).is_err() {
                tracing::warn!("Failed to send parse result back to caller");
            }
        }
    }

    fn parse_one(parser: &mut Parser, request: ParseRequest) -> Result<ParseResult> {
        parser
            .set_language(&request.file_type.language())
            .map_err(|e| anyhow::anyhow!("Failed to set language: {}", e))?;

        let tree = parser
            .parse(&request.content, None)
            .ok_or_else(|| anyhow::anyhow!("Failed to parse {}", request.path.display()))?;

        Ok(ParseResult {
            tree,
            path: request.path,
            content: request.content,
        })
    }

    fn submit(sender: &Sender<WorkerRequest>, request: ParseRequest) -> Result<ParseResult> {
        let (response_sender, response_receiver) = std::sync::mpsc::channel();

        sender
            .send(WorkerRequest { request, response_sender })
            .map_err(|_| anyhow::anyhow!("Parser pool is shut down"))?;

        response_receiver
            .recv()
            .map_err(|_| anyhow::anyhow!("Parser worker died"))?
    }

    /// Parse content, blocking the current thread until a worker answers.
    pub fn parse_blocking(&self, request: ParseRequest) -> Result<ParseResult> {
        Self::submit(&self.sender, request)
    }

    /// Parse content from async code without blocking the runtime.
    pub async fn parse(&self, request: ParseRequest) -> Result<ParseResult> {
        let sender = self.sender.clone();
        tokio::task::spawn_blocking(move || Self::submit(&sender, request))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
    }
}

/// Create a parser pool sized to the machine, with at least two workers.
pub fn create_parser_pool() -> ParserPool {
    let num_workers = std::thread::available_parallelism()
        .map(|n| n.get().max(2))
        .unwrap_or(2);

    ParserPool::new(num_workers)
}
