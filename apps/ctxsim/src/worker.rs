//! Message-passing façade over ingestion.
//!
//! Requests and responses are plain serde values tagged by `type`, so the
//! same protocol works in-process, across a thread, or serialized as JSON.
//! Each request produces zero or more `scan_progress` messages followed by
//! exactly one terminal message with the same id.

use crate::error::ZipScanErrorKind;
use crate::ingest::{self, FileLike, RepoPathParseResult, ScanOptions, ScanProgress};
use crate::models::RepoScanResult;
use serde::{Deserialize, Serialize};
use std::sync::mpsc;
use std::thread;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanRequest {
    ParseTree {
        id: u64,
        text: String,
    },
    ScanZip {
        id: u64,
        data: Vec<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ScanOptions>,
    },
    ScanFileList {
        id: u64,
        files: Vec<FileLike>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ScanOptions>,
    },
}

impl ScanRequest {
    pub fn id(&self) -> u64 {
        match self {
            ScanRequest::ParseTree { id, .. }
            | ScanRequest::ScanZip { id, .. }
            | ScanRequest::ScanFileList { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOrigin {
    Zip,
    FileList,
    ParseTree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ZipScanErrorKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScanResponse {
    ParseTreeResult {
        id: u64,
        result: RepoPathParseResult,
    },
    ScanResult {
        id: u64,
        origin: ScanOrigin,
        result: RepoScanResult,
    },
    ScanProgress {
        id: u64,
        origin: ScanOrigin,
        progress: ScanProgress,
    },
    ScanError {
        id: u64,
        origin: ScanOrigin,
        error: ScanErrorPayload,
    },
}

impl ScanResponse {
    pub fn id(&self) -> u64 {
        match self {
            ScanResponse::ParseTreeResult { id, .. }
            | ScanResponse::ScanResult { id, .. }
            | ScanResponse::ScanProgress { id, .. }
            | ScanResponse::ScanError { id, .. } => *id,
        }
    }

    /// False only for progress updates.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScanResponse::ScanProgress { .. })
    }
}

/// Run one request, posting progress and then one terminal response.
pub fn handle_scan_worker_request<F>(request: ScanRequest, post: &mut F)
where
    F: FnMut(ScanResponse),
{
    log::debug!("worker request {}", request.id());
    match request {
        ScanRequest::ParseTree { id, text } => {
            let result = ingest::parse_repo_input(&text);
            post(ScanResponse::ParseTreeResult { id, result });
        }
        ScanRequest::ScanZip { id, data, options } => {
            let options = options.unwrap_or_default();
            let outcome = ingest::scan_zip_with_progress(&data, &options, &mut |progress| {
                post(ScanResponse::ScanProgress {
                    id,
                    origin: ScanOrigin::Zip,
                    progress,
                })
            });
            match outcome {
                Ok(result) => post(ScanResponse::ScanResult {
                    id,
                    origin: ScanOrigin::Zip,
                    result,
                }),
                Err(err) => post(ScanResponse::ScanError {
                    id,
                    origin: ScanOrigin::Zip,
                    error: ScanErrorPayload {
                        name: Some("ZipScanError".into()),
                        message: err.message,
                        kind: Some(err.kind),
                    },
                }),
            }
        }
        ScanRequest::ScanFileList { id, files, options } => {
            let options = options.unwrap_or_default();
            let result = ingest::scan_file_list_with_progress(&files, &options, &mut |progress| {
                post(ScanResponse::ScanProgress {
                    id,
                    origin: ScanOrigin::FileList,
                    progress,
                })
            });
            post(ScanResponse::ScanResult {
                id,
                origin: ScanOrigin::FileList,
                result,
            });
        }
    }
}

/// Background scanner on a dedicated thread. Requests are handled one at
/// a time in submission order.
pub struct ScanWorker {
    requests: Option<mpsc::Sender<ScanRequest>>,
    responses: mpsc::Receiver<ScanResponse>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ScanWorker {
    pub fn spawn() -> std::io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<ScanRequest>();
        let (response_tx, response_rx) = mpsc::channel::<ScanResponse>();
        let handle = thread::Builder::new()
            .name("ctxsim-scan-worker".into())
            .spawn(move || {
                for request in request_rx {
                    let mut post = |response: ScanResponse| {
                        if response_tx.send(response).is_err() {
                            log::debug!("scan worker response dropped; receiver closed");
                        }
                    };
                    handle_scan_worker_request(request, &mut post);
                }
                log::debug!("scan worker queue closed");
            })?;
        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        })
    }

    /// Queue a request. Returns false if the worker thread has exited.
    pub fn submit(&self, request: ScanRequest) -> bool {
        self.requests
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok())
    }

    pub fn responses(&self) -> &mpsc::Receiver<ScanResponse> {
        &self.responses
    }

    /// Block until the terminal response for `id`, discarding progress and
    /// responses for other ids.
    pub fn wait_for(&self, id: u64) -> Option<ScanResponse> {
        self.responses
            .iter()
            .find(|response| response.id() == id && response.is_terminal())
    }
}

impl Drop for ScanWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("scan worker thread panicked");
            }
        }
    }
}
