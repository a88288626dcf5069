//! Shared helpers for end-to-end tests driving `LspService` directly

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use semver::Version;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::Service;
use tower_lsp::jsonrpc::{Request, Response};
use tower_lsp::{ClientSocket, LspService};

use sqlfluff_lsp::linter::{
    FixResult, LintResult, Linter, LinterConfig, LinterError, Violation,
};
use sqlfluff_lsp::lsp::backend::Backend;

/// Linter double returning canned results per source text
#[derive(Default)]
pub struct MockLinter {
    violations: HashMap<String, Vec<Violation>>,
    fixes: HashMap<String, FixResult>,
    fail_config: bool,
    fail_lint: bool,
    fail_fix: bool,
    lint_calls: Mutex<Vec<String>>,
}

impl MockLinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_violations(mut self, source: &str, violations: Vec<Violation>) -> Self {
        self.violations.insert(source.to_string(), violations);
        self
    }

    pub fn with_fix(mut self, source: &str, fixed: &str, success: bool) -> Self {
        self.fixes
            .insert(source.to_string(), FixResult::new(fixed, success));
        self
    }

    pub fn failing_config(mut self) -> Self {
        self.fail_config = true;
        self
    }

    pub fn failing_lint(mut self) -> Self {
        self.fail_lint = true;
        self
    }

    pub fn failing_fix(mut self) -> Self {
        self.fail_fix = true;
        self
    }

    /// Sources passed to `lint`, in call order
    pub fn lint_calls(&self) -> Vec<String> {
        self.lint_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Linter for MockLinter {
    async fn resolve_config(&self, root: &Path) -> Result<LinterConfig, LinterError> {
        if self.fail_config {
            return Err(LinterError::ConfigResolution(
                "no sqlfluff executable".to_string(),
            ));
        }
        Ok(LinterConfig {
            root: root.to_path_buf(),
            config_files: vec![PathBuf::from(".sqlfluff")],
            version: Version::new(3, 0, 7),
        })
    }

    async fn lint(&self, source: &str, _config: &LinterConfig) -> Result<LintResult, LinterError> {
        self.lint_calls.lock().unwrap().push(source.to_string());
        if self.fail_lint {
            return Err(LinterError::InvalidOutput("not json".to_string()));
        }
        let violations = self.violations.get(source).cloned().unwrap_or_default();
        Ok(LintResult::from_violations(violations))
    }

    async fn fix(&self, source: &str, _config: &LinterConfig) -> Result<FixResult, LinterError> {
        if self.fail_fix {
            return Err(LinterError::Failed {
                status: "exit status: 2".to_string(),
                stderr: "No dialect was specified.".to_string(),
            });
        }
        Ok(self
            .fixes
            .get(source)
            .cloned()
            .unwrap_or_else(|| FixResult::new(source, true)))
    }
}

pub fn create_service(linter: Arc<MockLinter>) -> (LspService<Backend>, ClientSocket) {
    LspService::build(|client| Backend::build(client, linter)).finish()
}

pub fn create_initialize_request(id: i64) -> Request {
    Request::build("initialize")
        .params(json!({
            "capabilities": {},
            "rootUri": "file:///project"
        }))
        .id(id)
        .finish()
}

pub fn create_initialized_notification() -> Request {
    Request::build("initialized").params(json!({})).finish()
}

pub fn create_did_open_notification(uri: &str, text: &str) -> Request {
    Request::build("textDocument/didOpen")
        .params(json!({
            "textDocument": {
                "uri": uri,
                "languageId": "sql",
                "version": 1,
                "text": text
            }
        }))
        .finish()
}

pub fn create_did_change_notification(uri: &str, version: i32, text: &str) -> Request {
    Request::build("textDocument/didChange")
        .params(json!({
            "textDocument": { "uri": uri, "version": version },
            "contentChanges": [{ "text": text }]
        }))
        .finish()
}

/// didChange without any content change
pub fn create_empty_change_notification(uri: &str, version: i32) -> Request {
    Request::build("textDocument/didChange")
        .params(json!({
            "textDocument": { "uri": uri, "version": version },
            "contentChanges": []
        }))
        .finish()
}

pub fn create_did_close_notification(uri: &str) -> Request {
    Request::build("textDocument/didClose")
        .params(json!({ "textDocument": { "uri": uri } }))
        .finish()
}

pub fn create_formatting_request(id: i64, uri: &str) -> Request {
    Request::build("textDocument/formatting")
        .params(json!({
            "textDocument": { "uri": uri },
            "options": { "tabSize": 4, "insertSpaces": true }
        }))
        .id(id)
        .finish()
}

pub fn create_code_action_request(id: i64, uri: &str, range: Value, diagnostics: Value) -> Request {
    Request::build("textDocument/codeAction")
        .params(json!({
            "textDocument": { "uri": uri },
            "range": range,
            "context": { "diagnostics": diagnostics }
        }))
        .id(id)
        .finish()
}

/// Sends `request` and returns the result payload of the response
pub async fn call(service: &mut LspService<Backend>, request: Request) -> Value {
    let response = service
        .call(request)
        .await
        .unwrap()
        .expect("Expected a response");
    let (_, result) = response.into_parts();
    result.expect("Expected a successful response")
}

/// Forwards server notifications to a channel and answers `workspace/configuration`
/// requests with `settings`
pub fn spawn_client(socket: ClientSocket, settings: Value) -> mpsc::UnboundedReceiver<Request> {
    let (tx, rx) = mpsc::unbounded_channel();
    let (mut requests, mut responses) = socket.split();

    tokio::spawn(async move {
        while let Some(request) = requests.next().await {
            if request.method() == "workspace/configuration" {
                if let Some(id) = request.id().cloned() {
                    let response = Response::from_ok(id, json!([settings.clone()]));
                    if responses.send(response).await.is_err() {
                        break;
                    }
                }
                continue;
            }
            if tx.send(request).is_err() {
                break;
            }
        }
    });

    rx
}

pub fn spawn_notification_collector(socket: ClientSocket) -> mpsc::UnboundedReceiver<Request> {
    spawn_client(socket, json!({}))
}

pub async fn wait_for_notification(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    method: &str,
) -> Option<Request> {
    let timeout = Duration::from_secs(5);
    tokio::time::timeout(timeout, async {
        while let Some(request) = rx.recv().await {
            if request.method() == method {
                return Some(request);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

/// Initializes the service and completes the `initialized` handshake
pub async fn initialize(service: &mut LspService<Backend>) -> Value {
    let result = call(service, create_initialize_request(1)).await;
    service
        .call(create_initialized_notification())
        .await
        .unwrap();
    result
}

/// Waits for a `window/logMessage` notification whose message contains `needle`
pub async fn wait_for_log_message(
    rx: &mut mpsc::UnboundedReceiver<Request>,
    needle: &str,
) -> Option<String> {
    loop {
        let notification = wait_for_notification(rx, "window/logMessage").await?;
        let message = notification
            .params()
            .and_then(|params| params.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default();
        if message.contains(needle) {
            return Some(message.to_string());
        }
    }
}
