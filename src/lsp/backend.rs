use std::sync::Arc;

use serde_json::Value;
use tower_lsp::jsonrpc::{self, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::{debug, error, info, warn};

use crate::config::{CONFIGURATION_SECTION, LinterOptions, SERVER_NAME, project_root};
use crate::linter::{Linter, SqlfluffCli};
use crate::lsp::code_action::{is_applicable, noqa_actions};
use crate::lsp::diagnostics::generate_diagnostics;
use crate::lsp::documents::Document;
use crate::lsp::formatting::{FormatOutcome, format_document};
use crate::lsp::session::{Session, server_config_from_items};

pub struct Backend {
    client: Client,
    linter: Arc<dyn Linter>,
    session: Arc<Session>,
}

impl Backend {
    pub fn new(client: Client, options: &LinterOptions) -> Self {
        let linter = SqlfluffCli::new(options.executable.clone(), options.timeout);
        Self::build(client, Arc::new(linter))
    }

    pub fn build(client: Client, linter: Arc<dyn Linter>) -> Self {
        Self {
            client,
            linter,
            session: Arc::new(Session::new()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn server_capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    ..Default::default()
                },
            )),
            document_formatting_provider: Some(OneOf::Left(true)),
            code_action_provider: Some(CodeActionProviderCapability::Options(
                CodeActionOptions {
                    code_action_kinds: Some(vec![
                        CodeActionKind::REFACTOR_INLINE,
                        CodeActionKind::REFACTOR_EXTRACT,
                    ]),
                    ..Default::default()
                },
            )),
            ..Default::default()
        }
    }

    /// Stores `text` for `uri`, lints it and publishes the resulting diagnostics.
    ///
    /// The document stays locked until the publish completes, so validations of
    /// the same URI never interleave.
    async fn update_and_validate(&self, uri: Url, text: String, version: Option<i32>) {
        let handle = self.session.documents().entry(&uri).await;
        let mut document = handle.lock().await;

        if !document.update(text, version) {
            debug!(
                "Ignoring stale content for {} (version {:?} < {:?})",
                uri, version, document.version
            );
        }

        self.validate(uri, &document).await;
    }

    /// Lints the stored content of `uri` again without changing it
    async fn revalidate(&self, uri: Url) {
        match self.session.documents().handle(&uri).await {
            Ok(handle) => {
                let document = handle.lock().await;
                self.validate(uri, &document).await;
            }
            Err(e) => {
                warn!("Skipping validation: {}", e);
                self.client.publish_diagnostics(uri, Vec::new(), None).await;
            }
        }
    }

    /// Lints `document` and publishes the diagnostics; the caller holds the document lock
    async fn validate(&self, uri: Url, document: &Document) {
        let diagnostics = match self.session.linter_config().await {
            Ok(config) => generate_diagnostics(&*self.linter, &config, &document.text).await,
            Err(e) => {
                warn!("Skipping validation of {}: {}", uri, e);
                Vec::new()
            }
        };

        self.client
            .log_message(
                MessageType::LOG,
                format!("Publishing {} diagnostics for {}", diagnostics.len(), uri),
            )
            .await;

        self.client
            .publish_diagnostics(uri, diagnostics, document.version)
            .await;
    }

    /// Requests the client settings in the background and marks the session ready
    async fn spawn_configuration_pull(&self) {
        let client = self.client.clone();
        let session = self.session.clone();

        let task = tokio::spawn(async move {
            let items = vec![ConfigurationItem {
                scope_uri: None,
                section: Some(CONFIGURATION_SECTION.to_string()),
            }];

            let values = match client.configuration(items).await {
                Ok(values) => values,
                Err(e) => {
                    warn!("Failed to fetch client configuration: {}", e);
                    return;
                }
            };

            let server_config = server_config_from_items(values);
            let message = format!("initialized: {}", Value::Object(server_config.clone()));

            if let Err(e) = session.set_server_config(server_config).await {
                warn!("Discarding client configuration: {}", e);
                return;
            }

            info!("{}", message);
            client.log_message(MessageType::INFO, message).await;
        });

        self.session.set_config_task(task).await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let root = project_root(&params);
        info!("Resolving linter configuration from {:?}", root);

        let linter_config = self.linter.resolve_config(&root).await.map_err(|e| {
            error!("Failed to resolve linter configuration: {}", e);
            jsonrpc::Error {
                message: e.to_string().into(),
                ..jsonrpc::Error::internal_error()
            }
        })?;

        self.session.initialize(linter_config).await;

        self.client
            .log_message(MessageType::INFO, "LSP server initializing")
            .await;

        Ok(InitializeResult {
            capabilities: Self::server_capabilities(),
            server_info: Some(ServerInfo {
                name: SERVER_NAME.to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "LSP server initialized")
            .await;
        self.spawn_configuration_pull().await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.session.cancel_pending().await;
        self.client
            .log_message(MessageType::INFO, "LSP server shutting down")
            .await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let TextDocumentItem {
            uri, text, version, ..
        } = params.text_document;

        self.client
            .log_message(MessageType::LOG, format!("Document opened: {}", uri))
            .await;

        self.update_and_validate(uri, text, Some(version)).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let VersionedTextDocumentIdentifier { uri, version } = params.text_document;

        // Full sync: the last change carries the whole document
        let Some(change) = params.content_changes.into_iter().last() else {
            self.revalidate(uri).await;
            return;
        };

        self.update_and_validate(uri, change.text, Some(version))
            .await;
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;

        if self.session.documents().remove(&uri).await.is_none() {
            return;
        }

        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn formatting(&self, params: DocumentFormattingParams) -> Result<Option<Vec<TextEdit>>> {
        let uri = params.text_document.uri;

        let document = match self.session.documents().get(&uri).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Skipping formatting: {}", e);
                return Ok(None);
            }
        };

        let config = match self.session.linter_config().await {
            Ok(config) => config,
            Err(e) => {
                warn!("Skipping formatting of {}: {}", uri, e);
                return Ok(None);
            }
        };

        let outcome = format_document(&*self.linter, &config, &document).await;

        let message = match &outcome {
            FormatOutcome::Formatted(_) | FormatOutcome::Empty => "Formatting success".to_string(),
            FormatOutcome::Failed(e) => format!("Formatting error: {}", e),
        };
        self.client.log_message(MessageType::LOG, message).await;

        Ok(outcome.into_edits())
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        if !is_applicable(&params) {
            return Ok(None);
        }

        let uri = &params.text_document.uri;
        let document = match self.session.documents().get(uri).await {
            Ok(document) => document,
            Err(e) => {
                warn!("Skipping code actions: {}", e);
                return Ok(None);
            }
        };

        let line_index = params.range.start.line as usize;
        let Some(line) = document.lines().get(line_index).copied() else {
            debug!("Line {} is outside of {}", line_index, uri);
            return Ok(None);
        };

        Ok(Some(noqa_actions(uri, params.range, line)))
    }
}
