//! Generation Session
//!
//! The context object owning everything one invoking surface (CLI command,
//! embedding application) needs: transport, retry governor, tree store,
//! and progress sink. Replaces the module-level registries and "currently
//! selected model" globals of the source application; each session is
//! independent and concurrent sessions share nothing.

use std::sync::Arc;

use tracing::{debug, info};

use crate::ai::retry::{CancelHandle, RetryGovernor, RetryPolicy};
use crate::ai::transport::{HttpTransport, Transport};
use crate::ai::{self, ModelId, NullProgress, ProgressEvent, ProgressSink};
use crate::config::Config;
use crate::store::TreeStore;
use crate::types::{Result, TreeId};

pub struct Session {
    transport: Arc<dyn Transport>,
    governor: RetryGovernor,
    store: TreeStore,
    progress: Arc<dyn ProgressSink>,
    default_model: ModelId,
}

impl Session {
    /// Create a session backed by the HTTP transport.
    pub fn new(config: &Config, progress: Arc<dyn ProgressSink>) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(&config.llm)?);
        Ok(Self::with_transport(config, transport, progress))
    }

    /// Create a session over any transport. Used by embedders and tests.
    pub fn with_transport(
        config: &Config,
        transport: Arc<dyn Transport>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            transport,
            governor: RetryGovernor::new(RetryPolicy::from_config(&config.retry)),
            store: TreeStore::new(),
            progress,
            default_model: config.llm.default_model,
        }
    }

    /// Session with no progress reporting.
    pub fn silent(config: &Config) -> Result<Self> {
        Self::new(config, Arc::new(NullProgress))
    }

    pub fn store(&self) -> &TreeStore {
        &self.store
    }

    pub fn default_model(&self) -> ModelId {
        self.default_model
    }

    /// Run one generation: prompt → governed transport → extraction →
    /// store. Returns the id of the stored tree.
    ///
    /// Fails fast on an empty fragment list and on a missing credential
    /// for the selected model; neither reaches the network.
    pub async fn generate(
        &self,
        model: Option<ModelId>,
        fragments: Vec<String>,
        structure_hint: Option<String>,
        source_files: Vec<String>,
        cancel: &CancelHandle,
    ) -> Result<TreeId> {
        let model = model.unwrap_or(self.default_model);
        self.transport.preflight(model)?;

        let request = ai::build_request(model, fragments, structure_hint)?;
        info!(%model, fragments = request.fragments.len(), "Generating knowledge tree");

        let raw_text = match self
            .governor
            .call_with_retry(&*self.transport, &request, &*self.progress, cancel)
            .await
        {
            Ok(raw_text) => raw_text,
            Err(e) => {
                self.progress.notify(ProgressEvent::Failed {
                    message: e.user_message(),
                });
                return Err(e);
            }
        };

        let tree = match ai::extract(&raw_text) {
            Ok(tree) => tree,
            Err(e) => {
                // raw model text goes to the debug log only; the surfaced
                // message never includes it
                debug!(raw = %raw_text, error = %e, "Extraction failed");
                self.progress.notify(ProgressEvent::Failed {
                    message: e.user_message(),
                });
                return Err(e);
            }
        };

        info!(
            nodes = tree.node_count(),
            depth = tree.depth(),
            "Knowledge tree extracted"
        );
        self.progress.notify(ProgressEvent::Completed);

        Ok(self.store.put(tree, source_files, model))
    }
}
