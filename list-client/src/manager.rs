//! ResourceManager - one fetcher and one mutation coordinator over a shared collection.
//!
//! The builder wires the fetcher's local mutators in as the coordinator's
//! local side, so a successful `add_item`/`update_item`/`delete_item` lands
//! in the same collection the list view renders. Both halves publish into
//! one [`Notifier`].

use list_types::{Extractor, KeyExtractor};
use std::sync::Arc;
use tokio::sync::watch;

use crate::config::ResourceOptions;
use crate::fetch::{FetchOptions, FetchOutcome, Fetcher};
use crate::mutation::MutationCoordinator;
use crate::remote::{ErrorCallback, PageService, RemoteOps};
use crate::snapshot::{Notifier, ResourceSnapshot};

/// A paginated collection with CRUD operations.
///
/// Cloning shares all state.
#[derive(Clone)]
pub struct ResourceManager {
    fetcher: Fetcher,
    crud: MutationCoordinator,
    notifier: Notifier,
    options: ResourceOptions,
}

impl ResourceManager {
    /// Start building a manager over `service`.
    pub fn builder(service: impl PageService + 'static) -> ResourceManagerBuilder {
        ResourceManagerBuilder {
            service: Arc::new(service),
            extractor: None,
            data_key: None,
            on_error: None,
            remote: RemoteOps::new(),
            options: ResourceOptions::default(),
        }
    }

    /// Perform the initial load, unless `should_fetch` is off.
    pub async fn start(&self) -> FetchOutcome {
        if !self.options.should_fetch {
            tracing::debug!("should_fetch disabled, not loading");
            return FetchOutcome::Skipped;
        }
        self.fetcher.fetch_data(FetchOptions::initial()).await
    }

    /// Current state of the collection and every flag.
    pub fn state(&self) -> ResourceSnapshot {
        self.notifier.snapshot()
    }

    /// Fetch operations, local mutators and raw setters.
    pub fn queries(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Remote write operations and their busy flags.
    pub fn crud(&self) -> &MutationCoordinator {
        &self.crud
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<ResourceSnapshot> {
        self.notifier.subscribe()
    }

    /// Options the manager was built with.
    pub fn options(&self) -> &ResourceOptions {
        &self.options
    }
}

/// Builder for [`ResourceManager`].
pub struct ResourceManagerBuilder {
    service: Arc<dyn PageService>,
    extractor: Option<Arc<dyn Extractor>>,
    data_key: Option<String>,
    on_error: Option<ErrorCallback>,
    remote: RemoteOps,
    options: ResourceOptions,
}

impl ResourceManagerBuilder {
    /// Use a custom extractor instead of the `data_key` one.
    pub fn extractor(mut self, extractor: impl Extractor + 'static) -> Self {
        self.extractor = Some(Arc::new(extractor));
        self
    }

    /// Response field holding the records. Overrides `options.data_key`.
    pub fn data_key(mut self, data_key: impl Into<String>) -> Self {
        self.data_key = Some(data_key.into());
        self
    }

    /// Callback for fetch failures.
    pub fn on_error(mut self, on_error: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    /// Remote write capabilities.
    pub fn remote(mut self, remote: RemoteOps) -> Self {
        self.remote = remote;
        self
    }

    /// Behavior options.
    pub fn options(mut self, options: ResourceOptions) -> Self {
        self.options = options;
        self
    }

    /// Wire everything together.
    pub fn build(self) -> ResourceManager {
        let mut options = self.options;
        if let Some(data_key) = self.data_key {
            options.data_key = data_key;
        }

        let extractor = self
            .extractor
            .unwrap_or_else(|| Arc::new(KeyExtractor::new(options.data_key.clone())));

        let notifier = Notifier::new();
        let mut fetcher =
            Fetcher::new(self.service, extractor, &options).with_notifier(notifier.clone());
        if let Some(on_error) = self.on_error {
            fetcher = fetcher.with_on_error(on_error);
        }

        let crud = MutationCoordinator::new(fetcher.local_ops(), self.remote)
            .with_notifier(notifier.clone());

        tracing::debug!(remote = ?crud, data_key = %options.data_key, "resource manager built");

        ResourceManager {
            fetcher,
            crud,
            notifier,
            options,
        }
    }
}
