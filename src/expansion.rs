//! Lazy Expansion Controller
//!
//! Orchestrates on-demand loading when the view expands a directory node.
//! Per node the lifecycle is `Unfetched -> Fetching -> Fetched`; `Fetched` is
//! terminal until the tree is reset.
//!
//! The tree sits behind a `parking_lot::RwLock` that is never held across an
//! `.await`: the listing call is the only suspension point. Requests carry the
//! tree generation they were issued against and are discarded at apply time if
//! the tree has been reset in the meantime.

use crate::config::ExpansionConfig;
use crate::error::ApiError;
use crate::listing::ListingService;
use crate::tree::{path, MergeReport, PathTree, TreeSynchronizer};
use crate::types::{Generation, NodeId};
use crate::views::{ObserverList, SubscriptionId, ViewEvent, ViewObserver};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of an expansion request that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandOutcome {
    /// Children were already known; no listing call was made.
    Cached,
    /// A listing for this node is already in flight; the request was dropped.
    AlreadyPending,
    /// Children were fetched and merged.
    Fetched(MergeReport),
}

/// Fetch state of a node as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Unfetched,
    Fetching,
    Fetched,
}

/// In-flight listing requests keyed by tree generation and path.
type PendingSet = Arc<Mutex<HashSet<(Generation, String)>>>;

/// Releases a pending-request slot when the request finishes or is dropped.
struct PendingGuard {
    pending: PendingSet,
    key: (Generation, String),
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}

/// Snapshot of the tree context a request was issued against.
struct RequestContext {
    generation: Generation,
    key: String,
    node: NodeId,
    fetched: bool,
}

/// Drives lazy population of a [`PathTree`] from a [`ListingService`].
pub struct LazyExpansionController {
    tree: Arc<RwLock<PathTree>>,
    service: Arc<dyn ListingService>,
    pending: PendingSet,
    observers: ObserverList,
    config: ExpansionConfig,
}

impl LazyExpansionController {
    /// Create a controller over an empty tree.
    pub fn new(service: Arc<dyn ListingService>, config: ExpansionConfig) -> Self {
        Self::with_tree(Arc::new(RwLock::new(PathTree::default())), service, config)
    }

    /// Create a controller over an existing shared tree.
    pub fn with_tree(
        tree: Arc<RwLock<PathTree>>,
        service: Arc<dyn ListingService>,
        config: ExpansionConfig,
    ) -> Self {
        Self {
            tree,
            service,
            pending: Arc::new(Mutex::new(HashSet::new())),
            observers: ObserverList::new(),
            config,
        }
    }

    /// Read access to the tree. Do not hold the guard across an `.await`.
    pub fn tree(&self) -> RwLockReadGuard<'_, PathTree> {
        self.tree.read()
    }

    /// Shared handle to the tree, for views that render it.
    pub fn shared_tree(&self) -> Arc<RwLock<PathTree>> {
        Arc::clone(&self.tree)
    }

    pub fn subscribe(&self, observer: Arc<dyn ViewObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Rebuild the tree from scratch for filesystem `key` rooted at `root_path`.
    ///
    /// Requests still in flight for the previous tree are discarded when they
    /// complete.
    pub fn reset(&self, key: &str, root_path: &str) -> Generation {
        let mut tree = self.tree.write();
        tree.reset(key, root_path);
        info!(
            key,
            root = %tree.root_path(),
            generation = tree.generation(),
            "Reset path tree"
        );
        tree.generation()
    }

    /// Current fetch state of the node at `absolute_path`.
    pub fn fetch_state(&self, absolute_path: &str) -> Option<FetchState> {
        let tree = self.tree.read();
        let node = tree.node_for_path(absolute_path)?;
        if node.fetched {
            return Some(FetchState::Fetched);
        }
        let key = (tree.generation(), absolute_path.to_string());
        if self.pending.lock().contains(&key) {
            Some(FetchState::Fetching)
        } else {
            Some(FetchState::Unfetched)
        }
    }

    /// Expand the node at `absolute_path`, fetching its children on first use.
    pub async fn request_expand(&self, absolute_path: &str) -> Result<ExpandOutcome, ApiError> {
        let context = self.request_context(absolute_path)?;
        self.expand_from(context, absolute_path).await
    }

    async fn expand_from(
        &self,
        context: RequestContext,
        absolute_path: &str,
    ) -> Result<ExpandOutcome, ApiError> {
        if context.fetched {
            debug!(path = absolute_path, "Expanding cached node");
            self.observers.emit(&ViewEvent::NodeExpansionRequested {
                path: absolute_path.to_string(),
            });
            return Ok(ExpandOutcome::Cached);
        }

        let Some(_guard) = self.claim(context.generation, absolute_path) else {
            debug!(path = absolute_path, "Listing already in flight, dropping request");
            return Ok(ExpandOutcome::AlreadyPending);
        };
        // A request that finished between the context read and the claim
        // has already fetched this node.
        if self.is_fetched(context.generation, context.node) {
            debug!(path = absolute_path, "Node fetched while claiming, using cache");
            self.observers.emit(&ViewEvent::NodeExpansionRequested {
                path: absolute_path.to_string(),
            });
            return Ok(ExpandOutcome::Cached);
        }

        let report = self.fetch_and_merge(&context, absolute_path).await?;
        if self.config.auto_expand {
            self.observers.emit(&ViewEvent::NodeExpansionRequested {
                path: absolute_path.to_string(),
            });
        }
        Ok(ExpandOutcome::Fetched(report))
    }

    /// Populate the root from its listing, as done once after each reset.
    ///
    /// The root is created fetched, so this bypasses the fetched check but still
    /// deduplicates and applies the staleness check.
    pub async fn populate_root(&self) -> Result<ExpandOutcome, ApiError> {
        let (context, root_path) = {
            let tree = self.tree.read();
            let root = tree.root();
            (
                RequestContext {
                    generation: tree.generation(),
                    key: tree.key().to_string(),
                    node: root.id,
                    fetched: false,
                },
                root.absolute_path.clone(),
            )
        };

        let Some(_guard) = self.claim(context.generation, &root_path) else {
            return Ok(ExpandOutcome::AlreadyPending);
        };
        let report = self.fetch_and_merge(&context, &root_path).await?;
        Ok(ExpandOutcome::Fetched(report))
    }

    /// Expand every node from the root down to `absolute_path`, in order.
    ///
    /// Stops at the first failure; nodes expanded so far stay expanded.
    pub async fn reveal(&self, absolute_path: &str) -> Result<Vec<ExpandOutcome>, ApiError> {
        let (mut current, segments) = {
            let tree = self.tree.read();
            let segments = path::relative_segments(tree.root_path(), absolute_path)
                .ok_or_else(|| ApiError::NodeNotFound(absolute_path.to_string()))?
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>();
            (tree.root_path().to_string(), segments)
        };

        let mut outcomes = vec![self.request_expand(&current).await?];
        for segment in segments {
            current = path::join(&current, &segment);
            outcomes.push(self.request_expand(&current).await?);
        }
        Ok(outcomes)
    }

    fn request_context(&self, absolute_path: &str) -> Result<RequestContext, ApiError> {
        let tree = self.tree.read();
        let Some(node) = tree.node_for_path(absolute_path) else {
            error!(
                path = absolute_path,
                generation = tree.generation(),
                "Expansion requested for a path that is not in the tree"
            );
            return Err(ApiError::NodeNotFound(absolute_path.to_string()));
        };
        Ok(RequestContext {
            generation: tree.generation(),
            key: tree.key().to_string(),
            node: node.id,
            fetched: node.fetched,
        })
    }

    fn is_fetched(&self, generation: Generation, node: NodeId) -> bool {
        let tree = self.tree.read();
        tree.generation() == generation && tree.get(node).is_some_and(|n| n.fetched)
    }

    /// Mark `path` as in flight for `generation`, unless it already is.
    fn claim(&self, generation: Generation, path: &str) -> Option<PendingGuard> {
        let key = (generation, path.to_string());
        if !self.pending.lock().insert(key.clone()) {
            return None;
        }
        Some(PendingGuard {
            pending: Arc::clone(&self.pending),
            key,
        })
    }

    async fn fetch_and_merge(
        &self,
        context: &RequestContext,
        absolute_path: &str,
    ) -> Result<MergeReport, ApiError> {
        let entries = match self.service.list(&context.key, absolute_path).await {
            Ok(response) => response.into_entries(absolute_path),
            Err(e) => Err(e),
        };
        let entries = entries.map_err(|e| {
            warn!(path = absolute_path, error = %e, "Listing failed, node left unfetched");
            match e {
                ApiError::ListingFailed { .. } => e,
                other => ApiError::ListingFailed {
                    path: absolute_path.to_string(),
                    reason: other.to_string(),
                },
            }
        })?;

        let report = {
            let mut tree = self.tree.write();
            if tree.generation() != context.generation || tree.get(context.node).is_none() {
                debug!(
                    path = absolute_path,
                    requested = context.generation,
                    current = tree.generation(),
                    "Discarding listing for a tree that was reset"
                );
                return Err(ApiError::StaleResponse {
                    path: absolute_path.to_string(),
                });
            }
            let report =
                TreeSynchronizer::merge(&mut tree, context.node, &entries, absolute_path)?;
            if let Some(node) = tree.get_mut(context.node) {
                node.fetched = true;
            }
            report
        };

        if report.skipped > 0 {
            warn!(
                path = absolute_path,
                skipped = report.skipped,
                "Some listing entries were skipped"
            );
        }
        debug!(
            path = absolute_path,
            created = report.created,
            "Applied listing"
        );
        self.observers.emit(&ViewEvent::SubtreeChanged {
            node: context.node,
            path: absolute_path.to_string(),
        });
        Ok(report)
    }
}
