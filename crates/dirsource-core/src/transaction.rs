//! Transaction-aware wrapping of context sources.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use ldap3::Ldap;

use crate::error::DirSourceResult;
use crate::source::ContextSource;

/// Delegating proxy marking the transaction-aware boundary of a
/// context-source stack.
///
/// The proxy is what callers receive from the configuration layer; the
/// target (raw or pooled) source is never handed out directly. Transaction
/// managers hold the proxy and coordinate context reuse through it, so the
/// proxy must stay the outermost layer.
pub struct TransactionAwareContextSourceProxy {
    target: Arc<dyn ContextSource>,
}

impl TransactionAwareContextSourceProxy {
    /// Wrap the given target source.
    pub fn new(target: Arc<dyn ContextSource>) -> Self {
        Self { target }
    }

    /// Get the wrapped target source.
    pub fn target(&self) -> &Arc<dyn ContextSource> {
        &self.target
    }
}

impl fmt::Debug for TransactionAwareContextSourceProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionAwareContextSourceProxy")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContextSource for TransactionAwareContextSourceProxy {
    async fn get_context(&self) -> DirSourceResult<Ldap> {
        self.target.get_context().await
    }

    async fn get_read_only_context(&self) -> DirSourceResult<Ldap> {
        self.target.get_read_only_context().await
    }

    async fn release(&self, ctx: Ldap) {
        self.target.release(ctx).await;
    }
}
