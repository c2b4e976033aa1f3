//! Context-source definition graph
//!
//! Definitions are the declarative output of the parser: plain
//! configuration structs describing the stack to build. The layering is
//! fixed — a raw context source, optionally wrapped by a pool, always
//! wrapped by the transaction-aware proxy — and [`ContextSourceProxyDefinition::build`]
//! materializes it in that order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use dirsource_core::error::DirSourceResult;
use dirsource_core::pool::{ContextValidator, PoolConfig, PooledContextSource};
use dirsource_core::source::{ContextSource, ContextSourceConfig, LdapContextSource};
use dirsource_core::transaction::TransactionAwareContextSourceProxy;

/// Declarative description of a raw LDAP context source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSourceDefinition {
    /// Connection configuration.
    pub config: ContextSourceConfig,

    /// Name of an externally registered authentication strategy. Unset
    /// leaves the default simple-bind strategy in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_strategy_ref: Option<String>,
}

impl ContextSourceDefinition {
    /// Materialize the raw context source.
    pub fn build(&self) -> DirSourceResult<LdapContextSource> {
        LdapContextSource::new(self.config.clone())
    }
}

/// Validation policy attached to a pooled source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationDefinition {
    /// The validation query.
    pub validator: ContextValidator,

    /// Name of externally registered search controls for the validation
    /// query. Unset leaves the default controls in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_controls_ref: Option<String>,
}

/// Declarative description of a pooling wrapper around a context source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolingDefinition {
    /// Sizing and eviction policy.
    pub pool: PoolConfig,

    /// Validation policy, present iff any of the test toggles is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationDefinition>,

    /// The wrapped context source.
    pub context_source: ContextSourceDefinition,
}

impl PoolingDefinition {
    /// Materialize the pool around a freshly built raw source.
    pub fn build(&self) -> DirSourceResult<PooledContextSource> {
        let target: Arc<dyn ContextSource> = Arc::new(self.context_source.build()?);
        let validator = self
            .validation
            .as_ref()
            .map(|validation| validation.validator.clone());
        PooledContextSource::with_validator(target, self.pool.clone(), validator)
    }
}

/// What the transaction-aware proxy wraps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProxyTarget {
    /// The raw context source, no pooling.
    Raw(ContextSourceDefinition),
    /// A pooled wrapper around the context source.
    Pooled(PoolingDefinition),
}

impl ProxyTarget {
    /// The raw context-source definition at the bottom of the stack.
    pub fn context_source(&self) -> &ContextSourceDefinition {
        match self {
            ProxyTarget::Raw(definition) => definition,
            ProxyTarget::Pooled(pooling) => &pooling.context_source,
        }
    }

    /// Whether a pooling layer is present.
    pub fn is_pooled(&self) -> bool {
        matches!(self, ProxyTarget::Pooled(_))
    }

    fn build(&self) -> DirSourceResult<Arc<dyn ContextSource>> {
        match self {
            ProxyTarget::Raw(definition) => Ok(Arc::new(definition.build()?)),
            ProxyTarget::Pooled(pooling) => Ok(Arc::new(pooling.build()?)),
        }
    }
}

/// The registered artifact: a transaction-aware proxy around its target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSourceProxyDefinition {
    /// Registration id.
    pub id: String,

    /// The wrapped stack.
    pub target: ProxyTarget,
}

impl ContextSourceProxyDefinition {
    /// Materialize the full stack, proxy outermost.
    pub fn build(&self) -> DirSourceResult<TransactionAwareContextSourceProxy> {
        Ok(TransactionAwareContextSourceProxy::new(self.target.build()?))
    }
}
