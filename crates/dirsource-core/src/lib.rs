//! # dirsource-core
//!
//! Context sources and attribute types for the dirsource directory toolkit.
//!
//! A *context source* is a factory for bound directory connections,
//! analogous to a connection factory. This crate provides the raw
//! [`LdapContextSource`] backed by the `ldap3` client, a pooled wrapper
//! ([`PooledContextSource`]) with validation and eviction policy, and the
//! [`TransactionAwareContextSourceProxy`] handed to callers as the outermost
//! layer of a configured stack.
//!
//! It also provides [`LdapAttribute`], a directory attribute value holder
//! carrying RFC2849 attribute options (e.g. `;binary`).
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dirsource_core::{ContextSource, ContextSourceConfig, LdapContextSource};
//!
//! let config = ContextSourceConfig::new(
//!     ["ldap://ldap.example.com:389"],
//!     "cn=admin,dc=example,dc=com",
//! )
//! .with_password("secret")
//! .with_base("dc=example,dc=com");
//!
//! let source = LdapContextSource::new(config)?;
//! let ctx = source.get_context().await?;
//! // ... use the connection ...
//! source.release(ctx).await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`attribute`] - Attribute values with RFC2849 options
//! - [`error`] - Error types with transient/permanent classification
//! - [`source`] - The [`ContextSource`] seam and raw LDAP implementation
//! - [`pool`] - Pooled context source, validation, eviction
//! - [`transaction`] - Transaction-aware proxy

pub mod attribute;
pub mod error;
pub mod pool;
pub mod source;
pub mod transaction;

// Re-exports
pub use attribute::{AttributeValue, LdapAttribute};
pub use error::{DirSourceError, DirSourceResult};
pub use pool::{
    ContextValidator, ExhaustionAction, PoolConfig, PooledContextSource, SearchControls,
    SearchScope, DEFAULT_VALIDATION_FILTER,
};
pub use source::{
    AuthenticationStrategy, ContextSource, ContextSourceConfig, LdapContextSource,
    SimpleAuthenticationStrategy,
};
pub use transaction::TransactionAwareContextSourceProxy;

// Re-export async_trait for context source implementors
pub use async_trait::async_trait;
