//! # dirsource-config
//!
//! Declarative XML configuration for dirsource context sources.
//!
//! A `<context-source>` element is translated into a definition graph:
//! a raw context source, an optional pooling wrapper described by a
//! `<pooling>` child element, and a transaction-aware proxy that always
//! forms the outermost layer. The proxy definition is registered with a
//! [`ContextSourceRegistry`] under the element's `id` (or a default) and
//! can be materialized into a live stack with
//! [`ContextSourceProxyDefinition::build`].
//!
//! ## Example
//!
//! ```ignore
//! use dirsource_config::{ContextSourceParser, ContextSourceRegistry};
//!
//! let xml = r#"
//! <context-source username="cn=admin,dc=example,dc=com"
//!                 password="secret"
//!                 url="ldap://a.example.com,ldap://b.example.com"
//!                 base="dc=example,dc=com">
//!     <pooling max-active="4" test-on-borrow="true"/>
//! </context-source>"#;
//!
//! let mut registry = ContextSourceRegistry::new();
//! let definition = ContextSourceParser::parse_str(xml, &mut registry)?;
//! let proxy = definition.build()?;
//! ```

pub mod definition;
pub mod error;
pub mod parser;
pub mod registry;
pub mod xml;

// Re-exports
pub use definition::{
    ContextSourceDefinition, ContextSourceProxyDefinition, PoolingDefinition, ProxyTarget,
    ValidationDefinition,
};
pub use error::{ConfigError, ConfigResult};
pub use parser::{ContextSourceParser, CONTEXT_SOURCE_ELEMENT, DEFAULT_ID, POOLING_ELEMENT};
pub use registry::ContextSourceRegistry;
pub use xml::XmlElement;
