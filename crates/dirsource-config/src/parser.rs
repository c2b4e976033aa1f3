//! `<context-source>` element parsing
//!
//! Translates one declarative element into a context-source definition
//! graph: the raw source, an optional pooling wrapper described by a
//! `<pooling>` child, and the always-present transaction-aware proxy, which
//! is registered with the surrounding registry and returned.

use std::str::FromStr;
use std::sync::Arc;

use tracing::debug;

use dirsource_core::pool::{ContextValidator, ExhaustionAction, PoolConfig, DEFAULT_VALIDATION_FILTER};
use dirsource_core::source::ContextSourceConfig;

use crate::definition::{
    ContextSourceDefinition, ContextSourceProxyDefinition, PoolingDefinition, ProxyTarget,
    ValidationDefinition,
};
use crate::error::{ConfigError, ConfigResult};
use crate::registry::ContextSourceRegistry;
use crate::xml::XmlElement;

const ATT_ID: &str = "id";
const ATT_USERNAME: &str = "username";
const ATT_PASSWORD: &str = "password";
const ATT_URL: &str = "url";
const ATT_BASE: &str = "base";
const ATT_REFERRAL: &str = "referral";
const ATT_ANONYMOUS_READ_ONLY: &str = "anonymous-read-only";
const ATT_NATIVE_POOLING: &str = "native-pooling";
const ATT_AUTHENTICATION_STRATEGY_REF: &str = "authentication-strategy-ref";

// pooling attributes
const ATT_MAX_ACTIVE: &str = "max-active";
const ATT_MAX_TOTAL: &str = "max-total";
const ATT_MAX_IDLE: &str = "max-idle";
const ATT_MIN_IDLE: &str = "min-idle";
const ATT_MAX_WAIT: &str = "max-wait";
const ATT_WHEN_EXHAUSTED: &str = "when-exhausted";
const ATT_TEST_ON_BORROW: &str = "test-on-borrow";
const ATT_TEST_ON_RETURN: &str = "test-on-return";
const ATT_TEST_WHILE_IDLE: &str = "test-while-idle";
const ATT_EVICTION_RUN_MILLIS: &str = "eviction-run-interval-millis";
const ATT_TESTS_PER_EVICTION_RUN: &str = "tests-per-eviction-run";
const ATT_EVICTABLE_TIME_MILLIS: &str = "min-evictable-time-millis";
const ATT_VALIDATION_QUERY_BASE: &str = "validation-query-base";
const ATT_VALIDATION_QUERY_FILTER: &str = "validation-query-filter";
const ATT_VALIDATION_QUERY_SEARCH_CONTROLS_REF: &str = "validation-query-search-controls-ref";

/// Local name of the context-source element.
pub const CONTEXT_SOURCE_ELEMENT: &str = "context-source";

/// Local name of the pooling child element.
pub const POOLING_ELEMENT: &str = "pooling";

/// Registration id used when the element carries none.
pub const DEFAULT_ID: &str = "contextSource";

/// Stateless parser for `<context-source>` elements.
pub struct ContextSourceParser;

impl ContextSourceParser {
    /// Parse one element, register the resulting proxy definition, and
    /// return it.
    ///
    /// `username`, `password`, and `url` are required; everything else
    /// takes documented defaults. A failed parse registers nothing.
    pub fn parse(
        element: &XmlElement,
        registry: &mut ContextSourceRegistry,
    ) -> ConfigResult<Arc<ContextSourceProxyDefinition>> {
        let username = element
            .attribute(ATT_USERNAME)
            .ok_or(ConfigError::MissingAttribute { name: ATT_USERNAME })?;
        let password = element
            .attribute(ATT_PASSWORD)
            .ok_or(ConfigError::MissingAttribute { name: ATT_PASSWORD })?;
        let url = element
            .attribute(ATT_URL)
            .ok_or(ConfigError::MissingAttribute { name: ATT_URL })?;

        let urls: Vec<String> = url
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(str::to_string)
            .collect();
        if urls.is_empty() {
            return Err(ConfigError::MissingAttribute { name: ATT_URL });
        }

        let mut config = ContextSourceConfig::new(urls, username).with_password(password);
        config.base = element.string_attribute(ATT_BASE, "");
        config.referral = element.attribute(ATT_REFERRAL).map(str::to_string);
        config.anonymous_read_only = element.parsed_attribute(ATT_ANONYMOUS_READ_ONLY, false)?;
        config.native_pooling = element.parsed_attribute(ATT_NATIVE_POOLING, false)?;

        let context_source = ContextSourceDefinition {
            config,
            authentication_strategy_ref: element
                .attribute(ATT_AUTHENTICATION_STRATEGY_REF)
                .map(str::to_string),
        };

        let target = Self::apply_pooling_if_applicable(context_source, element)?;

        let id = element.string_attribute(ATT_ID, DEFAULT_ID);
        debug!(id = %id, pooled = target.is_pooled(), "registering context source definition");

        registry.register(ContextSourceProxyDefinition { id, target })
    }

    /// Parse a whole document whose root is a `<context-source>` element.
    pub fn parse_str(
        xml: &str,
        registry: &mut ContextSourceRegistry,
    ) -> ConfigResult<Arc<ContextSourceProxyDefinition>> {
        let root = XmlElement::parse_document(xml)?;
        if root.name() != CONTEXT_SOURCE_ELEMENT {
            return Err(ConfigError::xml(format!(
                "expected a {} element, found {}",
                CONTEXT_SOURCE_ELEMENT,
                root.name()
            )));
        }
        Self::parse(&root, registry)
    }

    fn apply_pooling_if_applicable(
        context_source: ContextSourceDefinition,
        element: &XmlElement,
    ) -> ConfigResult<ProxyTarget> {
        let Some(pooling) = element.first_child(POOLING_ELEMENT) else {
            return Ok(ProxyTarget::Raw(context_source));
        };

        let mut pool = PoolConfig {
            max_active: pooling.parsed_attribute(ATT_MAX_ACTIVE, 8)?,
            max_total: pooling.parsed_attribute(ATT_MAX_TOTAL, -1)?,
            max_idle: pooling.parsed_attribute(ATT_MAX_IDLE, 8)?,
            min_idle: pooling.parsed_attribute(ATT_MIN_IDLE, 0)?,
            max_wait_millis: pooling.parsed_attribute(ATT_MAX_WAIT, -1)?,
            ..PoolConfig::default()
        };

        let when_exhausted =
            pooling.string_attribute(ATT_WHEN_EXHAUSTED, ExhaustionAction::Block.as_str());
        pool.when_exhausted = ExhaustionAction::from_str(&when_exhausted).map_err(|_| {
            ConfigError::UnknownExhaustionAction {
                value: when_exhausted,
            }
        })?;

        pool.test_on_borrow = pooling.parsed_attribute(ATT_TEST_ON_BORROW, false)?;
        pool.test_on_return = pooling.parsed_attribute(ATT_TEST_ON_RETURN, false)?;
        pool.test_while_idle = pooling.parsed_attribute(ATT_TEST_WHILE_IDLE, false)?;

        let validation = if pool.tests_enabled() {
            Some(Self::parse_validation(&mut pool, pooling)?)
        } else {
            None
        };

        Ok(ProxyTarget::Pooled(PoolingDefinition {
            pool,
            validation,
            context_source,
        }))
    }

    fn parse_validation(
        pool: &mut PoolConfig,
        pooling: &XmlElement,
    ) -> ConfigResult<ValidationDefinition> {
        let validator = ContextValidator::new()
            .with_base(pooling.string_attribute(ATT_VALIDATION_QUERY_BASE, ""))
            .with_filter(
                pooling.string_attribute(ATT_VALIDATION_QUERY_FILTER, DEFAULT_VALIDATION_FILTER),
            );

        pool.eviction_run_interval_millis = pooling.parsed_attribute(ATT_EVICTION_RUN_MILLIS, -1)?;
        pool.tests_per_eviction_run = pooling.parsed_attribute(ATT_TESTS_PER_EVICTION_RUN, 3)?;
        pool.min_evictable_time_millis =
            pooling.parsed_attribute(ATT_EVICTABLE_TIME_MILLIS, 1000 * 60 * 30)?;

        Ok(ValidationDefinition {
            validator,
            search_controls_ref: pooling
                .attribute(ATT_VALIDATION_QUERY_SEARCH_CONTROLS_REF)
                .map(str::to_string),
        })
    }
}
