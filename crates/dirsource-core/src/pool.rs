//! Pooled context sources
//!
//! [`PooledContextSource`] keeps released connections for reuse, bounded by
//! a [`PoolConfig`] sizing policy and optionally guarded by a
//! [`ContextValidator`] validation query on borrow, return, and idle
//! eviction runs.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ldap3::{Ldap, Scope};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{DirSourceError, DirSourceResult};
use crate::source::ContextSource;

/// Default filter for validation queries.
pub const DEFAULT_VALIDATION_FILTER: &str = "objectclass=*";

/// Policy applied when the pool has no idle contexts and the active bound
/// has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExhaustionAction {
    /// Fail the checkout immediately.
    Fail,
    /// Wait for a context to be returned.
    Block,
    /// Create a context beyond the bound.
    Grow,
}

impl ExhaustionAction {
    /// Get all exhaustion actions.
    #[must_use]
    pub fn all() -> &'static [ExhaustionAction] {
        &[
            ExhaustionAction::Fail,
            ExhaustionAction::Block,
            ExhaustionAction::Grow,
        ]
    }

    /// Numeric code of the action, matching the classic pool constants.
    #[must_use]
    pub fn as_code(self) -> u8 {
        match self {
            ExhaustionAction::Fail => 0,
            ExhaustionAction::Block => 1,
            ExhaustionAction::Grow => 2,
        }
    }

    /// Get the canonical string representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExhaustionAction::Fail => "FAIL",
            ExhaustionAction::Block => "BLOCK",
            ExhaustionAction::Grow => "GROW",
        }
    }
}

impl fmt::Display for ExhaustionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown exhaustion action.
#[derive(Debug, Error)]
#[error("unknown exhaustion action: {0}")]
pub struct ParseExhaustionActionError(pub String);

impl FromStr for ExhaustionAction {
    type Err = ParseExhaustionActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FAIL" => Ok(ExhaustionAction::Fail),
            "BLOCK" => Ok(ExhaustionAction::Block),
            "GROW" => Ok(ExhaustionAction::Grow),
            _ => Err(ParseExhaustionActionError(s.to_string())),
        }
    }
}

/// Search scope for validation queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    /// The named object only.
    Base,
    /// Direct children of the named object.
    OneLevel,
    /// The whole subtree.
    Subtree,
}

impl SearchScope {
    /// Map to the client scope.
    #[must_use]
    pub fn as_ldap(self) -> Scope {
        match self {
            SearchScope::Base => Scope::Base,
            SearchScope::OneLevel => Scope::OneLevel,
            SearchScope::Subtree => Scope::Subtree,
        }
    }
}

/// Controls applied to validation queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchControls {
    /// Search scope.
    #[serde(default = "default_scope")]
    pub scope: SearchScope,

    /// Seconds after which the query is abandoned (0 = no limit).
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u64,
}

fn default_scope() -> SearchScope {
    SearchScope::Base
}

fn default_time_limit() -> u64 {
    5
}

impl Default for SearchControls {
    fn default() -> Self {
        Self {
            scope: default_scope(),
            time_limit_secs: default_time_limit(),
        }
    }
}

/// Validation query run against pooled contexts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextValidator {
    /// Base DN of the validation search.
    #[serde(default)]
    pub base: String,

    /// Filter of the validation search.
    #[serde(default = "default_validation_filter")]
    pub filter: String,

    /// Search controls.
    #[serde(default)]
    pub controls: SearchControls,
}

fn default_validation_filter() -> String {
    DEFAULT_VALIDATION_FILTER.to_string()
}

impl Default for ContextValidator {
    fn default() -> Self {
        Self {
            base: String::new(),
            filter: default_validation_filter(),
            controls: SearchControls::default(),
        }
    }
}

impl ContextValidator {
    /// Create a validator with the default base, filter, and controls.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search base.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Set the search filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Set the search controls.
    #[must_use]
    pub fn with_controls(mut self, controls: SearchControls) -> Self {
        self.controls = controls;
        self
    }

    /// Run the validation query against the given connection.
    ///
    /// Returns whether the connection answered the query.
    pub async fn validate(&self, ldap: &mut Ldap) -> bool {
        let search = ldap.search(
            &self.base,
            self.controls.scope.as_ldap(),
            &self.filter,
            vec!["dn"],
        );

        let result = if self.controls.time_limit_secs > 0 {
            let limit = Duration::from_secs(self.controls.time_limit_secs);
            match tokio::time::timeout(limit, search).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        base = %self.base,
                        filter = %self.filter,
                        "validation query timed out"
                    );
                    return false;
                }
            }
        } else {
            search.await
        };

        match result {
            Ok(outcome) => match outcome.success() {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "validation query rejected");
                    false
                }
            },
            Err(e) => {
                warn!(error = %e, "validation query failed");
                false
            }
        }
    }
}

/// Sizing, validation, and eviction policy for a [`PooledContextSource`].
///
/// Negative sizing values mean "no bound" throughout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Maximum contexts checked out at once (non-positive = unbounded).
    #[serde(default = "default_max_active")]
    pub max_active: i32,

    /// Maximum live contexts, checked out plus idle (negative = unbounded).
    #[serde(default = "default_unbounded")]
    pub max_total: i32,

    /// Maximum idle contexts kept for reuse (negative = unbounded).
    #[serde(default = "default_max_idle")]
    pub max_idle: i32,

    /// Idle contexts replenished during eviction runs.
    #[serde(default)]
    pub min_idle: i32,

    /// Milliseconds a blocked checkout waits (negative = indefinitely).
    #[serde(default = "default_unbounded_millis")]
    pub max_wait_millis: i64,

    /// Policy when the active bound is reached.
    #[serde(default = "default_when_exhausted")]
    pub when_exhausted: ExhaustionAction,

    /// Validate contexts when checked out.
    #[serde(default)]
    pub test_on_borrow: bool,

    /// Validate contexts when returned.
    #[serde(default)]
    pub test_on_return: bool,

    /// Validate idle contexts during eviction runs.
    #[serde(default)]
    pub test_while_idle: bool,

    /// Milliseconds between eviction runs (non-positive = disabled).
    #[serde(default = "default_unbounded_millis")]
    pub eviction_run_interval_millis: i64,

    /// Idle contexts examined per eviction run.
    #[serde(default = "default_tests_per_eviction_run")]
    pub tests_per_eviction_run: i32,

    /// Milliseconds a context may sit idle before eviction (negative =
    /// never evicted by age).
    #[serde(default = "default_min_evictable_time")]
    pub min_evictable_time_millis: i64,
}

fn default_max_active() -> i32 {
    8
}

fn default_max_idle() -> i32 {
    8
}

fn default_unbounded() -> i32 {
    -1
}

fn default_unbounded_millis() -> i64 {
    -1
}

fn default_when_exhausted() -> ExhaustionAction {
    ExhaustionAction::Block
}

fn default_tests_per_eviction_run() -> i32 {
    3
}

fn default_min_evictable_time() -> i64 {
    1000 * 60 * 30
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_active: default_max_active(),
            max_total: default_unbounded(),
            max_idle: default_max_idle(),
            min_idle: 0,
            max_wait_millis: default_unbounded_millis(),
            when_exhausted: default_when_exhausted(),
            test_on_borrow: false,
            test_on_return: false,
            test_while_idle: false,
            eviction_run_interval_millis: default_unbounded_millis(),
            tests_per_eviction_run: default_tests_per_eviction_run(),
            min_evictable_time_millis: default_min_evictable_time(),
        }
    }
}

impl PoolConfig {
    /// Validate the sizing policy.
    pub fn validate(&self) -> DirSourceResult<()> {
        if self.min_idle < 0 {
            return Err(DirSourceError::invalid_configuration(
                "min_idle must not be negative",
            ));
        }
        if self.max_idle >= 0 && self.min_idle > self.max_idle {
            return Err(DirSourceError::invalid_configuration(
                "min_idle must not exceed max_idle",
            ));
        }
        Ok(())
    }

    /// Whether any of the validation toggles is set.
    #[must_use]
    pub fn tests_enabled(&self) -> bool {
        self.test_on_borrow || self.test_on_return || self.test_while_idle
    }
}

struct IdleEntry {
    ldap: Ldap,
    since: Instant,
}

struct PoolInner {
    target: Arc<dyn ContextSource>,
    config: PoolConfig,
    validator: Option<ContextValidator>,
    /// Idle contexts, oldest at the front.
    idle: Mutex<Vec<IdleEntry>>,
    /// Number of checked-out contexts.
    active: AtomicI32,
    returned: Notify,
}

impl PoolInner {
    /// Claim an active slot, applying the exhaustion policy at the bound.
    async fn reserve_slot(&self) -> DirSourceResult<()> {
        let max = self.config.max_active;
        if max <= 0 {
            self.active.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }

        let start = Instant::now();
        loop {
            let current = self.active.load(Ordering::SeqCst);
            if current < max {
                if self
                    .active
                    .compare_exchange(current, current + 1, Ordering::SeqCst, Ordering::SeqCst)
                    .is_ok()
                {
                    return Ok(());
                }
                continue;
            }

            match self.config.when_exhausted {
                ExhaustionAction::Grow => {
                    self.active.fetch_add(1, Ordering::SeqCst);
                    return Ok(());
                }
                ExhaustionAction::Fail => {
                    return Err(DirSourceError::PoolExhausted { max_active: max });
                }
                ExhaustionAction::Block => {
                    let released = self.returned.notified();
                    // a release landing after this check is captured by the
                    // stored notify permit
                    if self.active.load(Ordering::SeqCst) < max {
                        continue;
                    }
                    if self.config.max_wait_millis >= 0 {
                        let wait = Duration::from_millis(self.config.max_wait_millis as u64);
                        let remaining = wait.saturating_sub(start.elapsed());
                        if remaining.is_zero()
                            || tokio::time::timeout(remaining, released).await.is_err()
                        {
                            return Err(DirSourceError::ConnectionTimeout {
                                timeout_millis: self.config.max_wait_millis as u64,
                            });
                        }
                    } else {
                        released.await;
                    }
                }
            }
        }
    }

    fn release_slot(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.returned.notify_one();
    }

    /// Pop idle contexts (newest first) until one passes borrow validation.
    async fn take_validated_idle(&self) -> Option<Ldap> {
        loop {
            let entry = self.idle.lock().await.pop()?;
            let mut ldap = entry.ldap;
            if self.config.test_on_borrow {
                if let Some(validator) = &self.validator {
                    if !validator.validate(&mut ldap).await {
                        warn!("discarding pooled context that failed borrow validation");
                        let _ = ldap.unbind().await;
                        continue;
                    }
                }
            }
            return Some(ldap);
        }
    }

    async fn checkout(&self) -> DirSourceResult<Ldap> {
        self.reserve_slot().await?;

        if let Some(ldap) = self.take_validated_idle().await {
            return Ok(ldap);
        }

        match self.target.get_context().await {
            Ok(ldap) => Ok(ldap),
            Err(e) => {
                self.release_slot();
                Err(e)
            }
        }
    }

    async fn checkin(&self, mut ldap: Ldap) {
        let mut keep = true;
        if self.config.test_on_return {
            if let Some(validator) = &self.validator {
                keep = validator.validate(&mut ldap).await;
                if !keep {
                    warn!("discarding pooled context that failed return validation");
                }
            }
        }

        if keep {
            let mut idle = self.idle.lock().await;
            let within_idle_cap =
                self.config.max_idle < 0 || (idle.len() as i32) < self.config.max_idle;
            let within_total_cap = self.config.max_total < 0
                || i64::from(self.active.load(Ordering::SeqCst)) + idle.len() as i64
                    <= i64::from(self.config.max_total);
            if within_idle_cap && within_total_cap {
                idle.push(IdleEntry {
                    ldap,
                    since: Instant::now(),
                });
                drop(idle);
                self.release_slot();
                return;
            }
        }

        let _ = ldap.unbind().await;
        self.release_slot();
    }

    /// One eviction run: age out and revalidate the oldest idle contexts,
    /// then replenish up to `min_idle`.
    async fn evict_idle(&self) {
        let tests = self.config.tests_per_eviction_run.max(0) as usize;
        if tests > 0 {
            let mut candidates = Vec::new();
            {
                let mut idle = self.idle.lock().await;
                let count = tests.min(idle.len());
                candidates.extend(idle.drain(..count));
            }

            let mut retained = Vec::new();
            for mut entry in candidates {
                let min_evictable = self.config.min_evictable_time_millis;
                if min_evictable >= 0
                    && entry.since.elapsed() >= Duration::from_millis(min_evictable as u64)
                {
                    debug!("evicting idle context past its evictable age");
                    let _ = entry.ldap.unbind().await;
                    continue;
                }

                let valid = match &self.validator {
                    Some(validator) => validator.validate(&mut entry.ldap).await,
                    None => true,
                };
                if valid {
                    retained.push(entry);
                } else {
                    warn!("evicting idle context that failed validation");
                    let _ = entry.ldap.unbind().await;
                }
            }

            let mut idle = self.idle.lock().await;
            for (index, entry) in retained.into_iter().enumerate() {
                idle.insert(index, entry);
            }
        }

        self.ensure_min_idle().await;
    }

    async fn ensure_min_idle(&self) {
        let min_idle = self.config.min_idle;
        if min_idle <= 0 {
            return;
        }

        loop {
            {
                let idle = self.idle.lock().await;
                if idle.len() as i32 >= min_idle {
                    return;
                }
            }

            match self.target.get_context().await {
                Ok(ldap) => {
                    let mut idle = self.idle.lock().await;
                    if (idle.len() as i32) < min_idle {
                        idle.push(IdleEntry {
                            ldap,
                            since: Instant::now(),
                        });
                        continue;
                    }
                    drop(idle);
                    let mut ldap = ldap;
                    let _ = ldap.unbind().await;
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "failed to replenish idle contexts");
                    return;
                }
            }
        }
    }
}

async fn run_evictor(inner: Arc<PoolInner>) {
    let period = Duration::from_millis(inner.config.eviction_run_interval_millis as u64);
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    loop {
        ticker.tick().await;
        inner.evict_idle().await;
    }
}

/// Context source that pools connections obtained from a wrapped target.
///
/// Checkouts are bounded by [`PoolConfig::max_active`] under the configured
/// [`ExhaustionAction`]; released connections are kept idle for reuse up to
/// [`PoolConfig::max_idle`]. When `test_while_idle` is set and the eviction
/// interval is positive, a background task periodically ages out and
/// revalidates idle connections.
pub struct PooledContextSource {
    inner: Arc<PoolInner>,
    evictor: Option<JoinHandle<()>>,
}

impl PooledContextSource {
    /// Create a pool without a validator.
    pub fn new(target: Arc<dyn ContextSource>, config: PoolConfig) -> DirSourceResult<Self> {
        Self::with_validator(target, config, None)
    }

    /// Create a pool, optionally guarded by a validation query.
    ///
    /// A validator is required when any of the `test_*` toggles is set.
    /// Requires a running `tokio` runtime when eviction is enabled.
    pub fn with_validator(
        target: Arc<dyn ContextSource>,
        config: PoolConfig,
        validator: Option<ContextValidator>,
    ) -> DirSourceResult<Self> {
        config.validate()?;
        if config.tests_enabled() && validator.is_none() {
            return Err(DirSourceError::invalid_configuration(
                "connection testing requires a context validator",
            ));
        }

        let inner = Arc::new(PoolInner {
            target,
            config,
            validator,
            idle: Mutex::new(Vec::new()),
            active: AtomicI32::new(0),
            returned: Notify::new(),
        });

        let evictor = if inner.config.test_while_idle
            && inner.config.eviction_run_interval_millis > 0
        {
            Some(tokio::spawn(run_evictor(inner.clone())))
        } else {
            None
        };

        Ok(Self { inner, evictor })
    }

    /// Get the pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    /// Get the validator, if any.
    pub fn validator(&self) -> Option<&ContextValidator> {
        self.inner.validator.as_ref()
    }

    /// Get the wrapped target source.
    pub fn target(&self) -> &Arc<dyn ContextSource> {
        &self.inner.target
    }

    /// Number of checked-out contexts.
    pub fn active_count(&self) -> i32 {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Number of idle contexts.
    pub async fn idle_count(&self) -> usize {
        self.inner.idle.lock().await.len()
    }
}

impl Drop for PooledContextSource {
    fn drop(&mut self) {
        if let Some(evictor) = &self.evictor {
            evictor.abort();
        }
    }
}

impl fmt::Debug for PooledContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledContextSource")
            .field("config", &self.inner.config)
            .field("active", &self.active_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContextSource for PooledContextSource {
    async fn get_context(&self) -> DirSourceResult<Ldap> {
        self.inner.checkout().await
    }

    // Pooled contexts are bound read-write; read-only checkouts go through
    // the same pool.
    async fn get_read_only_context(&self) -> DirSourceResult<Ldap> {
        self.inner.checkout().await
    }

    async fn release(&self, ctx: Ldap) {
        self.inner.checkin(ctx).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Target whose connections always fail; slot bookkeeping is observable
    /// without a directory server.
    struct UnreachableSource;

    #[async_trait]
    impl ContextSource for UnreachableSource {
        async fn get_context(&self) -> DirSourceResult<Ldap> {
            Err(DirSourceError::connection_failed("unreachable"))
        }
    }

    fn pool_with(config: PoolConfig) -> PooledContextSource {
        PooledContextSource::new(Arc::new(UnreachableSource), config).unwrap()
    }

    #[test]
    fn test_exhaustion_action_codes() {
        assert_eq!(ExhaustionAction::Fail.as_code(), 0);
        assert_eq!(ExhaustionAction::Block.as_code(), 1);
        assert_eq!(ExhaustionAction::Grow.as_code(), 2);
    }

    #[test]
    fn test_exhaustion_action_from_str() {
        assert_eq!(
            "BLOCK".parse::<ExhaustionAction>().unwrap(),
            ExhaustionAction::Block
        );
        assert_eq!(
            "grow".parse::<ExhaustionAction>().unwrap(),
            ExhaustionAction::Grow
        );
        assert!("BOGUS".parse::<ExhaustionAction>().is_err());
    }

    #[test]
    fn test_exhaustion_action_display_round_trip() {
        for action in ExhaustionAction::all() {
            assert_eq!(action.to_string().parse::<ExhaustionAction>().unwrap(), *action);
        }
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = PoolConfig::default();
        assert_eq!(config.max_active, 8);
        assert_eq!(config.max_total, -1);
        assert_eq!(config.max_idle, 8);
        assert_eq!(config.min_idle, 0);
        assert_eq!(config.max_wait_millis, -1);
        assert_eq!(config.when_exhausted, ExhaustionAction::Block);
        assert!(!config.tests_enabled());
        assert_eq!(config.eviction_run_interval_millis, -1);
        assert_eq!(config.tests_per_eviction_run, 3);
        assert_eq!(config.min_evictable_time_millis, 1_800_000);
    }

    #[test]
    fn test_pool_config_serde_defaults() {
        let config: PoolConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_active, 8);
        assert_eq!(config.when_exhausted, ExhaustionAction::Block);
        assert_eq!(config.min_evictable_time_millis, 1_800_000);
    }

    #[test]
    fn test_pool_config_validation() {
        assert!(PoolConfig::default().validate().is_ok());

        let negative_min = PoolConfig {
            min_idle: -1,
            ..PoolConfig::default()
        };
        assert!(negative_min.validate().is_err());

        let min_over_max = PoolConfig {
            min_idle: 9,
            max_idle: 8,
            ..PoolConfig::default()
        };
        assert!(min_over_max.validate().is_err());
    }

    #[test]
    fn test_validator_defaults() {
        let validator = ContextValidator::new();
        assert_eq!(validator.base, "");
        assert_eq!(validator.filter, DEFAULT_VALIDATION_FILTER);
        assert_eq!(validator.controls.scope, SearchScope::Base);
    }

    #[tokio::test]
    async fn test_pool_requires_validator_for_testing() {
        let config = PoolConfig {
            test_on_borrow: true,
            ..PoolConfig::default()
        };
        let result = PooledContextSource::new(Arc::new(UnreachableSource), config);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failed_checkout_releases_slot() {
        let pool = pool_with(PoolConfig {
            max_active: 1,
            when_exhausted: ExhaustionAction::Fail,
            ..PoolConfig::default()
        });

        assert!(pool.get_context().await.is_err());
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.idle_count().await, 0);
    }

    #[tokio::test]
    async fn test_fail_action_errors_when_exhausted() {
        let pool = pool_with(PoolConfig {
            max_active: 2,
            when_exhausted: ExhaustionAction::Fail,
            ..PoolConfig::default()
        });

        pool.inner.reserve_slot().await.unwrap();
        pool.inner.reserve_slot().await.unwrap();

        let err = pool.inner.reserve_slot().await.unwrap_err();
        assert!(matches!(err, DirSourceError::PoolExhausted { max_active: 2 }));

        pool.inner.release_slot();
        pool.inner.reserve_slot().await.unwrap();
        assert_eq!(pool.active_count(), 2);
    }

    #[tokio::test]
    async fn test_grow_action_exceeds_bound() {
        let pool = pool_with(PoolConfig {
            max_active: 1,
            when_exhausted: ExhaustionAction::Grow,
            ..PoolConfig::default()
        });

        pool.inner.reserve_slot().await.unwrap();
        pool.inner.reserve_slot().await.unwrap();
        assert_eq!(pool.active_count(), 2);
    }

    #[tokio::test]
    async fn test_block_action_times_out() {
        let pool = pool_with(PoolConfig {
            max_active: 1,
            max_wait_millis: 20,
            when_exhausted: ExhaustionAction::Block,
            ..PoolConfig::default()
        });

        pool.inner.reserve_slot().await.unwrap();
        let err = pool.inner.reserve_slot().await.unwrap_err();
        assert!(matches!(
            err,
            DirSourceError::ConnectionTimeout { timeout_millis: 20 }
        ));
    }

    #[tokio::test]
    async fn test_block_action_wakes_on_release() {
        let pool = Arc::new(pool_with(PoolConfig {
            max_active: 1,
            max_wait_millis: 5_000,
            when_exhausted: ExhaustionAction::Block,
            ..PoolConfig::default()
        }));

        pool.inner.reserve_slot().await.unwrap();

        let waiter = {
            let pool = pool.clone();
            tokio::spawn(async move { pool.inner.reserve_slot().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        pool.inner.release_slot();

        waiter.await.unwrap().unwrap();
        assert_eq!(pool.active_count(), 1);
    }

    #[tokio::test]
    async fn test_unbounded_max_active() {
        let pool = pool_with(PoolConfig {
            max_active: -1,
            when_exhausted: ExhaustionAction::Fail,
            ..PoolConfig::default()
        });

        for _ in 0..32 {
            pool.inner.reserve_slot().await.unwrap();
        }
        assert_eq!(pool.active_count(), 32);
    }
}
