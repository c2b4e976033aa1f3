//! Context sources: factories for bound directory connections
//!
//! A [`ContextSource`] hands out [`Ldap`] handles and takes them back via
//! [`release`](ContextSource::release). [`LdapContextSource`] is the raw
//! implementation; the pooled and transaction-aware wrappers in
//! [`crate::pool`] and [`crate::transaction`] layer over the same seam.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DirSourceError, DirSourceResult};

/// LDAP result code for invalid credentials.
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Configuration for an [`LdapContextSource`].
#[derive(Clone, Serialize, Deserialize)]
pub struct ContextSourceConfig {
    /// Server URLs, tried in order until one accepts a connection.
    pub urls: Vec<String>,

    /// DN used for authenticated binds.
    pub user_dn: String,

    /// Password for authenticated binds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Base DN for operations (e.g., "dc=example,dc=com").
    #[serde(default)]
    pub base: String,

    /// Referral policy hint ("follow", "ignore", "throw"). Unset leaves the
    /// client default in place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,

    /// Perform read-only operations with an anonymous bind.
    #[serde(default)]
    pub anonymous_read_only: bool,

    /// Hint that the underlying client should pool connections natively.
    #[serde(default)]
    pub native_pooling: bool,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    30
}

impl fmt::Debug for ContextSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextSourceConfig")
            .field("urls", &self.urls)
            .field("user_dn", &self.user_dn)
            .field(
                "password",
                &self.password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("base", &self.base)
            .field("referral", &self.referral)
            .field("anonymous_read_only", &self.anonymous_read_only)
            .field("native_pooling", &self.native_pooling)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

impl ContextSourceConfig {
    /// Create a new config with the required fields.
    pub fn new<I, S>(urls: I, user_dn: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            user_dn: user_dn.into(),
            password: None,
            base: String::new(),
            referral: None,
            anonymous_read_only: false,
            native_pooling: false,
            connect_timeout_secs: default_connect_timeout(),
        }
    }

    /// Set the bind password.
    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set the base DN.
    #[must_use]
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Set the referral policy.
    #[must_use]
    pub fn with_referral(mut self, referral: impl Into<String>) -> Self {
        self.referral = Some(referral.into());
        self
    }

    /// Allow read-only operations over an anonymous bind.
    #[must_use]
    pub fn with_anonymous_read_only(mut self) -> Self {
        self.anonymous_read_only = true;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirSourceResult<()> {
        if self.urls.is_empty() {
            return Err(DirSourceError::invalid_configuration(
                "at least one server url is required",
            ));
        }
        if self.urls.iter().any(|url| url.trim().is_empty()) {
            return Err(DirSourceError::invalid_configuration(
                "server urls must not be blank",
            ));
        }
        if self.user_dn.trim().is_empty() {
            return Err(DirSourceError::invalid_configuration(
                "user_dn is required",
            ));
        }
        Ok(())
    }

    /// Create a redacted version of this config (for logging/display).
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.password.is_some() {
            config.password = Some("***REDACTED***".to_string());
        }
        config
    }
}

/// Performs the bind step when a new connection is established.
///
/// The default is a simple bind; alternative strategies (SASL, external)
/// plug in through [`LdapContextSource::with_authentication_strategy`].
#[async_trait]
pub trait AuthenticationStrategy: Send + Sync {
    /// Authenticate a freshly opened connection.
    async fn authenticate(
        &self,
        ldap: &mut Ldap,
        user_dn: &str,
        password: &str,
    ) -> DirSourceResult<()>;
}

/// Default strategy: LDAP simple bind.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleAuthenticationStrategy;

#[async_trait]
impl AuthenticationStrategy for SimpleAuthenticationStrategy {
    async fn authenticate(
        &self,
        ldap: &mut Ldap,
        user_dn: &str,
        password: &str,
    ) -> DirSourceResult<()> {
        debug!(user_dn = %user_dn, "performing simple bind");

        let result = ldap.simple_bind(user_dn, password).await.map_err(|e| {
            DirSourceError::connection_failed_with_source(
                format!("bind failed for {user_dn}"),
                e,
            )
        })?;

        if result.rc == RC_INVALID_CREDENTIALS {
            return Err(DirSourceError::AuthenticationFailed);
        }
        if result.rc != 0 {
            return Err(DirSourceError::connection_failed(format!(
                "bind failed with code {}: {}",
                result.rc, result.text
            )));
        }
        Ok(())
    }
}

/// A factory for directory connections.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Get an authenticated connection.
    async fn get_context(&self) -> DirSourceResult<Ldap>;

    /// Get a connection for read-only use.
    ///
    /// Sources configured for anonymous read-only access return an
    /// unauthenticated connection; everything else behaves like
    /// [`get_context`](ContextSource::get_context).
    async fn get_read_only_context(&self) -> DirSourceResult<Ldap> {
        self.get_context().await
    }

    /// Return a connection obtained from this source.
    ///
    /// The default implementation closes it.
    async fn release(&self, mut ctx: Ldap) {
        let _ = ctx.unbind().await;
    }
}

/// Raw context source backed by the `ldap3` client.
///
/// Walks the configured URL list in order until a server accepts the
/// connection, then authenticates through the configured strategy.
pub struct LdapContextSource {
    config: ContextSourceConfig,
    strategy: Arc<dyn AuthenticationStrategy>,
}

impl LdapContextSource {
    /// Create a new context source with the given configuration.
    pub fn new(config: ContextSourceConfig) -> DirSourceResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            strategy: Arc::new(SimpleAuthenticationStrategy),
        })
    }

    /// Replace the authentication strategy.
    #[must_use]
    pub fn with_authentication_strategy(
        mut self,
        strategy: Arc<dyn AuthenticationStrategy>,
    ) -> Self {
        self.strategy = strategy;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &ContextSourceConfig {
        &self.config
    }

    /// Open an unauthenticated connection to the first reachable server.
    async fn open_connection(&self) -> DirSourceResult<Ldap> {
        let mut last_error = None;

        for url in &self.config.urls {
            debug!(url = %url, "connecting to directory server");

            let settings = LdapConnSettings::new()
                .set_conn_timeout(Duration::from_secs(self.config.connect_timeout_secs));

            match LdapConnAsync::with_settings(settings, url).await {
                Ok((conn, ldap)) => {
                    // Spawn the connection driver
                    tokio::spawn(async move {
                        if let Err(e) = conn.drive().await {
                            warn!(error = %e, "directory connection driver error");
                        }
                    });
                    return Ok(ldap);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "directory server unreachable");
                    last_error = Some(DirSourceError::connection_failed_with_source(
                        format!("failed to connect to {url}"),
                        e,
                    ));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DirSourceError::invalid_configuration("no server urls configured")
        }))
    }
}

impl fmt::Debug for LdapContextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LdapContextSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ContextSource for LdapContextSource {
    async fn get_context(&self) -> DirSourceResult<Ldap> {
        let mut ldap = self.open_connection().await?;
        let password = self.config.password.as_deref().unwrap_or("");
        self.strategy
            .authenticate(&mut ldap, &self.config.user_dn, password)
            .await?;

        info!(user_dn = %self.config.user_dn, "directory connection established");
        Ok(ldap)
    }

    async fn get_read_only_context(&self) -> DirSourceResult<Ldap> {
        if !self.config.anonymous_read_only {
            return self.get_context().await;
        }

        let mut ldap = self.open_connection().await?;

        // Anonymous bind: empty DN and password.
        let result = ldap.simple_bind("", "").await.map_err(|e| {
            DirSourceError::connection_failed_with_source("anonymous bind failed", e)
        })?;
        if result.rc != 0 {
            return Err(DirSourceError::connection_failed(format!(
                "anonymous bind failed with code {}: {}",
                result.rc, result.text
            )));
        }

        info!("anonymous read-only directory connection established");
        Ok(ldap)
    }
}
