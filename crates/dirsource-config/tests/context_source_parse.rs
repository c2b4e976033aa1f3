//! End-to-end parsing of `<context-source>` documents.

use dirsource_config::{
    ConfigError, ContextSourceParser, ContextSourceRegistry, ProxyTarget, DEFAULT_ID,
};
use dirsource_core::pool::{ExhaustionAction, DEFAULT_VALIDATION_FILTER};

#[test]
fn parses_minimal_document_into_registered_proxy() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<context-source username="cn=admin,dc=example,dc=com"
                password="secret"
                url="ldap://ldap.example.com:389"/>"#;

    let mut registry = ContextSourceRegistry::new();
    let definition = ContextSourceParser::parse_str(xml, &mut registry).unwrap();

    assert_eq!(definition.id, DEFAULT_ID);
    assert!(!definition.target.is_pooled());
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(DEFAULT_ID));

    let config = &definition.target.context_source().config;
    assert_eq!(config.urls, vec!["ldap://ldap.example.com:389"]);
    assert_eq!(config.base, "");
}

#[test]
fn parses_namespaced_document_with_pooling_and_validation() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ldap:context-source xmlns:ldap="http://dirsource.example.com/schema/ldap"
                     id="pooledSource"
                     username="cn=admin,dc=example,dc=com"
                     password="secret"
                     url="ldap://a.example.com, ldap://b.example.com"
                     base="dc=example,dc=com"
                     anonymous-read-only="true">
    <ldap:pooling max-active="4"
                  max-idle="2"
                  when-exhausted="FAIL"
                  test-on-borrow="true"
                  test-while-idle="true"
                  validation-query-filter="(objectclass=organizationalUnit)"
                  eviction-run-interval-millis="30000"
                  tests-per-eviction-run="5"/>
</ldap:context-source>"#;

    let mut registry = ContextSourceRegistry::new();
    let definition = ContextSourceParser::parse_str(xml, &mut registry).unwrap();

    assert_eq!(definition.id, "pooledSource");
    assert!(registry.contains("pooledSource"));

    let ProxyTarget::Pooled(pooling) = &definition.target else {
        panic!("expected a pooled target");
    };

    let config = &pooling.context_source.config;
    assert_eq!(config.urls, vec!["ldap://a.example.com", "ldap://b.example.com"]);
    assert_eq!(config.base, "dc=example,dc=com");
    assert!(config.anonymous_read_only);

    assert_eq!(pooling.pool.max_active, 4);
    assert_eq!(pooling.pool.max_idle, 2);
    assert_eq!(pooling.pool.when_exhausted, ExhaustionAction::Fail);
    assert!(pooling.pool.test_on_borrow);
    assert!(pooling.pool.test_while_idle);
    assert_eq!(pooling.pool.eviction_run_interval_millis, 30_000);
    assert_eq!(pooling.pool.tests_per_eviction_run, 5);

    let validation = pooling.validation.as_ref().expect("validator expected");
    assert_eq!(validation.validator.filter, "(objectclass=organizationalUnit)");
    assert_eq!(validation.validator.base, "");
}

#[test]
fn default_validation_filter_applies_when_unspecified() {
    let xml = r#"<context-source username="admin" password="secret" url="ldap://a">
    <pooling test-on-return="true"/>
</context-source>"#;

    let mut registry = ContextSourceRegistry::new();
    let definition = ContextSourceParser::parse_str(xml, &mut registry).unwrap();

    let ProxyTarget::Pooled(pooling) = &definition.target else {
        panic!("expected a pooled target");
    };
    let validation = pooling.validation.as_ref().expect("validator expected");
    assert_eq!(validation.validator.filter, DEFAULT_VALIDATION_FILTER);
}

#[test]
fn missing_username_fails_before_registration() {
    let xml = r#"<context-source password="secret" url="ldap://a"/>"#;

    let mut registry = ContextSourceRegistry::new();
    let err = ContextSourceParser::parse_str(xml, &mut registry).unwrap_err();

    assert!(matches!(
        err,
        ConfigError::MissingAttribute { name: "username" }
    ));
    assert!(registry.is_empty());
}

#[test]
fn unexpected_root_element_is_rejected() {
    let xml = r#"<pooling max-active="4"/>"#;

    let mut registry = ContextSourceRegistry::new();
    let err = ContextSourceParser::parse_str(xml, &mut registry).unwrap_err();
    assert!(matches!(err, ConfigError::Xml { .. }));
}

#[tokio::test]
async fn parsed_definition_materializes_with_proxy_outermost() {
    let xml = r#"<context-source username="admin" password="secret" url="ldap://a">
    <pooling max-active="2" test-on-borrow="true"/>
</context-source>"#;

    let mut registry = ContextSourceRegistry::new();
    let definition = ContextSourceParser::parse_str(xml, &mut registry).unwrap();

    // building wires the stack without touching the network
    let proxy = definition.build().unwrap();
    let _ = proxy.target();
}
