//! Sanitizer layers and the properties the shield relies on.

use std::collections::BTreeSet;

use inputshield::rules::RuleEngine;
use inputshield::sanitize::sqli::SqlSanitizer;
use inputshield::sanitize::xss::XssSanitizer;
use inputshield::sanitize::{sanitize, SanitizePipeline, Sanitizer};
use inputshield::verdict::Category;

const XSS_PAYLOADS: &[&str] = &[
    "<script>alert(1)</script> hello",
    "<img src=x onerror=alert(1)>",
    r#"<a href="javascript:alert(1)">click</a>"#,
    "<body onload=alert('x')>",
    "<svg/onload=alert(1)>",
    "<scr<script>ipt>alert(1)</script>",
];

const SQL_PAYLOADS: &[&str] = &[
    "admin' OR '1'='1",
    "x' OR 1=1 --",
    "'; DROP TABLE users; --",
    "1 UNION SELECT password FROM users",
    "name WHERE id = 1 OR 1 = 1",
];

// ---------------------------------------------------------------------------
// XSS layer
// ---------------------------------------------------------------------------

#[test]
fn xss_keeps_surrounding_text() {
    let out = XssSanitizer.sanitize("<script>alert(1)</script> hello");
    assert!(!out.contains("<script>"));
    assert!(out.contains("hello"));
}

#[test]
fn xss_layer_metadata() {
    assert_eq!(XssSanitizer.name(), "xss");
    assert_eq!(XssSanitizer.category(), Category::Xss);
}

// ---------------------------------------------------------------------------
// SQL layer
// ---------------------------------------------------------------------------

#[test]
fn sql_removes_quotes_and_tautology() {
    let out = SqlSanitizer.sanitize("admin' OR '1'='1");
    assert_eq!(out, "admin");
    assert!(!out.contains('\''));
}

#[test]
fn sql_layer_metadata() {
    assert_eq!(SqlSanitizer.name(), "sqli");
    assert_eq!(SqlSanitizer.category(), Category::Sqli);
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn pipeline_runs_requested_categories_only() {
    let xss_only: BTreeSet<_> = [Category::Xss].into_iter().collect();
    assert_eq!(sanitize("<b>it's</b>", &xss_only), "bit's/b");

    let sql_only: BTreeSet<_> = [Category::Sqli].into_iter().collect();
    assert_eq!(sanitize("<b>it's</b>", &sql_only), "<b>it s</b>");
}

#[test]
fn empty_pipeline_is_identity() {
    let pipeline = SanitizePipeline::for_categories(&BTreeSet::new());
    assert_eq!(pipeline.layers().count(), 0);
    assert_eq!(pipeline.sanitize(" keep  as is "), " keep  as is ");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn xss_output_has_no_residual_hits() {
    let engine = RuleEngine::shield();
    for payload in XSS_PAYLOADS {
        assert!(!engine.xss_hits(payload).is_empty(), "payload {:?} should hit", payload);
        let out = XssSanitizer.sanitize(payload);
        assert!(engine.xss_hits(&out).is_empty(), "{:?} -> {:?}", payload, out);
    }
}

#[test]
fn sql_output_has_no_residual_hits() {
    let engine = RuleEngine::shield();
    for payload in SQL_PAYLOADS {
        assert!(!engine.sqli_hits(payload).is_empty(), "payload {:?} should hit", payload);
        let out = SqlSanitizer.sanitize(payload);
        assert!(engine.sqli_hits(&out).is_empty(), "{:?} -> {:?}", payload, out);
    }
}

#[test]
fn sanitizing_twice_changes_nothing() {
    for payload in XSS_PAYLOADS {
        let once = XssSanitizer.sanitize(payload);
        assert_eq!(XssSanitizer.sanitize(&once), once);
    }
    for payload in SQL_PAYLOADS {
        let once = SqlSanitizer.sanitize(payload);
        assert_eq!(SqlSanitizer.sanitize(&once), once);
    }
}
