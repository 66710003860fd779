// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Origin deduplication.
//!
//! Decides, for one observed call, whether a report should be sent. Reports
//! are keyed by canonical origin (scheme + host), not by full URL or by
//! method, so reporting volume is bounded by the number of distinct services
//! an application talks to rather than by its request volume.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{trace, warn};
use url::{ParseError, Url};

use crate::config::SentinelConfig;
use crate::error::TargetError;
use crate::telemetry::SentinelMetrics;
use crate::types::{CanonicalOrigin, ObservedCall, Target};

/// At-most-once-per-origin gate in front of the reporter.
#[derive(Debug)]
pub struct OriginDeduplicator {
    config: Arc<SentinelConfig>,
    /// Origins already admitted. Only ever grows.
    seen: Mutex<HashSet<String>>,
    metrics: Arc<SentinelMetrics>,
}

impl OriginDeduplicator {
    pub fn new(config: Arc<SentinelConfig>, metrics: Arc<SentinelMetrics>) -> Self {
        Self {
            config,
            seen: Mutex::new(HashSet::new()),
            metrics,
        }
    }

    /// Resolve a raw target into an absolute URL.
    ///
    /// Relative targets are joined onto the configured document origin.
    pub fn resolve(&self, target: &Target) -> Result<Url, TargetError> {
        let text = match target {
            Target::Url(url) => return Ok(url.clone()),
            Target::Text(text) => text.as_str(),
        };

        match &self.config.document_origin {
            Some(base) => Url::options()
                .base_url(Some(base))
                .parse(text)
                .map_err(|e| TargetError::malformed(text, e)),
            None => Url::parse(text).map_err(|e| match e {
                ParseError::RelativeUrlWithoutBase => TargetError::RelativeWithoutBase(text.to_string()),
                other => TargetError::malformed(text, other),
            }),
        }
    }

    /// Canonical origin of a raw target.
    pub fn canonical_origin(&self, target: &Target) -> Result<CanonicalOrigin, TargetError> {
        let url = self.resolve(target)?;
        CanonicalOrigin::from_url(&url).ok_or_else(|| TargetError::OpaqueOrigin(target.to_string()))
    }

    /// Admit a call for reporting, returning its origin the first time that
    /// origin is seen.
    ///
    /// The membership check and the insertion happen under one lock, so the
    /// same origin is never admitted twice, even from concurrent callers.
    pub fn admit(&self, call: &ObservedCall) -> Option<CanonicalOrigin> {
        let origin = match self.canonical_origin(&call.raw_target) {
            Ok(origin) => origin,
            Err(e) => {
                warn!(api = %call.api, error = %e, "Request Sentinel | Skipping unparseable target");
                #[cfg(feature = "telemetry")]
                self.metrics.record_malformed();
                return None;
            }
        };

        if self.config.is_collector_target(origin.as_str()) {
            trace!(%origin, "Request Sentinel | Ignoring call to the collector");
            #[cfg(feature = "telemetry")]
            self.metrics.record_self_excluded();
            return None;
        }

        let inserted = self
            .seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(origin.as_str().to_string());

        if !inserted {
            trace!(%origin, "Request Sentinel | Origin already reported");
            #[cfg(feature = "telemetry")]
            self.metrics.record_duplicate();
            return None;
        }

        Some(origin)
    }

    /// Whether a report should be emitted for this call.
    ///
    /// A `true` answer is final: the origin is recorded as reported.
    pub fn should_report(&self, call: &ObservedCall) -> bool {
        self.admit(call).is_some()
    }

    /// Number of distinct origins admitted so far.
    pub fn seen_count(&self) -> usize {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether `origin` has already been admitted.
    pub fn has_seen(&self, origin: &str) -> bool {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiKind;

    fn dedup_with(config: SentinelConfig) -> OriginDeduplicator {
        OriginDeduplicator::new(Arc::new(config), Arc::new(SentinelMetrics::new()))
    }

    fn dedup() -> OriginDeduplicator {
        dedup_with(
            SentinelConfig::new("key", "1.0.0", "test")
                .with_document_origin(Url::parse("https://app.example.com").unwrap()),
        )
    }

    fn fetch(target: &str) -> ObservedCall {
        ObservedCall::new(ApiKind::Fetch, "GET", target)
    }

    #[test]
    fn test_first_call_is_reported() {
        let dedup = dedup();
        assert!(dedup.should_report(&fetch("https://api.example.com/v1/users")));
        assert!(dedup.has_seen("https://api.example.com"));
    }

    #[test]
    fn test_same_origin_different_path_is_suppressed() {
        let dedup = dedup();
        assert!(dedup.should_report(&fetch("https://api.example.com/v1/users")));
        assert!(!dedup.should_report(&fetch("https://api.example.com/v2/orders?page=2")));
        assert!(!dedup.should_report(&fetch("https://api.example.com/#fragment")));
        assert_eq!(dedup.seen_count(), 1);
    }

    #[test]
    fn test_method_does_not_split_origins() {
        let dedup = dedup();
        assert!(dedup.should_report(&ObservedCall::new(ApiKind::Fetch, "GET", "https://a.example/")));
        assert!(!dedup.should_report(&ObservedCall::new(
            ApiKind::XmlHttpRequest,
            "POST",
            "https://a.example/submit"
        )));
    }

    #[test]
    fn test_scheme_splits_origins() {
        let dedup = dedup();
        assert!(dedup.should_report(&fetch("http://a.example/")));
        assert!(dedup.should_report(&fetch("https://a.example/")));
        assert!(dedup.should_report(&ObservedCall::new(ApiKind::WebSocket, "WEBSOCKET", "wss://a.example/socket")));
        assert_eq!(dedup.seen_count(), 3);
    }

    #[test]
    fn test_relative_target_uses_document_origin() {
        let dedup = dedup();
        assert!(dedup.should_report(&fetch("/api/example")));
        assert!(!dedup.should_report(&fetch("https://app.example.com/other/path")));
        assert!(dedup.has_seen("https://app.example.com"));
    }

    #[test]
    fn test_relative_target_without_document_origin() {
        let dedup = dedup_with(SentinelConfig::new("key", "1.0.0", "test"));
        let result = dedup.canonical_origin(&Target::from("/api/example"));
        assert!(matches!(result, Err(TargetError::RelativeWithoutBase(_))));
        assert!(!dedup.should_report(&fetch("/api/example")));
        assert_eq!(dedup.seen_count(), 0);
    }

    #[test]
    fn test_malformed_target_is_not_reported() {
        let dedup = dedup();
        let result = dedup.canonical_origin(&Target::from("http://[::1"));
        assert!(matches!(result, Err(TargetError::Malformed { .. })));
        assert!(!dedup.should_report(&fetch("http://[::1")));
        assert_eq!(dedup.seen_count(), 0);
    }

    #[test]
    fn test_opaque_origin_is_not_reported() {
        let dedup = dedup();
        let result = dedup.canonical_origin(&Target::from("data:text/plain,hi"));
        assert!(matches!(result, Err(TargetError::OpaqueOrigin(_))));
        assert!(!dedup.should_report(&fetch("data:text/plain,hi")));
    }

    #[test]
    fn test_collector_is_never_reported() {
        let dedup = dedup();
        let target = "https://api.requestsentinel.com/processor/ingest/request/outgoing";
        assert!(!dedup.should_report(&fetch(target)));
        assert!(!dedup.should_report(&fetch(target)));
        assert_eq!(dedup.seen_count(), 0);
    }

    #[test]
    fn test_structured_url_target() {
        let dedup = dedup();
        let call = ObservedCall::new(
            ApiKind::XmlHttpRequest,
            "GET",
            Url::parse("https://cdn.example.net/lib.js").unwrap(),
        );
        assert!(dedup.should_report(&call));
        assert!(dedup.has_seen("https://cdn.example.net"));
    }

    #[cfg(feature = "telemetry")]
    #[test]
    fn test_decisions_are_counted() {
        let metrics = Arc::new(SentinelMetrics::new());
        let config = SentinelConfig::new("key", "1.0.0", "test");
        let dedup = OriginDeduplicator::new(Arc::new(config), Arc::clone(&metrics));

        dedup.should_report(&fetch("https://a.example/1"));
        dedup.should_report(&fetch("https://a.example/2"));
        dedup.should_report(&fetch("https://api.requestsentinel.com/"));
        dedup.should_report(&fetch("::not a url::"));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.duplicates_suppressed, 1);
        assert_eq!(snapshot.self_excluded, 1);
        assert_eq!(snapshot.malformed_targets, 1);
    }

    #[test]
    fn test_concurrent_admission_is_once_only() {
        let dedup = Arc::new(dedup());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dedup = Arc::clone(&dedup);
                std::thread::spawn(move || {
                    (0..50)
                        .filter(|i| dedup.should_report(&fetch(&format!("https://svc{}.example/x", i % 5))))
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 5);
        assert_eq!(dedup.seen_count(), 5);
    }
}
