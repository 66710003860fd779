// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configure-then-send entry point (`XMLHttpRequest.prototype.open`).

use super::Observed;
use crate::types::{ApiKind, OpenArgs};

/// The `open` step of a configure-then-send request object.
///
/// Implemented once per request type, not per instance; the instance being
/// configured is passed explicitly as `request`.
pub trait XhrOpen {
    /// The request object being configured.
    type Request;
    /// What `open` hands back to its caller.
    type Output;

    fn open(&self, request: &mut Self::Request, args: OpenArgs) -> Self::Output;
}

impl<X: XhrOpen> XhrOpen for Observed<X> {
    type Request = X::Request;
    type Output = X::Output;

    fn open(&self, request: &mut Self::Request, args: OpenArgs) -> Self::Output {
        self.notify(ApiKind::XmlHttpRequest, &args.method, args.target.clone());
        self.original().open(request, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intercept::tests::{observer, Recorder};
    use crate::intercept::wrap;
    use crate::types::Target;

    /// Records what it was opened with on the request itself.
    struct RecordingOpen;

    #[derive(Debug, Default)]
    struct FakeRequest {
        opened: Option<OpenArgs>,
    }

    impl XhrOpen for RecordingOpen {
        type Request = FakeRequest;
        type Output = usize;

        fn open(&self, request: &mut FakeRequest, args: OpenArgs) -> usize {
            let extra = args.extra.len();
            request.opened = Some(args);
            extra
        }
    }

    #[tokio::test]
    async fn test_open_arguments_reach_original_untouched() {
        let recorder = Recorder::default();
        let wrapped = wrap(RecordingOpen, observer(&recorder));

        let args = OpenArgs::new("PUT", "https://api.example.com/items/1")
            .with_credentials("user", "pass")
            .with_extra(serde_json::json!({"trace": true}));
        let mut request = FakeRequest::default();

        let output = wrapped.open(&mut request, args.clone());

        assert_eq!(output, 1);
        let opened = request.opened.unwrap();
        assert_eq!(opened, args);
        assert_eq!(opened.async_flag, None);
        assert!(opened.is_async());
    }

    #[tokio::test]
    async fn test_open_is_observed_with_verbatim_method() {
        let recorder = Recorder::default();
        let wrapped = wrap(RecordingOpen, observer(&recorder));
        let mut request = FakeRequest::default();

        wrapped.open(&mut request, OpenArgs::new("post", "https://api.example.com/a").with_async(false));

        let reports = recorder.wait_for(1).await;
        assert_eq!(reports[0]["method"], "post");
        assert_eq!(reports[0]["url"], "https://api.example.com");
    }

    #[tokio::test]
    async fn test_unhooked_open_only_delegates() {
        let slot = Observed::unhooked(RecordingOpen);
        let mut request = FakeRequest::default();

        let output = slot.open(&mut request, OpenArgs::new("GET", Target::from("/relative")));

        assert_eq!(output, 0);
        assert!(request.opened.is_some());
    }
}
