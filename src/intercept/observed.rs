// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The observing decorator.

use std::fmt;
use std::sync::Arc;

use super::Observer;
use crate::types::{ApiKind, Target};

/// An entry point, optionally wrapped by an [`Observer`].
///
/// `Observed<T>` implements the same entry-point trait as `T` with the same
/// output types, so it can stand wherever `T` stood. When hooked it runs the
/// observation hook and then delegates; when unhooked it only delegates.
pub struct Observed<T> {
    inner: T,
    observer: Option<Arc<Observer>>,
}

/// Wrap `original` so every call through it is observed first.
pub fn wrap<T>(original: T, observer: Arc<Observer>) -> Observed<T> {
    Observed {
        inner: original,
        observer: Some(observer),
    }
}

impl<T> Observed<T> {
    /// A slot holding `original` with no instrumentation.
    pub fn unhooked(original: T) -> Self {
        Self {
            inner: original,
            observer: None,
        }
    }

    /// Whether an observer is attached.
    pub fn is_hooked(&self) -> bool {
        self.observer.is_some()
    }

    /// The original entry point.
    pub fn original(&self) -> &T {
        &self.inner
    }

    /// Unwrap, discarding any observer.
    pub fn into_original(self) -> T {
        self.inner
    }

    /// Attach `observer` unless one is already attached.
    ///
    /// Returns whether the slot changed.
    pub(crate) fn attach(&mut self, observer: Arc<Observer>) -> bool {
        if self.observer.is_some() {
            return false;
        }
        self.observer = Some(observer);
        true
    }

    /// Run the hook, if any.
    pub(crate) fn notify(&self, api: ApiKind, method: &str, target: impl Into<Target>) {
        if let Some(observer) = &self.observer {
            observer.observe(api, method, target);
        }
    }
}

impl<T: Clone> Clone for Observed<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            observer: self.observer.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Observed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observed")
            .field("inner", &self.inner)
            .field("hooked", &self.is_hooked())
            .finish()
    }
}
