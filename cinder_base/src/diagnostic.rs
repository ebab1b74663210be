//! A module for handling diagnostics reported by the compiler stages.
//!
//! The lexical engine never prints or terminates the process on its own;
//! every anomaly it detects is routed through a [`Handler`] supplied by the
//! caller, which decides whether to store, count, print, or discard it.

use std::{
    fmt::Display,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use derive_more::{Deref, DerefMut};

use crate::log::{Message, Severity};

/// Represents a trait responsible for handling diagnostics reported by the
/// compiler stages.
pub trait Handler<T> {
    /// Receives a diagnostic and handles it.
    fn receive(&self, diagnostic: T);
}

/// Is a struct that implements [`Handler`] trait by storing all diagnostics
/// in a vector.
#[derive(Debug, Deref, DerefMut)]
pub struct Storage<T: Send + Sync> {
    diagnostics: RwLock<Vec<T>>,
}

impl<T: Send + Sync> Storage<T> {
    /// Creates a new empty [`Storage`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            diagnostics: RwLock::new(Vec::new()),
        }
    }

    /// Consumes the [`Storage`] and returns the underlying vector of
    /// diagnostics.
    pub fn into_vec(self) -> Vec<T> { self.diagnostics.into_inner().unwrap() }

    /// Returns a reference to the underlying vector of diagnostics.
    pub fn as_vec(&self) -> RwLockReadGuard<Vec<T>> { self.diagnostics.read().unwrap() }

    /// Returns a mutable reference to the underlying vector of diagnostics.
    pub fn as_vec_mut(&self) -> RwLockWriteGuard<Vec<T>> { self.diagnostics.write().unwrap() }
}

impl<T: Send + Sync> Default for Storage<T> {
    fn default() -> Self { Self::new() }
}

impl<T: Send + Sync, U> Handler<U> for Storage<T>
where
    U: Into<T>,
{
    fn receive(&self, diagnostic: U) {
        self.diagnostics.write().unwrap().push(diagnostic.into());
    }
}

/// Is a struct that implements [`Handler`] trait by doing nothing with the
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dummy;

impl<T> Handler<T> for Dummy {
    fn receive(&self, _diagnostic: T) {}
}

/// Is a struct that implements [`Handler`] trait by counting the number of
/// diagnostics received.
#[derive(Debug, Default)]
pub struct Counter {
    counter: RwLock<usize>,
}

impl Counter {
    /// Returns the number of diagnostics received.
    #[must_use]
    pub fn count(&self) -> usize { *self.counter.read().unwrap() }

    /// Resets the counter to zero.
    pub fn reset(&self) { *self.counter.write().unwrap() = 0 }
}

impl<T> Handler<T> for Counter {
    fn receive(&self, _diagnostic: T) { *self.counter.write().unwrap() += 1; }
}

/// Is a struct that implements [`Handler`] trait by printing each diagnostic
/// to the standard error stream, prefixed with the name of the component that
/// reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tracer {
    /// The component tag prepended to every printed diagnostic.
    pub component: &'static str,

    /// The severity every printed diagnostic is reported with.
    pub severity: Severity,
}

impl Tracer {
    /// Creates a new [`Tracer`] with the given component tag, reporting at
    /// the info severity.
    #[must_use]
    pub fn new(component: &'static str) -> Self {
        Self {
            component,
            severity: Severity::Info,
        }
    }

    /// Creates a new [`Tracer`] with the given component tag and severity.
    #[must_use]
    pub fn with_severity(component: &'static str, severity: Severity) -> Self {
        Self {
            component,
            severity,
        }
    }
}

impl<T: Display> Handler<T> for Tracer {
    fn receive(&self, diagnostic: T) {
        eprintln!(
            "{}",
            Message::new(
                self.severity,
                format!("[{}] {diagnostic}", self.component)
            )
        );
    }
}
