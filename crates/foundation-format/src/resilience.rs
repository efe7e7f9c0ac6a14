//! Error-handling combinators.
//!
//! Small wrappers that decide what happens to a failed operation: re-raise it,
//! swallow it, substitute a fallback, undo partial work, or try again. All of
//! them log through `tracing` so failures that are absorbed still leave a trace.

use std::collections::HashMap;
use std::fmt::{self, Display};

use tracing::{debug, error, warn};

/// What [`error_boundary`] does with a failure after logging it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundaryPolicy<T> {
    /// Return the error to the caller.
    Reraise,
    /// Swallow the error and yield `None`.
    Suppress,
    /// Swallow the error and yield this value.
    Fallback(T),
}

/// Run `op`, logging any failure under `context` and applying `policy`.
///
/// Success yields `Ok(Some(value))`. A failure is always logged at error level
/// before the policy is applied.
///
/// ```
/// use foundation_format::{error_boundary, BoundaryPolicy};
///
/// let parsed = error_boundary("parse port", || "http".parse::<u16>(), BoundaryPolicy::Fallback(80));
/// assert_eq!(parsed, Ok(Some(80)));
/// ```
///
/// # Errors
///
/// Returns the original error when the policy is [`BoundaryPolicy::Reraise`].
pub fn error_boundary<T, E, F>(context: &str, op: F, policy: BoundaryPolicy<T>) -> Result<Option<T>, E>
where
    E: Display,
    F: FnOnce() -> Result<T, E>,
{
    match op() {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            error!(context, error = %err, "operation failed");
            match policy {
                BoundaryPolicy::Reraise => Err(err),
                BoundaryPolicy::Suppress => Ok(None),
                BoundaryPolicy::Fallback(value) => Ok(Some(value)),
            }
        }
    }
}

/// Run `op`; if it fails, run `rollback` and return the original error.
///
/// A failing rollback is logged but never replaces the error from `op`.
///
/// # Errors
///
/// Returns the error produced by `op`.
pub fn transactional<T, E, RE, F, R>(op: F, rollback: R) -> Result<T, E>
where
    E: Display,
    RE: Display,
    F: FnOnce() -> Result<T, E>,
    R: FnOnce() -> Result<(), RE>,
{
    match op() {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!(error = %err, "operation failed, rolling back");
            if let Err(rollback_err) = rollback() {
                error!(
                    error = %err,
                    rollback_error = %rollback_err,
                    "rollback failed"
                );
            }
            Err(err)
        }
    }
}

/// How [`ErrorHandler`] treats a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorPolicy<T> {
    /// Return the error.
    Raise,
    /// Drop the error silently and yield `None`.
    Suppress,
    /// Log the error and yield `None`.
    Log,
    /// Log the error and yield the given value.
    Fallback(T),
    /// Run the operation again, up to `attempts` more times.
    Retry {
        /// Additional attempts after the first failure.
        attempts: u32,
    },
}

type Classifier<E> = Box<dyn Fn(&E) -> &'static str + Send + Sync>;

/// Applies an [`ErrorPolicy`] to fallible closures.
///
/// With a classifier installed, each error is mapped to a class name and the
/// policy registered for that class wins over the default.
///
/// ```
/// use foundation_format::{ErrorHandler, ErrorPolicy};
///
/// let handler = ErrorHandler::new(ErrorPolicy::Raise)
///     .with_classifier(|e: &std::num::ParseIntError| {
///         if e.to_string().contains("empty") { "empty" } else { "other" }
///     })
///     .on("empty", ErrorPolicy::Fallback(0));
///
/// assert_eq!(handler.handle(|| "".parse::<i32>()), Ok(Some(0)));
/// assert!(handler.handle(|| "x".parse::<i32>()).is_err());
/// ```
pub struct ErrorHandler<T, E> {
    default: ErrorPolicy<T>,
    classifier: Option<Classifier<E>>,
    policies: HashMap<&'static str, ErrorPolicy<T>>,
}

impl<T, E> ErrorHandler<T, E>
where
    T: Clone,
    E: Display,
{
    /// Create a handler that applies `default` to every error.
    #[must_use]
    pub fn new(default: ErrorPolicy<T>) -> Self {
        Self {
            default,
            classifier: None,
            policies: HashMap::new(),
        }
    }

    /// Install the function that names an error's class.
    #[must_use]
    pub fn with_classifier<C>(mut self, classifier: C) -> Self
    where
        C: Fn(&E) -> &'static str + Send + Sync + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Register the policy for one error class.
    #[must_use]
    pub fn on(mut self, class: &'static str, policy: ErrorPolicy<T>) -> Self {
        self.policies.insert(class, policy);
        self
    }

    /// The policy that applies to `err`.
    #[must_use]
    pub fn policy_for(&self, err: &E) -> &ErrorPolicy<T> {
        self.classifier
            .as_ref()
            .and_then(|classify| self.policies.get(classify(err)))
            .unwrap_or(&self.default)
    }

    /// Run `op` and resolve a failure through the matching policy.
    ///
    /// The policy is chosen from the first error. Retries that keep failing
    /// return the last error.
    ///
    /// # Errors
    ///
    /// Returns the error under [`ErrorPolicy::Raise`], or the final error once
    /// [`ErrorPolicy::Retry`] runs out of attempts.
    pub fn handle<F>(&self, mut op: F) -> Result<Option<T>, E>
    where
        F: FnMut() -> Result<T, E>,
    {
        let err = match op() {
            Ok(value) => return Ok(Some(value)),
            Err(err) => err,
        };

        match self.policy_for(&err) {
            ErrorPolicy::Raise => Err(err),
            ErrorPolicy::Suppress => {
                debug!(error = %err, "error suppressed");
                Ok(None)
            }
            ErrorPolicy::Log => {
                error!(error = %err, "operation failed");
                Ok(None)
            }
            ErrorPolicy::Fallback(value) => {
                warn!(error = %err, "operation failed, using fallback");
                Ok(Some(value.clone()))
            }
            ErrorPolicy::Retry { attempts } => {
                let mut last = err;
                for attempt in 1..=*attempts {
                    warn!(attempt, max_attempts = attempts, error = %last, "retrying");
                    match op() {
                        Ok(value) => return Ok(Some(value)),
                        Err(next) => last = next,
                    }
                }
                Err(last)
            }
        }
    }
}

impl<T: fmt::Debug, E> fmt::Debug for ErrorHandler<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorHandler")
            .field("default", &self.default)
            .field("classified", &self.classifier.is_some())
            .field("policies", &self.policies)
            .finish()
    }
}
