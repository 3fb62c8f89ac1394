//! Diagnostics for constructs the generator deliberately skips.
//!
//! Generation never fails because of an unsupported method; it reports a
//! [`Diagnostic`] to a [`DiagnosticSink`] and moves on to the next sibling.
//! The sink is passed into the generator, so tests can capture reports with
//! [`CollectingSink`] while binaries forward them to `tracing` through
//! [`TracingSink`].

use std::fmt;
use std::sync::{Mutex, PoisonError};

use stubgen_define::MethodKind;
use tracing::warn;

/// A notice about something left out of the generated output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A streaming method was skipped; only unary wrappers are generated.
    StreamingMethodSkipped {
        service: String,
        method: String,
        kind: MethodKind,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StreamingMethodSkipped {
                service,
                method,
                kind,
            } => write!(
                f,
                "TODO: cannot generate {} method {}.{} yet, skipped",
                kind, service, method
            ),
        }
    }
}

/// Receives diagnostics as the generator produces them.
pub trait DiagnosticSink {
    /// Records one diagnostic. Must not panic or abort generation.
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` as warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::StreamingMethodSkipped {
                service,
                method,
                kind,
            } => {
                warn!(
                    service = %service,
                    method = %method,
                    kind = %kind,
                    "{}",
                    diagnostic
                );
            }
        }
    }
}

/// Keeps every diagnostic in memory, in report order.
///
/// ## Examples
///
/// ```
/// use stubgen_define::MethodKind;
/// use stubgen_gen::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink};
///
/// let sink = CollectingSink::default();
/// sink.report(Diagnostic::StreamingMethodSkipped {
///     service: "Echo".to_string(),
///     method: "Listen".to_string(),
///     kind: MethodKind::ServerStreaming,
/// });
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    /// Snapshot of everything reported so far.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of diagnostics reported.
    pub fn len(&self) -> usize {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// `true` if nothing has been reported.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}
