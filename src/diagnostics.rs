/*!
The `diagnostics` module provides the severity tag and sink through which the
codec reports recoverable problems. The core never prints; callers inject a
sink, or get the `log`-backed default.
!*/

use std::fmt::{Display, Formatter};

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl Display for Severity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "Warning"),
            Severity::Error => write!(f, "Error"),
        }
    }
}

/// Receives human-readable diagnostics while parsing or merging.
pub type DiagnosticSink<'a> = dyn FnMut(Severity, &str) + 'a;

/// The default sink, which forwards to the `log` crate.
pub(crate) fn log_sink(severity: Severity, message: &str) {
    match severity {
        Severity::Warning => log::warn!("{}", message),
        Severity::Error => log::error!("{}", message),
    }
}
