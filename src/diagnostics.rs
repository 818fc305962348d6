//! Structured logging plus a bounded in-memory log of recent engine activity.
//!
//! Every line goes to `tracing` and into a fixed-size ring the host can read back
//! without a subscriber. Verbosity is fixed at construction: a verbose engine
//! reports per-turn summaries at `info`, a quiet one at `debug`. Warnings and
//! faults are always reported at their own level.

use heapless::HistoryBuffer;

/// Number of lines kept in the ring.
pub const DIAGNOSTIC_CAPACITY: usize = 100;

// Severity of a stored line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Severity {
    /// Routine per-turn activity.
    Trace,
    /// Something was repaired or skipped.
    Warning,
    /// A fault was contained.
    Fault,
}

impl Severity {
    const fn prefix(self) -> &'static str {
        match self {
            Severity::Trace => "",
            Severity::Warning => "warning: ",
            Severity::Fault => "fault: ",
        }
    }
}

/// Diagnostic sink owned by one engine.
pub struct Diagnostics {
    verbose: bool,
    ring: HistoryBuffer<String, DIAGNOSTIC_CAPACITY>,
}

impl Diagnostics {
    /// A sink with the given verbosity.
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            ring: HistoryBuffer::new(),
        }
    }

    /// `true` if routine lines are logged at `info`.
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Routine activity.
    pub fn trace(&mut self, line: impl Into<String>) {
        let line = line.into();
        if self.verbose {
            tracing::info!(target: "slow_burn", "{line}");
        } else {
            tracing::debug!(target: "slow_burn", "{line}");
        }
        self.push(Severity::Trace, line);
    }

    /// Store a routine line without emitting it, for callers that already
    /// logged a structured event.
    pub fn remember(&mut self, line: impl Into<String>) {
        self.push(Severity::Trace, line.into());
    }

    /// Something was repaired or skipped; the engine carried on.
    pub fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!(target: "slow_burn", "{line}");
        self.push(Severity::Warning, line);
    }

    /// A contained fault.
    pub fn fault(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::error!(target: "slow_burn", "{line}");
        self.push(Severity::Fault, line);
    }

    fn push(&mut self, severity: Severity, line: String) {
        self.ring.write(format!("{}{line}", severity.prefix()));
    }

    /// Stored lines, oldest first.
    pub fn recent(&self) -> Vec<String> {
        self.ring.oldest_ordered().cloned().collect()
    }

    /// The most recent line.
    pub fn last(&self) -> Option<&str> {
        self.ring.recent().map(String::as_str)
    }

    /// Number of stored lines.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// `true` if nothing has been stored.
    pub fn is_empty(&self) -> bool {
        self.ring.len() == 0
    }

    /// Drop every stored line.
    pub fn clear(&mut self) {
        self.ring.clear();
    }
}

impl core::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.verbose)
            .field("lines", &self.ring.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_is_bounded_and_ordered() {
        let mut d = Diagnostics::new(false);
        for i in 0..(DIAGNOSTIC_CAPACITY + 20) {
            d.trace(format!("line {i}"));
        }
        assert_eq!(d.len(), DIAGNOSTIC_CAPACITY);
        let lines = d.recent();
        assert_eq!(lines.first().map(String::as_str), Some("line 20"));
        assert_eq!(d.last(), Some("line 119"));
    }

    #[test]
    fn test_severity_prefixes() {
        let mut d = Diagnostics::new(true);
        d.warn("archetype reset");
        d.fault("scoring panicked");
        assert_eq!(d.recent(), vec!["warning: archetype reset", "fault: scoring panicked"]);
    }

    #[test]
    fn test_clear() {
        let mut d = Diagnostics::new(false);
        d.trace("x");
        d.clear();
        assert!(d.is_empty());
        assert_eq!(d.last(), None);
    }
}
