//! Python FFI bindings via PyO3.
//!
//! State crosses the boundary as JSON: ledgers as [`LedgerSnapshot`] objects,
//! chat records as [`ChatRecord`] objects. The host stores whatever it gets back
//! and passes it in on the next call.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! import json
//! from slow_burn_core import Engine
//!
//! engine = Engine('{"regression_enabled": true}')
//! state = json.loads(engine.load(1))
//!
//! turn = json.loads(engine.before_prompt(
//!     json.dumps(state["ledger"]), json.dumps(state["record"]), "Hi! How was your day?"))
//! print(turn["directive"])
//!
//! reply = json.loads(engine.after_response(json.dumps(turn["ledger"]), "She smiles."))
//! print(reply["modified_message"], reply["notice"])
//! ```

#![allow(non_snake_case)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use serde::Deserialize;
use serde_json::json;

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::ledger::ChatRecord;
use crate::snapshot::LedgerSnapshot;

fn parse<T: serde::de::DeserializeOwned>(what: &str, text: &str) -> PyResult<T> {
    serde_json::from_str(text).map_err(|e| PyValueError::new_err(format!("invalid {what} JSON: {e}")))
}

/// Stored ledgers are untrusted. Only unreadable JSON is an error; a value of
/// the wrong shape restores as an empty snapshot and is repaired downstream.
fn parse_snapshot(text: &str) -> PyResult<LedgerSnapshot> {
    let value: serde_json::Value = parse("ledger", text)?;
    Ok(LedgerSnapshot::deserialize(value).unwrap_or_default())
}

fn render(value: serde_json::Value) -> PyResult<String> {
    serde_json::to_string(&value).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Progression and enforcement engine.
///
/// Args:
///     config_json: optional JSON object with any of `regression_enabled`,
///         `regress_disengagement`, `show_progress_ui`, `verbose_logging`,
///         `thoughtful_policy`, `consistency_policy`.
#[pyclass(name = "Engine")]
pub struct PyEngine {
    inner: Engine,
}

#[pymethods]
impl PyEngine {
    /// Create an engine.
    #[new]
    #[pyo3(signature = (config_json=None))]
    pub fn new(config_json: Option<&str>) -> PyResult<Self> {
        let config = match config_json {
            Some(text) => parse::<EngineConfig>("config", text)?,
            None => EngineConfig::default(),
        };
        Ok(Self { inner: Engine::new(config) })
    }

    /// Initialise state for a chat. Returns `{"ledger", "record", "warnings"}`.
    #[pyo3(signature = (character_count, ledger_json=None, record_json=None))]
    pub fn load(
        &mut self,
        character_count: usize,
        ledger_json: Option<&str>,
        record_json: Option<&str>,
    ) -> PyResult<String> {
        let snapshot = ledger_json
            .map(parse_snapshot)
            .transpose()?;
        let record = record_json
            .map(|t| parse::<ChatRecord>("record", t))
            .transpose()?;
        let out = self.inner.load(character_count, snapshot.as_ref(), record);
        render(json!({
            "ledger": out.ledger.snapshot(),
            "record": out.record,
            "warnings": out.warnings,
        }))
    }

    /// Process a user turn.
    ///
    /// Returns `{"ledger", "record", "directive", "notice", "error"}`.
    pub fn before_prompt(&mut self, ledger_json: &str, record_json: &str, text: &str) -> PyResult<String> {
        let snapshot = parse_snapshot(ledger_json)?;
        let record = parse::<ChatRecord>("record", record_json)?;
        let ledger = self.inner.restore(&snapshot);
        let out = self.inner.before_prompt(ledger, record, text);
        render(json!({
            "ledger": out.ledger.snapshot(),
            "record": out.record,
            "directive": out.directive,
            "notice": out.notice,
            "error": out.error.map(|e| e.to_string()),
        }))
    }

    /// Check a generated message.
    ///
    /// Returns `{"ledger", "modified_message", "directive", "notice", "error"}`.
    pub fn after_response(&mut self, ledger_json: &str, text: &str) -> PyResult<String> {
        let snapshot = parse_snapshot(ledger_json)?;
        let ledger = self.inner.restore(&snapshot);
        let out = self.inner.after_response(&ledger, text);
        render(json!({
            "ledger": out.ledger.snapshot(),
            "modified_message": out.rewritten,
            "directive": out.correction,
            "notice": out.notice,
            "error": out.error.map(|e| e.to_string()),
        }))
    }

    /// Repair a stored ledger for a branch switch. Returns the repaired ledger.
    pub fn restore(&mut self, ledger_json: &str) -> PyResult<String> {
        let snapshot = parse_snapshot(ledger_json)?;
        let ledger = self.inner.restore(&snapshot);
        render(json!(ledger.snapshot()))
    }

    /// Recent diagnostic lines, oldest first.
    pub fn diagnostics(&self) -> Vec<String> {
        self.inner.diagnostics().recent()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("Engine(config={:?})", self.inner.config())
    }
}

/// Python module definition.
#[pymodule]
pub fn slow_burn_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyEngine>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add("MAX_AFFECTION", crate::stage::MAX_AFFECTION)?;
    Ok(())
}
