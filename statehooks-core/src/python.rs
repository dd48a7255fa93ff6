//! Python Bindings
//!
//! Python callers do not have tagged updates, so `StateCell.update` picks
//! the form from the argument: a callable is a transform, a `dict` is a
//! shallow merge, anything else replaces the value.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::history::History;

/// A Python object stored in a `History`.
///
/// Cloning takes the GIL to bump the reference count.
struct PyValue(Py<PyAny>);

impl Clone for PyValue {
    fn clone(&self) -> Self {
        Python::with_gil(|py| PyValue(self.0.clone_ref(py)))
    }
}

/// Python-exposed state cell.
#[pyclass(name = "StateCell")]
pub struct PyStateCell {
    value: RwLock<Py<PyAny>>,
    version: AtomicU64,

    /// Zero-argument callables run after every commit.
    watchers: RwLock<Vec<Py<PyAny>>>,
}

#[pymethods]
impl PyStateCell {
    /// Create a cell. A callable initial value is called once for the value.
    #[new]
    fn new(initial: &Bound<'_, PyAny>) -> PyResult<Self> {
        let value = if initial.is_callable() {
            initial.call0()?
        } else {
            initial.clone()
        };

        Ok(Self {
            value: RwLock::new(value.unbind()),
            version: AtomicU64::new(0),
            watchers: RwLock::new(Vec::new()),
        })
    }

    #[getter]
    fn value(&self, py: Python<'_>) -> Py<PyAny> {
        self.value.read().clone_ref(py)
    }

    #[getter]
    fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Commit a transform, merge, or replacement and notify watchers.
    fn update(&self, py: Python<'_>, arg: &Bound<'_, PyAny>) -> PyResult<()> {
        let current = self.value.read().clone_ref(py);

        let next = if arg.is_callable() {
            arg.call1((current,))?.unbind()
        } else if let Ok(patch) = arg.downcast::<PyDict>() {
            let merged = PyDict::new_bound(py);
            if let Ok(fields) = current.bind(py).downcast::<PyDict>() {
                merged.update(fields.as_mapping())?;
            }
            merged.update(patch.as_mapping())?;
            merged.into_any().unbind()
        } else {
            arg.clone().unbind()
        };

        *self.value.write() = next;
        self.version.fetch_add(1, Ordering::SeqCst);

        let watchers: Vec<Py<PyAny>> = self
            .watchers
            .read()
            .iter()
            .map(|watcher| watcher.clone_ref(py))
            .collect();
        for watcher in watchers {
            watcher.call0(py)?;
        }
        Ok(())
    }

    /// Register a zero-argument callable run after every commit.
    fn subscribe(&self, callback: Py<PyAny>) {
        self.watchers.write().push(callback);
    }

    fn subscriber_count(&self) -> usize {
        self.watchers.read().len()
    }

    fn __repr__(&self, py: Python<'_>) -> String {
        let value = self.value.read();
        let repr = value
            .bind(py)
            .repr()
            .map(|r| r.to_string())
            .unwrap_or_else(|_| "?".to_string());
        format!("StateCell(value={}, version={})", repr, self.version())
    }
}

/// Python-exposed undo/redo history.
#[pyclass(name = "History")]
pub struct PyHistory {
    inner: RwLock<History<PyValue>>,
}

#[pymethods]
impl PyHistory {
    #[new]
    #[pyo3(signature = (initial, limit=None))]
    fn new(initial: Py<PyAny>, limit: Option<usize>) -> Self {
        let initial = PyValue(initial);
        let history = match limit {
            Some(limit) => History::with_limit(initial, limit),
            None => History::new(initial),
        };
        Self {
            inner: RwLock::new(history),
        }
    }

    #[getter]
    fn state(&self, py: Python<'_>) -> Py<PyAny> {
        self.inner.read().present().0.clone_ref(py)
    }

    #[getter]
    fn past(&self, py: Python<'_>) -> Vec<Py<PyAny>> {
        self.inner
            .read()
            .past()
            .iter()
            .map(|value| value.0.clone_ref(py))
            .collect()
    }

    #[getter]
    fn future(&self, py: Python<'_>) -> Vec<Py<PyAny>> {
        self.inner
            .read()
            .future()
            .iter()
            .map(|value| value.0.clone_ref(py))
            .collect()
    }

    #[getter]
    fn can_undo(&self) -> bool {
        self.inner.read().can_undo()
    }

    #[getter]
    fn can_redo(&self) -> bool {
        self.inner.read().can_redo()
    }

    fn set(&self, value: Py<PyAny>) {
        self.inner.write().set(PyValue(value));
    }

    fn undo(&self) -> bool {
        self.inner.write().undo()
    }

    fn redo(&self) -> bool {
        self.inner.write().redo()
    }

    fn clear(&self) {
        self.inner.write().clear();
    }

    fn __repr__(&self) -> String {
        let history = self.inner.read();
        format!(
            "History(past={}, future={})",
            history.past().len(),
            history.future().len()
        )
    }
}
