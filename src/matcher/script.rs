//! Scripted predicates.
//!
//! The expression language is supplied by the host through [`ScriptEvaluator`]. Scripts
//! are compiled when the matcher is built and see the subject under [`SCRIPT_VALUE_KEY`].
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellValue;
use std::collections::HashMap;

/// Binding name under which the tested subject is exposed to scripts.
pub const SCRIPT_VALUE_KEY: &str = "value";

pub type Bindings = HashMap<String, CellValue>;

/// Compiles script source text into a reusable predicate.
pub trait ScriptEvaluator {
    fn compile(&self, source: &str) -> anyhow::Result<Box<dyn CompiledScript>>;
}

/// A compiled script. It must produce a boolean for the given bindings.
pub trait CompiledScript: Send + Sync {
    fn evaluate(&self, bindings: &Bindings) -> anyhow::Result<bool>;
}

/// Subjects that can be handed to a script.
pub trait ScriptBinding {
    fn binding(&self) -> CellValue;
}

impl ScriptBinding for CellValue {
    fn binding(&self) -> CellValue {
        self.clone()
    }
}

impl ScriptBinding for Cell {
    fn binding(&self) -> CellValue {
        self.value.clone()
    }
}

impl ScriptBinding for String {
    fn binding(&self) -> CellValue {
        CellValue::Text(self.clone())
    }
}

impl ScriptBinding for f64 {
    fn binding(&self) -> CellValue {
        CellValue::Number(*self)
    }
}

impl ScriptBinding for i64 {
    fn binding(&self) -> CellValue {
        CellValue::Number(*self as f64)
    }
}

impl ScriptBinding for bool {
    fn binding(&self) -> CellValue {
        CellValue::Boolean(*self)
    }
}

/// Builds the bindings for one evaluation.
pub(crate) fn bindings_of<T: ScriptBinding + ?Sized>(value: &T) -> Bindings {
    HashMap::from([(SCRIPT_VALUE_KEY.to_owned(), value.binding())])
}
