use js_sys::Uint32Array;
use wasm_bindgen::prelude::*;

use crate::builder::LawnBuilder;
use crate::config::SearchConfig;
use crate::solver::{Solver, StepOutcome};

/// A [`Solver`] a browser can drive one step per animation frame.
#[wasm_bindgen]
pub struct WasmSolver {
    solver: Solver,
}

#[wasm_bindgen]
impl WasmSolver {
    /// Build from a single map in the `W H` + rows format, with an optional `key = value` configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(map_text: &str, config_text: Option<String>) -> Result<WasmSolver, JsValue> {
        let lawn = LawnBuilder::from_map(map_text).map_err(|reasons| {
            JsValue::from_str(&reasons.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))
        })?;
        let config = config_text.as_deref().map(SearchConfig::parse).unwrap_or_default();

        Ok(WasmSolver { solver: Solver::with_config(lawn, config) })
    }

    /// 0 while searching, 1 once solved, 2 once exhausted.
    pub fn step(&mut self) -> u8 {
        match self.solver.step() {
            StepOutcome::Searching => 0,
            StepOutcome::Solved => 1,
            StepOutcome::Exhausted(_) => 2,
        }
    }

    /// Start over.
    pub fn reset(&mut self) {
        self.solver.reset();
    }

    /// Whether another step would change nothing.
    pub fn is_finished(&self) -> bool {
        self.solver.is_finished()
    }

    /// Why the search failed, if it did.
    pub fn failure(&self) -> Option<String> {
        match self.solver.step_outcome() {
            Some(StepOutcome::Exhausted(failure)) => Some(failure.to_string()),
            _ => None,
        }
    }

    /// The move string, empty until solved.
    pub fn instructions(&self) -> String {
        self.solver.solution().map(|solution| solution.instructions().to_string()).unwrap_or_default()
    }

    /// The path as flattened `x, y` pairs, empty until solved.
    pub fn path(&self) -> Uint32Array {
        let flat = self.solver
            .solution()
            .map(|solution| {
                solution.path()
                    .iter()
                    .flat_map(|location| [location.0 as u32, location.1 as u32])
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        Uint32Array::from(flat.as_slice())
    }

    /// Steps taken so far.
    pub fn steps(&self) -> usize {
        self.solver.steps()
    }
}
