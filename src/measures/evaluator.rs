use std::collections::HashSet;

use tracing::{debug, warn};

use crate::model::{QueryJudgments, RankedResults};

use super::contract::{Accumulator, EvalParams, Measure, MeasureSlots, QueryEval};
use super::error::EvalError;
use super::registry::MeasureSelection;

struct PlannedMeasure {
    measure: &'static (dyn Measure + Sync),
    slots: MeasureSlots,
    acc: Accumulator,
}

/// Result of running every planned measure over one query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub eval: QueryEval,
    pub failures: Vec<EvalError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FinalValue {
    pub name: String,
    pub value: f64,
    pub num_queries: usize,
}

/// Drives the measure contract over a sequence of queries: `init` at
/// construction, `calc` and `accumulate` per query, `average` at the end.
pub struct Evaluator {
    params: EvalParams,
    planned: Vec<PlannedMeasure>,
    width: usize,
}

impl Evaluator {
    pub fn new(params: EvalParams, selections: Vec<MeasureSelection>) -> Result<Self, EvalError> {
        params.validate()?;
        if selections.is_empty() {
            return Err(EvalError::parameter("selection", "no measures selected"));
        }

        let mut names = HashSet::new();
        let mut planned = Vec::with_capacity(selections.len());
        let mut eval_index = 0_usize;
        for selection in selections {
            let measure = selection.measure;
            if !names.insert(measure.name()) {
                return Err(EvalError::parameter(measure.name(), "selected more than once"));
            }

            let slots = measure.init(selection.params, eval_index)?;
            debug!(
                measure = measure.name(),
                eval_index,
                width = slots.width(),
                "initialized measure"
            );
            eval_index += slots.width();
            planned.push(PlannedMeasure {
                measure,
                acc: Accumulator::new(slots.width()),
                slots,
            });
        }

        Ok(Self {
            params,
            planned,
            width: eval_index,
        })
    }

    pub fn params(&self) -> &EvalParams {
        &self.params
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn slots(&self) -> impl Iterator<Item = &MeasureSlots> {
        self.planned.iter().map(|planned| &planned.slots)
    }

    /// Runs every measure on one query. A measure that fails leaves its
    /// slots unevaluated and contributes nothing to its accumulator.
    pub fn evaluate_query(
        &mut self,
        judgments: &QueryJudgments,
        results: &RankedResults,
    ) -> QueryOutcome {
        let mut eval = QueryEval::new(results.query_id.clone(), self.width);
        let mut failures = Vec::new();

        for planned in &mut self.planned {
            match planned
                .measure
                .calc(&self.params, judgments, results, &planned.slots, &mut eval)
            {
                Ok(()) => planned
                    .measure
                    .accumulate(&planned.slots, &eval, &mut planned.acc),
                Err(err) => {
                    for index in planned.slots.range() {
                        eval.values[index] = None;
                    }
                    warn!(
                        query_id = %results.query_id,
                        measure = planned.measure.name(),
                        error = %err,
                        "measure could not be evaluated"
                    );
                    failures.push(err);
                }
            }
        }

        QueryOutcome { eval, failures }
    }

    pub fn single_lines(&self, outcome: &QueryOutcome) -> Vec<String> {
        self.planned
            .iter()
            .flat_map(|planned| planned.measure.print_single(&planned.slots, &outcome.eval))
            .collect()
    }

    pub fn finals(&self) -> Vec<FinalValue> {
        self.planned
            .iter()
            .flat_map(|planned| {
                let averages = planned.measure.average(&planned.slots, &planned.acc);
                planned
                    .slots
                    .names
                    .iter()
                    .zip(averages)
                    .map(|(name, value)| FinalValue {
                        name: name.clone(),
                        value,
                        num_queries: planned.acc.num_queries,
                    })
                    .collect::<Vec<FinalValue>>()
            })
            .collect()
    }

    pub fn final_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for planned in &self.planned {
            let averages = planned.measure.average(&planned.slots, &planned.acc);
            lines.extend(planned.measure.print_final(&planned.slots, &averages));
        }
        for planned in &self.planned {
            let name = format!("num_q_{}", planned.measure.name());
            lines.push(format!("{name:<22}\tall\t{}", planned.acc.num_queries));
        }
        lines
    }
}
