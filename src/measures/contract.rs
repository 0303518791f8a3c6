use std::ops::Range;

use crate::model::{QueryJudgments, RankedResults};

use super::error::EvalError;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum UnjudgedPolicy {
    /// Unjudged retrieved documents count as relevance level 0.
    #[default]
    NonRelevant,
    /// Unjudged retrieved documents are dropped from the ranking.
    JudgedOnly,
}

impl UnjudgedPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NonRelevant => "non_relevant",
            Self::JudgedOnly => "judged_only",
        }
    }
}

/// Evaluation-wide settings shared by every measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalParams {
    /// Minimum level that counts as relevant; gains are shifted by it.
    pub relevance_level: u32,
    pub unjudged: UnjudgedPolicy,
    pub max_docs_per_query: Option<usize>,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            relevance_level: 1,
            unjudged: UnjudgedPolicy::NonRelevant,
            max_docs_per_query: None,
        }
    }
}

impl EvalParams {
    pub fn validate(&self) -> Result<(), EvalError> {
        if self.relevance_level < 1 {
            return Err(EvalError::parameter(
                "relevance_level",
                "minimum relevance level must be at least 1",
            ));
        }
        if self.max_docs_per_query == Some(0) {
            return Err(EvalError::parameter(
                "max_docs_per_query",
                "maximum documents per query must be positive",
            ));
        }
        Ok(())
    }
}

/// Raw scalar parameters attached to one measure, e.g. cutoff ranks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasureParams(Vec<i64>);

impl MeasureParams {
    pub fn new(values: Vec<i64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[i64] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where a measure writes its outputs inside a [`QueryEval`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureSlots {
    pub measure: &'static str,
    pub params: MeasureParams,
    pub eval_index: usize,
    pub names: Vec<String>,
    cutoffs: Vec<usize>,
}

impl MeasureSlots {
    pub fn single(
        measure: &'static str,
        params: MeasureParams,
        eval_index: usize,
    ) -> Result<Self, EvalError> {
        if !params.is_empty() {
            return Err(EvalError::parameter(measure, "measure takes no parameters"));
        }
        Ok(Self {
            measure,
            params,
            eval_index,
            names: vec![measure.to_string()],
            cutoffs: Vec::new(),
        })
    }

    /// One slot per cutoff followed by a final uncut slot. Cutoffs must be
    /// positive and strictly ascending.
    pub fn with_cutoffs(
        measure: &'static str,
        params: MeasureParams,
        eval_index: usize,
    ) -> Result<Self, EvalError> {
        if params.is_empty() {
            return Err(EvalError::parameter(measure, "at least one cutoff is required"));
        }

        let mut cutoffs = Vec::with_capacity(params.values().len());
        for value in params.values() {
            let cutoff = usize::try_from(*value)
                .ok()
                .filter(|cutoff| *cutoff > 0)
                .ok_or_else(|| {
                    EvalError::parameter(measure, format!("cutoff {value} must be positive"))
                })?;
            if let Some(previous) = cutoffs.last() {
                if *previous == cutoff {
                    return Err(EvalError::parameter(
                        measure,
                        format!("duplicate cutoff {cutoff}"),
                    ));
                }
                if *previous > cutoff {
                    return Err(EvalError::parameter(
                        measure,
                        format!("cutoff {cutoff} follows larger cutoff {previous}"),
                    ));
                }
            }
            cutoffs.push(cutoff);
        }

        let mut names = cutoffs
            .iter()
            .map(|cutoff| format!("{measure}_{cutoff}"))
            .collect::<Vec<String>>();
        names.push(format!("{measure}_all"));

        Ok(Self {
            measure,
            params,
            eval_index,
            names,
            cutoffs,
        })
    }

    pub fn width(&self) -> usize {
        self.names.len()
    }

    pub fn range(&self) -> Range<usize> {
        self.eval_index..self.eval_index + self.width()
    }

    pub fn cutoffs(&self) -> &[usize] {
        &self.cutoffs
    }

    /// Index of the uncut slot for cutoff-indexed measures.
    pub fn final_index(&self) -> usize {
        self.eval_index + self.width() - 1
    }
}

/// Per-query result record. `None` marks a slot that could not be
/// evaluated, which is distinct from a computed zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEval {
    pub query_id: String,
    pub values: Vec<Option<f64>>,
}

impl QueryEval {
    pub fn new(query_id: impl Into<String>, width: usize) -> Self {
        Self {
            query_id: query_id.into(),
            values: vec![None; width],
        }
    }

    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = Some(value);
    }

    pub fn slot_values(&self, slots: &MeasureSlots) -> &[Option<f64>] {
        &self.values[slots.range()]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    pub sums: Vec<f64>,
    pub num_queries: usize,
}

impl Accumulator {
    pub fn new(width: usize) -> Self {
        Self {
            sums: vec![0.0; width],
            num_queries: 0,
        }
    }
}

/// The contract every scoring formula implements. The evaluator calls
/// `init` once, then `calc`/`accumulate` per query, then `average`.
pub trait Measure {
    fn name(&self) -> &'static str;

    fn explanation(&self) -> &'static str;

    fn default_params(&self) -> MeasureParams {
        MeasureParams::default()
    }

    fn init(&self, params: MeasureParams, eval_index: usize) -> Result<MeasureSlots, EvalError>;

    fn calc(
        &self,
        epi: &EvalParams,
        judgments: &QueryJudgments,
        results: &RankedResults,
        slots: &MeasureSlots,
        eval: &mut QueryEval,
    ) -> Result<(), EvalError>;

    fn accumulate(&self, slots: &MeasureSlots, eval: &QueryEval, acc: &mut Accumulator) {
        let values = eval.slot_values(slots);
        if values.iter().any(Option::is_none) {
            return;
        }
        for (sum, value) in acc.sums.iter_mut().zip(values) {
            *sum += value.unwrap_or_default();
        }
        acc.num_queries += 1;
    }

    fn average(&self, _slots: &MeasureSlots, acc: &Accumulator) -> Vec<f64> {
        if acc.num_queries == 0 {
            return vec![0.0; acc.sums.len()];
        }
        acc.sums
            .iter()
            .map(|sum| sum / acc.num_queries as f64)
            .collect()
    }

    fn print_single(&self, slots: &MeasureSlots, eval: &QueryEval) -> Vec<String> {
        slots
            .names
            .iter()
            .zip(eval.slot_values(slots))
            .map(|(name, value)| match value {
                Some(value) => format!("{name:<22}\t{}\t{value:.4}", eval.query_id),
                None => format!("{name:<22}\t{}\tundef", eval.query_id),
            })
            .collect()
    }

    fn print_final(&self, slots: &MeasureSlots, finals: &[f64]) -> Vec<String> {
        slots
            .names
            .iter()
            .zip(finals)
            .map(|(name, value)| format!("{name:<22}\tall\t{value:.4}"))
            .collect()
    }
}
