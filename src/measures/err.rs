use crate::model::{QueryJudgments, RankedResults};

use super::contract::{EvalParams, Measure, MeasureParams, MeasureSlots, QueryEval};
use super::error::EvalError;
use super::gain::err_gain;
use super::res_rels::MergedRelevanceList;

/// Expected Reciprocal Rank with gains shifted by the minimum relevance
/// level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrRelLvl;

impl Measure for ErrRelLvl {
    fn name(&self) -> &'static str {
        "err_rel_lvl"
    }

    fn explanation(&self) -> &'static str {
        "Expected Reciprocal Rank using graded relevance. The user scans the \
         ranking top-down and stops at a satisfying document with probability \
         given by its gain. Gains are adjusted by the minimum relevance level: \
         with minimum level 4, level 4 has gain numerator 1, level 5 has 3, \
         and so on. Cite: Chapelle, Metzler, Zhang and Grinspan, Expected \
         Reciprocal Rank for Graded Relevance, CIKM 2009."
    }

    fn init(&self, params: MeasureParams, eval_index: usize) -> Result<MeasureSlots, EvalError> {
        MeasureSlots::single(self.name(), params, eval_index)
    }

    fn calc(
        &self,
        epi: &EvalParams,
        judgments: &QueryJudgments,
        results: &RankedResults,
        slots: &MeasureSlots,
        eval: &mut QueryEval,
    ) -> Result<(), EvalError> {
        let res_rels = MergedRelevanceList::build(epi, judgments, results)?;
        let max_rel = res_rels.num_rel_levels as u32;

        let mut p = 1.0_f64;
        let mut err = 0.0_f64;
        for (rank, level) in res_rels.results_rel_list.iter().enumerate() {
            let gain = err_gain(*level, max_rel, epi.relevance_level);
            err += p * gain / (rank + 1) as f64;
            p *= 1.0 - gain;
        }

        eval.set(slots.eval_index, err);
        Ok(())
    }
}
