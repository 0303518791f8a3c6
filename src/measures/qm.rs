use tracing::debug;

use crate::model::{QueryJudgments, RankedResults};

use super::contract::{EvalParams, Measure, MeasureParams, MeasureSlots, QueryEval};
use super::error::EvalError;
use super::gain::q_gain;
use super::res_rels::MergedRelevanceList;

const DEFAULT_CUTOFFS: [i64; 6] = [5, 10, 15, 20, 30, 100];

/// Q-measure at a list of rank cutoffs, plus the uncut value.
#[derive(Debug, Clone, Copy, Default)]
pub struct QmRelLvlCut;

impl Measure for QmRelLvlCut {
    fn name(&self) -> &'static str {
        "qm_rel_lvl_cut"
    }

    fn explanation(&self) -> &'static str {
        "Q-measure: cumulative graded gain blended with precision and \
         normalized by the cumulative gain of the ideal ranking. Gains are \
         adjusted by the minimum relevance level. Cutoffs must be positive, \
         ascending and without duplicates. Cite: Sakai and Kando, On \
         information retrieval metrics designed for evaluation with \
         incomplete relevance assessments, Information Retrieval 11(5), 2008."
    }

    fn default_params(&self) -> MeasureParams {
        MeasureParams::new(DEFAULT_CUTOFFS.to_vec())
    }

    fn init(&self, params: MeasureParams, eval_index: usize) -> Result<MeasureSlots, EvalError> {
        MeasureSlots::with_cutoffs(self.name(), params, eval_index)
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
        let min_lvl = epi.relevance_level;

        let total = res_rels
            .rel_levels
            .iter()
            .enumerate()
            .filter(|(level, _)| q_gain(*level as u32, min_lvl) > 0.0)
            .map(|(_, count)| *count)
            .sum::<usize>();

        if total == 0 {
            debug!(query_id = %results.query_id, "no gainable judged documents");
            for index in slots.range() {
                eval.set(index, 0.0);
            }
            return Ok(());
        }

        let cgi = ideal_cumulative_gains(&res_rels, min_lvl, total, &results.query_id)?;
        let max_cgi = cgi.last().copied().unwrap_or_default();
        let total_f = total as f64;

        let cutoffs = slots.cutoffs();
        let mut cutoff_index = 0_usize;
        let mut rel_so_far = 0_usize;
        let mut cum_gain = 0.0_f64;
        let mut q_measure = 0.0_f64;
        for (rank, level) in res_rels.results_rel_list.iter().enumerate() {
            if cutoffs.get(cutoff_index) == Some(&rank) {
                eval.set(slots.eval_index + cutoff_index, q_measure / total_f);
                cutoff_index += 1;
            }

            let gain = q_gain(*level, min_lvl);
            if gain > 0.0 {
                rel_so_far += 1;
                cum_gain += gain;
                let ideal = cgi.get(rank).copied().unwrap_or(max_cgi);
                q_measure += (cum_gain + rel_so_far as f64) / ((rank + 1) as f64 + ideal);
            }
        }

        let q_measure = q_measure / total_f;
        for index in cutoff_index..cutoffs.len() {
            eval.set(slots.eval_index + index, q_measure);
        }
        eval.set(slots.final_index(), q_measure);

        Ok(())
    }
}

/// Running gain of the ideal ranking: judged documents from the highest
/// level down, `total` entries long.
fn ideal_cumulative_gains(
    res_rels: &MergedRelevanceList,
    min_lvl: u32,
    total: usize,
    query_id: &str,
) -> Result<Vec<f64>, EvalError> {
    let mut cgi = Vec::new();
    cgi.try_reserve_exact(total)
        .map_err(|_| EvalError::Allocation {
            query_id: query_id.to_string(),
            requested: total,
        })?;

    let mut running = 0.0_f64;
    'levels: for level in (0..res_rels.num_rel_levels).rev() {
        let gain = q_gain(level as u32, min_lvl);
        if gain <= 0.0 {
            break;
        }
        for _ in 0..res_rels.rel_levels[level] {
            if cgi.len() == total {
                break 'levels;
            }
            running += gain;
            cgi.push(running);
        }
    }

    Ok(cgi)
}
