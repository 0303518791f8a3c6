use std::collections::HashSet;

use crate::model::{QueryJudgments, RankedResults};

use super::contract::{EvalParams, UnjudgedPolicy};
use super::error::EvalError;

/// Highest judged relevance level the builder accepts. The histogram is
/// indexed by level, so the bound also caps its size.
pub const MAX_RELEVANCE_LEVEL: u32 = 65_535;

/// One query's ranking expressed as relevance levels, plus the judged
/// level histogram used to rebuild the ideal ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRelevanceList {
    pub results_rel_list: Vec<u32>,
    pub num_ret: usize,
    /// Count of judged documents at exactly each level, retrieved or not.
    pub rel_levels: Vec<usize>,
    pub num_rel_levels: usize,
    pub num_unjudged_ret: usize,
}

impl MergedRelevanceList {
    pub fn build(
        epi: &EvalParams,
        judgments: &QueryJudgments,
        results: &RankedResults,
    ) -> Result<Self, EvalError> {
        let query_id = results.query_id.as_str();

        let max_level = judgments
            .levels
            .values()
            .filter_map(|level| u32::try_from(*level).ok())
            .max()
            .ok_or_else(|| EvalError::input(query_id, "no judged documents for query"))?;

        if max_level > MAX_RELEVANCE_LEVEL {
            return Err(EvalError::input(
                query_id,
                format!("relevance level {max_level} exceeds maximum {MAX_RELEVANCE_LEVEL}"),
            ));
        }

        let num_rel_levels = max_level as usize + 1;
        let mut rel_levels = Vec::new();
        rel_levels
            .try_reserve_exact(num_rel_levels)
            .map_err(|_| EvalError::Allocation {
                query_id: query_id.to_string(),
                requested: num_rel_levels,
            })?;
        rel_levels.resize(num_rel_levels, 0_usize);
        for level in judgments
            .levels
            .values()
            .filter_map(|level| usize::try_from(*level).ok())
        {
            rel_levels[level] += 1;
        }

        let limit = epi
            .max_docs_per_query
            .unwrap_or(results.doc_ids.len())
            .min(results.doc_ids.len());

        let mut seen = HashSet::with_capacity(limit);
        let mut results_rel_list = Vec::with_capacity(limit);
        let mut num_unjudged_ret = 0_usize;
        for doc_id in &results.doc_ids[..limit] {
            if !seen.insert(doc_id.as_str()) {
                return Err(EvalError::input(
                    query_id,
                    format!("document {doc_id} retrieved more than once"),
                ));
            }

            match judgments.judged_level(doc_id) {
                Some(level) => results_rel_list.push(level),
                None => {
                    num_unjudged_ret += 1;
                    if epi.unjudged == UnjudgedPolicy::NonRelevant {
                        results_rel_list.push(0);
                    }
                }
            }
        }

        Ok(Self {
            num_ret: results_rel_list.len(),
            results_rel_list,
            rel_levels,
            num_rel_levels,
            num_unjudged_ret,
        })
    }
}
