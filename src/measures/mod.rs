//! Measure computation framework: merges rankings with graded judgments and
//! runs every registered scoring formula through one uniform contract.

mod contract;
mod err;
mod error;
mod evaluator;
mod gain;
mod qm;
mod registry;
mod res_rels;

pub use self::contract::{
    Accumulator, EvalParams, Measure, MeasureParams, MeasureSlots, QueryEval, UnjudgedPolicy,
};
pub use self::err::ErrRelLvl;
pub use self::error::EvalError;
pub use self::evaluator::{Evaluator, FinalValue, QueryOutcome};
pub use self::gain::{err_gain, q_gain};
pub use self::qm::QmRelLvlCut;
pub use self::registry::{MEASURES, MeasureSelection, find_measure, parse_selection};
pub use self::res_rels::{MAX_RELEVANCE_LEVEL, MergedRelevanceList};
