use std::fmt;

use regex::Regex;

use super::contract::{Measure, MeasureParams};
use super::err::ErrRelLvl;
use super::error::EvalError;
use super::qm::QmRelLvlCut;

pub static MEASURES: &[&(dyn Measure + Sync)] = &[&ErrRelLvl, &QmRelLvlCut];

pub fn find_measure(name: &str) -> Option<&'static (dyn Measure + Sync)> {
    MEASURES.iter().copied().find(|measure| measure.name() == name)
}

/// A registered measure together with the parameters it will be run with.
#[derive(Clone)]
pub struct MeasureSelection {
    pub measure: &'static (dyn Measure + Sync),
    pub params: MeasureParams,
}

impl MeasureSelection {
    pub fn with_defaults(measure: &'static (dyn Measure + Sync)) -> Self {
        Self {
            measure,
            params: measure.default_params(),
        }
    }

    pub fn all() -> Vec<Self> {
        MEASURES.iter().copied().map(Self::with_defaults).collect()
    }
}

impl fmt::Debug for MeasureSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasureSelection")
            .field("measure", &self.measure.name())
            .field("params", &self.params)
            .finish()
    }
}

/// Parses `name`, `name.p1,p2,...` or `all`.
pub fn parse_selection(raw: &str) -> Result<Vec<MeasureSelection>, EvalError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("all") {
        return Ok(MeasureSelection::all());
    }

    let pattern = Regex::new(r"^(?P<name>[A-Za-z][A-Za-z0-9_]*)(?:\.(?P<params>.+))?$")
        .map_err(|err| EvalError::parameter("measure selection", err.to_string()))?;
    let captures = pattern
        .captures(trimmed)
        .ok_or_else(|| EvalError::parameter(trimmed, "malformed measure selection"))?;

    let name = &captures["name"];
    let measure = find_measure(name)
        .ok_or_else(|| EvalError::parameter(name, "unknown measure"))?;

    let params = match captures.name("params") {
        None => measure.default_params(),
        Some(raw_params) => {
            let values = raw_params
                .as_str()
                .split(',')
                .map(|value| {
                    value.trim().parse::<i64>().map_err(|_| {
                        EvalError::parameter(name, format!("invalid parameter {value:?}"))
                    })
                })
                .collect::<Result<Vec<i64>, EvalError>>()?;
            MeasureParams::new(values)
        }
    };

    Ok(vec![MeasureSelection { measure, params }])
}
