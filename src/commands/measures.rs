use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::MeasuresArgs;
use gradeval::measures::MEASURES;

pub fn run(args: MeasuresArgs) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_measure_list(&mut out, args.names_only)?;
    out.flush().context("failed to flush measure list")?;
    Ok(())
}

fn write_measure_list(out: &mut impl Write, names_only: bool) -> Result<()> {
    for measure in MEASURES {
        if names_only {
            writeln!(out, "{}", measure.name()).context("failed to write measure list")?;
            continue;
        }

        let defaults = measure
            .default_params()
            .values()
            .iter()
            .map(i64::to_string)
            .collect::<Vec<String>>();
        let usage = if defaults.is_empty() {
            measure.name().to_string()
        } else {
            format!("{}.{}", measure.name(), defaults.join(","))
        };

        writeln!(out, "{}\n    default: -m {usage}\n    {}\n", measure.name(), measure.explanation())
            .context("failed to write measure list")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_measure_list;

    #[test]
    fn names_only_lists_one_measure_per_line() {
        let mut out = Vec::new();
        write_measure_list(&mut out, true).expect("listing should write");
        let text = String::from_utf8(out).expect("listing is UTF-8");
        assert_eq!(
            text.lines().collect::<Vec<&str>>(),
            vec!["err_rel_lvl", "qm_rel_lvl_cut"]
        );
    }

    #[test]
    fn full_listing_shows_default_selection() {
        let mut out = Vec::new();
        write_measure_list(&mut out, false).expect("listing should write");
        let text = String::from_utf8(out).expect("listing is UTF-8");
        assert!(text.contains("default: -m err_rel_lvl\n"), "unexpected listing: {text}");
        assert!(
            text.contains("default: -m qm_rel_lvl_cut.5,10,15,20,30,100\n"),
            "unexpected listing: {text}"
        );
    }
}
