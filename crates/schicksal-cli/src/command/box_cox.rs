use std::{borrow::Cow, path::PathBuf};

use anyhow::Context;
use schicksal_normalize::{
    box_cox::{LambdaSearch, box_cox_normalize_with, box_cox_normalize_with_lambda},
    delta::{calculate_delta, shift_to_positive},
    record::TransformKind,
    sample::RawSample,
};

use crate::util::{self, Output};

/// λ search flags shared by the `box-cox` and `lambda` subcommands
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SearchArg {
    /// Lower bound of the λ search interval
    #[arg(long, default_value_t = LambdaSearch::default().lower, allow_negative_numbers = true)]
    lambda_min: f64,
    /// Upper bound of the λ search interval
    #[arg(long, default_value_t = LambdaSearch::default().upper, allow_negative_numbers = true)]
    lambda_max: f64,
    /// Relative tolerance of the λ search
    #[arg(long, default_value_t = LambdaSearch::default().tolerance)]
    tolerance: f64,
}

impl SearchArg {
    pub(crate) fn search(&self) -> LambdaSearch {
        LambdaSearch {
            lower: self.lambda_min,
            upper: self.lambda_max,
            tolerance: self.tolerance,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BoxCoxArg {
    /// Sample hierarchy JSON file
    sample: PathBuf,
    /// Use this λ instead of estimating it
    #[arg(long, allow_negative_numbers = true)]
    lambda: Option<f64>,
    /// Shift the sample to strictly positive values before transforming
    #[arg(long)]
    shift: bool,
    #[clap(flatten)]
    search: SearchArg,
    /// Output file path
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct BoxCoxReport {
    transform: TransformKind,
    lambda: Option<f64>,
    estimated: bool,
    shift: u64,
    values: RawSample,
}

pub(crate) fn run(arg: &BoxCoxArg) -> anyhow::Result<()> {
    let BoxCoxArg {
        sample,
        lambda,
        shift,
        search,
        output,
    } = arg;

    let input = util::read_sample_file(sample)?;
    let (input, delta) = if *shift {
        let delta = calculate_delta(&input.flatten().collect::<Vec<_>>());
        let shifted = shift_to_positive(&input)
            .with_context(|| format!("Failed to shift {}", sample.display()))?
            .into_owned();
        if delta > 0 {
            log::info!("Shifted {} by {delta}", sample.display());
        }
        (shifted, delta)
    } else {
        (input, 0)
    };

    let transformed = match lambda {
        Some(lambda) => box_cox_normalize_with_lambda(&input, *lambda),
        None => box_cox_normalize_with(&input, &search.search()).map(Cow::Owned),
    }
    .with_context(|| format!("Failed to apply Box-Cox transform to {}", sample.display()))?;

    let applied = transformed.leaves().find_map(|leaf| leaf.lambda());
    if let Some(applied) = applied {
        log::info!("Transformed {} with λ = {applied}", sample.display());
    }

    let report = BoxCoxReport {
        transform: TransformKind::BoxCox,
        lambda: applied,
        estimated: lambda.is_none(),
        shift: delta,
        values: transformed.to_raw(),
    };
    Output::save_json(&report, output.clone())
}
