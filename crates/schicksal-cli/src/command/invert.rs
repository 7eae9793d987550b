use std::{borrow::Cow, path::PathBuf};

use anyhow::Context;
use schicksal_normalize::{
    box_cox::box_cox_normalize, inverse::create_inverse_handler, rank::rank_normalize,
};

use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum Transform {
    Rank,
    BoxCox,
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InvertArg {
    /// Sample hierarchy JSON file the transform is fitted on
    sample: PathBuf,
    /// Transform to undo
    #[arg(long, value_enum, default_value_t = Transform::Rank)]
    transform: Transform,
    /// Decimal digits used to detect tied values when ranking
    #[arg(long)]
    precision: Option<u32>,
    /// Values on the normalized scale
    #[arg(required = true, allow_negative_numbers = true)]
    values: Vec<f64>,
}

pub(crate) fn run(arg: &InvertArg) -> anyhow::Result<()> {
    let InvertArg {
        sample,
        transform,
        precision,
        values,
    } = arg;

    let input = util::read_sample_file(sample)?;
    let transformed = match transform {
        Transform::Rank => rank_normalize(&input, *precision),
        Transform::BoxCox => box_cox_normalize(&input).map(Cow::Owned),
    }
    .with_context(|| format!("Failed to fit {transform:?} transform on {}", sample.display()))?;
    let inverse = create_inverse_handler(&transformed)?;
    log::debug!("Inverting {} values with {inverse:?}", values.len());

    for &value in values {
        println!("{value}\t{}", inverse.invert(value));
    }
    Ok(())
}
