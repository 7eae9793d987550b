use std::path::PathBuf;

use anyhow::Context;
use schicksal_normalize::box_cox::calculate_lambda_with;

use super::box_cox::SearchArg;
use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct LambdaArg {
    /// Sample hierarchy JSON file
    sample: PathBuf,
    #[clap(flatten)]
    search: SearchArg,
}

pub(crate) fn run(arg: &LambdaArg) -> anyhow::Result<()> {
    let LambdaArg { sample, search } = arg;

    let input = util::read_sample_file(sample)?;
    let lambda = calculate_lambda_with(&input, &search.search())
        .with_context(|| format!("Failed to estimate λ of {}", sample.display()))?;
    println!("{lambda}");
    Ok(())
}
