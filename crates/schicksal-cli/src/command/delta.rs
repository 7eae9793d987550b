use std::path::PathBuf;

use schicksal_normalize::delta::calculate_delta;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct DeltaArg {
    /// Sample hierarchy JSON file
    sample: PathBuf,
}

pub(crate) fn run(arg: &DeltaArg) -> anyhow::Result<()> {
    let input = util::read_sample_file(&arg.sample)?;
    let pooled = input.flatten().collect::<Vec<_>>();
    if let Some(value) = pooled.iter().find(|v| !v.is_finite()) {
        anyhow::bail!("{} contains non-finite value {value}", arg.sample.display());
    }
    println!("{}", calculate_delta(&pooled));
    Ok(())
}
