use std::path::PathBuf;

use anyhow::Context;
use schicksal_normalize::{rank::rank_normalize, record::TransformKind, sample::RawSample};

use crate::util::{self, Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct RankArg {
    /// Sample hierarchy JSON file
    sample: PathBuf,
    /// Decimal digits used to detect tied values (exact comparison if omitted)
    #[arg(long)]
    precision: Option<u32>,
    /// Output file path
    #[arg(long, short)]
    output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct RankReport {
    transform: TransformKind,
    precision: Option<u32>,
    values: RawSample,
}

pub(crate) fn run(arg: &RankArg) -> anyhow::Result<()> {
    let RankArg {
        sample,
        precision,
        output,
    } = arg;

    let input = util::read_sample_file(sample)?;
    let ranked = rank_normalize(&input, *precision)
        .with_context(|| format!("Failed to rank {}", sample.display()))?;
    log::info!("Ranked {} values of {}", ranked.pooled_len(), sample.display());

    let report = RankReport {
        transform: TransformKind::Rank,
        precision: *precision,
        values: ranked.to_raw(),
    };
    Output::save_json(&report, output.clone())
}
