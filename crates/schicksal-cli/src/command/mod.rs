use clap::{Parser, Subcommand};
use log::LevelFilter;

use self::{
    box_cox::BoxCoxArg, delta::DeltaArg, invert::InvertArg, lambda::LambdaArg, rank::RankArg,
};

mod box_cox;
mod delta;
mod invert;
mod lambda;
mod rank;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Replace every value with its pooled fractional rank
    Rank(#[clap(flatten)] RankArg),
    /// Apply the Box-Cox power transform
    BoxCox(#[clap(flatten)] BoxCoxArg),
    /// Estimate the Box-Cox λ of a sample without transforming it
    Lambda(#[clap(flatten)] LambdaArg),
    /// Compute the shift that makes a sample strictly positive
    Delta(#[clap(flatten)] DeltaArg),
    /// Map normalized values back to original units
    Invert(#[clap(flatten)] InvertArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    match args.mode {
        Mode::Rank(arg) => rank::run(&arg)?,
        Mode::BoxCox(arg) => box_cox::run(&arg)?,
        Mode::Lambda(arg) => lambda::run(&arg)?,
        Mode::Delta(arg) => delta::run(&arg)?,
        Mode::Invert(arg) => invert::run(&arg)?,
    }
    Ok(())
}
