use clap::Parser;

const CMD_NAME: &str = "dagcalc";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Name of the calculator to run
    #[arg(short, long, value_name = "NAME")]
    #[arg(env = "DAGCALC_CALC")]
    pub calc: Option<String>,

    /// Set a node's value (or, with --vectorize, a sweep: NAME=START..STOP:NUM)
    #[arg(short, long = "set", value_name = "NAME=VALUE")]
    pub set: Vec<String>,

    /// List built-in calculators
    #[arg(short, long)]
    pub list: bool,

    /// Recompute every derived node after applying edits
    #[arg(short, long)]
    pub reload: bool,

    /// Evaluate over sequences of values instead of single values
    #[arg(short = 'V', long)]
    pub vectorize: bool,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
