use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::SelectArgs;

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    #[command(flatten)]
    pub select: SelectArgs,
    /// Write the suite summary as CSV to this path.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn run(args: &DiscoverArgs) -> Result<(), Box<dyn Error>> {
    let suite = args.select.discover()?;
    let table = suite.summary_table()?;
    if let Some(path) = &args.summary {
        table.write_csv(path)?;
    }
    print!("{table}");
    Ok(())
}
