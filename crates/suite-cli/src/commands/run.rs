use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use suite_build::CommandRunner;

use super::SelectArgs;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub select: SelectArgs,
    /// Program executed in each case directory with the settings file appended.
    #[arg(long)]
    pub program: PathBuf,
    /// Arguments passed to the program before the settings file.
    #[arg(last = true)]
    pub args: Vec<String>,
}

pub fn run(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let suite = args.select.discover()?;
    let runner = CommandRunner::new(&args.program)
        .with_args(args.args.iter().cloned())
        .with_layout(args.select.layout());
    let outcomes = suite.run(&runner)?;
    for outcome in &outcomes {
        let code = outcome
            .exit_code
            .map(|code| code.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}\t{}", outcome.case, code);
    }
    Ok(())
}
