use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use suite_build::{load_plan, WriteOpts};
use tracing::info;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// YAML sweep plan.
    #[arg(long)]
    pub plan: PathBuf,
    /// Output directory; defaults to the plan's `output`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Worker threads used to write case inputs.
    #[arg(long, default_value_t = 1)]
    pub concurrency: usize,
    /// Write the suite summary as CSV to this path.
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

pub fn run(args: &BuildArgs) -> Result<(), Box<dyn Error>> {
    let plan = load_plan(&args.plan)?;
    let ctx = plan.context(args.out.as_deref());
    let mut builder = plan.builder()?;
    let suite = builder.build_suite(&ctx)?;
    let written = suite.write_inputs(
        &ctx.layout,
        &WriteOpts {
            concurrency: args.concurrency,
        },
    )?;
    if let Some(path) = &args.summary {
        suite.write_summary_csv(path)?;
    }
    info!(plan_hash = %plan.plan_hash()?, "plan built");
    println!(
        "wrote {} case(s) under {}",
        written.len(),
        ctx.output_root.display()
    );
    Ok(())
}
