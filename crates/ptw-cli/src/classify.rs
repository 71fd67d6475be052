//! # Classify: Offline risk preview.
//!
//! ```bash
//! ptw classify --type HOT_WORK --location "boiler house" --description "cutting pipe"
//! ptw classify --type CONFINED_SPACE --json
//! ```

use anyhow::Result;
use clap::Args;

use ptw_risk::{classify, RiskAssessment, RiskInput};

/// Classify subcommand arguments.
#[derive(Args, Debug, Default)]
pub struct ClassifyArgs {
    /// Permit type, e.g. HOT_WORK. Unknown types start at LOW.
    #[arg(long = "type")]
    pub permit_type: Option<String>,

    /// Work location.
    #[arg(long)]
    pub location: Option<String>,

    /// Work description.
    #[arg(long)]
    pub description: Option<String>,

    /// Print the assessment as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the classify subcommand.
pub fn run_classify(args: &ClassifyArgs) -> Result<u8> {
    println!("{}", render(args, &assess(args))?);
    Ok(0)
}

fn assess(args: &ClassifyArgs) -> RiskAssessment {
    classify(&RiskInput {
        permit_type: args.permit_type.as_deref(),
        work_location: args.location.as_deref(),
        description: args.description.as_deref(),
    })
}

fn render(args: &ClassifyArgs, assessment: &RiskAssessment) -> Result<String> {
    if args.json {
        return Ok(serde_json::to_string_pretty(assessment)?);
    }
    Ok(format!(
        "Risk level: {}\n  base:        {}\n  location:    {}\n  description: {}\n\n{}",
        assessment.level,
        assessment.stages.base,
        assessment.stages.location,
        assessment.stages.description,
        assessment.report
    ))
}
