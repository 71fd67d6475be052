//! # Policy: Show or validate a capability table.
//!
//! ```bash
//! # Print the built-in table as YAML (a starting point for PTW_POLICY_FILE):
//! ptw policy
//!
//! # Validate a custom table and list one role's grants:
//! ptw policy --file site-policy.yaml --role SUPERVISOR
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ptw_core::Role;
use ptw_policy::CapabilityTable;

/// Policy subcommand arguments.
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// YAML capability table; the built-in table when omitted.
    #[arg(long, env = "PTW_POLICY_FILE")]
    pub file: Option<PathBuf>,

    /// Only list the grants held by this role.
    #[arg(long)]
    pub role: Option<String>,
}

/// Execute the policy subcommand.
pub fn run_policy(args: &PolicyArgs) -> Result<u8> {
    let table = load(args)?;
    let output = match &args.role {
        Some(role) => {
            let role: Role = role.parse().context("invalid --role")?;
            render_grants(&table, role)
        }
        None => table.to_yaml().context("failed to render capability table")?,
    };
    print!("{output}");
    Ok(0)
}

fn load(args: &PolicyArgs) -> Result<CapabilityTable> {
    match &args.file {
        Some(path) => {
            let table = CapabilityTable::load(path)
                .with_context(|| format!("failed to load capability table {}", path.display()))?;
            tracing::info!(path = %path.display(), "capability table is valid");
            Ok(table)
        }
        None => Ok(CapabilityTable::builtin()),
    }
}

fn render_grants(table: &CapabilityTable, role: Role) -> String {
    let mut out = String::new();
    for (action, scope) in table.grants(role) {
        out.push_str(&format!("{:<16} {}\n", action.as_str(), scope));
    }
    if out.is_empty() {
        out.push_str(&format!("{role} holds no grants\n"));
    }
    out
}
