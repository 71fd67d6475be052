//! # ptw-cli: Permit-to-Work Command Line
//!
//! Subcommand handlers for the `ptw` binary. Each module exposes an
//! `Args` struct and a `run_*` function returning the process exit code.
//!
//! | Subcommand | Module | Purpose |
//! |------------|--------|---------|
//! | `ptw serve` | [`serve`] | Run the HTTP API |
//! | `ptw classify` | [`classify`] | Offline risk classification |
//! | `ptw policy` | [`policy`] | Show or validate a capability table |

pub mod classify;
pub mod logging;
pub mod policy;
pub mod serve;
