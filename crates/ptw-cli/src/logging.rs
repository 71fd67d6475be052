//! Tracing subscriber set-up shared by every subcommand.

use tracing_subscriber::EnvFilter;

/// Filter directive for a `-v` count, used when `RUST_LOG` is unset.
pub fn default_directive(verbose: u8, floor: &str) -> String {
    match verbose {
        0 => floor.to_string(),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `directive`.
pub fn init(directive: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive_scales_with_verbosity() {
        assert_eq!(default_directive(0, "warn"), "warn");
        assert_eq!(default_directive(0, "info"), "info");
        assert_eq!(default_directive(2, "warn"), "debug");
        assert_eq!(default_directive(7, "warn"), "trace");
    }
}
