use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for the `huddle` binary.
#[derive(Debug, Parser)]
#[command(name = "huddle", version, about = "Huddle - team collaboration backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding `config.toml` (defaults to `./.huddle`)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the REST API.
    Serve {
        /// Listen address, overriding `server.bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Inspect or fix mirrored document links.
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },
}

#[derive(Debug, Clone, Copy, Subcommand, PartialEq, Eq)]
pub enum LinksAction {
    /// List references that have no mirror on the other side.
    Check,
    /// Restore missing mirrors and drop references to deleted documents.
    Repair,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands, LinksAction};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_accepts_bind_override() {
        let cli = Cli::try_parse_from(["huddle", "serve", "--bind", "0.0.0.0:9000"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Serve { bind: Some(ref addr) } if addr == "0.0.0.0:9000"
        ));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["huddle", "links", "repair", "--verbose", "--config-dir", "/tmp/h"])
            .expect("cli should parse");
        assert!(cli.verbose);
        assert_eq!(cli.config_dir.as_deref(), Some(std::path::Path::new("/tmp/h")));
        assert!(matches!(
            cli.command,
            Commands::Links {
                action: LinksAction::Repair
            }
        ));
    }

    #[test]
    fn links_requires_an_action() {
        assert!(Cli::try_parse_from(["huddle", "links"]).is_err());
    }
}
