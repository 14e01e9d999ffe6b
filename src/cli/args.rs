//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--config <path>`: Read this config file instead of searching
//! - `--api-url <url>` / `-A`: Build service API to query
//! - `--username <name>` / `-u`: Account for HTTP authentication
//! - `--debug`: Enable debug logging
//! - `--no-interactive`: Never prompt for a password

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// obs-origin - Find the origin projects of packages in maintained OBS projects
#[derive(Parser, Debug)]
#[command(name = "obs-origin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the standard locations
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Build service API URL
    #[arg(short = 'A', long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Account name for HTTP authentication
    #[arg(short, long, global = true)]
    pub username: Option<String>,

    /// Account password
    #[arg(long, env = "OBS_ORIGIN_PASSWORD", hide = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Never prompt for a password
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Whether prompts are allowed.
    pub fn interactive(&self) -> bool {
        use std::io::IsTerminal;
        !self.no_interactive && std::io::stdin().is_terminal()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find the origin project of one package
    #[command(
        name = "find",
        long_about = "Find the origin project of a package.\n\n\
            The package's project is first replaced by the project it is inherited \
            from, unless --no-resolve-inheritance is given. Prints the origin project, \
            or (none) when no origin applies.",
        after_help = "\
EXAMPLES:
    obs-origin find openSUSE:Leap:15.2:Update zypper
    obs-origin find --no-resolve-inheritance openSUSE:Leap:15.2 zypper"
    )]
    Find {
        /// Project holding the package
        project: String,

        /// Package name
        package: String,

        /// Use the project as given instead of the one the package is inherited from
        #[arg(long)]
        no_resolve_inheritance: bool,
    },

    /// List all packages of a project with their origins
    #[command(
        name = "list",
        long_about = "Resolve the origin of every package in an origin-configured project.\n\n\
            Patchinfo packages and linked incident packages are skipped. Output is one \
            tab-separated `package origin` line per package.",
        after_help = "\
EXAMPLES:
    obs-origin list openSUSE:Leap:15.2:Update
    obs-origin list openSUSE:Leap:15.2:Update --json | jq '.[] | select(.origin == null)'"
    )]
    List {
        /// Origin-configured project
        project: String,

        /// Print a JSON array instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show expanded origin candidates
    #[command(name = "origins")]
    Origins {
        /// Only show this project (defaults to all configured projects)
        project: Option<String>,
    },

    /// Show the decoded origin configuration of a project
    #[command(name = "config")]
    Config {
        /// Origin-configured project
        project: String,
    },

    /// List maintained, configured or maintenance projects
    #[command(name = "projects")]
    Projects {
        /// Projects carrying OBS:Maintained (default)
        #[arg(long, conflicts_with_all = ["configured", "maintenance"])]
        maintained: bool,

        /// Projects carrying an origin configuration
        #[arg(long, conflicts_with = "maintenance")]
        configured: bool,

        /// The maintenance project
        #[arg(long)]
        maintenance: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
EXAMPLES:
    obs-origin completion bash > ~/.local/share/bash-completion/completions/obs-origin
    obs-origin completion zsh > ~/.zfunc/_obs-origin"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Which projects the `projects` command lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectKind {
    Maintained,
    Configured,
    Maintenance,
}

impl ProjectKind {
    /// Select the kind from the `projects` flags.
    pub fn from_flags(_maintained: bool, configured: bool, maintenance: bool) -> Self {
        if maintenance {
            ProjectKind::Maintenance
        } else if configured {
            ProjectKind::Configured
        } else {
            ProjectKind::Maintained
        }
    }
}
