//! CLI argument definitions for Vendo.
//!
//! Uses `clap` derive macros to define the full command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use clap::{Parser, Subcommand};

use vendo_resolver::fetch::DEFAULT_JOBS;

#[derive(Parser, Debug)]
#[command(
    name = "vendo",
    version,
    about = "A source-vendoring dependency manager for git-pinned projects",
    long_about = "Vendo materializes a project's transitive git dependencies into a local \
                  directory, pinned to exact revisions, and emits a build descriptor \
                  listing them in dependency order."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch and pin all transitive dependencies, then write the build descriptor
    Sync {
        /// Directory to vendor dependencies into (relative to the project root)
        #[arg(long, default_value = "deps")]
        deps_root: String,
        /// Clone over https instead of ssh
        #[arg(long)]
        https: bool,
        /// Maximum number of concurrent fetch jobs
        #[arg(short, long, default_value_t = DEFAULT_JOBS)]
        jobs: usize,
        /// Abort the run on the first dependency failure
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print the dependency tree from already-vendored sources (offline)
    Tree {
        /// Directory dependencies are vendored into (relative to the project root)
        #[arg(long, default_value = "deps")]
        deps_root: String,
        /// Maximum depth
        #[arg(long)]
        depth: Option<usize>,
    },
}

pub fn parse() -> Cli {
    Cli::parse()
}
