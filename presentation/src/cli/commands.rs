//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use leadflow_domain::{AgentId, AgentShare, LeadId, OutputFormat};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliOutputFormat {
    /// Human-readable table grouped by agent
    Table,
    /// JSON output
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(format: CliOutputFormat) -> Self {
        match format {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for leadflow
#[derive(Parser, Debug)]
#[command(name = "leadflow")]
#[command(author, version, about = "Distribute sales leads between agents by percentage")]
#[command(long_about = r#"
Leadflow assigns sales leads to agents.

A distribution run shuffles every unassigned lead and hands each agent
its percentage of the pool; leftovers go to the first agent with a
non-zero share. Leads can also be assigned by hand, transferred away
from inactive agents, or released again.

Configuration files are loaded from (in priority order):
1. LEADFLOW_* environment variables
2. --config <path>     Explicit config file
3. ./leadflow.toml     Project-level config
4. ~/.config/leadflow/config.toml   Global config

Example:
  leadflow distribute --share 1=70 --share 2=30
  leadflow distribute --share 1=50 --share 2=50 --course rust-101 --create-deals --pipeline sales
  leadflow assign --agent 3 --lead L7 --lead L8
  leadflow transfer --from 4 --to 1
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// JSON snapshot to load the store from (overrides [store] data_file)
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Output format (overrides [output] format)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<CliOutputFormat>,

    /// Also write diagnostic logs to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split unassigned leads between agents by percentage
    Distribute {
        /// Agent share as <agent>=<percentage>; shares must total 100
        #[arg(short, long = "share", value_name = "AGENT=PCT", required = true)]
        shares: Vec<AgentShare>,

        /// Only distribute leads of this course
        #[arg(long, value_name = "COURSE")]
        course: Option<String>,

        /// Create a deal for every newly assigned lead
        #[arg(long)]
        create_deals: bool,

        /// Pipeline for new deals (overrides [distribution] pipeline_id)
        #[arg(long, value_name = "PIPELINE")]
        pipeline: Option<String>,

        /// Seed the shuffle for a reproducible run
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Assign specific leads to one agent, replacing current assignments
    Assign {
        /// Target agent
        #[arg(short, long, value_name = "AGENT")]
        agent: AgentId,

        /// Lead to assign (repeatable)
        #[arg(short, long = "lead", value_name = "LEAD", required = true)]
        leads: Vec<LeadId>,

        /// Create a deal for every assigned lead
        #[arg(long)]
        create_deals: bool,

        /// Pipeline for new deals
        #[arg(long, value_name = "PIPELINE")]
        pipeline: Option<String>,
    },

    /// Move every lead of one agent to another
    Transfer {
        #[arg(long, value_name = "AGENT")]
        from: AgentId,

        #[arg(long, value_name = "AGENT")]
        to: AgentId,
    },

    /// Release leads back to the unassigned pool
    Unassign {
        /// Lead to release (repeatable)
        #[arg(short, long = "lead", value_name = "LEAD", required = true)]
        leads: Vec<LeadId>,
    },

    /// List leads held by inactive or deleted agents
    Orphans,

    /// Create missing deals for assigned leads
    Deals {
        /// Pipeline for new deals (overrides [distribution] pipeline_id)
        #[arg(long, value_name = "PIPELINE")]
        pipeline: Option<String>,

        /// Restrict to these leads; default is every assigned lead
        #[arg(short, long = "lead", value_name = "LEAD")]
        leads: Vec<LeadId>,
    },

    /// Show current assignments grouped by agent
    Report {
        /// Only this agent
        #[arg(short, long, value_name = "AGENT")]
        agent: Option<AgentId>,
    },
}

impl Command {
    /// Whether the command writes to the store
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Orphans | Command::Report { .. })
    }
}
