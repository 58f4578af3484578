//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};

/// Bandi CLI - Extract structured records from grant notices.
#[derive(Debug, Parser)]
#[command(name = "bandi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BANDI_CONFIG")]
    pub config: Option<String>,

    /// Profile to use
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (identifiers only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Find the notice that best matches a business description
    Locate(LocateArgs),

    /// Extract the structured record of one notice
    Extract(ExtractArgs),

    /// Show stored records
    Show(ShowArgs),

    /// Manage configuration profiles
    Profile(ProfileArgs),
}

/// Arguments for the locate command.
#[derive(Debug, Parser)]
pub struct LocateArgs {
    /// Free-text description of the business or project
    pub description: String,

    /// Fragment index (JSON array), overrides the profile
    #[arg(short, long)]
    pub index: Option<String>,
}

/// Arguments for the extract command.
#[derive(Debug, Parser)]
pub struct ExtractArgs {
    /// Locate the notice from a business description
    #[arg(short, long, conflicts_with = "source", required_unless_present = "source")]
    pub description: Option<String>,

    /// Source identifier of the notice in the index
    #[arg(short, long)]
    pub source: Option<String>,

    /// Display filename recorded with the notice (defaults to the source basename)
    #[arg(long, requires = "source", conflicts_with = "description")]
    pub filename: Option<String>,

    /// Fragment index (JSON array), overrides the profile
    #[arg(short, long)]
    pub index: Option<String>,

    /// Output directory for the record, overrides the profile
    #[arg(short, long)]
    pub output: Option<String>,

    /// Extractor preset, overrides the configured extractor section
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,

    /// Seconds to wait for the run
    #[arg(long, default_value = "60")]
    pub wait: u64,

    /// Extra seconds to wait when the first wait runs out
    #[arg(long, default_value = "30")]
    pub grace: u64,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Record file or notice filename; all records when omitted
    pub file: Option<String>,

    /// Record directory, overrides the profile
    #[arg(short, long)]
    pub dir: Option<String>,
}

/// Arguments for the profile command.
#[derive(Debug, Parser)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub action: ProfileAction,
}

/// Profile management actions.
#[derive(Debug, Subcommand)]
pub enum ProfileAction {
    /// List all profiles
    List,

    /// Show the active profile
    Show,

    /// Switch to a different profile
    Switch {
        /// Profile name
        name: String,
    },

    /// Create or update a profile
    Set {
        /// Profile name
        name: String,

        /// LLM provider
        #[arg(long, value_enum, default_value = "ollama")]
        provider: ProviderArg,

        /// Provider endpoint (Ollama only)
        #[arg(long)]
        endpoint: Option<String>,

        /// Model name (Ollama only)
        #[arg(long)]
        model: Option<String>,

        /// Fragment index (JSON array)
        #[arg(long)]
        index: String,

        /// Record output directory
        #[arg(long)]
        output: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile name
        name: String,
    },
}

/// Extractor presets.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced defaults
    Default,
    /// Shorter timeouts and excerpts, cross-check only when needed
    Aggressive,
    /// Longer timeouts and wider context
    Lenient,
}

/// LLM provider options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ProviderArg {
    /// Local Ollama server
    Ollama,
    /// Azure OpenAI, configured from AZURE_* variables
    Azure,
    /// Offline provider that never finds anything
    Mock,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<ProviderArg> for crate::config::ProviderKind {
    fn from(provider: ProviderArg) -> Self {
        match provider {
            ProviderArg::Ollama => crate::config::ProviderKind::Ollama,
            ProviderArg::Azure => crate::config::ProviderKind::Azure,
            ProviderArg::Mock => crate::config::ProviderKind::Mock,
        }
    }
}

impl From<PresetArg> for bandi_extractor::ExtractorConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => bandi_extractor::ExtractorConfig::default(),
            PresetArg::Aggressive => bandi_extractor::ExtractorConfig::aggressive(),
            PresetArg::Lenient => bandi_extractor::ExtractorConfig::lenient(),
        }
    }
}
