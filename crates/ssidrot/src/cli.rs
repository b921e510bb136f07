//! Clap derive structures for the `ssidrot` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ssidrot -- rotate a UniFi WLAN through a curated list of SSIDs
#[derive(Debug, Parser)]
#[command(
    name = "ssidrot",
    version,
    about = "Rotate a UniFi WLAN through a curated list of SSIDs",
    long_about = "Rotates the broadcast name of one WLAN on a UniFi controller through\n\
        an operator-curated list, one step per invocation. Protected SSIDs are\n\
        never written and a WLAN broadcasting one is never touched.\n\n\
        Run without a subcommand to perform one rotation (suitable for cron or\n\
        a systemd timer).",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, env = "SSIDROT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// SSID list file (overrides config)
    #[arg(long, value_name = "PATH", global = true)]
    pub ssid_list: Option<PathBuf>,

    /// Rotation state file (overrides config)
    #[arg(long, value_name = "PATH", global = true)]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Log format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,
}

// ── Output, Color & Log Enums ────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line (journald, log shippers)
    Json,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rotate the target WLAN to the next SSID (default)
    Rotate,

    /// Show the rotation lists and current position
    #[command(alias = "st")]
    Status,

    /// Validate the SSID list file and suggest fixes
    Validate,

    /// Choose which active SSID the next rotation uses
    Stage(StageArgs),

    /// Forget the cached WLAN id so the next run searches again
    ForgetTarget,

    /// List the controller's WLANs and how each relates to the rotation
    #[command(alias = "w")]
    Wlans,

    /// Inspect and manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct StageArgs {
    /// 0-based index into the active rotation
    pub index: usize,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Display the resolved configuration (password masked)
    Show,

    /// Store the controller password in the system keyring
    SetPassword,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
