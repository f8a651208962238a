// crates/lifescore-cli/src/main.rs
// ============================================================================
// Module: LifeScore CLI Entry Point
// Description: Command dispatcher for LifeScore catalogs and user progression.
// Purpose: Drive every progression command against the configured store.
// Dependencies: clap, lifescore-cli, lifescore-config, lifescore-core, serde, thiserror, time
// ============================================================================

//! ## Overview
//! The LifeScore CLI validates catalogs and runs progression queries and
//! commands for one user at a time. Results are written to stdout as
//! canonical JSON (RFC 8785); errors go to stderr with a failure exit code.
//! Commands are stamped with wall-clock unix milliseconds.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use lifescore_cli::host::HostedEngine;
use lifescore_cli::host::build_engine;
use lifescore_config::LifeScoreConfig;
use lifescore_config::load_catalog;
use lifescore_core::EngineError;
use lifescore_core::HashDigest;
use lifescore_core::MissionId;
use lifescore_core::RewardId;
use lifescore_core::SkillNodeId;
use lifescore_core::SkillTreeId;
use lifescore_core::Timestamp;
use lifescore_core::UserId;
use lifescore_core::hashing::canonical_json_bytes;
use serde::Serialize;
use thiserror::Error;
use time::Date;
use time::OffsetDateTime;
use time::macros::format_description;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// LifeScore command-line interface.
#[derive(Parser, Debug)]
#[command(
    name = "lifescore",
    version,
    about = "LifeScore progression engine",
    disable_help_subcommand = true
)]
struct Cli {
    /// Optional config file path (defaults to `LIFESCORE_CONFIG` or `lifescore.toml`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected command.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Catalog utilities.
    Catalog {
        /// Selected catalog subcommand.
        #[command(subcommand)]
        command: CatalogCommand,
    },
    /// Profile queries and resets.
    Profile {
        /// Selected profile subcommand.
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Mission lifecycle commands.
    Mission {
        /// Selected mission subcommand.
        #[command(subcommand)]
        command: MissionCommand,
    },
    /// Skill tree commands.
    Skill {
        /// Selected skill subcommand.
        #[command(subcommand)]
        command: SkillCommand,
    },
    /// Reward commands.
    Reward {
        /// Selected reward subcommand.
        #[command(subcommand)]
        command: RewardCommand,
    },
    /// Increment the streak or decay it by one day.
    Streak(StreakCommand),
    /// Record daily activity for a calendar day.
    CheckIn(CheckInCommand),
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Validate a catalog file and print its summary.
    Validate(CatalogValidateCommand),
}

/// Arguments for `catalog validate`.
#[derive(Args, Debug)]
struct CatalogValidateCommand {
    /// Catalog file to validate (defaults to the configured catalog).
    #[arg(long, value_name = "PATH")]
    catalog: Option<PathBuf>,
}

/// Profile subcommands.
#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the user's full profile.
    Show(UserArgs),
    /// Reset the user's profile to defaults.
    Reset(UserArgs),
}

/// Shared user selector.
#[derive(Args, Debug)]
struct UserArgs {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
}

/// Mission subcommands.
#[derive(Subcommand, Debug)]
enum MissionCommand {
    /// List missions in catalog order.
    List(MissionListCommand),
    /// Start an available mission.
    Start(MissionArgs),
    /// Set progress on an active mission.
    Progress(MissionProgressCommand),
    /// Complete an active mission.
    Complete(MissionArgs),
    /// Abandon an active mission.
    Abandon(MissionArgs),
}

/// Mission list filter.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum MissionListState {
    /// Missions the user can start.
    Available,
    /// Missions in progress.
    Active,
    /// Finished missions.
    Completed,
}

/// Arguments for `mission list`.
#[derive(Args, Debug)]
struct MissionListCommand {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Which missions to list.
    #[arg(long, value_enum, default_value_t = MissionListState::Available)]
    state: MissionListState,
}

/// Shared mission selector.
#[derive(Args, Debug)]
struct MissionArgs {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Mission identifier.
    #[arg(long, value_name = "MISSION")]
    mission: String,
}

/// Arguments for `mission progress`.
#[derive(Args, Debug)]
struct MissionProgressCommand {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Mission identifier.
    #[arg(long, value_name = "MISSION")]
    mission: String,
    /// Progress percentage; clamped to 0..=100.
    #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
    progress: i64,
}

/// Skill subcommands.
#[derive(Subcommand, Debug)]
enum SkillCommand {
    /// Classify every node of a tree.
    List(SkillListCommand),
    /// Unlock a node.
    Unlock(SkillUnlockCommand),
}

/// Arguments for `skill list`.
#[derive(Args, Debug)]
struct SkillListCommand {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Skill tree identifier.
    #[arg(long, value_name = "TREE")]
    tree: String,
}

/// Arguments for `skill unlock`.
#[derive(Args, Debug)]
struct SkillUnlockCommand {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Skill tree identifier.
    #[arg(long, value_name = "TREE")]
    tree: String,
    /// Skill node identifier.
    #[arg(long, value_name = "NODE")]
    node: String,
}

/// Reward subcommands.
#[derive(Subcommand, Debug)]
enum RewardCommand {
    /// List owned rewards.
    List(UserArgs),
    /// Buy a reward with coins.
    Redeem(RewardArgs),
    /// Grant a reward without payment.
    Earn(RewardArgs),
}

/// Shared reward arguments.
#[derive(Args, Debug)]
struct RewardArgs {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Reward identifier.
    #[arg(long, value_name = "REWARD")]
    reward: String,
    /// Context tag stored on the ledger entry.
    #[arg(long, value_name = "CONTEXT", default_value = "cli")]
    context: String,
}

/// Arguments for `streak`.
#[derive(Args, Debug)]
struct StreakCommand {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Streak direction.
    #[command(flatten)]
    direction: StreakDirection,
}

/// Mutually exclusive streak direction flags.
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct StreakDirection {
    /// Increment the streak.
    #[arg(long)]
    increment: bool,
    /// Decay the streak by one day.
    #[arg(long)]
    decay: bool,
}

impl StreakDirection {
    /// Returns true when the streak should increment.
    const fn increments(&self) -> bool {
        self.increment && !self.decay
    }
}

/// Arguments for `check-in`.
#[derive(Args, Debug)]
struct CheckInCommand {
    /// User identifier.
    #[arg(long, value_name = "USER")]
    user: String,
    /// Calendar day as YYYY-MM-DD (defaults to today in UTC).
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_day)]
    day: Option<Date>,
}

/// Summary printed by `catalog validate`.
#[derive(Debug, Serialize)]
struct CatalogSummary {
    /// Always `valid`; invalid catalogs exit with an error.
    status: &'static str,
    /// Canonical catalog fingerprint.
    fingerprint: HashDigest,
    /// Mission count.
    missions: usize,
    /// Skill tree count.
    skill_trees: usize,
    /// Skill node count across all trees.
    skill_nodes: usize,
    /// Reward count.
    rewards: usize,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing failures.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(err: EngineError) -> Self {
        Self::new(format!("{}: {err}", err.kind()))
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Catalog {
            command: CatalogCommand::Validate(command),
        } => command_catalog_validate(config_path, &command),
        Commands::Profile {
            command,
        } => command_profile(config_path, command),
        Commands::Mission {
            command,
        } => command_mission(config_path, command),
        Commands::Skill {
            command,
        } => command_skill(config_path, command),
        Commands::Reward {
            command,
        } => command_reward(config_path, command),
        Commands::Streak(command) => command_streak(config_path, &command),
        Commands::CheckIn(command) => command_check_in(config_path, &command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Validates a catalog and prints its summary.
fn command_catalog_validate(
    config_path: Option<&Path>,
    command: &CatalogValidateCommand,
) -> CliResult<ExitCode> {
    let catalog_path = match &command.catalog {
        Some(path) => path.clone(),
        None => load_config(config_path)?.catalog.path,
    };
    let catalog = load_catalog(&catalog_path).map_err(|err| CliError::new(err.to_string()))?;
    let fingerprint = catalog.fingerprint().map_err(|err| CliError::new(err.to_string()))?;
    let summary = CatalogSummary {
        status: "valid",
        fingerprint,
        missions: catalog.missions.len(),
        skill_trees: catalog.skill_trees.len(),
        skill_nodes: catalog.skill_nodes().count(),
        rewards: catalog.rewards.len(),
    };
    write_canonical_json(&summary)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs a profile subcommand.
fn command_profile(config_path: Option<&Path>, command: ProfileCommand) -> CliResult<ExitCode> {
    let engine = open_engine(config_path)?;
    match command {
        ProfileCommand::Show(args) => {
            write_canonical_json(&engine.profile(&UserId::new(args.user))?)?;
        }
        ProfileCommand::Reset(args) => {
            let receipt = engine.reset_profile(&UserId::new(args.user), now_timestamp()?)?;
            write_canonical_json(&receipt)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs a mission subcommand.
fn command_mission(config_path: Option<&Path>, command: MissionCommand) -> CliResult<ExitCode> {
    let engine = open_engine(config_path)?;
    match command {
        MissionCommand::List(args) => {
            let user_id = UserId::new(args.user);
            match args.state {
                MissionListState::Available => {
                    write_canonical_json(&engine.available_missions(&user_id)?)?;
                }
                MissionListState::Active => {
                    write_canonical_json(&engine.active_missions(&user_id)?)?;
                }
                MissionListState::Completed => {
                    write_canonical_json(&engine.completed_missions(&user_id)?)?;
                }
            }
        }
        MissionCommand::Start(args) => {
            let receipt = engine.start_mission(
                &UserId::new(args.user),
                &MissionId::new(args.mission),
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
        MissionCommand::Progress(args) => {
            let receipt = engine.update_mission_progress(
                &UserId::new(args.user),
                &MissionId::new(args.mission),
                args.progress,
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
        MissionCommand::Complete(args) => {
            let receipt = engine.complete_mission(
                &UserId::new(args.user),
                &MissionId::new(args.mission),
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
        MissionCommand::Abandon(args) => {
            let receipt = engine.abandon_mission(
                &UserId::new(args.user),
                &MissionId::new(args.mission),
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs a skill subcommand.
fn command_skill(config_path: Option<&Path>, command: SkillCommand) -> CliResult<ExitCode> {
    let engine = open_engine(config_path)?;
    match command {
        SkillCommand::List(args) => {
            let nodes = engine.skill_nodes(&UserId::new(args.user), &SkillTreeId::new(args.tree))?;
            write_canonical_json(&nodes)?;
        }
        SkillCommand::Unlock(args) => {
            let receipt = engine.unlock_skill(
                &UserId::new(args.user),
                &SkillTreeId::new(args.tree),
                &SkillNodeId::new(args.node),
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Runs a reward subcommand.
fn command_reward(config_path: Option<&Path>, command: RewardCommand) -> CliResult<ExitCode> {
    let engine = open_engine(config_path)?;
    match command {
        RewardCommand::List(args) => {
            write_canonical_json(&engine.owned_rewards(&UserId::new(args.user))?)?;
        }
        RewardCommand::Redeem(args) => {
            let receipt = engine.redeem_reward(
                &UserId::new(args.user),
                &RewardId::new(args.reward),
                &args.context,
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
        RewardCommand::Earn(args) => {
            let receipt = engine.earn_reward(
                &UserId::new(args.user),
                &RewardId::new(args.reward),
                &args.context,
                now_timestamp()?,
            )?;
            write_canonical_json(&receipt)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Applies a raw streak increment or decay.
fn command_streak(config_path: Option<&Path>, command: &StreakCommand) -> CliResult<ExitCode> {
    let engine = open_engine(config_path)?;
    let receipt = engine.record_streak(
        &UserId::new(command.user.clone()),
        command.direction.increments(),
        now_timestamp()?,
    )?;
    write_canonical_json(&receipt)?;
    Ok(ExitCode::SUCCESS)
}

/// Records a daily check-in.
fn command_check_in(config_path: Option<&Path>, command: &CheckInCommand) -> CliResult<ExitCode> {
    let engine = open_engine(config_path)?;
    let day = command.day.unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let receipt = engine.check_in(&UserId::new(command.user.clone()), day, now_timestamp()?)?;
    write_canonical_json(&receipt)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Engine Setup
// ============================================================================

/// Loads the configuration file.
fn load_config(config_path: Option<&Path>) -> CliResult<LifeScoreConfig> {
    LifeScoreConfig::load(config_path)
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))
}

/// Loads the configuration and builds the engine.
fn open_engine(config_path: Option<&Path>) -> CliResult<HostedEngine> {
    let config = load_config(config_path)?;
    build_engine(&config).map_err(|err| CliError::new(err.to_string()))
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

/// Parses a `YYYY-MM-DD` calendar day.
fn parse_day(value: &str) -> Result<Date, String> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|err| format!("invalid day '{value}': {err}"))
}

/// Returns the current wall-clock time as unix milliseconds.
fn now_timestamp() -> CliResult<Timestamp> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|err| CliError::new(format!("system clock is before unix epoch: {err}")))?;
    let millis = i64::try_from(elapsed.as_millis())
        .map_err(|_| CliError::new("system clock exceeds timestamp range".to_string()))?;
    Ok(Timestamp::UnixMillis(millis))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes canonical JSON to stdout followed by a newline.
fn write_canonical_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = canonical_json_bytes(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a message to stderr with a trailing newline.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
