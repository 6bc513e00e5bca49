use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, WrapErr};
use tracing::{debug, warn};

use guard_core::{DiffMode, GuardConfig, OutputFormat};
use guard_diff::{DiffSource, Git};
use guard_hook::HookManager;
use guard_review::llm::GeminiClient;
use guard_review::pipeline::ScanPipeline;

#[derive(Parser)]
#[command(
    name = "ai-git-guard",
    version,
    about = "AI security gate for git pushes",
    long_about = "ai-git-guard sends your pending changes to Gemini for a security review\n\
                   and blocks the push unless the model answers SAFE TO RELEASE.\n\n\
                   Examples:\n  \
                     ai-git-guard install         Install the pre-push hook\n  \
                     ai-git-guard scan            Review commits not yet on the upstream\n  \
                     ai-git-guard scan --staged   Review staged changes\n  \
                     ai-git-guard uninstall       Remove the pre-push hook"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .ai-git-guard.toml at the repository root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text  Human-readable messages (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable verbose (debug) logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Install the pre-push hook
    #[command(long_about = "Install the pre-push hook.\n\n\
        Writes .git/hooks/pre-push, which runs 'ai-git-guard scan' and blocks the\n\
        push when the scan exits non-zero. An existing pre-push hook is overwritten.")]
    Install {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Remove the pre-push hook
    Uninstall {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Show whether the pre-push hook is installed
    Status {
        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Run the AI security scan
    #[command(long_about = "Run the AI security scan.\n\n\
        By default reviews the commits on the current branch that are not yet on its\n\
        upstream. With --staged, reviews staged changes instead.\n\n\
        Requires GEMINI_API_KEY in the environment or a .env file.\n\
        Exits 0 when the model answers SAFE TO RELEASE or there is nothing to review,\n\
        and 1 otherwise, including when the model cannot be reached.")]
    Scan {
        /// Review staged changes (git diff --cached) instead of the branch
        #[arg(long)]
        staged: bool,

        /// Repository path (default: current directory)
        #[arg(long, default_value = ".")]
        repo: PathBuf,
    },
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!("ai-git-guard v{version}: AI security review before every push\n");

    println!("Quick start:");
    println!("  ai-git-guard install         Install the pre-push hook");
    println!("  ai-git-guard scan --staged   Review staged changes now\n");

    println!("All commands:");
    println!("  install    Install the pre-push hook");
    println!("  uninstall  Remove the pre-push hook");
    println!("  status     Show the hook state");
    println!("  scan       Review changes and exit 0 (allow) or 1 (block)\n");

    println!("Run 'ai-git-guard <command> --help' for details.");
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        "ai_git_guard=debug,guard_core=debug,guard_diff=debug,guard_review=debug,guard_hook=debug"
    } else {
        "warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Load `<root>/.env`, falling back to the usual search from the working
/// directory. Variables already in the environment are never overridden.
fn load_dotenv(root: &Path) {
    let repo_env = root.join(".env");
    let loaded = if repo_env.is_file() {
        dotenvy::from_path(&repo_env).map(|()| repo_env)
    } else {
        dotenvy::dotenv()
    };
    match loaded {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => debug!("no .env file found"),
        Err(e) => warn!(error = %e, "failed to load .env file"),
    }
}

fn run_install(repo: &Path, format: OutputFormat) -> Result<()> {
    let installed = HookManager::discover(repo).and_then(|manager| manager.install());
    match installed {
        Ok(path) => {
            match format {
                OutputFormat::Json => println!(
                    "{}",
                    serde_json::json!({ "installed": true, "path": path })
                ),
                OutputFormat::Text => {
                    println!("[SUCCESS] Pre-push hook installed successfully.")
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("[ERROR] Failed to install hook: {e}");
            Err(e.into())
        }
    }
}

fn run_uninstall(repo: &Path, format: OutputFormat) -> Result<()> {
    let manager = HookManager::discover(repo)?;
    let removed = manager.uninstall()?;
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "removed": removed, "path": manager.hook_path() })
        ),
        OutputFormat::Text => {
            if removed {
                println!("[SUCCESS] Pre-push hook removed.");
            } else {
                println!("No pre-push hook installed. Nothing to remove.");
            }
        }
    }
    Ok(())
}

fn run_status(repo: &Path, format: OutputFormat) -> Result<()> {
    let status = HookManager::discover(repo)?.status()?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&status).into_diagnostic()?);
        }
        OutputFormat::Text => {
            let state = match (status.installed, status.managed) {
                (false, _) => "not installed",
                (true, true) => "installed",
                (true, false) => "present, not managed by ai-git-guard",
            };
            println!("pre-push hook: {state}");
            println!("  path: {}", status.path.display());
            if status.installed && !status.executable {
                println!("  warning: hook is not executable; git will skip it");
            }
        }
    }
    Ok(())
}

async fn run_scan(
    config_path: Option<&Path>,
    repo: &Path,
    staged: bool,
    format: OutputFormat,
) -> Result<i32> {
    // Outside a repository the lookup fails; the diff step reports that later.
    let root = Git::new(repo)
        .toplevel()
        .unwrap_or_else(|_| repo.to_path_buf());
    load_dotenv(&root);
    let config = GuardConfig::load(config_path, &root).wrap_err("loading configuration")?;

    // Credential check comes before any diff or network work.
    let mut llm_config = config.llm;
    llm_config.resolve_api_key()?;
    let client = GeminiClient::new(&llm_config)?;
    debug!(model = client.model(), "verdict client ready");

    let mode = if staged {
        DiffMode::Staged
    } else {
        DiffMode::Branch
    };
    let pipeline = ScanPipeline::new(DiffSource::new(repo), client);

    let report = match format {
        OutputFormat::Text => {
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let report = pipeline.run(mode, &mut out).await?;
            out.flush().into_diagnostic()?;
            report
        }
        OutputFormat::Json => {
            // Messages still reach the user, without breaking the JSON on stdout.
            let report = pipeline.run(mode, &mut std::io::stderr()).await?;
            println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
            report
        }
    };

    Ok(report.exit_code())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        None => print_welcome(),
        Some(Command::Install { ref repo }) => run_install(repo, cli.format)?,
        Some(Command::Uninstall { ref repo }) => run_uninstall(repo, cli.format)?,
        Some(Command::Status { ref repo }) => run_status(repo, cli.format)?,
        Some(Command::Scan { staged, ref repo }) => {
            let code = run_scan(cli.config.as_deref(), repo, staged, cli.format).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Some(Command::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "ai-git-guard",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}
