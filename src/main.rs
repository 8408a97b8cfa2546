mod api;
mod config;
mod console;
mod html;
mod render;
mod setup;
mod validate;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use api::{EditBackend, HttpBackend, OperationKind};
use console::{Console, EditForm, Modal, PanelState};

/// Edit Console: describe a change to a GitHub repository in plain language,
/// send it to the editor backend, and get the result as an HTML fragment.
#[derive(Parser, Debug)]
#[command(name = "edit-console", version, about)]
struct Cli {
    /// Write the rendered fragment to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Config file (defaults to .edit-console.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether the backend can reach GitHub and the AI model
    Status,
    /// Apply the change and open a pull request
    Execute {
        #[command(flatten)]
        edit: EditArgs,
        /// Branch to push to (the backend picks one when omitted)
        #[arg(short, long)]
        branch: Option<String>,
        /// Push the branch without opening a pull request
        #[arg(long)]
        no_pr: bool,
    },
    /// Show sample diffs without writing anything
    Preview {
        #[command(flatten)]
        edit: EditArgs,
        /// Apply the change right after a successful preview
        #[arg(long)]
        apply: bool,
    },
    /// Show the backend's step-by-step plan for the change
    Plan {
        #[command(flatten)]
        edit: EditArgs,
    },
    /// Summarize a repository: languages, important files, layout
    Analyze {
        /// Repository URL (e.g., https://github.com/owner/repo)
        repo_url: String,
    },
    /// List the example instructions, or fill the form from one
    Example {
        /// 1-based example number
        index: Option<usize>,
        /// Repository to pair the example with
        #[arg(long)]
        repo: Option<String>,
    },
    /// Print a dialog fragment
    Show {
        #[arg(value_enum)]
        dialog: Dialog,
    },
    /// Query the backend health endpoint
    Health,
    /// Bootstrap the local backend: interpreter, venv, dependencies, .env
    Setup {
        /// Skip venv creation and dependency installation
        #[arg(long)]
        skip_install: bool,
    },
    /// Run the local backend from its virtual environment
    Serve,
}

#[derive(clap::Args, Debug)]
struct EditArgs {
    /// Repository URL (e.g., https://github.com/owner/repo)
    repo_url: String,
    /// What to change, in plain language
    instruction: String,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Dialog {
    Help,
    About,
}

impl From<Dialog> for Modal {
    fn from(dialog: Dialog) -> Self {
        match dialog {
            Dialog::Help => Modal::Help,
            Dialog::About => Modal::About,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded env file"),
        Err(_) => debug!("no env file found, using process environment"),
    }

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(backend = %config.backend.base_url, "configuration loaded");

    let console = Console::new(HttpBackend::new(&config.backend)?, config.preview.clone());
    let output = cli.output.as_deref();

    match cli.command {
        Command::Status => {
            let indicators = console.check_connections().await;
            for indicator in &indicators {
                println!("{}", indicator.terminal_line());
            }
            if output.is_some() {
                let fragment: String = indicators.iter().map(|i| i.to_html()).collect();
                render::output(&fragment, output)?;
            }
        }
        Command::Execute { edit, branch, no_pr } => {
            let form = EditForm {
                branch_name: branch.unwrap_or_default(),
                create_pr: !no_pr,
                ..edit.into_form()
            };
            let state = run_operation(&console, form, OperationKind::Execute).await;
            finish(&console, state, output).await?;
        }
        Command::Preview { edit, apply } => {
            let mut state = run_operation(&console, edit.into_form(), OperationKind::Preview).await;
            if apply && state == PanelState::PreviewReady {
                info!("applying previewed changes");
                if let Some(done) = console.confirm_preview().await {
                    state = done.state;
                }
            }
            finish(&console, state, output).await?;
        }
        Command::Plan { edit } => {
            let state = run_operation(&console, edit.into_form(), OperationKind::Plan).await;
            finish(&console, state, output).await?;
        }
        Command::Analyze { repo_url } => {
            let form = EditForm {
                repo_url,
                ..EditForm::default()
            };
            let state = run_operation(&console, form, OperationKind::Analyze).await;
            finish(&console, state, output).await?;
        }
        Command::Example { index: None, .. } => {
            for (i, example) in console::picker::EXAMPLES.iter().enumerate() {
                println!("{:>2}. {}: {}", i + 1, example.title.bold(), example.instruction);
            }
        }
        Command::Example { index: Some(index), repo } => {
            if let Some(repo) = repo {
                console.view().lock().await.form.repo_url = repo;
            }
            console.pick_example(index).await?;
            let form = console.view().lock().await.form.clone();
            println!("{} {}", "repository:".bold(), form.repo_url);
            println!("{} {}", "instruction:".bold(), form.instruction);
            println!("{} {}", "branch:".bold(), form.branch_name);
        }
        Command::Show { dialog } => {
            console.open_modal(dialog.into()).await;
            let fragment = console.view().lock().await.modals.render_open();
            render::output(&fragment, output)?;
        }
        Command::Health => {
            let health = console.backend().health().await?;
            println!(
                "{} {} (version {})",
                "backend:".bold(),
                health.status.green().bold(),
                health.version.as_deref().unwrap_or("unknown")
            );
        }
        Command::Setup { skip_install } => {
            let report = setup::run_setup(&config.setup, skip_install).await?;
            if let Some(python) = report.python {
                println!("{} Python {python}", "✓".green());
            }
            if report.created_venv {
                println!("{} created {}", "✓".green(), config.setup.venv_dir.display());
            }
            if report.installed_requirements {
                println!("{} installed {}", "✓".green(), config.setup.requirements.display());
            }
            if report.created_env_file {
                println!("{} created {}", "✓".green(), config.setup.env_file.display());
            }
            println!("{} ready; start the backend with `edit-console serve`", "✓".green().bold());
        }
        Command::Serve => {
            let status = setup::serve(&config.setup).await?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
    }

    Ok(())
}

impl EditArgs {
    fn into_form(self) -> EditForm {
        EditForm {
            repo_url: self.repo_url,
            instruction: self.instruction,
            ..EditForm::default()
        }
    }
}

async fn run_operation<B: EditBackend>(console: &Console<B>, form: EditForm, kind: OperationKind) -> PanelState {
    let span = info_span!("edit", %kind, repo_url = %form.repo_url);
    async move {
        if let Ok(repo) = validate::parse_repo_url(form.repo_url.trim()) {
            debug!(owner = %repo.owner, repo = %repo.repo, "target repository");
        }
        console.fill_form(form).await;
        let done = console.submit(kind).await;
        info!(state = %done.state, token = done.token, "operation finished");
        done.state
    }
    .instrument(span)
    .await
}

/// Print the state line, emit the panel fragment, and fail the process when
/// the operation failed.
async fn finish<B: EditBackend>(
    console: &Console<B>,
    state: PanelState,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let fragment = {
        let view = console.view().lock().await;
        debug!(scroll_requests = view.panel.scroll_requests(), "result panel");
        view.panel.is_visible().then(|| view.panel.html().to_string())
    };
    if let Some(fragment) = fragment {
        render::output(&fragment, output)?;
    }

    let line = format!("═══ {state} ═══");
    if state == PanelState::Failed {
        eprintln!("{}", line.red().bold());
        return Err(format!("operation {state}").into());
    }
    eprintln!("{}", line.green().bold());
    Ok(())
}
