use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use academiya_client::auth::{RegisterRequest, Role, SessionManager, SessionState, TokenStore};
use academiya_client::client::{ApiClient, SessionEvent};
use academiya_client::config::{Config, GlobalArgs};
use academiya_client::error::ApiError;
use academiya_client::models::InscriptionStatus;
use academiya_client::routes::{self, Navigation};

/// CLI client for the ACADEMIYA-Hub academic management backend
#[derive(Parser, Debug)]
#[command(name = "academiya", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in with email (password is prompted)
    Login { email: String },

    /// Clear the stored session
    Logout,

    /// Show the restored session
    Whoami,

    /// Register a new student account (password is prompted)
    Register {
        username: String,
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },

    /// Resolve a dashboard path against the current session
    Navigate { path: String },

    /// List departments
    Departements,

    /// List filières, optionally filtered by department
    Filieres {
        #[arg(long)]
        departement: Option<i64>,
    },

    /// List modules, optionally filtered by filière and semester
    Modules {
        #[arg(long)]
        filiere: Option<i64>,
        #[arg(long)]
        semestre: Option<u8>,
    },

    /// Enrollment operations
    Inscriptions {
        #[command(subcommand)]
        action: InscriptionCmd,
    },

    /// Grade operations
    Notes {
        #[command(subcommand)]
        action: NotesCmd,
    },

    /// Admin dashboard KPIs
    Dashboard,

    /// Performance KPIs
    Performance,
}

#[derive(Subcommand, Debug)]
enum InscriptionCmd {
    /// List visible inscriptions
    List {
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        year: Option<String>,
    },
    /// Current student's inscriptions
    Mine,
    /// Pending inscriptions awaiting validation
    Pending,
    /// Submit an enrollment request
    Create {
        filiere: i64,
        #[arg(long, default_value = "2024-2025")]
        year: String,
    },
    /// Validate or reject a pending inscription
    Validate {
        id: i64,
        #[arg(long)]
        reject: bool,
        #[arg(long, default_value = "")]
        reason: String,
    },
}

#[derive(Subcommand, Debug)]
enum NotesCmd {
    /// List visible grade records
    List,
    /// Modules assigned to the calling teacher
    MyModules,
    /// Grade sheet for one module
    Students {
        module_id: i64,
        #[arg(long, default_value = "2024-2025")]
        year: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_args(cli.global)?;
    config.validate()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Storage failure here is fatal: auth state is unknowable without it
    let store = Arc::new(
        TokenStore::open(&config.session_file).context("Failed to open the session store")?,
    );

    let client = Arc::new(ApiClient::new(
        config.api_url.clone(),
        store.clone(),
        config.http_connect_timeout,
        config.http_request_timeout,
    )?);

    let session = Arc::new(SessionManager::new(
        store,
        config.api_url.clone(),
        client.client().clone(),
    ));

    // The transport layer only announces expiry; the composition root
    // observes it and redirects
    let mut expiry = client.subscribe();

    // Loading gate: all route decisions wait for the restore to resolve
    session.restore().await?;

    let outcome = run(cli.command, &client, &session).await;

    if matches!(expiry.try_recv(), Ok(SessionEvent::Expired)) {
        session.logout().await?;
        eprintln!("Session expired - please log in again: academiya login <email>");
    }

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(
    command: Command,
    client: &ApiClient,
    session: &SessionManager,
) -> Result<(), ApiError> {
    match command {
        Command::Login { email } => {
            let password = prompt_password()?;
            let role = session.login(&email, &password).await?;
            println!("Logged in as {} ({})", email, role);
            println!("Landing page: {}", landing_path(role));
        }

        Command::Logout => {
            session.logout().await?;
            println!("Logged out");
        }

        Command::Whoami => match session.state().await {
            SessionState::Authenticated(user) => {
                println!("{} ({})", user.username, user.role);
            }
            _ => println!("Not logged in"),
        },

        Command::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            let password = prompt_password()?;
            let created = session
                .register(&RegisterRequest {
                    username,
                    email,
                    password,
                    first_name,
                    last_name,
                })
                .await?;
            print_json(&created)?;
        }

        Command::Navigate { path } => {
            let state = session.state().await;
            match routes::resolve(&path, &state) {
                Navigation::Render { view, params, shell } => {
                    println!("{:?} (shell: {})", view, shell);
                    for (name, value) in params {
                        println!("  {} = {}", name, value);
                    }
                }
                Navigation::RedirectToLogin => println!("-> /login"),
                Navigation::Pending => println!("(loading)"),
            }
        }

        Command::Departements => {
            print_json(&client.departements().list().await?)?;
        }

        Command::Filieres { departement } => {
            print_json(&client.filieres().list(departement, None).await?)?;
        }

        Command::Modules { filiere, semestre } => {
            print_json(&client.modules().list(filiere, semestre).await?)?;
        }

        Command::Inscriptions { action } => match action {
            InscriptionCmd::List { status, year } => {
                let status = status.as_deref().map(parse_status).transpose()?;
                let inscriptions = client
                    .inscriptions()
                    .list(status, year.as_deref())
                    .await?;
                print_json(&inscriptions)?;
            }
            InscriptionCmd::Mine => print_json(&client.inscriptions().mine().await?)?,
            InscriptionCmd::Pending => print_json(&client.inscriptions().pending().await?)?,
            InscriptionCmd::Create { filiere, year } => {
                let created = client
                    .inscriptions()
                    .create(&academiya_client::models::InscriptionInput {
                        filiere,
                        academic_year: year,
                    })
                    .await?;
                print_json(&created)?;
            }
            InscriptionCmd::Validate { id, reject, reason } => {
                let status = if reject {
                    InscriptionStatus::Rejected
                } else {
                    InscriptionStatus::Validated
                };
                let updated = client.inscriptions().validate(id, status, reason).await?;
                print_json(&updated)?;
            }
        },

        Command::Notes { action } => match action {
            NotesCmd::List => print_json(&client.notes().list().await?)?,
            NotesCmd::MyModules => print_json(&client.notes().my_modules().await?)?,
            NotesCmd::Students { module_id, year } => {
                print_json(&client.notes().students_by_module(module_id, &year).await?)?;
            }
        },

        Command::Dashboard => print_json(&client.dashboard().admin().await?)?,
        Command::Performance => print_json(&client.dashboard().performance().await?)?,
    }

    Ok(())
}

fn prompt_password() -> Result<String, ApiError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to read password: {}", e)))
}

fn parse_status(s: &str) -> Result<InscriptionStatus, ApiError> {
    match s.to_uppercase().as_str() {
        "PENDING" => Ok(InscriptionStatus::Pending),
        "VALIDATED" => Ok(InscriptionStatus::Validated),
        "REJECTED" => Ok(InscriptionStatus::Rejected),
        other => Err(ApiError::Internal(anyhow::anyhow!(
            "Unknown status '{}' (expected PENDING, VALIDATED or REJECTED)",
            other
        ))),
    }
}

/// Where each role lands after login, mirroring the dashboard shell
fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Etudiant => "/etudiant/dashboard",
        Role::Enseignant => "/enseignant/notes",
        Role::Admin => "/admin/validations",
        Role::Direction => "/direction/stats",
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), ApiError> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to render output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
