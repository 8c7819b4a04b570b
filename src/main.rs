use anyhow::Context;
use clap::{Parser, Subcommand};
use firebridge::utils::logger;
use firebridge::{
    AuthProvider, DataProvider, FieldMap, FileSessionStore, FirebaseAuth, FirebaseAuthProvider,
    FirebaseConfig, FirestoreClient, FirestoreDataProvider, ForgotPasswordParams, LoginParams,
    RegisterParams,
};

#[derive(Debug, Parser)]
#[command(name = "firebridge")]
#[command(about = "Firebase-backed auth and data providers, driven from the command line")]
struct Cli {
    #[arg(long, default_value = "firebridge.toml")]
    config: String,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with email and password
    Login {
        email: String,
        password: String,
        #[arg(long)]
        remember: bool,
    },
    /// Create an account
    Register {
        email: String,
        password: String,
        #[arg(long)]
        display_name: Option<String>,
    },
    /// Show the current identity
    Whoami,
    /// Probe the session state
    Check,
    /// Sign out
    Logout,
    /// Send a password-reset mail
    ForgotPassword { email: String },
    /// List a resource
    List { resource: String },
    /// Fetch one record by id
    Get { resource: String, id: String },
    /// Create a record from a JSON object
    Create { resource: String, json: String },
    /// Merge a JSON object into a record
    Update {
        resource: String,
        id: String,
        json: String,
    },
    /// Delete a record
    Delete { resource: String, id: String },
}

fn parse_fields(json: &str) -> anyhow::Result<FieldMap> {
    serde_json::from_str(json).context("variables must be a JSON object")
}

fn print_json<T: serde::Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).expect("serializable output"));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);

    let config = match FirebaseConfig::from_toml_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let session_file = config
        .session_file
        .clone()
        .unwrap_or_else(|| ".firebridge-session.json".to_string());
    let store = FileSessionStore::new(session_file);
    let auth = FirebaseAuthProvider::new(FirebaseAuth::connect(&config, store).await);
    let data = FirestoreDataProvider::new(FirestoreClient::new(&config));

    let mut failed = false;
    match cli.command {
        Command::Login {
            email,
            password,
            remember,
        } => {
            let response = auth
                .login(LoginParams {
                    email,
                    password,
                    remember,
                })
                .await;
            failed = !response.success;
            print_json(&response);
        }
        Command::Register {
            email,
            password,
            display_name,
        } => {
            let response = auth
                .register(RegisterParams {
                    email,
                    password,
                    display_name,
                })
                .await;
            failed = !response.success;
            print_json(&response);
        }
        Command::Whoami => print_json(&auth.get_identity().await),
        Command::Check => print_json(&auth.check().await),
        Command::Logout => {
            let response = auth.logout().await;
            failed = !response.success;
            print_json(&response);
        }
        Command::ForgotPassword { email } => {
            let response = auth.forgot_password(ForgotPasswordParams { email }).await;
            failed = !response.success;
            print_json(&response);
        }
        Command::List { resource } => print_json(&data.get_list(&resource, &[], &[]).await?),
        Command::Get { resource, id } => print_json(&data.get_one(&resource, &id).await?),
        Command::Create { resource, json } => {
            print_json(&data.create(&resource, parse_fields(&json)?).await?)
        }
        Command::Update { resource, id, json } => {
            print_json(&data.update(&resource, &id, parse_fields(&json)?).await?)
        }
        Command::Delete { resource, id } => {
            data.delete_one(&resource, &id).await?;
            println!("deleted {}/{}", resource, id);
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
