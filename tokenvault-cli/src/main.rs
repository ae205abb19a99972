mod client;
mod ops;

use clap::{Parser, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Password};
use ops::OutputFormat;
use tokenvault_core::{ChangePasswordRequest, RegisterRequest, UpdateProfileRequest};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI wrapper around the TokenVault HTTP API.
#[derive(Parser)]
#[command(
    name = "tokenvault-cli",
    author,
    version,
    about = "CLI for the TokenVault credential API"
)]
struct Cli {
    /// API base url
    #[arg(long, env = "TV_API_BASE", default_value = "http://127.0.0.1:3000")]
    api_base: String,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, short)]
        email: String,
        /// Prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Log in and print a refresh token
    Login {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Exchange a refresh token for an access token
    Token { refresh_token: String },
    /// Show the claims inside an access token
    Decode { access_token: String },
    /// Revoke one refresh token
    Logout { refresh_token: String },
    /// Revoke every refresh token of an account
    LogoutAll {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: Option<String>,
    },
    /// Change name and last name
    Update {
        #[arg(long)]
        refresh_token: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        last_name: String,
    },
    /// Change the account password
    ChangePassword {
        #[arg(long, short)]
        email: String,
        /// Current password, prompted for when omitted
        #[arg(long, short)]
        password: Option<String>,
        /// Prompted for (with confirmation) when omitted
        #[arg(long)]
        new_password: Option<String>,
    },
    /// Delete an account
    Delete {
        #[arg(long, short)]
        email: String,
        #[arg(long, short)]
        password: Option<String>,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();
    let client = client::ApiClient::new(&cli.api_base)?;
    let output = cli.output;

    match cli.command {
        Commands::Register {
            name,
            last_name,
            email,
            password,
        } => {
            let password = password_or_prompt(password, "Password", true)?;
            let req = RegisterRequest {
                name: Some(name),
                last_name: Some(last_name),
                email: Some(email),
                password: Some(password),
            };
            ops::register(&client, req, output).await?
        }
        Commands::Login { email, password } => {
            let password = password_or_prompt(password, "Password", false)?;
            ops::login(&client, &email, &password, output).await?
        }
        Commands::Token { refresh_token } => ops::token(&client, &refresh_token, output).await?,
        Commands::Decode { access_token } => ops::decode(&client, &access_token, output).await?,
        Commands::Logout { refresh_token } => ops::logout(&client, &refresh_token, output).await?,
        Commands::LogoutAll { email, password } => {
            let password = password_or_prompt(password, "Password", false)?;
            ops::logout_all(&client, &email, &password, output).await?
        }
        Commands::Update {
            refresh_token,
            name,
            last_name,
        } => {
            let req = UpdateProfileRequest {
                name: Some(name),
                last_name: Some(last_name),
                refresh_token: Some(refresh_token),
            };
            ops::update_profile(&client, req, output).await?
        }
        Commands::ChangePassword {
            email,
            password,
            new_password,
        } => {
            let password = password_or_prompt(password, "Current password", false)?;
            let new_password = password_or_prompt(new_password, "New password", true)?;
            let req = ChangePasswordRequest {
                email: Some(email),
                password: Some(password),
                new_password: Some(new_password),
            };
            ops::change_password(&client, req, output).await?
        }
        Commands::Delete {
            email,
            password,
            yes,
        } => {
            if !yes && !confirm_delete(&email)? {
                ops::ui::tip("aborted, nothing was deleted");
                return Ok(());
            }
            let password = password_or_prompt(password, "Password", false)?;
            ops::delete_account(&client, &email, &password, output).await?
        }
    }

    Ok(())
}

fn password_or_prompt(
    given: Option<String>,
    prompt: &str,
    confirm: bool,
) -> anyhow::Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    let theme = ColorfulTheme::default();
    let mut input = Password::with_theme(&theme).with_prompt(prompt);
    if confirm {
        input = input.with_confirmation("Repeat password", "Passwords do not match");
    }
    Ok(input.interact()?)
}

fn confirm_delete(email: &str) -> anyhow::Result<bool> {
    Ok(Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Delete account {email}? This cannot be undone"))
        .default(false)
        .interact()?)
}

fn init_tracing() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
