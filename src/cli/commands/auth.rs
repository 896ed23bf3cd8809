use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Deserialize;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, save_session};
use crate::cli::utils::{output_success, resolve_password};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout from server")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    expiration: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct StatusMessage {
    message: String,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        AuthCommands::Login { username, password } => {
            let password = resolve_password(password)?;
            let client = ApiClient::new(&session.server_url)?;
            let login: LoginResponse = client
                .post(
                    "/api/authentication/login",
                    &json!({ "username": username, "password": password }),
                )
                .await?;

            session.log_in(username.clone(), login.token, login.expiration);
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Logged in as '{}'", username),
                Some(json!({ "user": username, "expiration": login.expiration })),
            )
        }
        AuthCommands::Register {
            username,
            email,
            password,
        } => {
            let password = resolve_password(password)?;
            let client = ApiClient::new(&session.server_url)?;
            let status: StatusMessage = client
                .post(
                    "/api/authentication/register",
                    &json!({ "userName": username, "emailId": email, "password": password }),
                )
                .await?;

            output_success(&output_format, &status.message, Some(json!({ "user": username })))
        }
        AuthCommands::Logout => {
            session.log_out();
            save_session(&session)?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let logged_in = session.active_token().is_some();
            let message = match (&session.user_name, logged_in) {
                (Some(user), true) => format!("Logged in as '{}' on {}", user, session.server_url),
                (Some(user), false) => format!("Session for '{}' has expired", user),
                (None, _) => "Not logged in".to_string(),
            };

            output_success(
                &output_format,
                &message,
                Some(json!({
                    "authenticated": logged_in,
                    "user": session.user_name,
                    "server": session.server_url,
                    "expiration": session.expiration,
                })),
            )
        }
    }
}
