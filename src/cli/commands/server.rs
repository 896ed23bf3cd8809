use clap::Subcommand;
use serde_json::json;
use url::Url;

use crate::cli::client::ApiClient;
use crate::cli::config::{load_session, save_session, ServerStatus};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at a server; clears any stored login")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the configured server")]
    Current,

    #[command(about = "Health check the configured server")]
    Ping,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut session = load_session()?;

    match cmd {
        ServerCommands::Set { url } => {
            let url = normalize_server_url(&url)?;
            if url != session.server_url {
                session.log_out();
            }
            session.server_url = url.clone();
            session.status = ServerStatus::Unknown;
            save_session(&session)?;

            output_success(
                &output_format,
                &format!("Using server {}", url),
                Some(json!({ "server": url })),
            )
        }
        ServerCommands::Current => output_success(
            &output_format,
            &format!("Current server: {}", session.server_url),
            Some(json!({
                "server": session.server_url,
                "status": session.status,
                "last_ping": session.last_ping,
            })),
        ),
        ServerCommands::Ping => {
            let client = ApiClient::new(&session.server_url)?;
            let status = if client.ping().await {
                ServerStatus::Up
            } else {
                ServerStatus::Down
            };
            session.update_ping(status);
            save_session(&session)?;

            if status == ServerStatus::Down {
                return Err(anyhow::anyhow!("Server {} is not responding", session.server_url));
            }
            output_success(
                &output_format,
                &format!("Server {} is up", session.server_url),
                Some(json!({ "server": session.server_url, "status": status })),
            )
        }
    }
}

/// Accept only http(s) URLs and strip any trailing slash.
fn normalize_server_url(raw: &str) -> anyhow::Result<String> {
    let url = Url::parse(raw).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", raw, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow::anyhow!("Server URL must use http or https"));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_server_urls() {
        assert_eq!(
            normalize_server_url("http://localhost:3000/").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            normalize_server_url("https://todo.example.com/api").unwrap(),
            "https://todo.example.com/api"
        );
        assert!(normalize_server_url("ftp://example.com").is_err());
        assert!(normalize_server_url("not a url").is_err());
    }
}
