use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::config::load_session;
use crate::cli::utils::{output_item, output_items, output_success};
use crate::cli::OutputFormat;
use crate::services::TodoItem;

#[derive(Subcommand)]
pub enum ItemCommands {
    #[command(about = "List your to-do items")]
    List,

    #[command(about = "Show a single item")]
    Show {
        #[arg(help = "Item id")]
        id: i64,
    },

    #[command(about = "Add a new item")]
    Add {
        #[arg(help = "Item description")]
        description: String,
    },

    #[command(about = "Change an item's description")]
    Edit {
        #[arg(help = "Item id")]
        id: i64,
        #[arg(help = "New description")]
        description: String,
    },

    #[command(about = "Mark an item completed")]
    Complete {
        #[arg(help = "Item id")]
        id: i64,
        #[arg(long, help = "Mark the item not completed instead")]
        undo: bool,
    },

    #[command(about = "Delete an item")]
    Delete {
        #[arg(help = "Item id")]
        id: i64,
    },
}

pub async fn handle(cmd: ItemCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let session = load_session()?;
    let client = ApiClient::authenticated(&session)?;

    match cmd {
        ItemCommands::List => {
            let items: Vec<TodoItem> = client.get("/api/todoitems").await?;
            output_items(&output_format, &items)
        }
        ItemCommands::Show { id } => {
            let item: TodoItem = client.get(&item_path(id)).await?;
            output_item(&output_format, &item)
        }
        ItemCommands::Add { description } => {
            let item: TodoItem = client
                .post(
                    "/api/todoitems",
                    &json!({ "itemDescription": description, "isCompleted": false }),
                )
                .await?;
            output_success(
                &output_format,
                &format!("Added item {}", item.id),
                Some(json!({ "item": item })),
            )
        }
        ItemCommands::Edit { id, description } => {
            modify(&client, id, |item| item.item_description = description).await?;
            output_success(&output_format, &format!("Updated item {}", id), None)
        }
        ItemCommands::Complete { id, undo } => {
            modify(&client, id, |item| item.is_completed = !undo).await?;
            let state = if undo { "not completed" } else { "completed" };
            output_success(&output_format, &format!("Marked item {} {}", id, state), None)
        }
        ItemCommands::Delete { id } => {
            client.delete(&item_path(id)).await?;
            output_success(&output_format, &format!("Deleted item {}", id), None)
        }
    }
}

fn item_path(id: i64) -> String {
    format!("/api/todoitems/{}", id)
}

/// Read-modify-write that sends back the version it read, so a concurrent
/// change is reported as a conflict rather than silently overwritten.
async fn modify(client: &ApiClient, id: i64, change: impl FnOnce(&mut TodoItem)) -> anyhow::Result<()> {
    let mut item: TodoItem = client.get(&item_path(id)).await?;
    change(&mut item);
    client.put(&item_path(id), &item).await
}
