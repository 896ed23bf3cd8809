use std::io::{self, BufRead, Write};

use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::services::TodoItem;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));
            if let Some(Value::Object(fields)) = data {
                response.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

pub fn output_items(output_format: &OutputFormat, items: &[TodoItem]) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "items": items }))?);
        }
        OutputFormat::Text if items.is_empty() => {
            println!("No to-do items");
        }
        OutputFormat::Text => {
            for item in items {
                println!("{}", item_line(item));
            }
        }
    }
    Ok(())
}

pub fn output_item(output_format: &OutputFormat, item: &TodoItem) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item)?);
        }
        OutputFormat::Text => {
            println!("{}", item_line(item));
            println!("Created:  {}", item.created_date.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("Modified: {}", item.modified_date.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}

pub fn item_line(item: &TodoItem) -> String {
    let mark = if item.is_completed { "x" } else { " " };
    format!("[{}] {:>4}  {}", mark, item.id, item.item_description)
}

/// Use `provided` or read a password from stdin.
pub fn resolve_password(provided: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = provided {
        return Ok(password);
    }

    print!("Password: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(anyhow::anyhow!("Password is required"));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_line_marks_completion() {
        let mut item = TodoItem {
            id: 3,
            item_description: "purchase".to_string(),
            ..TodoItem::default()
        };
        assert_eq!(item_line(&item), "[ ]    3  purchase");

        item.is_completed = true;
        assert_eq!(item_line(&item), "[x]    3  purchase");
    }

    #[test]
    fn provided_password_is_used_verbatim() {
        assert_eq!(resolve_password(Some("Test@123".to_string())).unwrap(), "Test@123");
    }
}
