//! Configuration file editor command.
//!
//! Opens the configuration file in the user's preferred editor, writing the
//! defaults first when no file exists yet.

use std::process::Command;

use crate::config::{get_config_path, PerceptConfig};

/// Opens the configuration file in the user's preferred editor.
///
/// Tries $EDITOR first, then nano, then vi.
///
/// # Errors
/// - If no editor can be found or executed
pub fn handle_config() -> anyhow::Result<()> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        PerceptConfig::default().save()?;
        tracing::info!("Wrote default config: {}", config_path.display());
    }

    tracing::info!("Opening config file: {}", config_path.display());

    let editor = find_editor()?;

    let status = Command::new(&editor)
        .arg(&config_path)
        .status()
        .map_err(|e| {
            anyhow::anyhow!(
                "Failed to open editor '{editor}': {e}. Make sure the editor is installed and accessible."
            )
        })?;

    if !status.success() {
        return Err(anyhow::anyhow!(
            "Editor exited with error code: {}",
            status.code().unwrap_or(-1)
        ));
    }

    Ok(())
}

/// Finds the best available editor: $EDITOR, nano, vi.
fn find_editor() -> anyhow::Result<String> {
    if let Ok(editor) = std::env::var("EDITOR") {
        if !editor.is_empty() {
            return Ok(editor);
        }
    }

    for editor in &["nano", "vi"] {
        if is_editor_available(editor) {
            return Ok(editor.to_string());
        }
    }

    Err(anyhow::anyhow!(
        "No editor found. Please set the $EDITOR environment variable."
    ))
}

fn is_editor_available(editor: &str) -> bool {
    Command::new("which")
        .arg(editor)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}
