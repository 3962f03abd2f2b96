use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

const STATE_FILE: &str = "selected_model.json";

#[derive(Debug, Serialize, Deserialize)]
struct SelectedModel {
    model: String,
}

/// Read the persisted model id from the working directory. A missing,
/// unreadable, or malformed file simply means nothing is selected yet.
pub fn load_selected_model() -> Option<String> {
    load_from(Path::new(STATE_FILE))
}

pub fn save_selected_model(model_id: &str) -> Result<()> {
    save_to(Path::new(STATE_FILE), model_id)
}

fn load_from(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let parsed: SelectedModel = serde_json::from_str(&raw)
        .map_err(|err| debug!(path = %path.display(), error = %err, "ignoring malformed state file"))
        .ok()?;
    if parsed.model.trim().is_empty() {
        return None;
    }
    Some(parsed.model)
}

fn save_to(path: &Path, model_id: &str) -> Result<()> {
    let body = serde_json::to_string(&SelectedModel {
        model: model_id.to_string(),
    })
    .context("Failed to encode selected model")?;
    fs::write(path, body)
        .with_context(|| format!("Failed to write selected model to '{}'", path.display()))?;
    debug!(path = %path.display(), model = %model_id, "saved selected model");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_from, save_to};

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("selected_model.json");

        save_to(&path, "llama-3.1-8b-instant").expect("save should succeed");
        assert_eq!(
            load_from(&path).as_deref(),
            Some("llama-3.1-8b-instant")
        );
    }

    #[test]
    fn missing_file_yields_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        assert_eq!(load_from(&dir.path().join("absent.json")), None);
    }

    #[test]
    fn malformed_file_yields_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("selected_model.json");
        std::fs::write(&path, "not json at all").expect("write should succeed");
        assert_eq!(load_from(&path), None);
    }

    #[test]
    fn empty_model_id_yields_none() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let path = dir.path().join("selected_model.json");
        std::fs::write(&path, r#"{"model":"  "}"#).expect("write should succeed");
        assert_eq!(load_from(&path), None);
    }
}
