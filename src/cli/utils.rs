use std::path::Path;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::parameters::ModelParameters;

/// Loads model parameters from `config`, or the built-in reference set when absent.
pub fn load_parameters(config: Option<&Path>) -> Result<ModelParameters> {
    match config {
        Some(path) => ModelParameters::from_json_file(path)
            .with_context(|| format!("loading parameters from {}", path.display())),
        None => Ok(ModelParameters::default()),
    }
}

/// Writes `value` to stdout as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
