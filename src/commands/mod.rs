pub mod completions;
pub mod help;
pub mod pick;
pub mod search;

use multipick::{Config, OptionSource};
use std::path::Path;

/// Load the options file and config shared by `pick` and `search`.
pub(crate) fn load_inputs(
    file: &Path,
    config: Option<&Path>,
) -> Result<(OptionSource, Config), String> {
    let source = OptionSource::load(file)
        .map_err(|e| format!("Failed to load {}: {e}", file.display()))?;
    let config = Config::load(config).map_err(|e| format!("Failed to load config: {e}"))?;
    Ok((source, config))
}
