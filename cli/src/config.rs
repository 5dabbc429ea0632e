use crate::helpers::get_config;

use anyhow::Result;
use config::Configuration;

pub fn new_config(_matches: &clap::ArgMatches, config_file_path: String) -> Result<()> {
    Configuration::new_config_file(config_file_path.as_str(), false)?;
    Ok(())
}

pub fn sanitize(_matches: &clap::ArgMatches, config_file_path: String) -> Result<()> {
    let mut config = get_config(&config_file_path)?;
    config.sanitize();
    let output = sibling_file(&config_file_path, "_sanitized.yaml");
    config.save(output.as_str(), false)?;
    Ok(())
}

pub fn export_as_json(_matches: &clap::ArgMatches, config_file_path: String) -> Result<()> {
    let mut config = get_config(&config_file_path)?;
    // remove sensitive information
    config.sanitize();
    let output = sibling_file(&config_file_path, ".json");
    config.save(output.as_str(), true)?;
    Ok(())
}

/// derives an output path next to the input file by swapping its extension
/// for the given suffix
fn sibling_file(path: &str, suffix: &str) -> String {
    let stem = path
        .rsplit_once('.')
        .map_or(path, |(stem, _extension)| stem);
    format!("{stem}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sibling_file_swaps_extension() {
        assert_eq!(
            sibling_file("config.yaml", "_sanitized.yaml"),
            "config_sanitized.yaml"
        );
        assert_eq!(sibling_file("config.yaml", ".json"), "config.json");
        // no extension at all
        assert_eq!(sibling_file("config", ".json"), "config.json");
    }
}
