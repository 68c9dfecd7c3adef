use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use snafu::{ResultExt, ensure};

use crate::{Error, ParseConfigSnafu, ReadConfigSnafu, UnsupportedConfigVersionSnafu};

const DEFAULT_INPUT: &str = "dragonsprite.png";

/// Where to read the sprite from and where to write the packed files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    pub input: PathBuf,
    pub bitmap_output: PathBuf,
    pub palette_output: PathBuf,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self::with_input(DEFAULT_INPUT)
    }
}

impl ConverterConfig {
    /// Outputs are named after the input's upper-cased file stem and go in the
    /// working directory, so `art/dragonsprite.png` gives `DRAGONSPRITE.BIN`
    /// and `DRAGONSPRITE.PAL`.
    pub fn with_input(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_uppercase())
            .unwrap_or_else(|| "SPRITE".to_owned());

        ConverterConfig {
            bitmap_output: PathBuf::from(format!("{stem}.BIN")),
            palette_output: PathBuf::from(format!("{stem}.PAL")),
            input,
        }
    }

    pub fn from_toml_file(filename: &Path) -> Result<Self, Error> {
        let config_toml =
            fs::read_to_string(filename).context(ReadConfigSnafu { path: filename })?;

        Self::parse(&config_toml, filename)
    }

    fn parse(config_toml: &str, filename: &Path) -> Result<Self, Error> {
        let config: ConfigV1 =
            toml::from_str(config_toml).context(ParseConfigSnafu { path: filename })?;

        ensure!(
            config.version == "1.0",
            UnsupportedConfigVersionSnafu {
                path: filename,
                version: config.version
            }
        );

        Ok(config.into())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigV1 {
    version: String,
    input: Option<PathBuf>,
    bitmap_output: Option<PathBuf>,
    palette_output: Option<PathBuf>,
}

impl From<ConfigV1> for ConverterConfig {
    fn from(config: ConfigV1) -> Self {
        let defaults = config
            .input
            .map(ConverterConfig::with_input)
            .unwrap_or_default();

        ConverterConfig {
            bitmap_output: config.bitmap_output.unwrap_or(defaults.bitmap_output),
            palette_output: config.palette_output.unwrap_or(defaults.palette_output),
            input: defaults.input,
        }
    }
}
