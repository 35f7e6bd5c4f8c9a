use std::path::{Path, PathBuf};
use std::{error, fmt, fs, io};

/// read when no `--config` is given and the file exists
pub const DEFAULT_CONFIG_FILE: &str = "rsi.toml";

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RsiConfig {
	/// trace logging for the interpreter
	pub debug: bool,
	/// printed before `[<n>]-> `
	pub prompt: String,
	pub history_file: Option<PathBuf>,
	/// source files loaded before the first prompt
	pub preload: Vec<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
	Io(PathBuf, io::Error),
	Parse(PathBuf, toml::de::Error),
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::Io(path, err) => write!(f, "can't read config {}: {}", path.display(), err),
			ConfigError::Parse(path, err) => write!(f, "bad config {}: {}", path.display(), err),
		}
	}
}

impl error::Error for ConfigError {}

impl RsiConfig {
	pub fn from_toml(data: &[u8]) -> Result<Self, toml::de::Error> {
		toml::from_slice(data)
	}

	/// `path` must exist when given, otherwise `rsi.toml` is used if present
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		let path = match path {
			Some(path) => path.to_path_buf(),
			None => {
				let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
				if !fallback.is_file() {
					log::debug!("no {}, using defaults", DEFAULT_CONFIG_FILE);
					return Ok(Self::default())
				}
				fallback
			},
		};
		let data = fs::read(&path).map_err(|err| ConfigError::Io(path.clone(), err))?;
		let config = Self::from_toml(&data).map_err(|err| ConfigError::Parse(path.clone(), err))?;
		log::debug!("config loaded from {}", path.display());
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_file_is_defaults() {
		assert_eq!(RsiConfig::from_toml(b"").unwrap(), RsiConfig::default());
	}

	#[test]
	fn partial_file_keeps_other_defaults() {
		let config = RsiConfig::from_toml(b"debug = true\npreload = [\"lib.scm\", \"more.scm\"]\n").unwrap();
		assert!(config.debug);
		assert_eq!(config.prompt, "");
		assert_eq!(config.preload, vec![PathBuf::from("lib.scm"), PathBuf::from("more.scm")]);
		assert_eq!(config.history_file, None);
	}

	#[test]
	fn full_file() {
		let config = RsiConfig::from_toml(b"prompt = \"lisp\"\nhistory_file = \".rsi_history\"\n").unwrap();
		assert_eq!(config.prompt, "lisp");
		assert_eq!(config.history_file, Some(PathBuf::from(".rsi_history")));
	}

	#[test]
	fn malformed_toml() {
		assert!(RsiConfig::from_toml(b"debug = \"yes\"").is_err());
		assert!(RsiConfig::from_toml(b"prompt = ").is_err());
	}

	#[test]
	fn missing_explicit_file() {
		let err = RsiConfig::load(Some(Path::new("does/not/exist.toml"))).unwrap_err();
		assert!(matches!(err, ConfigError::Io(..)));
		assert!(err.to_string().starts_with("can't read config does/not/exist.toml"));
	}
}
