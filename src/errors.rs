use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the font catalog or applying a font.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    #[error("Google Fonts API returned {code}: {message}")]
    Api { code: u16, message: String },

    #[error("Failed to parse font list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Font \"{0}\" is not in the font list")]
    UnknownFont(String),

    #[error("Font \"{0}\" has no downloadable file")]
    MissingFile(String),

    #[error("Font loader stopped before reporting a result")]
    LoaderGone,
}

impl FontError {
    /// Map a ureq error, turning HTTP status failures into [`FontError::Api`].
    pub fn from_request(err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(code) => FontError::Api {
                code,
                message: status_message(code).to_string(),
            },
            other => FontError::Http(other),
        }
    }
}

fn status_message(code: u16) -> &'static str {
    match code {
        400 => "request rejected, check the API key",
        403 => "access denied for this API key",
        429 => "quota exceeded",
        500..=599 => "service unavailable",
        _ => "unexpected response",
    }
}

pub type FontResult<T> = Result<T, FontError>;

/// Errors raised while resolving or persisting the picker configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid picker id \"{0}\": only letters and digits are allowed")]
    InvalidPickerId(String),

    #[error("No API key given. Pass --api-key, set `api_key` in the config file or FONTPICK_API_KEY, or use --catalog")]
    MissingApiKey,

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    #[error("Invalid `{key}` in {}: expected {expected}", path.display())]
    InvalidValue {
        path: PathBuf,
        key: String,
        expected: &'static str,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_become_api_errors() {
        let err = FontError::from_request(ureq::Error::StatusCode(403));
        match err {
            FontError::Api { code, message } => {
                assert_eq!(code, 403);
                assert!(message.contains("denied"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn config_errors_name_the_file() {
        let err = ConfigError::InvalidValue {
            path: PathBuf::from("fontpick.toml"),
            key: "limit".to_string(),
            expected: "a positive integer",
        };
        assert_eq!(
            err.to_string(),
            "Invalid `limit` in fontpick.toml: expected a positive integer"
        );
    }
}
