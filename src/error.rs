// ============================================================
// Error Taxonomy
// ============================================================
// Most failures travel as anyhow::Error with context attached.
// The few that decide the process exit status are typed here
// and carried inside the anyhow::Error; main.rs downcasts to
// pick the exit code.
//
//   exit 1  - bad configuration, or any other fatal failure
//   exit 2  - a required input (the vectorizer log, or the
//             snapshot behind template-vectors) could not be opened

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinerError {
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A required input file cannot be opened
    #[error("cannot open input '{path}': {source}")]
    InputUnavailable {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MinerError {
    pub fn exit_code(&self) -> u8 {
        match self {
            MinerError::InvalidConfig(_) => 1,
            MinerError::InputUnavailable { .. } => 2,
        }
    }
}

/// Exit status for an error that reached main
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<MinerError>())
        .map(MinerError::exit_code)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_input_unavailable_exits_two() {
        let err: anyhow::Error = MinerError::InputUnavailable {
            path:   PathBuf::from("missing.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_context_does_not_hide_exit_code() {
        let res: anyhow::Result<()> = Err(MinerError::InputUnavailable {
            path:   PathBuf::from("missing.log"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        }
        .into());
        let err = res.context("vectorize failed").unwrap_err();
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(exit_code_for(&anyhow::anyhow!("disk full")), 1);
        let cfg: anyhow::Error = MinerError::InvalidConfig("batch_size".into()).into();
        assert_eq!(exit_code_for(&cfg), 1);
    }
}
