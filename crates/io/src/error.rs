use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported point cloud format {extension:?}")]
    UnsupportedFormat { extension: String },

    #[error("failed to access point cloud file")]
    Io(#[from] std::io::Error),

    #[error("malformed point cloud{}: {message}", at_line(.line))]
    Parse { line: Option<usize>, message: String },
}

impl IoError {
    /// Parse failure tied to a 1-based text line.
    pub(crate) fn at(line: usize, message: impl Into<String>) -> Self {
        IoError::Parse {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Parse failure with no meaningful line number (binary bodies, whole-header checks).
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        IoError::Parse {
            line: None,
            message: message.into(),
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    match line {
        Some(l) => format!(" at line {l}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::IoError;

    #[test]
    fn parse_error_mentions_line() {
        let err = IoError::at(7, "expected 6 fields, found 5");
        assert_eq!(
            err.to_string(),
            "malformed point cloud at line 7: expected 6 fields, found 5"
        );
        let err = IoError::parse("body too short");
        assert_eq!(err.to_string(), "malformed point cloud: body too short");
    }
}
