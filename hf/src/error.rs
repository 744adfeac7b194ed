//! Render pipeline errors

use std::path::PathBuf;

use thiserror::Error;

use crate::notification::Notification;

/// Reasons a render cycle stops before writing the output file
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("No .liquid working environment detected.")]
    NoActiveDocument,

    #[error("No workspace folder found")]
    NoWorkspace,

    #[error("File {name} not found")]
    SourceNotFound { name: String, path: PathBuf },

    #[error("{name} is not a .{extension} file")]
    NotTemplate { name: String, extension: String },

    #[error("Failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] liquid::Error),

    #[error("Shell template error: {0}")]
    Shell(String),

    #[error("Failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    /// The single user-visible message for this failure
    pub fn notification(&self) -> Notification {
        match self {
            Self::NoActiveDocument => Notification::info(self.to_string()),
            Self::NoWorkspace | Self::SourceNotFound { .. } | Self::NotTemplate { .. } => {
                Notification::error(self.to_string())
            }
            Self::ReadSource { .. } | Self::Template(_) | Self::Shell(_) | Self::WriteOutput { .. } => {
                Notification::error(format!("Render failed: {}", self))
            }
        }
    }

    /// Missing context is reported, but is not a failure of the tool
    pub fn is_missing_context(&self) -> bool {
        matches!(self, Self::NoActiveDocument)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::Level;

    #[test]
    fn test_missing_context_is_informational() {
        let n = RenderError::NoActiveDocument.notification();
        assert_eq!(n.level, Level::Info);
        assert_eq!(n.message, "No .liquid working environment detected.");
        assert!(RenderError::NoActiveDocument.is_missing_context());
    }

    #[test]
    fn test_missing_workspace_is_error() {
        let n = RenderError::NoWorkspace.notification();
        assert_eq!(n.level, Level::Error);
        assert_eq!(n.message, "No workspace folder found");
    }

    #[test]
    fn test_source_not_found_names_file() {
        let err = RenderError::SourceNotFound {
            name: "index.liquid".to_string(),
            path: PathBuf::from("/proj/index.liquid"),
        };
        assert_eq!(err.notification().message, "File index.liquid not found");
        assert_eq!(err.notification().level, Level::Error);
    }

    #[test]
    fn test_write_failure_is_prefixed() {
        let err = RenderError::WriteOutput {
            path: PathBuf::from("/proj/index.html"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let n = err.notification();
        assert_eq!(n.level, Level::Error);
        assert!(n.message.starts_with("Render failed: Failed to write /proj/index.html"));
    }
}
