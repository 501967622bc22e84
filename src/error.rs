// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the overlay library.

use std::fmt;

/// Result type alias for overlay operations.
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Main error type for the overlay library.
#[derive(Debug)]
pub enum OverlayError {
    /// Error decoding, encoding or drawing images.
    ImageError(String),
    /// Malformed or unexpected JSON.
    JsonError(String),
    /// Malformed CSV data.
    CsvError(String),
    /// `.npy`/`.npz` file that cannot be read or written.
    NumpyError(String),
    /// Pickle stream that cannot be read or written.
    PickleError(String),
    /// Parquet file or Arrow batch error.
    ParquetError(String),
    /// Keypoint data that does not fit the OpenPose layout.
    KeypointError(String),
    /// File extension without a registered handler.
    UnsupportedFormat(String),
    /// Path given without a file extension.
    MissingExtension(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// IO error with context.
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
    /// Visualizer error.
    VisualizerError(String),
}

impl fmt::Display for OverlayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::JsonError(msg) => write!(f, "JSON error: {msg}"),
            Self::CsvError(msg) => write!(f, "CSV error: {msg}"),
            Self::NumpyError(msg) => write!(f, "NumPy error: {msg}"),
            Self::PickleError(msg) => write!(f, "Pickle error: {msg}"),
            Self::ParquetError(msg) => write!(f, "Parquet error: {msg}"),
            Self::KeypointError(msg) => write!(f, "Keypoint error: {msg}"),
            Self::UnsupportedFormat(ext) => write!(f, "Unsupported file format: {ext}"),
            Self::MissingExtension(path) => {
                write!(f, "You need to specify a file extension: {path}")
            }
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::VisualizerError(msg) => write!(f, "Visualizer error: {msg}"),
        }
    }
}

impl std::error::Error for OverlayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for OverlayError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<csv::Error> for OverlayError {
    fn from(err: csv::Error) -> Self {
        Self::CsvError(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpyError> for OverlayError {
    fn from(err: ndarray_npy::ReadNpyError) -> Self {
        Self::NumpyError(err.to_string())
    }
}

impl From<ndarray_npy::WriteNpyError> for OverlayError {
    fn from(err: ndarray_npy::WriteNpyError) -> Self {
        Self::NumpyError(err.to_string())
    }
}

impl From<ndarray_npy::ReadNpzError> for OverlayError {
    fn from(err: ndarray_npy::ReadNpzError) -> Self {
        Self::NumpyError(err.to_string())
    }
}

impl From<ndarray_npy::WriteNpzError> for OverlayError {
    fn from(err: ndarray_npy::WriteNpzError) -> Self {
        Self::NumpyError(err.to_string())
    }
}

impl From<serde_pickle::Error> for OverlayError {
    fn from(err: serde_pickle::Error) -> Self {
        Self::PickleError(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for OverlayError {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Self::ParquetError(err.to_string())
    }
}

impl From<arrow::error::ArrowError> for OverlayError {
    fn from(err: arrow::error::ArrowError) -> Self {
        Self::ParquetError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverlayError::KeypointError("test".to_string());
        assert_eq!(err.to_string(), "Keypoint error: test");

        let err = OverlayError::UnsupportedFormat("pkl".to_string());
        assert_eq!(err.to_string(), "Unsupported file format: pkl");

        let err = OverlayError::MissingExtension("figure".to_string());
        assert!(err.to_string().starts_with("You need to specify a file extension"));
    }

    #[test]
    fn test_error_from_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: OverlayError = parse_err.into();
        assert!(matches!(err, OverlayError::JsonError(_)));
    }

    #[test]
    fn test_error_from_pickle() {
        let options = serde_pickle::DeOptions::new();
        let err: OverlayError = serde_pickle::from_slice::<serde_json::Value>(b"\x00garbage", options)
            .unwrap_err()
            .into();
        assert!(matches!(err, OverlayError::PickleError(_)));
        assert!(err.to_string().starts_with("Pickle error"));
    }

    #[test]
    fn test_io_error_source() {
        use std::error::Error;
        let err: OverlayError = std::io::Error::other("boom").into();
        assert!(err.source().is_some());
    }
}
