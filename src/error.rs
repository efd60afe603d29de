#[cfg(feature = "tensorflow")]
use tensorflow::Status;

use std::io::Error as IOError;
use std::path::PathBuf;

/// Every way a detection run can go wrong.
///
/// `ImageLoad` and `ModelLoad` abort a whole invocation, the rest are turned
/// into per-candidate or per-stage text by the orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum PlateError {
    #[error("could not load image: {}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: Option<image::ImageError>,
    },

    #[error("no detection models found")]
    ModelLoad,

    #[error("OCR engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("OCR error: {0}")]
    Recognition(String),

    #[error("invalid region {x},{y} {width}x{height} for a {frame_width}x{frame_height} frame")]
    Geometry {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("malformed cascade model: {0}")]
    Cascade(String),

    #[error(transparent)]
    Io(#[from] IOError),

    #[error(transparent)]
    Xml(#[from] roxmltree::Error),

    #[error("tensorflow: {0}")]
    Tensorflow(String),
}

#[cfg(feature = "tensorflow")]
impl From<Status> for PlateError {
    fn from(e: Status) -> Self {
        PlateError::Tensorflow(e.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::PlateError;

    #[test]
    fn load_errors_name_what_failed() {
        let load = PlateError::ImageLoad { path: "missing.jpg".into(), source: None };
        assert_eq!(load.to_string(), "could not load image: missing.jpg");
        assert_eq!(PlateError::ModelLoad.to_string(), "no detection models found");
        assert_eq!(PlateError::Recognition("boom".into()).to_string(), "OCR error: boom");
    }
}
