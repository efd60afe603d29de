use std::path::{Path, PathBuf};

/// Shape detector models looked up relative to the working directory.
pub const DEFAULT_CASCADE_PATHS: [&str; 3] = [
    "platedetc/cascade.xml",
    "platedetc/haarcascade_licence_plate_rus_16stages.xml",
    "platedetc/haarcascade_russian_plate_number.xml",
];

pub const DEFAULT_OCR_MODEL: &str = "models/ocr_plate_en.pb";
pub const DEFAULT_FONT: &str = "fonts/label.ttf";
pub const DEFAULT_SENSITIVITY: f64 = 0.5;

/// Frames larger than this are downscaled before detection.
pub const MAX_FRAME_WIDTH: u32 = 1920;
pub const MAX_FRAME_HEIGHT: u32 = 1080;

/// Where the detector finds its assets.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub cascade_paths: Vec<PathBuf>,
    pub label_font: Option<PathBuf>,
    pub max_frame: (u32, u32),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            cascade_paths: DEFAULT_CASCADE_PATHS.iter().map(PathBuf::from).collect(),
            label_font: Some(PathBuf::from(DEFAULT_FONT)),
            max_frame: (MAX_FRAME_WIDTH, MAX_FRAME_HEIGHT),
        }
    }
}

impl DetectorConfig {
    /// Same file names as the defaults, resolved under `dir`.
    pub fn with_model_dir(mut self, dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        self.cascade_paths = DEFAULT_CASCADE_PATHS
            .iter()
            .filter_map(|p| Path::new(p).file_name())
            .map(|name| dir.join(name))
            .collect();
        self
    }

    pub fn with_cascades<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.cascade_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_font(mut self, font: Option<PathBuf>) -> Self {
        self.label_font = font;
        self
    }
}
