use image::{ imageops::FilterType, DynamicImage, GenericImageView, GrayImage, RgbImage };
use log::{ debug, info, warn };
use rusttype::Font;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use candidates::{ dedupe_candidates, CandidateGenerator, PlateRect, SensitivityParams };
use config::DetectorConfig;
use enhance::{ enhancement_ladder, Stage };
use error::PlateError;
use ocr::{ OcrEngine, Recognition };

pub mod candidates;
pub mod cascade;
pub mod config;
pub mod enhance;
pub mod error;
pub mod ocr;
pub mod utils;

pub const NO_PLATES: &str = "no plates detected";

/// Recognition of one ladder stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageResult {
    pub stage: Stage,
    pub recognition: Recognition,
}

/// Final reading for one accepted candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateReading {
    /// 1-based, in candidate order.
    pub index: usize,
    pub rect: PlateRect,
    pub best_stage: Stage,
    pub recognition: Recognition,
    pub stages: Vec<StageResult>,
}

impl PlateReading {
    pub fn summary_line(&self) -> String {
        format!("Matrícula {}: {}", self.index, self.recognition)
    }
}

/// What one detection run hands back to its caller.
#[derive(Debug, Clone)]
pub struct DetectionSummary {
    pub frame: Option<RgbImage>,
    pub lines: Vec<String>,
    pub success: bool,
    pub plates: Vec<PlateReading>,
}

impl DetectionSummary {

    fn failed(e: &PlateError) -> Self {
        Self { frame: None, lines: vec![format!("Error: {}", e)], success: false, plates: Vec::new() }
    }

    /// `(annotated frame, result lines, success)`.
    pub fn into_parts(self) -> (Option<RgbImage>, Vec<String>, bool) {
        (self.frame, self.lines, self.success)
    }
}

/// Pick the stage with the highest displayed confidence.
///
/// The Original stage is the starting point with confidence 0, and a later
/// stage only replaces the current best when strictly more confident.
pub fn arbitrate(stages: &[StageResult]) -> (Stage, Recognition) {
    let mut best_stage = Stage::Original;
    let mut best = stages
        .iter()
        .find(|s| s.stage == Stage::Original)
        .map_or(Recognition::NoText, |s| s.recognition.clone());
    let mut best_confidence = 0.0f32;

    for result in stages {
        if let Some(confidence) = result.recognition.confidence() {
            let confidence = utils::displayed_confidence(confidence);
            if confidence > best_confidence {
                best_confidence = confidence;
                best = result.recognition.clone();
                best_stage = result.stage;
            }
        }
    }
    (best_stage, best)
}

pub struct PlateDetector {
    config: DetectorConfig,
    engine: Arc<OcrEngine>,
}

impl PlateDetector {

    /// Detector reading text with the process-wide OCR engine.
    pub fn new(config: DetectorConfig) -> Self {
        Self::with_engine(config, OcrEngine::shared())
    }

    pub fn with_engine(config: DetectorConfig, engine: Arc<OcrEngine>) -> Self {
        PlateDetector { config, engine }
    }

    /// Find and read every plate in the image at `image_path`.
    ///
    /// Never fails outright: faults end up as the single line of an
    /// unsuccessful summary.
    pub fn detect(&self, image_path: impl AsRef<Path>, sensitivity: f64) -> DetectionSummary {
        let image_path = image_path.as_ref();
        match self.try_detect(image_path, sensitivity) {
            Ok(summary) => summary,
            Err(e) => {
                warn!("detection on {} failed: {}", image_path.display(), e);
                DetectionSummary::failed(&e)
            }
        }
    }

    fn try_detect(&self, image_path: &Path, sensitivity: f64) -> Result<DetectionSummary, PlateError> {
        let params = SensitivityParams::from_sensitivity(sensitivity);
        info!(
            "sensitivity {:.2}: scale step {:.2}, min neighbors {}, min size {}x{}, min area {}",
            params.sensitivity, params.scale_step, params.min_neighbors,
            params.min_width, params.min_height, params.min_area
        );

        let frame = load_frame(image_path)?;
        let frame = fit_frame(frame, self.config.max_frame).to_rgb8();
        let gray = DynamicImage::ImageRgb8(frame.clone()).to_luma8();

        let generator = CandidateGenerator::load(&self.config.cascade_paths)?;
        debug!("{} of {} detector models loaded", generator.detector_count(), self.config.cascade_paths.len());
        let candidates = dedupe_candidates(generator.generate(&gray, &params));
        if candidates.is_empty() {
            info!("no plates detected in {}", image_path.display());
            return Ok(DetectionSummary {
                frame: Some(frame),
                lines: vec![NO_PLATES.to_string()],
                success: true,
                plates: Vec::new(),
            });
        }

        let font = self.load_font();
        let mut annotated = frame;
        let mut plates = Vec::with_capacity(candidates.len());
        for (i, candidate) in candidates.iter().enumerate() {
            debug!("plate #{} proposed by detector {}", i + 1, candidate.source);
            let reading = self.read_plate(&gray, candidate.rect, i + 1);
            utils::draw_plate_box(&mut annotated, &candidate.rect, reading.index, font.as_ref());
            plates.push(reading);
        }
        info!("detection finished, {} plate regions", plates.len());

        Ok(DetectionSummary {
            frame: Some(annotated),
            lines: plates.iter().map(PlateReading::summary_line).collect(),
            success: true,
            plates,
        })
    }

    /// Crop, enhance, recognise and arbitrate one candidate.
    pub fn read_plate(&self, gray: &GrayImage, rect: PlateRect, index: usize) -> PlateReading {
        debug!("plate #{} at {},{} {}x{}", index, rect.x, rect.y, rect.width, rect.height);
        let region = match utils::crop_region(gray, &rect) {
            Ok(region) => region,
            Err(e) => {
                warn!("plate #{}: {}", index, e);
                return PlateReading {
                    index,
                    rect,
                    best_stage: Stage::Original,
                    recognition: Recognition::Failed(format!("Error: {}", e)),
                    stages: Vec::new(),
                };
            }
        };

        let stages = self.recognize_stages(&region);
        let (best_stage, recognition) = arbitrate(&stages);
        debug!("plate #{} final: {} - {}", index, best_stage.name(), recognition);
        PlateReading { index, rect, best_stage, recognition, stages }
    }

    /// One recognition per produced ladder stage, in ladder order.
    pub fn recognize_stages(&self, region: &GrayImage) -> Vec<StageResult> {
        enhancement_ladder(region).into_iter().filter_map(|step| match step.outcome.image() {
            Some(img) => {
                let recognition = self.engine.recognize(img);
                debug!("  {}: {}", step.stage.name(), recognition);
                Some(StageResult { stage: step.stage, recognition })
            }
            None => {
                debug!("  {}: skipped", step.stage.name());
                None
            }
        }).collect()
    }

    fn load_font(&self) -> Option<Font<'static>> {
        let path = self.config.label_font.as_ref()?;
        let font = fs::read(path).ok().and_then(Font::try_from_vec);
        if font.is_none() {
            debug!("label font {} unavailable, drawing boxes only", path.display());
        }
        font
    }
}

/// Decode by extension first, then by sniffing the raw bytes.
fn load_frame(path: &Path) -> Result<DynamicImage, PlateError> {
    let first = match image::open(path) {
        Ok(img) => return Ok(img),
        Err(e) => e,
    };
    debug!("decoding {} failed ({}), retrying from raw bytes", path.display(), first);
    let bytes = fs::read(path).map_err(|_| PlateError::ImageLoad {
        path: path.to_path_buf(),
        source: Some(first),
    })?;
    image::load_from_memory(&bytes).map_err(|e| PlateError::ImageLoad {
        path: path.to_path_buf(),
        source: Some(e),
    })
}

/// Downscale, keeping the aspect ratio, so the frame fits inside `max`.
fn fit_frame(frame: DynamicImage, max: (u32, u32)) -> DynamicImage {
    let (width, height) = frame.dimensions();
    if width <= max.0 && height <= max.1 {
        return frame;
    }
    let scale = (max.0 as f64 / width as f64).min(max.1 as f64 / height as f64);
    let new_width = ((width as f64 * scale) as u32).max(1);
    let new_height = ((height as f64 * scale) as u32).max(1);
    debug!("resizing {}x{} frame to {}x{}", width, height, new_width, new_height);
    frame.resize_exact(new_width, new_height, FilterType::Triangle)
}
