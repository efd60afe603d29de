use image::GrayImage;
use log::{ debug, info, warn };

use std::path::PathBuf;

use crate::cascade::{ Cascade, ScanParams };
use crate::config::DEFAULT_SENSITIVITY;
use crate::error::PlateError;

/// Largest plate window searched for, regardless of sensitivity.
pub const MAX_CANDIDATE_SIZE: (u32, u32) = (400, 150);
pub const MIN_ASPECT_RATIO: f32 = 2.0;
pub const MAX_ASPECT_RATIO: f32 = 6.0;
/// Top-left corners closer than this on both axes are the same plate.
pub const DUPLICATE_DX: i32 = 50;
pub const DUPLICATE_DY: i32 = 30;

/// Axis-aligned rectangle in working-frame coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlateRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl PlateRect {

    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return f32::INFINITY;
        }
        self.width as f32 / self.height as f32
    }
}

/// A proposal that passed the geometric filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub rect: PlateRect,
    pub area: u64,
    /// Index of the detector that proposed it.
    pub source: usize,
}

/// Detector strictness derived from one sensitivity knob.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityParams {
    pub sensitivity: f64,
    pub scale_step: f64,
    pub min_neighbors: i32,
    pub min_width: u32,
    pub min_height: u32,
    pub min_area: u64,
}

impl SensitivityParams {

    /// 0 is the most permissive, 1 the most restrictive.
    pub fn from_sensitivity(sensitivity: f64) -> Self {
        let s = if sensitivity.is_nan() { DEFAULT_SENSITIVITY } else { sensitivity.clamp(0.0, 1.0) };
        Self {
            sensitivity: s,
            scale_step: 1.03 + s * 0.07,
            min_neighbors: (2.0 + s * 3.0) as i32,
            min_width: (20.0 + s * 60.0) as u32,
            min_height: (5.0 + s * 15.0) as u32,
            min_area: (100.0 + s * 1500.0) as u64,
        }
    }

    pub fn scan_params(&self) -> ScanParams {
        ScanParams {
            scale_step: self.scale_step,
            min_neighbors: self.min_neighbors,
            min_size: (self.min_width, self.min_height),
            max_size: MAX_CANDIDATE_SIZE,
        }
    }

    /// Plate-shaped and large enough.
    pub fn accepts(&self, rect: &PlateRect) -> bool {
        let ratio = rect.aspect_ratio();
        (MIN_ASPECT_RATIO..=MAX_ASPECT_RATIO).contains(&ratio)
            && rect.area() >= self.min_area
            && rect.width >= self.min_width
            && rect.height >= self.min_height
    }
}

/// Every shape detector that could be loaded.
pub struct CandidateGenerator {
    detectors: Vec<(PathBuf, Cascade)>,
}

impl CandidateGenerator {

    /// Loads what it can; unreadable models are skipped, none at all is an error.
    pub fn load(paths: &[PathBuf]) -> Result<Self, PlateError> {
        let mut detectors = Vec::new();
        for path in paths {
            if !path.exists() {
                debug!("detector model {} not present", path.display());
                continue;
            }
            match Cascade::from_file(path) {
                Ok(cascade) => {
                    debug!(
                        "loaded detector {} ({}x{} window, {} stages)",
                        path.display(), cascade.window().0, cascade.window().1, cascade.stage_count()
                    );
                    detectors.push((path.clone(), cascade));
                }
                Err(e) => warn!("skipping detector {}: {}", path.display(), e),
            }
        }
        Self::from_cascades(detectors)
    }

    pub fn from_cascades(detectors: Vec<(PathBuf, Cascade)>) -> Result<Self, PlateError> {
        if detectors.is_empty() {
            return Err(PlateError::ModelLoad);
        }
        Ok(Self { detectors })
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Filtered proposals from every detector, not yet deduplicated.
    pub fn generate(&self, gray: &GrayImage, params: &SensitivityParams) -> Vec<Candidate> {
        let scan = params.scan_params();
        let mut candidates = Vec::new();
        for (source, (path, cascade)) in self.detectors.iter().enumerate() {
            let raw = cascade.detect_multi_scale(gray, &scan);
            let before = candidates.len();
            candidates.extend(filter_candidates(&raw, params, source));
            debug!(
                "detector {}: {} raw, {} plate-shaped",
                path.display(), raw.len(), candidates.len() - before
            );
        }
        info!("{} candidate regions from {} detectors", candidates.len(), self.detector_count());
        candidates
    }
}

pub fn filter_candidates(raw: &[PlateRect], params: &SensitivityParams, source: usize) -> Vec<Candidate> {
    raw.iter()
        .filter(|rect| params.accepts(rect))
        .map(|rect| Candidate { rect: *rect, area: rect.area(), source })
        .collect()
}

fn near_duplicate(a: &PlateRect, b: &PlateRect) -> bool {
    (a.x - b.x).abs() < DUPLICATE_DX && (a.y - b.y).abs() < DUPLICATE_DY
}

/// Largest first; a candidate whose top-left corner is near an accepted one is dropped.
pub fn dedupe_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(|a, b| b.area.cmp(&a.area));
    let mut accepted: Vec<Candidate> = Vec::new();
    for candidate in candidates {
        if !accepted.iter().any(|a| near_duplicate(&candidate.rect, &a.rect)) {
            accepted.push(candidate);
        }
    }
    accepted
}

#[cfg(test)]
mod test {
    use super::*;

    fn candidate(x: i32, y: i32, width: u32, height: u32) -> Candidate {
        let rect = PlateRect::new(x, y, width, height);
        Candidate { rect, area: rect.area(), source: 0 }
    }

    #[test]
    fn params_at_the_ends_of_the_range() {
        let low = SensitivityParams::from_sensitivity(0.0);
        assert!((low.scale_step - 1.03).abs() < 1e-9);
        assert_eq!((low.min_neighbors, low.min_width, low.min_height, low.min_area), (2, 20, 5, 100));

        let high = SensitivityParams::from_sensitivity(1.0);
        assert!((high.scale_step - 1.10).abs() < 1e-9);
        assert_eq!((high.min_neighbors, high.min_width, high.min_height, high.min_area), (5, 80, 20, 1600));

        let mid = SensitivityParams::from_sensitivity(0.5);
        assert_eq!((mid.min_neighbors, mid.min_width, mid.min_height, mid.min_area), (3, 50, 12, 850));
    }

    #[test]
    fn slider_steps_truncate_like_double_math() {
        let seventy = SensitivityParams::from_sensitivity(0.7);
        assert_eq!((seventy.min_width, seventy.min_height, seventy.min_area), (62, 15, 1150));
        let one = SensitivityParams::from_sensitivity(0.01);
        assert_eq!(one.min_area, 115);

        for i in 0..=100 {
            let s = i as f64 / 100.0;
            let p = SensitivityParams::from_sensitivity(s);
            assert_eq!(p.min_neighbors, (2.0 + s * 3.0) as i32, "s={}", s);
            assert_eq!(p.min_width, (20.0 + s * 60.0) as u32, "s={}", s);
            assert_eq!(p.min_height, (5.0 + s * 15.0) as u32, "s={}", s);
            assert_eq!(p.min_area, (100.0 + s * 1500.0) as u64, "s={}", s);
        }
    }

    #[test]
    fn params_are_monotonic() {
        let mut prev = SensitivityParams::from_sensitivity(0.0);
        for i in 1..=100 {
            let next = SensitivityParams::from_sensitivity(i as f64 / 100.0);
            assert!(next.scale_step >= prev.scale_step);
            assert!(next.min_neighbors >= prev.min_neighbors);
            assert!(next.min_width >= prev.min_width);
            assert!(next.min_height >= prev.min_height);
            assert!(next.min_area >= prev.min_area);
            prev = next;
        }
    }

    #[test]
    fn out_of_range_sensitivity_is_clamped() {
        assert_eq!(SensitivityParams::from_sensitivity(-3.0), SensitivityParams::from_sensitivity(0.0));
        assert_eq!(SensitivityParams::from_sensitivity(7.0), SensitivityParams::from_sensitivity(1.0));
        assert_eq!(SensitivityParams::from_sensitivity(f64::NAN), SensitivityParams::from_sensitivity(0.5));
    }

    #[test]
    fn plate_shaped_rect_passes_filter() {
        let rect = PlateRect::new(100, 100, 160, 40);
        assert_eq!(rect.aspect_ratio(), 4.0);
        assert_eq!(rect.area(), 6400);
        for s in [0.0, 0.5, 1.0] {
            assert!(SensitivityParams::from_sensitivity(s).accepts(&rect));
        }
        let narrow = PlateRect::new(0, 0, 60, 20);
        assert!(SensitivityParams::from_sensitivity(0.0).accepts(&narrow));
        assert!(!SensitivityParams::from_sensitivity(1.0).accepts(&narrow));
    }

    #[test]
    fn wrong_aspect_ratio_is_rejected() {
        let params = SensitivityParams::from_sensitivity(0.0);
        assert!(!params.accepts(&PlateRect::new(0, 0, 100, 100)));
        assert!(!params.accepts(&PlateRect::new(0, 0, 350, 50)));
        assert!(params.accepts(&PlateRect::new(0, 0, 300, 50)));
        assert!(params.accepts(&PlateRect::new(0, 0, 100, 50)));
    }

    #[test]
    fn close_corners_are_merged() {
        let out = dedupe_candidates(vec![candidate(120, 115, 150, 40), candidate(100, 100, 160, 40)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rect, PlateRect::new(100, 100, 160, 40));
    }

    #[test]
    fn dedupe_orders_by_area_and_keeps_distant_plates() {
        let input = vec![
            candidate(0, 0, 100, 30),
            candidate(400, 300, 200, 50),
            candidate(40, 20, 120, 30),
            candidate(0, 200, 90, 30),
        ];
        let out = dedupe_candidates(input);
        let rects: Vec<PlateRect> = out.iter().map(|c| c.rect).collect();
        assert_eq!(rects, vec![
            PlateRect::new(400, 300, 200, 50),
            PlateRect::new(40, 20, 120, 30),
            PlateRect::new(0, 200, 90, 30),
        ]);
    }

    #[test]
    fn dedupe_is_idempotent() {
        let input: Vec<Candidate> = (0..20)
            .map(|i| candidate((i * 37) % 300, (i * 23) % 120, 80 + (i as u32 % 5) * 10, 25))
            .collect();
        let once = dedupe_candidates(input);
        let twice = dedupe_candidates(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_models_are_a_model_load_error() {
        let paths = vec![PathBuf::from("does/not/exist.xml")];
        assert!(matches!(CandidateGenerator::load(&paths), Err(PlateError::ModelLoad)));
    }
}
