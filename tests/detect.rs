use image::{ GrayImage, Rgb, RgbImage };
use plate_reader::config::DetectorConfig;
use plate_reader::error::PlateError;
use plate_reader::ocr::{ OcrEngine, RawDetection, TextRecognizer };
use plate_reader::{ PlateDetector, NO_PLATES };

use std::error::Error;
use std::fs;
use std::path::{ Path, PathBuf };
use std::sync::Arc;

struct Constant;

impl TextRecognizer for Constant {
    fn read_text(&self, region: &GrayImage) -> Result<Vec<RawDetection>, PlateError> {
        Ok(vec![RawDetection {
            bbox: [0, 0, region.width(), region.height()],
            text: "TEST-123".to_string(),
            confidence: 0.9,
        }])
    }
}

fn cascade_xml(leaves: &str) -> String {
    format!(r#"<?xml version="1.0"?>
<opencv_storage>
<cascade>
  <stageType>BOOST</stageType>
  <featureType>HAAR</featureType>
  <height>10</height>
  <width>40</width>
  <featureParams><maxCatCount>0</maxCatCount></featureParams>
  <stages>
    <_>
      <stageThreshold>0.</stageThreshold>
      <weakClassifiers>
        <_>
          <internalNodes>0 -1 0 0.5</internalNodes>
          <leafValues>{}</leafValues></_></weakClassifiers></_></stages>
  <features>
    <_>
      <rects>
        <_>0 0 40 10 -1.</_>
        <_>0 0 20 10 2.</_></rects>
      <tilted>0</tilted></_></features></cascade>
</opencv_storage>
"#, leaves)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    Ok(path)
}

fn gray_frame(dir: &Path) -> Result<(PathBuf, RgbImage), Box<dyn Error>> {
    let frame = RgbImage::from_pixel(200, 60, Rgb([128, 128, 128]));
    let path = dir.join("car.png");
    frame.save(&path)?;
    Ok((path, frame))
}

fn detector(cascades: Vec<PathBuf>) -> PlateDetector {
    let config = DetectorConfig::default().with_cascades(cascades).with_font(None);
    PlateDetector::with_engine(config, Arc::new(OcrEngine::with_recognizer(Constant)))
}

#[test]
fn missing_image_fails_with_its_path() {
    let (frame, lines, success) = detector(vec![]).detect("nowhere/missing-car.jpg", 0.5).into_parts();
    assert!(frame.is_none());
    assert!(!success);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("nowhere/missing-car.jpg"), "{}", lines[0]);
}

#[test]
fn no_models_is_a_failure() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let (image, _) = gray_frame(dir.path())?;
    let det = detector(vec![dir.path().join("absent.xml")]);
    let (frame, lines, success) = det.detect(&image, 0.5).into_parts();
    assert!(frame.is_none());
    assert!(!success);
    assert_eq!(lines, vec!["Error: no detection models found".to_string()]);
    Ok(())
}

const EMPTY_LEGACY_TREE: &str = r#"<?xml version="1.0"?>
<opencv_storage>
<plate type_id="opencv-haar-classifier">
  <size>40 10</size>
  <stages>
    <_>
      <trees>
        <_>
          <!-- tree 0 --></_></trees>
      <stage_threshold>0.</stage_threshold>
      <parent>-1</parent>
      <next>-1</next></_></stages></plate>
</opencv_storage>
"#;

#[test]
fn only_malformed_models_is_a_failure() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let (image, _) = gray_frame(dir.path())?;
    let models = vec![
        write(dir.path(), "truncated.xml", "<opencv_storage><cascade>")?,
        write(dir.path(), "garbage.xml", "not a cascade at all")?,
        write(dir.path(), "empty_tree.xml", EMPTY_LEGACY_TREE)?,
        write(dir.path(), "oversized.xml", &cascade_xml("1. 1.").replace("<_>0 0 40 10 -1.</_>", "<_>0 0 400 100 -1.</_>"))?,
    ];
    let (frame, lines, success) = detector(models).detect(&image, 0.5).into_parts();
    assert!(frame.is_none());
    assert!(!success);
    assert_eq!(lines, vec!["Error: no detection models found".to_string()]);
    Ok(())
}

#[test]
fn no_candidates_returns_the_frame_untouched() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let (image, original) = gray_frame(dir.path())?;
    let never = write(dir.path(), "never.xml", &cascade_xml("-1. -1."))?;
    let (frame, lines, success) = detector(vec![never]).detect(&image, 1.0).into_parts();
    assert!(success);
    assert_eq!(lines, vec![NO_PLATES.to_string()]);
    assert_eq!(frame, Some(original));
    Ok(())
}

#[test]
fn plates_are_read_numbered_and_drawn() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let (image, _) = gray_frame(dir.path())?;
    let corrupt = write(dir.path(), "corrupt.xml", "<opencv_storage><cascade>")?;
    let always = write(dir.path(), "always.xml", &cascade_xml("1. 1."))?;

    let summary = detector(vec![corrupt, always]).detect(&image, 1.0);
    assert!(summary.success);
    assert!(!summary.plates.is_empty());
    for (i, line) in summary.lines.iter().enumerate() {
        assert_eq!(line, &format!("Matrícula {}: TEST123 (conf: 0.90)", i + 1));
    }

    let areas: Vec<u64> = summary.plates.iter().map(|p| p.rect.area()).collect();
    assert!(areas.windows(2).all(|w| w[0] >= w[1]), "{:?}", areas);
    for plate in &summary.plates {
        let ratio = plate.rect.aspect_ratio();
        assert!((2.0..=6.0).contains(&ratio));
        assert!(plate.rect.width >= 80 && plate.rect.height >= 20);
    }

    let frame = summary.frame.ok_or("missing frame")?;
    assert!(frame.pixels().any(|p| *p == Rgb([0, 255, 0])));
    Ok(())
}
