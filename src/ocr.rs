//! Text recognition for cropped plate regions.
//!
//! [`OcrEngine`] owns the recognizer and builds it on first use. The engine
//! used by default is a shared, process-wide instance ([`OcrEngine::shared`]);
//! its initialisation runs exactly once even when several threads race into
//! it, and a failed initialisation is remembered rather than retried.

#[cfg(feature = "tensorflow")]
use tensorflow::{ Graph, ImportGraphDefOptions, Session, SessionOptions, SessionRunArgs, Tensor };
#[cfg(feature = "tensorflow")]
use image::imageops::{ self, FilterType };

use image::GrayImage;
use log::{ info, warn };

use std::fmt;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, OnceLock };

use crate::config::DEFAULT_OCR_MODEL;
use crate::error::PlateError;
use crate::utils;

/// Characters the plate recognizer can emit; the blank class follows them.
pub const ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const NO_TEXT: &str = "no text detected";

/// One text line found by a recognizer, box in region coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub bbox: [u32; 4],
    pub text: String,
    pub confidence: f32,
}

pub trait TextRecognizer: Send + Sync {
    fn read_text(&self, region: &GrayImage) -> Result<Vec<RawDetection>, PlateError>;
}

/// Outcome of one recognition attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Recognition {
    Text { text: String, confidence: f32 },
    NoText,
    Failed(String),
}

impl Recognition {
    pub fn confidence(&self) -> Option<f32> {
        match self {
            Recognition::Text { confidence, .. } => Some(*confidence),
            _ => None,
        }
    }
}

impl fmt::Display for Recognition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recognition::Text { text, confidence } => write!(f, "{} (conf: {:.2})", text, confidence),
            Recognition::NoText => f.write_str(NO_TEXT),
            Recognition::Failed(msg) => f.write_str(msg),
        }
    }
}

/// Keep letters, digits and whitespace, then trim.
pub fn clean_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Highest-confidence detection with non-empty cleaned text; ties keep the first.
pub fn best_detection(detections: &[RawDetection]) -> Recognition {
    let mut best_text = String::new();
    let mut best_confidence = 0.0f32;
    for detection in detections {
        let text = clean_text(&detection.text);
        if !text.is_empty() && detection.confidence > best_confidence {
            best_text = text;
            best_confidence = detection.confidence;
        }
    }
    if best_text.is_empty() {
        Recognition::NoText
    } else {
        Recognition::Text { text: best_text, confidence: best_confidence }
    }
}

/// Greedy CTC decode over `[steps, classes]` probabilities, blank last.
///
/// Confidence is the mean probability of the emitted characters.
pub fn ctc_greedy_decode(probs: &[f32], shape: [usize; 2]) -> (String, f32) {
    let [steps, classes] = shape;
    if steps == 0 || classes == 0 || probs.len() < steps * classes {
        return (String::new(), 0.0);
    }
    let argmax = utils::argmax_in_axis0(&probs[..steps * classes], &shape);
    let (text, total) = argmax.iter().enumerate().filter(|(i, v)| {
        **v < ALPHABET.len() && (*i == 0 || **v != argmax[i - 1])
    }).fold((String::new(), 0.0f32), |(mut text, total), (i, v)| {
        text.push(ALPHABET[*v] as char);
        (text, total + probs[i * classes + v])
    });
    if text.is_empty() {
        return (text, 0.0);
    }
    let confidence = total / text.len() as f32;
    (text, confidence)
}

type Initializer = Box<dyn Fn() -> Result<Box<dyn TextRecognizer>, PlateError> + Send + Sync>;

pub struct OcrEngine {
    init: Initializer,
    state: OnceLock<Result<Box<dyn TextRecognizer>, String>>,
}

impl OcrEngine {

    /// Engine whose recognizer is built by `init` on first use.
    pub fn new<F>(init: F) -> Self
    where
        F: Fn() -> Result<Box<dyn TextRecognizer>, PlateError> + Send + Sync + 'static,
    {
        Self { init: Box::new(init), state: OnceLock::new() }
    }

    /// Engine around an already built recognizer.
    pub fn with_recognizer(recognizer: impl TextRecognizer + 'static) -> Self {
        let engine = Self::new(|| Err(PlateError::EngineUnavailable("already initialised".into())));
        let _ = engine.state.set(Ok(Box::new(recognizer)));
        engine
    }

    /// Engine backed by the frozen plate recognition graph at `model`.
    pub fn from_model(model: impl AsRef<Path>) -> Self {
        let model: PathBuf = model.as_ref().to_path_buf();
        Self::new(move || load_recognizer(&model))
    }

    /// The process-wide engine on the default model.
    pub fn shared() -> Arc<OcrEngine> {
        Self::shared_with_model(DEFAULT_OCR_MODEL)
    }

    /// The process-wide engine; the model of the first caller wins.
    pub fn shared_with_model(model: impl AsRef<Path>) -> Arc<OcrEngine> {
        static SHARED: OnceLock<Arc<OcrEngine>> = OnceLock::new();
        SHARED.get_or_init(|| Arc::new(OcrEngine::from_model(model))).clone()
    }

    fn recognizer(&self) -> Result<&dyn TextRecognizer, PlateError> {
        let state = self.state.get_or_init(|| {
            info!("initializing OCR engine");
            match (self.init)() {
                Ok(recognizer) => {
                    info!("OCR engine ready");
                    Ok(recognizer)
                }
                Err(e) => {
                    warn!("OCR engine unavailable: {}", e);
                    Err(e.to_string())
                }
            }
        });
        match state {
            Ok(recognizer) => Ok(recognizer.as_ref()),
            Err(msg) => Err(PlateError::EngineUnavailable(msg.clone())),
        }
    }

    /// Never fails: faults come back as [`Recognition::Failed`].
    pub fn recognize(&self, region: &GrayImage) -> Recognition {
        let recognizer = match self.recognizer() {
            Ok(recognizer) => recognizer,
            Err(e) => return Recognition::Failed(e.to_string()),
        };
        match recognizer.read_text(region) {
            Ok(detections) => best_detection(&detections),
            Err(e @ PlateError::Recognition(_)) => Recognition::Failed(e.to_string()),
            Err(e) => Recognition::Failed(PlateError::Recognition(e.to_string()).to_string()),
        }
    }
}

#[cfg(feature = "tensorflow")]
fn load_recognizer(model: &Path) -> Result<Box<dyn TextRecognizer>, PlateError> {
    Ok(Box::new(TfRecognizer::new(model)?))
}

#[cfg(not(feature = "tensorflow"))]
fn load_recognizer(_model: &Path) -> Result<Box<dyn TextRecognizer>, PlateError> {
    Err(PlateError::EngineUnavailable("built without tensorflow support".into()))
}

#[cfg(feature = "tensorflow")]
const INPUT_NAME: &str = "input_1";
#[cfg(feature = "tensorflow")]
const OUTPUT_NAME: &str = "dense/Softmax";
#[cfg(feature = "tensorflow")]
const INPUT_WIDTH: u32 = 128;
#[cfg(feature = "tensorflow")]
const INPUT_HEIGHT: u32 = 32;

#[cfg(feature = "tensorflow")]
struct TfModel {
    graph: Graph,
    session: Session,
}

/// CPU-only CRNN plate reader over a frozen tensorflow graph.
#[cfg(feature = "tensorflow")]
pub struct TfRecognizer {
    model: std::sync::Mutex<TfModel>,
}

#[cfg(feature = "tensorflow")]
impl TfRecognizer {

    pub fn new(pb_file: impl AsRef<Path>) -> Result<Self, PlateError> {
        let pb = std::fs::read(pb_file)?;
        // import graph def
        let mut graph = Graph::new();
        graph.import_graph_def(&pb, &ImportGraphDefOptions::new())?;
        // new session
        let session = Session::new(&SessionOptions::new(), &graph)?;
        Ok(Self { model: std::sync::Mutex::new(TfModel { graph, session }) })
    }

    fn run(&self, input: &Tensor<f32>) -> Result<Tensor<f32>, PlateError> {
        let model = self.model.lock().map_err(|_| PlateError::Recognition("recognizer lock poisoned".into()))?;
        let mut args = SessionRunArgs::new();
        args.add_feed(&model.graph.operation_by_name_required(INPUT_NAME)?, 0, input);
        let res = args.request_fetch(&model.graph.operation_by_name_required(OUTPUT_NAME)?, 0);
        model.session.run(&mut args)?;
        let res: Tensor<f32> = args.fetch(res)?;
        Ok(res)
    }
}

#[cfg(feature = "tensorflow")]
impl TextRecognizer for TfRecognizer {
    fn read_text(&self, region: &GrayImage) -> Result<Vec<RawDetection>, PlateError> {
        let (width, height) = region.dimensions();
        if width == 0 || height == 0 {
            return Ok(Vec::new());
        }
        let img = imageops::resize(region, INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle);
        let data: Vec<f32> = img.pixels().map(|p| p.0[0] as f32 / 255.0).collect();
        let tensor = Tensor::new(&[1, INPUT_HEIGHT as u64, INPUT_WIDTH as u64, 1]).with_values(&data)?;

        let out = self.run(&tensor)?;
        let classes = out.dims().last().copied().unwrap_or(0) as usize;
        if classes == 0 {
            return Err(PlateError::Recognition("recognizer produced an empty tensor".into()));
        }
        let (text, confidence) = ctc_greedy_decode(&out, [out.len() / classes, classes]);
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![RawDetection { bbox: [0, 0, width, height], text, confidence }])
    }
}
