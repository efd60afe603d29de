use clap::{Arg, App};
use log::info;

use std::error::Error;
use std::path::PathBuf;
use std::process;

use plate_reader::config::{ DetectorConfig, DEFAULT_OCR_MODEL, DEFAULT_SENSITIVITY };
use plate_reader::ocr::OcrEngine;
use plate_reader::PlateDetector;


fn main() -> Result<(), Box<dyn Error>>{
    env_logger::init();

    let matches = App::new("plate-reader")
                    .version("0.1.0")
                    .author("kingrong")
                    .about("Finds licence plates in an image and reads their text")
                    .arg(Arg::with_name("INPUT")
                        .help("image file with license plates")
                        .required(true)
                        .index(1))
                    .arg(Arg::with_name("sensitivity")
                        .short("s")
                        .long("sensitivity")
                        .takes_value(true)
                        .help("detector strictness, 0 (permissive) to 1 (strict)"))
                    .arg(Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .help("where to save the annotated frame"))
                    .arg(Arg::with_name("models")
                        .long("models")
                        .takes_value(true)
                        .value_name("DIR")
                        .help("directory holding the cascade models"))
                    .arg(Arg::with_name("ocr-model")
                        .long("ocr-model")
                        .takes_value(true)
                        .value_name("PATH")
                        .help("frozen OCR graph"))
                    .arg(Arg::with_name("font")
                        .long("font")
                        .takes_value(true)
                        .value_name("PATH")
                        .help("ttf font for the plate labels"))
                    .get_matches();
    let file_name = matches.value_of("INPUT").ok_or("image is required")?;
    let sensitivity = match matches.value_of("sensitivity") {
        Some(s) => s.parse::<f64>().map_err(|e| format!("invalid sensitivity {:?}: {}", s, e))?,
        None => DEFAULT_SENSITIVITY,
    };

    let mut config = DetectorConfig::default();
    if let Some(dir) = matches.value_of("models") {
        config = config.with_model_dir(dir);
    }
    if let Some(font) = matches.value_of("font") {
        config = config.with_font(Some(PathBuf::from(font)));
    }
    let engine = OcrEngine::shared_with_model(matches.value_of("ocr-model").unwrap_or(DEFAULT_OCR_MODEL));

    let detector = PlateDetector::with_engine(config, engine);
    let (frame, lines, success) = detector.detect(file_name, sensitivity).into_parts();
    for line in &lines {
        println!("{}", line);
    }

    if let (Some(out), Some(frame)) = (matches.value_of("output"), frame) {
        frame.save(out)?;
        info!("annotated frame saved to {}", out);
    }

    if !success {
        process::exit(1);
    }
    Ok(())
}
