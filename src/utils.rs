use image::{ imageops, GrayImage, Rgb, RgbImage };
use imageproc::{ drawing, rect::Rect };
use rusttype::{ Font, Scale };

use crate::candidates::PlateRect;
use crate::error::PlateError;

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LABEL_SCALE: f32 = 22.0;

// 按行取最大值下标, tensor 展开是先行再列
pub fn argmax_in_axis0(input: &[f32], shape: &[usize]) -> Vec<usize> {
    input.chunks(shape[1]).map(|v: &[f32]| {
        let mut max = v[0];
        let mut index = 0;
        v.iter().enumerate().for_each(|(i, v_in_v)| {
            if *v_in_v > max {
                max = *v_in_v;
                index = i;
            }
        });
        index
    }).collect()
}

/// Round to the two decimals a confidence is displayed with.
pub fn displayed_confidence(confidence: f32) -> f32 {
    (confidence * 100.0).round() / 100.0
}

/// Crop `rect` out of `gray`, clipped to the frame.
pub fn crop_region(gray: &GrayImage, rect: &PlateRect) -> Result<GrayImage, PlateError> {
    let (frame_width, frame_height) = gray.dimensions();
    let geometry = || PlateError::Geometry {
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        frame_width,
        frame_height,
    };

    let x0 = rect.x.max(0) as u32;
    let y0 = rect.y.max(0) as u32;
    let x1 = (rect.x as i64 + rect.width as i64).min(frame_width as i64);
    let y1 = (rect.y as i64 + rect.height as i64).min(frame_height as i64);
    if x1 <= x0 as i64 || y1 <= y0 as i64 {
        return Err(geometry());
    }
    let (width, height) = (x1 as u32 - x0, y1 as u32 - y0);
    Ok(imageops::crop_imm(gray, x0, y0, width, height).to_image())
}

/// 2px green box with an optional `#k` label above it.
pub fn draw_plate_box(canvas: &mut RgbImage, rect: &PlateRect, index: usize, font: Option<&Font<'_>>) {
    let outer = Rect::at(rect.x, rect.y).of_size(rect.width + 1, rect.height + 1);
    drawing::draw_hollow_rect_mut(canvas, outer, BOX_COLOR);
    if rect.width > 2 && rect.height > 2 {
        let inner = Rect::at(rect.x + 1, rect.y + 1).of_size(rect.width - 1, rect.height - 1);
        drawing::draw_hollow_rect_mut(canvas, inner, BOX_COLOR);
    }

    if let Some(font) = font {
        let text = format!("#{}", index);
        let y = (rect.y - 10 - LABEL_SCALE as i32).max(0);
        drawing::draw_text_mut(canvas, BOX_COLOR, rect.x, y, Scale::uniform(LABEL_SCALE), font, &text);
    }
}
