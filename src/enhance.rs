//! The four-step enhancement ladder applied to every candidate region.

use image::{ imageops::{ self, FilterType }, GrayImage, ImageBuffer, Luma };
use imageproc::filter;

/// Regions narrower than this get an upscaled stage.
pub const MIN_OCR_WIDTH: u32 = 150;
pub const CLAHE_CLIP_LIMIT: f32 = 2.0;
pub const CLAHE_TILES: (u32, u32) = (8, 8);
pub const THRESHOLD_BLOCK: u32 = 11;
pub const THRESHOLD_OFFSET: f64 = 2.0;

const HIST_SIZE: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Original,
    Resized,
    Contrast,
    Binarized,
}

impl Stage {

    pub const ALL: [Stage; 4] = [Stage::Original, Stage::Resized, Stage::Contrast, Stage::Binarized];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Original => "Original",
            Stage::Resized => "Resized",
            Stage::Contrast => "CLAHE",
            Stage::Binarized => "Threshold",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome {
    Produced(GrayImage),
    Skipped,
}

impl StageOutcome {
    pub fn image(&self) -> Option<&GrayImage> {
        match self {
            StageOutcome::Produced(img) => Some(img),
            StageOutcome::Skipped => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LadderStep {
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// Original, upscaled (only for narrow regions), CLAHE, then binarized, in that order.
///
/// Contrast works on the upscaled image when there is one; binarization
/// always works on the contrast output.
pub fn enhancement_ladder(region: &GrayImage) -> Vec<LadderStep> {
    let resized = upscale_narrow(region);
    let contrast = {
        let base = resized.as_ref().unwrap_or(region);
        clahe(base, CLAHE_CLIP_LIMIT, CLAHE_TILES)
    };
    let binarized = adaptive_threshold_gaussian(&contrast, THRESHOLD_BLOCK, THRESHOLD_OFFSET);

    vec![
        LadderStep { stage: Stage::Original, outcome: StageOutcome::Produced(region.clone()) },
        LadderStep {
            stage: Stage::Resized,
            outcome: resized.map_or(StageOutcome::Skipped, StageOutcome::Produced),
        },
        LadderStep { stage: Stage::Contrast, outcome: StageOutcome::Produced(contrast) },
        LadderStep { stage: Stage::Binarized, outcome: StageOutcome::Produced(binarized) },
    ]
}

/// Cubic upscale to `MIN_OCR_WIDTH`, or `None` when the region is wide enough.
pub fn upscale_narrow(region: &GrayImage) -> Option<GrayImage> {
    let (width, height) = region.dimensions();
    if width >= MIN_OCR_WIDTH || width == 0 {
        return None;
    }
    let factor = MIN_OCR_WIDTH as f64 / width as f64;
    let new_height = ((height as f64 * factor) as u32).max(1);
    Some(imageops::resize(region, MIN_OCR_WIDTH, new_height, FilterType::CatmullRom))
}

fn reflect_101(i: i64, n: i64) -> i64 {
    if n == 1 {
        return 0;
    }
    let mut i = i;
    loop {
        if i < 0 {
            i = -i;
        } else if i >= n {
            i = 2 * (n - 1) - i;
        } else {
            return i;
        }
    }
}

/// Contrast limited adaptive histogram equalization.
pub fn clahe(img: &GrayImage, clip_limit: f32, tiles: (u32, u32)) -> GrayImage {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return img.clone();
    }
    let (tiles_x, tiles_y) = (tiles.0.max(1) as usize, tiles.1.max(1) as usize);
    let (w, h) = (width as usize, height as usize);

    // pad by reflection up to a whole number of tiles
    let (ext_w, ext_h) = if w % tiles_x == 0 && h % tiles_y == 0 {
        (w, h)
    } else {
        (w + tiles_x - w % tiles_x, h + tiles_y - h % tiles_y)
    };
    let (tile_w, tile_h) = (ext_w / tiles_x, ext_h / tiles_y);
    let tile_total = tile_w * tile_h;
    let lut_scale = (HIST_SIZE - 1) as f32 / tile_total as f32;
    let clip = if clip_limit > 0.0 {
        ((clip_limit * tile_total as f32 / HIST_SIZE as f32) as usize).max(1)
    } else {
        0
    };

    let sample = |x: usize, y: usize| -> u8 {
        let sx = reflect_101(x as i64, w as i64) as u32;
        let sy = reflect_101(y as i64, h as i64) as u32;
        img.get_pixel(sx, sy).0[0]
    };

    let mut luts = vec![0u8; tiles_x * tiles_y * HIST_SIZE];
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let mut hist = [0usize; HIST_SIZE];
            for y in ty * tile_h..(ty + 1) * tile_h {
                for x in tx * tile_w..(tx + 1) * tile_w {
                    hist[sample(x, y) as usize] += 1;
                }
            }

            if clip > 0 {
                let mut clipped = 0;
                for bin in hist.iter_mut() {
                    if *bin > clip {
                        clipped += *bin - clip;
                        *bin = clip;
                    }
                }
                let batch = clipped / HIST_SIZE;
                let mut residual = clipped - batch * HIST_SIZE;
                hist.iter_mut().for_each(|bin| *bin += batch);
                if residual > 0 {
                    let step = (HIST_SIZE / residual).max(1);
                    let mut i = 0;
                    while i < HIST_SIZE && residual > 0 {
                        hist[i] += 1;
                        i += step;
                        residual -= 1;
                    }
                }
            }

            let lut = &mut luts[(ty * tiles_x + tx) * HIST_SIZE..][..HIST_SIZE];
            let mut sum = 0;
            for (i, bin) in hist.iter().enumerate() {
                sum += bin;
                lut[i] = (sum as f32 * lut_scale).round().min(255.0) as u8;
            }
        }
    }

    // bilinear blend of the four surrounding tile mappings
    let neighbours = |pos: usize, tile: usize, count: usize| -> (usize, usize, f32) {
        let f = pos as f32 / tile as f32 - 0.5;
        let t1 = f.floor() as i64;
        let alpha = f - t1 as f32;
        let lo = t1.max(0) as usize;
        let hi = ((t1 + 1) as usize).min(count - 1);
        (lo, hi, alpha)
    };
    let columns: Vec<(usize, usize, f32)> = (0..w).map(|x| neighbours(x, tile_w, tiles_x)).collect();

    let mut out = GrayImage::new(width, height);
    for y in 0..h {
        let (ty1, ty2, ya) = neighbours(y, tile_h, tiles_y);
        for (x, &(tx1, tx2, xa)) in columns.iter().enumerate() {
            let v = img.get_pixel(x as u32, y as u32).0[0] as usize;
            let at = |ty: usize, tx: usize| luts[(ty * tiles_x + tx) * HIST_SIZE + v] as f32;
            let top = at(ty1, tx1) * (1.0 - xa) + at(ty1, tx2) * xa;
            let bottom = at(ty2, tx1) * (1.0 - xa) + at(ty2, tx2) * xa;
            let res = top * (1.0 - ya) + bottom * ya;
            out.put_pixel(x as u32, y as u32, Luma([res.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f64 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size as f64 - 1.0) / 2.0;
    let raw: Vec<f64> = (0..size)
        .map(|i| (-(i as f64 - center).powi(2) / (2.0 * sigma * sigma)).exp())
        .collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|v| (v / total) as f32).collect()
}

/// Gaussian local mean with replicated borders.
fn gaussian_mean(img: &GrayImage, block: u32) -> GrayImage {
    // 8 fractional bits, so the filter's truncation stays below the final rounding
    let fixed: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_fn(img.width(), img.height(), |x, y| Luma([img.get_pixel(x, y).0[0] as u16 * 256]));
    let blurred = filter::separable_filter_equal(&fixed, &gaussian_kernel(block));
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let v = (blurred.get_pixel(x, y).0[0] as u32 + 128) >> 8;
        Luma([v.min(255) as u8])
    })
}

/// White where a pixel is brighter than its Gaussian-weighted neighbourhood minus `offset`.
pub fn adaptive_threshold_gaussian(img: &GrayImage, block: u32, offset: f64) -> GrayImage {
    if img.width() == 0 || img.height() == 0 {
        return img.clone();
    }
    let block = if block % 2 == 0 { block + 1 } else { block.max(3) };
    let mean = gaussian_mean(img, block);
    let delta = offset.ceil() as i32;

    let mut out = GrayImage::new(img.width(), img.height());
    for (x, y, pixel) in img.enumerate_pixels() {
        let diff = pixel.0[0] as i32 - mean.get_pixel(x, y).0[0] as i32;
        let value = if diff > -delta { 255 } else { 0 };
        out.put_pixel(x, y, Luma([value]));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| Luma([100 + (x / 2) as u8]))
    }

    fn stages(steps: &[LadderStep]) -> Vec<Stage> {
        steps.iter().map(|s| s.stage).collect()
    }

    #[test]
    fn narrow_region_gets_all_four_stages() {
        let region = gradient(100, 30);
        let steps = enhancement_ladder(&region);
        assert_eq!(stages(&steps), Stage::ALL.to_vec());
        assert_eq!(steps[0].outcome, StageOutcome::Produced(region.clone()));
        let resized = steps[1].outcome.image().map(|i| i.dimensions());
        assert_eq!(resized, Some((150, 45)));
        assert_eq!(steps[2].outcome.image().map(|i| i.dimensions()), Some((150, 45)));
        assert_eq!(steps[3].outcome.image().map(|i| i.dimensions()), Some((150, 45)));
    }

    #[test]
    fn wide_region_skips_resize_and_keeps_size() {
        let region = gradient(150, 40);
        let steps = enhancement_ladder(&region);
        assert_eq!(stages(&steps), Stage::ALL.to_vec());
        assert_eq!(steps[1].outcome, StageOutcome::Skipped);
        assert_eq!(steps[2].outcome.image().map(|i| i.dimensions()), Some((150, 40)));
    }

    #[test]
    fn clahe_stretches_low_contrast() {
        let img = gradient(64, 16);
        let out = clahe(&img, CLAHE_CLIP_LIMIT, CLAHE_TILES);
        assert_eq!(out.dimensions(), img.dimensions());
        let min = out.pixels().map(|p| p.0[0]).min().unwrap_or(0);
        let max = out.pixels().map(|p| p.0[0]).max().unwrap_or(0);
        assert!(max - min > 40, "range {}..{}", min, max);
    }

    #[test]
    fn clahe_handles_sizes_off_the_tile_grid() {
        let img = gradient(13, 5);
        assert_eq!(clahe(&img, CLAHE_CLIP_LIMIT, CLAHE_TILES).dimensions(), (13, 5));
        let tiny = GrayImage::from_pixel(1, 1, Luma([42]));
        assert_eq!(clahe(&tiny, CLAHE_CLIP_LIMIT, CLAHE_TILES).dimensions(), (1, 1));
    }

    #[test]
    fn threshold_marks_dark_spot() {
        let mut img = GrayImage::from_pixel(30, 30, Luma([200]));
        img.put_pixel(15, 15, Luma([0]));
        let out = adaptive_threshold_gaussian(&img, THRESHOLD_BLOCK, THRESHOLD_OFFSET);
        assert_eq!(out.get_pixel(15, 15).0[0], 0);
        assert_eq!(out.get_pixel(2, 2).0[0], 255);
        assert!(out.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
    }

    #[test]
    fn gaussian_mean_replicates_borders() {
        let flat = GrayImage::from_pixel(9, 7, Luma([200]));
        assert!(gaussian_mean(&flat, 11).pixels().all(|p| p.0[0] == 200));

        let step = GrayImage::from_fn(30, 4, |x, _| Luma([if x < 15 { 0 } else { 200 }]));
        let mean = gaussian_mean(&step, 11);
        assert_eq!(mean.get_pixel(0, 0).0[0], 0);
        assert_eq!(mean.get_pixel(29, 3).0[0], 200);
        let mid = mean.get_pixel(15, 1).0[0];
        assert!(mid > 80 && mid < 200, "{}", mid);
        assert!(mean.get_pixel(14, 1).0[0] < mid);
    }

    #[test]
    fn kernel_is_normalised() {
        let kernel = gaussian_kernel(11);
        assert_eq!(kernel.len(), 11);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(kernel[5] > kernel[4] && kernel[0] == kernel[10]);
    }
}
