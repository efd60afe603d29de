//! Boosted cascade detectors stored in OpenCV's XML formats.
//!
//! Two layouts are understood: the legacy `opencv-haar-classifier` files
//! (features inlined in every tree node) and the `opencv_traincascade`
//! layout (shared feature table, HAAR or LBP features). Both are loaded into
//! the same tree representation, where a child index `<= 0` points into the
//! leaf table.

use image::{ imageops::{ self, FilterType }, GrayImage };

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::candidates::PlateRect;
use crate::error::PlateError;

/// Similarity tolerance used when grouping raw hits.
pub const GROUP_EPS: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
struct WeightedRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    weight: f32,
}

#[derive(Debug, Clone)]
struct HaarFeature {
    rects: Vec<WeightedRect>,
    tilted: bool,
}

/// 3x3 grid of `width`x`height` blocks anchored at `(x, y)`.
#[derive(Debug, Clone, Copy)]
struct LbpFeature {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

#[derive(Debug, Clone)]
enum Features {
    Haar(Vec<HaarFeature>),
    Lbp(Vec<LbpFeature>),
}

#[derive(Debug, Clone)]
struct Node {
    left: i32,
    right: i32,
    feature: usize,
    threshold: f32,
    subset: Vec<i32>,
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
    leaves: Vec<f32>,
}

#[derive(Debug, Clone)]
struct Stage {
    threshold: f32,
    trees: Vec<Tree>,
}

/// Sliding-window search parameters, in working-frame pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanParams {
    pub scale_step: f64,
    pub min_neighbors: i32,
    pub min_size: (u32, u32),
    pub max_size: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct Cascade {
    window: (u32, u32),
    stages: Vec<Stage>,
    features: Features,
}

impl Cascade {

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, PlateError> {
        let text = fs::read_to_string(path)?;
        Self::from_xml(&text)
    }

    pub fn from_xml(text: &str) -> Result<Self, PlateError> {
        let doc = roxmltree::Document::parse(text)?;
        let top = elements(doc.root_element())
            .next()
            .ok_or_else(|| malformed("empty opencv_storage"))?;

        let cascade = if find(top, "featureType").is_some() {
            parse_traincascade(top)?
        } else if find(top, "size").is_some() {
            parse_legacy(top)?
        } else {
            return Err(malformed("unknown cascade layout"));
        };
        cascade.validate()?;
        Ok(cascade)
    }

    /// Base window size (width, height).
    pub fn window(&self) -> (u32, u32) {
        self.window
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    fn has_tilted(&self) -> bool {
        match &self.features {
            Features::Haar(features) => features.iter().any(|f| f.tilted),
            Features::Lbp(_) => false,
        }
    }

    fn feature_count(&self) -> usize {
        match &self.features {
            Features::Haar(features) => features.len(),
            Features::Lbp(features) => features.len(),
        }
    }

    fn validate(&self) -> Result<(), PlateError> {
        let (w, h) = self.window;
        if w < 3 || h < 3 {
            return Err(malformed("window smaller than 3x3"));
        }
        if self.stages.is_empty() {
            return Err(malformed("no stages"));
        }
        let (w, h) = (w as i32, h as i32);
        match &self.features {
            Features::Haar(features) => {
                for feature in features {
                    for r in &feature.rects {
                        let (left, right, bottom) = if feature.tilted {
                            (r.x - r.height, r.x + r.width, r.y + r.width + r.height)
                        } else {
                            (r.x, r.x + r.width, r.y + r.height)
                        };
                        if r.width <= 0 || r.height <= 0 || left < 0 || r.y < 0 || right > w || bottom > h {
                            return Err(malformed("feature rect outside the window"));
                        }
                    }
                }
            }
            Features::Lbp(features) => {
                for f in features {
                    if f.width <= 0 || f.height <= 0 || f.x < 0 || f.y < 0
                        || f.x + 3 * f.width > w || f.y + 3 * f.height > h
                    {
                        return Err(malformed("LBP block outside the window"));
                    }
                }
            }
        }

        let feature_count = self.feature_count();
        let lbp = matches!(self.features, Features::Lbp(_));
        for tree in self.stages.iter().flat_map(|s| s.trees.iter()) {
            if tree.nodes.is_empty() {
                return Err(malformed("tree without nodes"));
            }
            for (i, node) in tree.nodes.iter().enumerate() {
                if node.feature >= feature_count {
                    return Err(malformed("feature index out of range"));
                }
                if lbp && node.subset.len() < 8 {
                    return Err(malformed("LBP node without category subset"));
                }
                // inner children point forward so every walk ends in a leaf
                for child in [node.left, node.right] {
                    let ok = if child > 0 {
                        (child as usize) > i && (child as usize) < tree.nodes.len()
                    } else {
                        (child.unsigned_abs() as usize) < tree.leaves.len()
                    };
                    if !ok {
                        return Err(malformed("tree child out of range"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Multi-scale detection followed by neighbour grouping.
    pub fn detect_multi_scale(&self, gray: &GrayImage, params: &ScanParams) -> Vec<PlateRect> {
        let hits = self.detect_raw(gray, params);
        group_rectangles(hits, params.min_neighbors, GROUP_EPS)
    }

    /// Every accepted window at every admissible scale, ungrouped.
    pub fn detect_raw(&self, gray: &GrayImage, params: &ScanParams) -> Vec<PlateRect> {
        let (img_w, img_h) = gray.dimensions();
        let (win_w, win_h) = self.window;
        let max_size = if params.max_size.0 == 0 || params.max_size.1 == 0 {
            (img_w, img_h)
        } else {
            params.max_size
        };
        let step = params.scale_step.max(1.01);

        let mut hits = Vec::new();
        let mut factor = 1.0f64;
        loop {
            let window_w = (win_w as f64 * factor).round() as u32;
            let window_h = (win_h as f64 * factor).round() as u32;
            let scaled_w = (img_w as f64 / factor).round() as u32;
            let scaled_h = (img_h as f64 / factor).round() as u32;

            if scaled_w < win_w || scaled_h < win_h {
                break;
            }
            if window_w > max_size.0 || window_h > max_size.1 {
                break;
            }
            if window_w >= params.min_size.0 && window_h >= params.min_size.1 {
                self.scan_scale(gray, factor, (scaled_w, scaled_h), &mut hits);
            }
            factor *= step;
        }
        hits
    }

    fn scan_scale(&self, gray: &GrayImage, factor: f64, scaled: (u32, u32), hits: &mut Vec<PlateRect>) {
        let scaled_img;
        let img = if scaled == gray.dimensions() {
            gray
        } else {
            scaled_img = imageops::resize(gray, scaled.0, scaled.1, FilterType::Triangle);
            &scaled_img
        };
        let integral = Integral::new(img, self.has_tilted());

        let (win_w, win_h) = self.window;
        let step = if factor > 2.0 { 1 } else { 2 };
        let work_w = (scaled.0 - win_w + 1) as i32;
        let work_h = (scaled.1 - win_h + 1) as i32;
        let width = (win_w as f64 * factor).round() as u32;
        let height = (win_h as f64 * factor).round() as u32;

        let mut y = 0;
        while y < work_h {
            let mut x = 0;
            while x < work_w {
                let verdict = self.run_at(&integral, x, y);
                if verdict > 0 {
                    hits.push(PlateRect {
                        x: (x as f64 * factor).round() as i32,
                        y: (y as f64 * factor).round() as i32,
                        width,
                        height,
                    });
                } else if verdict == 0 {
                    // rejected by the first stage, skip a neighbour too
                    x += step;
                }
                x += step;
            }
            y += step;
        }
    }

    /// 1 if the window passes every stage, otherwise minus the failing stage index.
    fn run_at(&self, integral: &Integral, x: i32, y: i32) -> i32 {
        let norm = match self.features {
            Features::Haar(_) => integral.inv_norm_factor(x, y, self.window),
            Features::Lbp(_) => 1.0,
        };

        for (si, stage) in self.stages.iter().enumerate() {
            let mut sum = 0.0f64;
            for tree in &stage.trees {
                let mut idx = 0i32;
                loop {
                    let node = &tree.nodes[idx as usize];
                    idx = match &self.features {
                        Features::Haar(features) => {
                            let value = haar_value(&features[node.feature], integral, x, y) * norm;
                            if value < node.threshold as f64 { node.left } else { node.right }
                        }
                        Features::Lbp(features) => {
                            let code = lbp_code(&features[node.feature], integral, x, y) as usize;
                            let word = node.subset[code >> 5] as u32;
                            if word & (1u32 << (code & 31)) != 0 { node.left } else { node.right }
                        }
                    };
                    if idx <= 0 {
                        break;
                    }
                }
                sum += tree.leaves[(-idx) as usize] as f64;
            }
            if sum < stage.threshold as f64 {
                return -(si as i32);
            }
        }
        1
    }
}

fn haar_value(feature: &HaarFeature, integral: &Integral, x: i32, y: i32) -> f64 {
    feature.rects.iter().map(|r| {
        let sum = if feature.tilted {
            integral.tilted_sum(x + r.x, y + r.y, r.width, r.height)
        } else {
            integral.rect_sum(x + r.x, y + r.y, r.width, r.height)
        };
        r.weight as f64 * sum as f64
    }).sum()
}

fn lbp_code(feature: &LbpFeature, integral: &Integral, x: i32, y: i32) -> u8 {
    let block = |bx: i32, by: i32| {
        integral.rect_sum(
            x + feature.x + bx * feature.width,
            y + feature.y + by * feature.height,
            feature.width,
            feature.height,
        )
    };
    let center = block(1, 1);
    // clockwise from the top-left block, most significant bit first
    const RING: [(i32, i32); 8] = [(0, 0), (1, 0), (2, 0), (2, 1), (2, 2), (1, 2), (0, 2), (0, 1)];
    RING.iter().fold(0u8, |code, &(bx, by)| {
        (code << 1) | (block(bx, by) >= center) as u8
    })
}

/// Upright and squared integral images, plus the 45 degree one when needed.
struct Integral {
    stride: usize,
    sum: Vec<i64>,
    sqsum: Vec<f64>,
    tilted: Option<TiltedIntegral>,
}

impl Integral {

    fn new(img: &GrayImage, with_tilted: bool) -> Self {
        let (w, h) = (img.width() as usize, img.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0i64; stride * (h + 1)];
        let mut sqsum = vec![0f64; stride * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0i64;
            let mut row_sq = 0f64;
            for x in 0..w {
                let v = img.get_pixel(x as u32, y as u32).0[0] as i64;
                row_sum += v;
                row_sq += (v * v) as f64;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row_sum;
                sqsum[idx] = sqsum[idx - stride] + row_sq;
            }
        }
        let tilted = if with_tilted { Some(TiltedIntegral::new(img)) } else { None };
        Self { stride, sum, sqsum, tilted }
    }

    fn at(&self, x: i32, y: i32) -> usize {
        y as usize * self.stride + x as usize
    }

    fn rect_sum(&self, x: i32, y: i32, w: i32, h: i32) -> i64 {
        let s = &self.sum;
        s[self.at(x, y)] - s[self.at(x + w, y)] - s[self.at(x, y + h)] + s[self.at(x + w, y + h)]
    }

    fn rect_sqsum(&self, x: i32, y: i32, w: i32, h: i32) -> f64 {
        let s = &self.sqsum;
        s[self.at(x, y)] - s[self.at(x + w, y)] - s[self.at(x, y + h)] + s[self.at(x + w, y + h)]
    }

    fn tilted_sum(&self, x: i32, y: i32, w: i32, h: i32) -> i64 {
        match &self.tilted {
            Some(t) => t.get(x, y) - t.get(x - h, y + h) - t.get(x + w, y + w) + t.get(x + w - h, y + w + h),
            None => 0,
        }
    }

    /// `1 / sqrt(area * sqsum - sum^2)` over the window's inner rectangle.
    fn inv_norm_factor(&self, x: i32, y: i32, window: (u32, u32)) -> f64 {
        let (w, h) = (window.0 as i32 - 2, window.1 as i32 - 2);
        let area = (w * h) as f64;
        let sum = self.rect_sum(x + 1, y + 1, w, h) as f64;
        let sqsum = self.rect_sqsum(x + 1, y + 1, w, h);
        let nf = area * sqsum - sum * sum;
        if nf > 0.0 { 1.0 / nf.sqrt() } else { 1.0 }
    }
}

/// `T(X, Y) = sum of I(x, y) for y < Y and |x - X + 1| <= Y - y - 1`.
///
/// Columns are padded by the image height on both sides so corner lookups of
/// rotated rectangles never leave the table.
struct TiltedIntegral {
    stride: usize,
    offset: i64,
    rows: usize,
    data: Vec<i64>,
}

impl TiltedIntegral {

    fn new(img: &GrayImage) -> Self {
        let (w, h) = (img.width() as i64, img.height() as i64);
        let offset = h + 1;
        let stride = (w + 2 * h + 3) as usize;
        let rows = (h + 1) as usize;
        let mut data = vec![0i64; stride * rows];
        let pixel = |x: i64, y: i64| -> i64 {
            if x < 0 || y < 0 || x >= w || y >= h {
                0
            } else {
                img.get_pixel(x as u32, y as u32).0[0] as i64
            }
        };

        for y in 1..rows {
            for px in 0..stride {
                let x = px as i64 - offset;
                let up_left = if px > 0 { data[(y - 1) * stride + px - 1] } else { 0 };
                let up_right = if px + 1 < stride { data[(y - 1) * stride + px + 1] } else { 0 };
                let (two_up, below_apex) = if y >= 2 {
                    (data[(y - 2) * stride + px], pixel(x - 1, y as i64 - 2))
                } else {
                    (0, 0)
                };
                data[y * stride + px] = up_left + up_right - two_up + pixel(x - 1, y as i64 - 1) + below_apex;
            }
        }
        Self { stride, offset, rows, data }
    }

    fn get(&self, x: i32, y: i32) -> i64 {
        let px = x as i64 + self.offset;
        if y < 0 || y as usize >= self.rows || px < 0 || px as usize >= self.stride {
            return 0;
        }
        self.data[y as usize * self.stride + px as usize]
    }
}

/// Cluster similar rectangles and keep clusters with more than
/// `group_threshold` members, averaged.
///
/// Clusters nested inside a stronger cluster are dropped as well. A threshold
/// `<= 0` returns the input untouched.
pub fn group_rectangles(rects: Vec<PlateRect>, group_threshold: i32, eps: f64) -> Vec<PlateRect> {
    if group_threshold <= 0 || rects.is_empty() {
        return rects;
    }

    let labels = partition(&rects, |a, b| similar(a, b, eps));
    let classes = labels.iter().max().map_or(0, |m| m + 1);
    let mut sums = vec![[0i64; 4]; classes];
    let mut weights = vec![0i32; classes];
    for (rect, &label) in rects.iter().zip(&labels) {
        let s = &mut sums[label];
        s[0] += rect.x as i64;
        s[1] += rect.y as i64;
        s[2] += rect.width as i64;
        s[3] += rect.height as i64;
        weights[label] += 1;
    }
    let averaged: Vec<PlateRect> = sums.iter().zip(&weights).map(|(s, &n)| {
        let n = n as f64;
        PlateRect {
            x: (s[0] as f64 / n).round() as i32,
            y: (s[1] as f64 / n).round() as i32,
            width: (s[2] as f64 / n).round() as u32,
            height: (s[3] as f64 / n).round() as u32,
        }
    }).collect();

    let mut grouped = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = weights[i];
        if n1 <= group_threshold {
            continue;
        }
        let swallowed = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = weights[j];
            if j == i || n2 <= group_threshold {
                return false;
            }
            let dx = (r2.width as f64 * eps).round() as i32;
            let dy = (r2.height as f64 * eps).round() as i32;
            r1.x >= r2.x - dx
                && r1.y >= r2.y - dy
                && r1.right() <= r2.right() + dx
                && r1.bottom() <= r2.bottom() + dy
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !swallowed {
            grouped.push(*r1);
        }
    }
    grouped
}

fn similar(a: &PlateRect, b: &PlateRect, eps: f64) -> bool {
    let delta = eps * (a.width.min(b.width) + a.height.min(b.height)) as f64 * 0.5;
    (a.x - b.x).abs() as f64 <= delta
        && (a.y - b.y).abs() as f64 <= delta
        && (a.right() - b.right()).abs() as f64 <= delta
        && (a.bottom() - b.bottom()).abs() as f64 <= delta
}

/// Equivalence classes of the transitive closure of `same`, labelled in
/// order of first appearance.
fn partition<T>(items: &[T], same: impl Fn(&T, &T) -> bool) -> Vec<usize> {
    let mut parent: Vec<usize> = (0..items.len()).collect();
    fn root(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }
    for i in 0..items.len() {
        for j in 0..i {
            if same(&items[i], &items[j]) {
                let (ri, rj) = (root(&mut parent, i), root(&mut parent, j));
                if ri != rj {
                    parent[ri] = rj;
                }
            }
        }
    }

    let mut label_of_root = vec![usize::MAX; items.len()];
    let mut next = 0;
    (0..items.len()).map(|i| {
        let r = root(&mut parent, i);
        if label_of_root[r] == usize::MAX {
            label_of_root[r] = next;
            next += 1;
        }
        label_of_root[r]
    }).collect()
}

// xml helpers

type XmlNode<'a, 'i> = roxmltree::Node<'a, 'i>;

fn malformed(msg: &str) -> PlateError {
    PlateError::Cascade(msg.to_string())
}

fn elements<'a, 'i>(node: XmlNode<'a, 'i>) -> impl Iterator<Item = XmlNode<'a, 'i>> {
    node.children().filter(|n| n.is_element())
}

fn find<'a, 'i>(node: XmlNode<'a, 'i>, name: &str) -> Option<XmlNode<'a, 'i>> {
    elements(node).find(|n| n.has_tag_name(name))
}

fn child<'a, 'i>(node: XmlNode<'a, 'i>, name: &str) -> Result<XmlNode<'a, 'i>, PlateError> {
    find(node, name).ok_or_else(|| PlateError::Cascade(format!("missing <{}>", name)))
}

fn numbers<T: FromStr>(node: XmlNode<'_, '_>) -> Result<Vec<T>, PlateError> {
    node.text().unwrap_or("").split_whitespace().map(|token| {
        token.parse::<T>().map_err(|_| PlateError::Cascade(format!("bad number {:?}", token)))
    }).collect()
}

fn number<T: FromStr>(node: XmlNode<'_, '_>, name: &str) -> Result<T, PlateError> {
    numbers::<T>(child(node, name)?)?
        .into_iter()
        .next()
        .ok_or_else(|| PlateError::Cascade(format!("empty <{}>", name)))
}

fn parse_haar_rects(feature: XmlNode<'_, '_>) -> Result<HaarFeature, PlateError> {
    let rects = elements(child(feature, "rects")?).map(|r| {
        let v = numbers::<f64>(r)?;
        if v.len() < 5 {
            return Err(malformed("rect needs x y w h weight"));
        }
        Ok(WeightedRect {
            x: v[0] as i32,
            y: v[1] as i32,
            width: v[2] as i32,
            height: v[3] as i32,
            weight: v[4] as f32,
        })
    }).collect::<Result<Vec<_>, _>>()?;
    let tilted = match find(feature, "tilted") {
        Some(t) => numbers::<i32>(t)?.first().copied().unwrap_or(0) != 0,
        None => false,
    };
    Ok(HaarFeature { rects, tilted })
}

fn parse_traincascade(cascade: XmlNode<'_, '_>) -> Result<Cascade, PlateError> {
    let stage_type = child(cascade, "stageType")?.text().unwrap_or("").trim();
    if stage_type != "BOOST" {
        return Err(PlateError::Cascade(format!("unsupported stage type {:?}", stage_type)));
    }
    let width: u32 = number(cascade, "width")?;
    let height: u32 = number(cascade, "height")?;
    let max_cat_count: usize = match find(cascade, "featureParams") {
        Some(params) => find(params, "maxCatCount")
            .map(|n| numbers::<usize>(n))
            .transpose()?
            .and_then(|v| v.first().copied())
            .unwrap_or(0),
        None => 0,
    };
    let subset_size = if max_cat_count > 0 { (max_cat_count + 31) / 32 } else { 0 };

    let feature_nodes = child(cascade, "features")?;
    let features = match child(cascade, "featureType")?.text().unwrap_or("").trim() {
        "HAAR" => Features::Haar(elements(feature_nodes).map(parse_haar_rects).collect::<Result<_, _>>()?),
        "LBP" => Features::Lbp(elements(feature_nodes).map(|f| {
            let v = numbers::<i32>(child(f, "rect")?)?;
            if v.len() < 4 {
                return Err(malformed("LBP rect needs x y w h"));
            }
            Ok(LbpFeature { x: v[0], y: v[1], width: v[2], height: v[3] })
        }).collect::<Result<_, _>>()?),
        other => return Err(PlateError::Cascade(format!("unsupported feature type {:?}", other))),
    };

    let stages = elements(child(cascade, "stages")?).map(|stage| {
        let threshold: f32 = number(stage, "stageThreshold")?;
        let trees = elements(child(stage, "weakClassifiers")?).map(|weak| {
            let raw = numbers::<f64>(child(weak, "internalNodes")?)?;
            let leaves = numbers::<f32>(child(weak, "leafValues")?)?;
            let per_node = 3 + if subset_size > 0 { subset_size } else { 1 };
            if raw.is_empty() || raw.len() % per_node != 0 {
                return Err(malformed("internalNodes length mismatch"));
            }
            let nodes = raw.chunks(per_node).map(|n| {
                let (threshold, subset) = if subset_size > 0 {
                    (0.0, n[3..].iter().map(|v| *v as i64 as i32).collect())
                } else {
                    (n[3] as f32, Vec::new())
                };
                Node { left: n[0] as i32, right: n[1] as i32, feature: n[2] as usize, threshold, subset }
            }).collect();
            Ok(Tree { nodes, leaves })
        }).collect::<Result<Vec<_>, PlateError>>()?;
        Ok(Stage { threshold, trees })
    }).collect::<Result<Vec<_>, PlateError>>()?;

    Ok(Cascade { window: (width, height), stages, features })
}

fn parse_legacy(top: XmlNode<'_, '_>) -> Result<Cascade, PlateError> {
    let size = numbers::<u32>(child(top, "size")?)?;
    if size.len() < 2 {
        return Err(malformed("size needs width and height"));
    }
    let mut features = Vec::new();

    let stages = elements(child(top, "stages")?).map(|stage| {
        let threshold: f32 = number(stage, "stage_threshold")?;
        let trees = elements(child(stage, "trees")?).map(|tree| {
            let mut nodes = Vec::new();
            let mut leaves = Vec::new();
            for node in elements(tree) {
                features.push(parse_haar_rects(child(node, "feature")?)?);
                let mut branch = |node_tag: &str, val_tag: &str| -> Result<i32, PlateError> {
                    if find(node, node_tag).is_some() {
                        number::<i32>(node, node_tag)
                    } else {
                        leaves.push(number::<f32>(node, val_tag)?);
                        Ok(-(leaves.len() as i32 - 1))
                    }
                };
                let left = branch("left_node", "left_val")?;
                let right = branch("right_node", "right_val")?;
                nodes.push(Node {
                    left,
                    right,
                    feature: features.len() - 1,
                    threshold: number(node, "threshold")?,
                    subset: Vec::new(),
                });
            }
            Ok(Tree { nodes, leaves })
        }).collect::<Result<Vec<_>, PlateError>>()?;
        Ok(Stage { threshold, trees })
    }).collect::<Result<Vec<_>, PlateError>>()?;

    Ok(Cascade { window: (size[0], size[1]), stages, features: Features::Haar(features) })
}
