//! SVG rendering of correspondences between two images placed side by side
//! (or stacked when `vertical`).
use super::ind_match::IndMatch;
use super::io::MatchIoError;
use crate::features::PointFeature;
use std::path::Path;
use svg::node::element::{Circle, Group, Image, Line};
use svg::Document;

const MATCH_COLOR: &str = "#00C000";
const FEATURE_COLOR: &str = "#FFD700";
const STROKE_WIDTH: f32 = 2.0;
const FEATURE_RADIUS: f32 = 3.0;

/// One side of the rendering: image reference, size and feature positions.
#[derive(Clone, Copy, Debug)]
pub struct SvgView<'a> {
    pub image_path: &'a str,
    pub width: usize,
    pub height: usize,
    pub features: &'a [PointFeature],
}

/// Build the SVG document; `None` when a match references a missing feature.
pub fn matches_document(
    left: &SvgView<'_>,
    right: &SvgView<'_>,
    matches: &[IndMatch],
    vertical: bool,
) -> Option<Document> {
    let (ox, oy) = if vertical {
        (0.0, left.height as f32)
    } else {
        (left.width as f32, 0.0)
    };
    let (total_w, total_h) = if vertical {
        (left.width.max(right.width), left.height + right.height)
    } else {
        (left.width + right.width, left.height.max(right.height))
    };

    let mut lines = Group::new()
        .set("stroke", MATCH_COLOR)
        .set("stroke-width", STROKE_WIDTH);
    let mut points = Group::new()
        .set("fill", "none")
        .set("stroke", FEATURE_COLOR)
        .set("stroke-width", STROKE_WIDTH);
    for m in matches {
        let l = left.features.get(m.i as usize)?;
        let r = right.features.get(m.j as usize)?;
        lines = lines.add(
            Line::new()
                .set("x1", l.x)
                .set("y1", l.y)
                .set("x2", r.x + ox)
                .set("y2", r.y + oy),
        );
        points = points
            .add(Circle::new().set("cx", l.x).set("cy", l.y).set("r", FEATURE_RADIUS))
            .add(
                Circle::new()
                    .set("cx", r.x + ox)
                    .set("cy", r.y + oy)
                    .set("r", FEATURE_RADIUS),
            );
    }

    let doc = Document::new()
        .set("width", total_w)
        .set("height", total_h)
        .set("viewBox", (0, 0, total_w, total_h))
        .add(
            Image::new()
                .set("href", left.image_path)
                .set("width", left.width)
                .set("height", left.height),
        )
        .add(
            Image::new()
                .set("href", right.image_path)
                .set("x", ox)
                .set("y", oy)
                .set("width", right.width)
                .set("height", right.height),
        )
        .add(lines)
        .add(points);
    Some(doc)
}

pub fn save_matches_svg(
    left: &SvgView<'_>,
    right: &SvgView<'_>,
    matches: &[IndMatch],
    path: &Path,
    vertical: bool,
) -> Result<(), MatchIoError> {
    let doc = matches_document(left, right, matches, vertical).ok_or_else(|| {
        MatchIoError::Malformed {
            path: path.to_path_buf(),
            reason: "match references a feature index out of range".to_string(),
        }
    })?;
    svg::save(path, &doc).map_err(|source| MatchIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
