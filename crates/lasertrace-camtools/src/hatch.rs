//! # Hatch Fill
//!
//! Fills closed, coloured outlines with parallel hatch lines. Darker fills get
//! denser hatching: the luma of the fill colour is mapped linearly from
//! `[0, 255]` onto `[max_density, min_density]`, where `max_density` is the
//! number of laser-wide lines that fit across the outline's bounding square.
//!
//! Scan lines covering the bounding square are clipped against the outline
//! polygon and only the interior pieces are kept.
//!
//! Each subpath of the outline becomes one ring. Rings are combined with the
//! even-odd rule, so a ring inside another cuts a hole.

use geo::algorithm::line_intersection::line_intersection;
use geo::{
    Area as GeoArea, BooleanOps, BoundingRect, Coord, LineString, MultiLineString, MultiPolygon,
    Polygon,
};
use lasertrace_core::constants::{INPUT_TOLERANCE, OPERATION_TOLERANCE};
use lasertrace_core::{GeometryError, Vector};
use lasertrace_designer::{Area, Color, Flattener, Line, LineSegmentChain};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Direction of the hatch lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HatchOrientation {
    /// Lines running from the lower right to the upper left (`x + y = c`)
    #[default]
    Diagonal,
    /// Lines running from the lower left to the upper right (`x - y = c`)
    AntiDiagonal,
    Horizontal,
    Vertical,
    /// Diagonal and anti-diagonal together
    Cross,
}

impl HatchOrientation {
    /// Normals of the line families, one per family.
    fn normals(self) -> &'static [Vector] {
        const DIAGONAL: Vector = Vector::new(1.0, 1.0);
        const ANTI_DIAGONAL: Vector = Vector::new(1.0, -1.0);
        const HORIZONTAL: Vector = Vector::new(0.0, 1.0);
        const VERTICAL: Vector = Vector::new(1.0, 0.0);
        match self {
            HatchOrientation::Diagonal => &[DIAGONAL],
            HatchOrientation::AntiDiagonal => &[ANTI_DIAGONAL],
            HatchOrientation::Horizontal => &[HORIZONTAL],
            HatchOrientation::Vertical => &[VERTICAL],
            HatchOrientation::Cross => &[DIAGONAL, ANTI_DIAGONAL],
        }
    }
}

/// Density-modulated hatch generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchFiller {
    /// Width of the burned line; bounds the maximum density
    pub laser_diameter: f64,
    /// Density used for white fills
    pub min_density: f64,
    pub orientation: HatchOrientation,
}

impl Default for HatchFiller {
    fn default() -> Self {
        Self {
            laser_diameter: 2.0,
            min_density: 0.0,
            orientation: HatchOrientation::Diagonal,
        }
    }
}

impl HatchFiller {
    /// Number of hatch lines across a bounding square of `side` for `luma`.
    pub fn density(&self, luma: f64, side: f64) -> u32 {
        if self.laser_diameter <= 0.0 || side <= 0.0 {
            return 0;
        }
        let max_density = side / self.laser_diameter;
        let t = (luma / 255.0).clamp(0.0, 1.0);
        let density = max_density + (self.min_density - max_density) * t;
        density.max(0.0).trunc() as u32
    }

    /// Generates hatch lines for `area`, one single-segment cutting chain each.
    pub fn hatch(
        &self,
        area: &Area,
        flattener: &Flattener,
    ) -> Result<Vec<LineSegmentChain>, GeometryError> {
        let rings = outline_rings(area, flattener)?;
        for ring in &rings {
            check_simple(ring)?;
        }
        let polygon = even_odd(&rings);
        if polygon.unsigned_area() <= OPERATION_TOLERANCE {
            return Err(GeometryError::DegenerateOutline {
                reason: "outline encloses zero area".to_string(),
            });
        }

        let luma = Color::parse(&area.color)
            .map_err(|_| GeometryError::InvalidColor {
                value: area.color.clone(),
            })?
            .luma();

        let Some(bounds) = polygon.bounding_rect() else {
            return Ok(Vec::new());
        };
        let low = Vector::new(bounds.min().x, bounds.min().y);
        let side = bounds.width().max(bounds.height());
        let density = self.density(luma, side);
        debug!(luma, side, density, "Hatch density");
        if density == 0 {
            return Ok(Vec::new());
        }

        let spacing = side / f64::from(density);
        let corners = [
            low,
            low + Vector::new(side, 0.0),
            low + Vector::new(0.0, side),
            low + Vector::new(side, side),
        ];
        let center = low + Vector::new(side / 2.0, side / 2.0);

        let mut chains = Vec::new();
        for normal in self.orientation.normals() {
            let unit_normal = *normal * (1.0 / normal.length());
            let direction = Vector::new(unit_normal.y, -unit_normal.x);
            let offsets = corners.iter().map(|c| c.dot(&unit_normal));
            let lo = offsets.clone().fold(f64::INFINITY, f64::min);
            let hi = offsets.fold(f64::NEG_INFINITY, f64::max);
            let center_offset = center.dot(&unit_normal);

            let mut offset = lo + spacing;
            while offset < hi - OPERATION_TOLERANCE {
                let anchor = center + unit_normal * (offset - center_offset);
                let a = anchor - direction * side;
                let b = anchor + direction * side;
                chains.extend(clip_scan_line(&polygon, a, b, direction));
                offset += spacing;
            }
        }
        Ok(chains)
    }
}

/// Flattens the outline into one ring per subpath, without repeated points.
///
/// A subpath ends where a curve does not start at the previous curve's end.
/// Rings with fewer than three distinct points are dropped.
fn outline_rings(area: &Area, flattener: &Flattener) -> Result<Vec<Vec<Vector>>, GeometryError> {
    let mut rings: Vec<Vec<Vector>> = Vec::new();
    let mut ring: Vec<Vector> = Vec::new();
    let mut previous_end: Option<Vector> = None;

    for curve in &area.path.curves {
        if previous_end.is_some_and(|end| !end.approx_eq(&curve.start(), INPUT_TOLERANCE)) {
            rings.extend(close_ring(std::mem::take(&mut ring)));
        }
        previous_end = Some(curve.end());

        let chain = flattener.flatten(curve);
        for point in chain.start().into_iter().chain(chain.iter().map(|s| s.end)) {
            if ring
                .last()
                .is_some_and(|last| last.approx_eq(&point, INPUT_TOLERANCE))
            {
                continue;
            }
            ring.push(point);
        }
    }
    rings.extend(close_ring(ring));

    if rings.is_empty() {
        return Err(GeometryError::DegenerateOutline {
            reason: "no subpath has at least 3 distinct points".to_string(),
        });
    }
    Ok(rings)
}

fn close_ring(mut ring: Vec<Vector>) -> Option<Vec<Vector>> {
    if ring.len() > 1 && ring[0].approx_eq(&ring[ring.len() - 1], INPUT_TOLERANCE) {
        ring.pop();
    }
    (ring.len() >= 3).then_some(ring)
}

fn to_polygon(ring: &[Vector]) -> Polygon {
    Polygon::new(
        LineString::from(ring.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()),
        vec![],
    )
}

/// Combines rings so that nested rings alternate between filled and empty.
fn even_odd(rings: &[Vec<Vector>]) -> MultiPolygon {
    let mut polygons = rings.iter().map(|ring| to_polygon(ring));
    let Some(first) = polygons.next() else {
        return MultiPolygon::new(Vec::new());
    };
    polygons.fold(MultiPolygon::new(vec![first]), |filled, ring| {
        filled.xor(&ring)
    })
}

/// Rejects rings where two non-adjacent edges touch or cross.
///
/// Edges are swept by increasing x so only edges with overlapping x ranges
/// are intersected. The lowest intersecting pair of edge indices is reported.
fn check_simple(ring: &[Vector]) -> Result<(), GeometryError> {
    let n = ring.len();
    let edge = |i: usize| {
        let a = ring[i];
        let b = ring[(i + 1) % n];
        geo::Line::new(Coord { x: a.x, y: a.y }, Coord { x: b.x, y: b.y })
    };
    let range = |i: usize, pick: fn(Coord) -> f64| {
        let line = edge(i);
        let (a, b) = (pick(line.start), pick(line.end));
        (a.min(b), a.max(b))
    };
    let x_ranges: Vec<(f64, f64)> = (0..n).map(|i| range(i, |c| c.x)).collect();
    let y_ranges: Vec<(f64, f64)> = (0..n).map(|i| range(i, |c| c.y)).collect();
    let adjacent = |i: usize, j: usize| (i + 1) % n == j || (j + 1) % n == i;

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| x_ranges[i].0.total_cmp(&x_ranges[j].0));

    let mut active: Vec<usize> = Vec::new();
    let mut found: Option<(usize, usize)> = None;
    for &i in &order {
        active.retain(|&j| x_ranges[j].1 >= x_ranges[i].0);
        for &j in &active {
            let y_overlap = y_ranges[i].0 <= y_ranges[j].1 && y_ranges[j].0 <= y_ranges[i].1;
            if adjacent(i, j) || !y_overlap {
                continue;
            }
            if line_intersection(edge(i), edge(j)).is_some() {
                let pair = (i.min(j), i.max(j));
                found = Some(found.map_or(pair, |best| best.min(pair)));
            }
        }
        active.push(i);
    }

    match found {
        Some((first, second)) => Err(GeometryError::SelfIntersecting { first, second }),
        None => Ok(()),
    }
}

/// Interior pieces of the scan line `a`-`b`, ordered along `direction`.
fn clip_scan_line(polygon: &MultiPolygon, a: Vector, b: Vector, direction: Vector) -> Vec<LineSegmentChain> {
    let scan_line = MultiLineString::new(vec![LineString::from(vec![(a.x, a.y), (b.x, b.y)])]);
    let clipped = polygon.clip(&scan_line, false);

    let mut pieces: Vec<(Vector, Vector)> = clipped
        .iter()
        .filter_map(|piece| {
            let first = piece.0.first()?;
            let last = piece.0.last()?;
            let (start, end) = (Vector::new(first.x, first.y), Vector::new(last.x, last.y));
            if start.distance_to(&end) <= OPERATION_TOLERANCE {
                return None;
            }
            // Orient every piece along the scan line direction
            Some(if (end - start).dot(&direction) >= 0.0 {
                (start, end)
            } else {
                (end, start)
            })
        })
        .collect();
    pieces.sort_by(|p, q| p.0.dot(&direction).total_cmp(&q.0.dot(&direction)));

    pieces
        .into_iter()
        .map(|(start, end)| LineSegmentChain::from_segments(vec![Line::new(start, end, true)]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lasertrace_designer::parse_path;

    fn square_area(color: &str) -> Area {
        Area {
            path: parse_path("M0 0 L20 0 L20 20 L0 20 Z", None, false).unwrap(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_density_follows_luma() {
        let filler = HatchFiller::default();
        assert_eq!(filler.density(0.0, 20.0), 10);
        assert_eq!(filler.density(255.0, 20.0), 0);
        assert_eq!(filler.density(127.5, 20.0), 5);
        assert_eq!(filler.density(0.0, 0.0), 0);
    }

    #[test]
    fn test_black_square_horizontal_hatch() {
        let filler = HatchFiller {
            orientation: HatchOrientation::Horizontal,
            ..Default::default()
        };
        let chains = filler.hatch(&square_area("#000000"), &Flattener::default()).unwrap();
        // Density 10 over a 20 wide square: lines at y = 2, 4, ..., 18
        assert_eq!(chains.len(), 9);
        for (i, chain) in chains.iter().enumerate() {
            let segment = chain.segments()[0];
            assert!(segment.cut);
            let y = 2.0 * (i as f64 + 1.0);
            assert!((segment.start.y - y).abs() < 1e-6);
            assert!((segment.start.x - 0.0).abs() < 1e-6);
            assert!((segment.end.x - 20.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_white_fill_has_no_lines() {
        let chains = HatchFiller::default()
            .hatch(&square_area("#ffffff"), &Flattener::default())
            .unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn test_hatch_lines_stay_inside_outline() {
        let filler = HatchFiller {
            orientation: HatchOrientation::Cross,
            ..Default::default()
        };
        let chains = filler.hatch(&square_area("#404040"), &Flattener::default()).unwrap();
        assert!(!chains.is_empty());
        for chain in &chains {
            for point in [chain.start().unwrap(), chain.end().unwrap()] {
                assert!(point.x > -1e-6 && point.x < 20.0 + 1e-6);
                assert!(point.y > -1e-6 && point.y < 20.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_degenerate_outline() {
        let area = Area {
            path: parse_path("M0 0 L10 0 Z", None, false).unwrap(),
            color: "#000000".to_string(),
        };
        let err = HatchFiller::default().hatch(&area, &Flattener::default()).unwrap_err();
        assert!(matches!(err, GeometryError::DegenerateOutline { .. }));
    }

    #[test]
    fn test_self_intersecting_outline() {
        let area = Area {
            path: parse_path("M0 0 L10 10 L10 0 L0 10 Z", None, false).unwrap(),
            color: "#000000".to_string(),
        };
        let err = HatchFiller::default().hatch(&area, &Flattener::default()).unwrap_err();
        assert!(matches!(err, GeometryError::SelfIntersecting { first: 0, second: 2 }));
    }

    #[test]
    fn test_hole_is_not_hatched() {
        let filler = HatchFiller {
            orientation: HatchOrientation::Horizontal,
            ..Default::default()
        };
        let donut = Area {
            path: parse_path("M0 0 H20 V20 H0 Z M5 5 H15 V15 H5 Z", None, false).unwrap(),
            color: "#000000".to_string(),
        };
        let chains = filler.hatch(&donut, &Flattener::default()).unwrap();
        // y = 2, 4, 16, 18 run through; y = 6..14 are split by the hole
        assert_eq!(chains.len(), 14);
        for chain in &chains {
            let segment = chain.segments()[0];
            let middle = segment.start.lerp(&segment.end, 0.5);
            let in_hole = middle.x > 5.0 && middle.x < 15.0 && middle.y > 5.0 && middle.y < 15.0;
            assert!(!in_hole, "hatch line inside hole at {middle}");
        }
    }

    #[test]
    fn test_separate_subpaths_are_both_filled() {
        let filler = HatchFiller {
            orientation: HatchOrientation::Vertical,
            ..Default::default()
        };
        let pair = Area {
            path: parse_path("M0 0 H8 V20 H0 Z M12 0 H20 V20 H12 Z", None, false).unwrap(),
            color: "#000000".to_string(),
        };
        let chains = filler.hatch(&pair, &Flattener::default()).unwrap();
        let left = chains.iter().filter(|c| c.start().unwrap().x < 10.0).count();
        let right = chains.len() - left;
        assert!(left > 0 && right > 0);
    }

    #[test]
    fn test_degenerate_subpath_is_ignored() {
        let area = Area {
            path: parse_path("M0 0 H20 V20 H0 Z M30 30 L31 31", None, false).unwrap(),
            color: "#000000".to_string(),
        };
        let chains = HatchFiller::default().hatch(&area, &Flattener::default()).unwrap();
        assert!(!chains.is_empty());
    }

    #[test]
    fn test_check_simple_reports_lowest_pair() {
        // Star polygon: every edge crosses two others
        let ring: Vec<Vector> = (0..5)
            .map(|k| {
                let angle = (k as f64) * 4.0 * std::f64::consts::PI / 5.0;
                Vector::new(angle.cos(), angle.sin())
            })
            .collect();
        assert_eq!(
            check_simple(&ring),
            Err(GeometryError::SelfIntersecting { first: 0, second: 2 })
        );

        let square = [
            Vector::new(0.0, 0.0),
            Vector::new(1.0, 0.0),
            Vector::new(1.0, 1.0),
            Vector::new(0.0, 1.0),
        ];
        assert!(check_simple(&square).is_ok());
    }

    #[test]
    fn test_invalid_color() {
        let err = HatchFiller::default()
            .hatch(&square_area("url(#gradient)"), &Flattener::default())
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidColor { .. }));
    }
}
