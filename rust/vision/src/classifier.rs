// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Court line classification
//!
//! Horizontal lines are named by how many verticals they cross: the base
//! line meets all five sidelines and the centre mark, the service line
//! only the two singles sidelines and the centre service line. Their
//! endpoints then become anchors for naming the vertical lines.

use crate::intersections::{IntersectionMap, LineId};
use crate::types::{ClassifiedSegment, LineClass, Point};
use rustc_hash::FxHashMap;

/// Crossings of a base line after false-intersection filtering.
pub const BASE_LINE_INTERSECTIONS: usize = 5;

/// Crossings of a service line after false-intersection filtering.
pub const SERVICE_LINE_INTERSECTIONS: usize = 3;

/// Horizontal classes the vertical rules extend from.
const ANCHOR_CLASSES: [LineClass; 4] = [
    LineClass::BaseLine,
    LineClass::InnerBaseLine,
    LineClass::ServiceLine,
    LineClass::ServiceLineHalf,
];

/// Classified horizontal segments keyed by class; the first one recorded wins.
#[derive(Debug, Clone, Default)]
pub struct AnchorTable {
    anchors: FxHashMap<LineClass, ClassifiedSegment>,
}

impl AnchorTable {
    fn record(&mut self, segment: ClassifiedSegment) {
        self.anchors.entry(segment.class).or_insert(segment);
    }

    pub fn get(&self, class: LineClass) -> Option<&ClassifiedSegment> {
        self.anchors.get(&class)
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    /// Anchor classes no horizontal line was classified as.
    pub fn missing(&self) -> Vec<LineClass> {
        ANCHOR_CLASSES
            .into_iter()
            .filter(|class| !self.anchors.contains_key(class))
            .collect()
    }
}

/// Output of the horizontal pass
#[derive(Debug, Clone, Default)]
pub struct HorizontalClassification {
    /// Base and service segments with their internal refinements, in map order
    pub segments: Vec<ClassifiedSegment>,
    pub anchors: AnchorTable,
    /// Horizontal lines that matched a rule
    pub classified: Vec<LineId>,
}

/// Name horizontal lines by their (filtered) intersection count.
///
/// Five crossings give a base line plus its inner span between the singles
/// sidelines; three give a service line plus the half from the centre
/// crossing back to its origin. Other counts stay unclassified.
pub fn classify_horizontal(map: &IntersectionMap) -> HorizontalClassification {
    let mut result = HorizontalClassification::default();

    for entry in &map.horizontal {
        let points = &entry.points;
        let n = points.len();
        let pair = match n {
            BASE_LINE_INTERSECTIONS => [
                ClassifiedSegment::new(LineClass::BaseLine, points[0], points[n - 1]),
                ClassifiedSegment::new(LineClass::InnerBaseLine, points[1], points[n - 2]),
            ],
            SERVICE_LINE_INTERSECTIONS => [
                ClassifiedSegment::new(LineClass::ServiceLine, points[0], points[n - 1]),
                ClassifiedSegment::new(LineClass::ServiceLineHalf, points[1], points[n - 3]),
            ],
            _ => {
                tracing::debug!(
                    line = entry.line.0,
                    intersections = n,
                    "horizontal line unclassified"
                );
                continue;
            }
        };

        tracing::debug!(line = entry.line.0, class = %pair[0].class, "horizontal line classified");
        for segment in pair {
            result.anchors.record(segment);
            result.segments.push(segment);
        }
        result.classified.push(entry.line);
    }

    result
}

/// Anchor endpoint that a crossing at `point` extends from, if any.
fn match_anchor(point: Point, anchors: &AnchorTable) -> Option<(LineClass, Point)> {
    if let (Some(service), Some(inner)) = (
        anchors.get(LineClass::ServiceLine),
        anchors.get(LineClass::InnerBaseLine),
    ) {
        if point == service.origin {
            return Some((LineClass::SinglesSideline, inner.origin));
        }
        if point == service.destination {
            return Some((LineClass::SinglesSideline, inner.destination));
        }
    }

    if let Some(base) = anchors.get(LineClass::BaseLine) {
        if point == base.origin {
            return Some((LineClass::DoublesSideline, base.origin));
        }
        if point == base.destination {
            return Some((LineClass::DoublesSideline, base.destination));
        }
    }

    match anchors.get(LineClass::ServiceLineHalf) {
        Some(half) if point == half.origin => Some((LineClass::CentreServiceLine, half.origin)),
        _ => None,
    }
}

/// Where the line through `p1` and `p2` meets the top image border (y = 0).
///
/// The slope denominator carries a `+1` bias so exactly vertical pairs still
/// give a finite slope. `None` when the points are level or the bias cancels
/// the run.
pub fn upper_image_intercept(p1: Point, p2: Point) -> Option<Point> {
    let m = (p2.y - p1.y) as f64 / (p2.x - p1.x + 1) as f64;
    if m == 0.0 || !m.is_finite() {
        return None;
    }
    let c = p1.y as f64 - m * p1.x as f64;
    let x = -c / m;
    x.is_finite().then(|| Point::new(x as i32, 0))
}

/// Name vertical lines by the horizontal anchor endpoint they pass through.
///
/// Returns the horizontal segments followed by one segment per matching
/// crossing, each running from its anchor endpoint to the top border.
/// Anchors that were never detected disable only the rules needing them.
pub fn classify_vertical(
    map: &IntersectionMap,
    horizontal: &HorizontalClassification,
) -> Vec<ClassifiedSegment> {
    for class in horizontal.anchors.missing() {
        tracing::warn!(%class, "anchor not detected");
    }

    let mut segments = horizontal.segments.clone();

    for entry in &map.vertical {
        for &point in &entry.points {
            let Some((class, origin)) = match_anchor(point, &horizontal.anchors) else {
                continue;
            };

            let destination = match entry.points.as_slice() {
                [p1, p2, ..] => upper_image_intercept(*p1, *p2),
                _ => None,
            };
            match destination {
                Some(destination) => {
                    segments.push(ClassifiedSegment::new(class, origin, destination));
                }
                None => {
                    tracing::warn!(
                        line = entry.line.0,
                        %class,
                        intersections = entry.points.len(),
                        "cannot extrapolate vertical line to the top border"
                    );
                }
            }
        }
    }

    segments
}

/// Run both passes over an intersection map.
pub fn classify(map: &IntersectionMap) -> Vec<ClassifiedSegment> {
    let horizontal = classify_horizontal(map);
    classify_vertical(map, &horizontal)
}

/// Drop segments whose class only anchors the vertical pass.
pub fn final_segments(segments: &[ClassifiedSegment]) -> Vec<ClassifiedSegment> {
    segments
        .iter()
        .filter(|segment| !segment.class.is_internal())
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersections::LineIntersections;

    fn row(y: i32, xs: &[i32]) -> Vec<Point> {
        xs.iter().map(|&x| Point::new(x, y)).collect()
    }

    fn column(x: i32, ys: &[i32]) -> Vec<Point> {
        ys.iter().map(|&y| Point::new(x, y)).collect()
    }

    fn entry(id: usize, points: Vec<Point>) -> LineIntersections {
        LineIntersections {
            line: LineId(id),
            points,
        }
    }

    /// Filtered intersections of a full court: service row 130, base row 220
    fn court_map() -> IntersectionMap {
        IntersectionMap {
            horizontal: vec![
                entry(2, row(130, &[79, 199, 320])),
                entry(4, row(220, &[39, 79, 199, 320, 360])),
            ],
            vertical: vec![
                entry(0, column(39, &[130, 220])),
                entry(1, column(79, &[130, 220])),
                entry(3, column(199, &[130, 220])),
                entry(5, column(320, &[130, 220])),
                entry(6, column(360, &[130, 220])),
            ],
        }
    }

    fn of_class(segments: &[ClassifiedSegment], class: LineClass) -> Vec<ClassifiedSegment> {
        segments.iter().filter(|s| s.class == class).copied().collect()
    }

    #[test]
    fn test_five_intersections_make_a_base_line() {
        let map = IntersectionMap {
            horizontal: vec![entry(0, row(220, &[39, 79, 199, 320, 360]))],
            vertical: Vec::new(),
        };
        let result = classify_horizontal(&map);

        assert_eq!(
            result.segments,
            vec![
                ClassifiedSegment::new(
                    LineClass::BaseLine,
                    Point::new(39, 220),
                    Point::new(360, 220),
                ),
                ClassifiedSegment::new(
                    LineClass::InnerBaseLine,
                    Point::new(79, 220),
                    Point::new(320, 220),
                ),
            ]
        );
        assert!(result.anchors.get(LineClass::ServiceLine).is_none());
        assert_eq!(result.classified, vec![LineId(0)]);
    }

    #[test]
    fn test_three_intersections_make_a_service_line() {
        let map = IntersectionMap {
            horizontal: vec![entry(0, row(130, &[79, 199, 320]))],
            vertical: Vec::new(),
        };
        let result = classify_horizontal(&map);

        assert_eq!(
            result.segments,
            vec![
                ClassifiedSegment::new(
                    LineClass::ServiceLine,
                    Point::new(79, 130),
                    Point::new(320, 130),
                ),
                ClassifiedSegment::new(
                    LineClass::ServiceLineHalf,
                    Point::new(199, 130),
                    Point::new(79, 130),
                ),
            ]
        );
        assert!(result.anchors.get(LineClass::BaseLine).is_none());
    }

    #[test]
    fn test_other_counts_stay_unclassified() {
        let map = IntersectionMap {
            horizontal: vec![
                entry(0, row(100, &[10, 20, 30, 40])),
                entry(1, row(110, &[10, 20])),
                entry(2, row(120, &[10, 20, 30, 40, 50, 60])),
                entry(3, Vec::new()),
            ],
            vertical: Vec::new(),
        };
        let result = classify_horizontal(&map);
        assert!(result.segments.is_empty());
        assert!(result.anchors.is_empty());
        assert!(result.classified.is_empty());
    }

    #[test]
    fn test_first_anchor_wins() {
        let map = IntersectionMap {
            horizontal: vec![
                entry(0, row(130, &[79, 199, 320])),
                entry(1, row(140, &[80, 200, 321])),
            ],
            vertical: Vec::new(),
        };
        let result = classify_horizontal(&map);
        assert_eq!(result.segments.len(), 4);
        assert_eq!(result.anchors.len(), 2);
        assert_eq!(
            result.anchors.get(LineClass::ServiceLine).map(|s| s.origin),
            Some(Point::new(79, 130))
        );
    }

    #[test]
    fn test_missing_anchor_classes() {
        let full = classify_horizontal(&court_map());
        assert!(full.anchors.missing().is_empty());

        let empty = classify_horizontal(&IntersectionMap::default());
        assert_eq!(empty.anchors.missing().len(), 4);
    }

    #[test]
    fn test_without_service_line_only_doubles_are_named() {
        let mut map = court_map();
        map.horizontal.retain(|entry| entry.line != LineId(2));

        let horizontal = classify_horizontal(&map);
        assert_eq!(
            horizontal.anchors.missing(),
            vec![LineClass::ServiceLine, LineClass::ServiceLineHalf]
        );

        // Crossings on the service row match no anchor and are skipped
        let segments = classify_vertical(&map, &horizontal);
        let classes: Vec<LineClass> = segments.iter().map(|s| s.class).collect();
        assert_eq!(
            classes,
            vec![
                LineClass::BaseLine,
                LineClass::InnerBaseLine,
                LineClass::DoublesSideline,
                LineClass::DoublesSideline,
            ]
        );
        assert_eq!(segments[2].destination, Point::new(37, 0));
    }

    #[test]
    fn test_full_court_classification() {
        let map = court_map();
        let segments = classify(&map);

        assert_eq!(segments.len(), 9);
        assert_eq!(
            of_class(&segments, LineClass::DoublesSideline),
            vec![
                ClassifiedSegment::new(
                    LineClass::DoublesSideline,
                    Point::new(39, 220),
                    Point::new(37, 0),
                ),
                ClassifiedSegment::new(
                    LineClass::DoublesSideline,
                    Point::new(360, 220),
                    Point::new(358, 0),
                ),
            ]
        );
        assert_eq!(
            of_class(&segments, LineClass::SinglesSideline),
            vec![
                ClassifiedSegment::new(
                    LineClass::SinglesSideline,
                    Point::new(79, 220),
                    Point::new(77, 0),
                ),
                ClassifiedSegment::new(
                    LineClass::SinglesSideline,
                    Point::new(320, 220),
                    Point::new(318, 0),
                ),
            ]
        );
        assert_eq!(
            of_class(&segments, LineClass::CentreServiceLine),
            vec![ClassifiedSegment::new(
                LineClass::CentreServiceLine,
                Point::new(199, 130),
                Point::new(197, 0)
            )]
        );

        let visible = final_segments(&segments);
        assert_eq!(visible.len(), 7);
        assert!(visible.iter().all(|s| !s.class.is_internal()));
    }

    #[test]
    fn test_missing_service_line_keeps_doubles() {
        let mut map = court_map();
        map.horizontal.remove(0);
        let segments = classify(&map);

        assert_eq!(of_class(&segments, LineClass::DoublesSideline).len(), 2);
        assert!(of_class(&segments, LineClass::SinglesSideline).is_empty());
        assert!(of_class(&segments, LineClass::CentreServiceLine).is_empty());
    }

    #[test]
    fn test_missing_base_line_keeps_centre() {
        let mut map = court_map();
        map.horizontal.remove(1);
        let segments = classify(&map);

        // Singles need the inner base line as their origin
        assert!(of_class(&segments, LineClass::SinglesSideline).is_empty());
        assert!(of_class(&segments, LineClass::DoublesSideline).is_empty());
        assert_eq!(of_class(&segments, LineClass::CentreServiceLine).len(), 1);
    }

    #[test]
    fn test_no_anchor_matches_origin_point() {
        let map = IntersectionMap {
            horizontal: Vec::new(),
            vertical: vec![entry(0, vec![Point::new(0, 0), Point::new(0, 100)])],
        };
        assert!(classify(&map).is_empty());
    }

    #[test]
    fn test_single_point_vertical_is_skipped() {
        let mut map = court_map();
        map.vertical[0].points = vec![Point::new(39, 220)];
        let segments = classify(&map);
        // Matches the base line origin but has nothing to extrapolate from
        assert_eq!(of_class(&segments, LineClass::DoublesSideline).len(), 1);
    }

    #[test]
    fn test_upper_image_intercept() {
        assert_eq!(
            upper_image_intercept(Point::new(79, 130), Point::new(79, 220)),
            Some(Point::new(77, 0))
        );
        // m = 100 / 10, c = 100 - 10 * 30
        assert_eq!(
            upper_image_intercept(Point::new(30, 100), Point::new(39, 200)),
            Some(Point::new(20, 0))
        );
        assert_eq!(upper_image_intercept(Point::new(10, 50), Point::new(90, 50)), None);
        assert_eq!(upper_image_intercept(Point::new(10, 50), Point::new(9, 90)), None);
    }

    #[test]
    fn test_final_segments_hide_internal_classes() {
        let segments = vec![
            ClassifiedSegment::new(LineClass::BaseLine, Point::new(0, 0), Point::new(1, 0)),
            ClassifiedSegment::new(LineClass::InnerBaseLine, Point::new(0, 0), Point::new(1, 0)),
            ClassifiedSegment::new(LineClass::ServiceLineHalf, Point::new(0, 0), Point::new(1, 0)),
            ClassifiedSegment::new(LineClass::Unknown, Point::new(0, 0), Point::new(1, 0)),
            ClassifiedSegment::new(
                LineClass::CentreServiceLine,
                Point::new(0, 0),
                Point::new(0, 1),
            ),
        ];
        let visible = final_segments(&segments);
        assert_eq!(
            visible.iter().map(|s| s.class).collect::<Vec<_>>(),
            vec![LineClass::BaseLine, LineClass::CentreServiceLine]
        );
    }
}
