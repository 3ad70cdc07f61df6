//! Drawing projected object models onto a render target.

use augment_core::{Error, ModelKind, PatternSize, Pt2, Real, Result, Vec2};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};

/// RGB colour.
pub type Color = [u8; 3];

pub const RED: Color = [255, 0, 0];
pub const GREEN: Color = [0, 255, 0];
pub const BLUE: Color = [0, 0, 255];
pub const BLACK: Color = [0, 0, 0];

const CORNER_RADIUS: u32 = 10;
const AXIS_THICKNESS: u32 = 4;
const MESH_THICKNESS: u32 = 1;
const STAR_VERTEX_RADIUS: u32 = 5;
const STAR_EDGE_THICKNESS: u32 = 3;
const DETECTION_RADIUS: u32 = 4;

/// Minimal drawing surface.
pub trait RenderTarget {
    /// Filled circle.
    fn circle(&mut self, center: Pt2, radius: u32, color: Color);
    fn line(&mut self, from: Pt2, to: Pt2, color: Color, thickness: u32);
}

impl RenderTarget for RgbImage {
    fn circle(&mut self, center: Pt2, radius: u32, color: Color) {
        let r = Real::from(radius);
        let (w, h) = (Real::from(self.width()), Real::from(self.height()));
        if !(center.x.is_finite() && center.y.is_finite())
            || center.x < -r
            || center.y < -r
            || center.x > w + r
            || center.y > h + r
        {
            return;
        }
        let c = (center.x.round() as i32, center.y.round() as i32);
        draw_filled_circle_mut(self, c, radius as i32, Rgb(color));
    }

    fn line(&mut self, from: Pt2, to: Pt2, color: Color, thickness: u32) {
        let d = to - from;
        let len = d.norm();
        // Unit normal; a zero-length segment is drawn as a single pass.
        let (nx, ny) = if len > 0.0 {
            (-d.y / len, d.x / len)
        } else {
            (0.0, 0.0)
        };
        let half = Real::from(thickness.max(1) - 1) / 2.0;
        let bounds = (Real::from(self.width()), Real::from(self.height()));
        for k in 0..thickness.max(1) {
            let off = Real::from(k) - half;
            let o = Vec2::new(nx * off, ny * off);
            let Some((a, b)) = clip_segment(from + o, to + o, bounds) else {
                continue;
            };
            draw_line_segment_mut(
                self,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                Rgb(color),
            );
        }
    }
}

/// Liang-Barsky clip of `a`-`b` to `[-1, w] x [-1, h]`.
///
/// `None` if the segment misses the rectangle or has a non-finite endpoint.
fn clip_segment(a: Pt2, b: Pt2, (w, h): (Real, Real)) -> Option<(Pt2, Pt2)> {
    if !(a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite()) {
        return None;
    }
    let d = b - a;
    let (mut t0, mut t1): (Real, Real) = (0.0, 1.0);
    for (p, q) in [
        (-d.x, a.x + 1.0),
        (d.x, w - a.x),
        (-d.y, a.y + 1.0),
        (d.y, h - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }
    Some((a + d * t0, a + d * t1))
}

/// Recorded drawing call, for inspecting what a render routine emitted.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Pt2,
        radius: u32,
        color: Color,
    },
    Line {
        from: Pt2,
        to: Pt2,
        color: Color,
        thickness: u32,
    },
}

impl RenderTarget for Vec<DrawCommand> {
    fn circle(&mut self, center: Pt2, radius: u32, color: Color) {
        self.push(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn line(&mut self, from: Pt2, to: Pt2, color: Color, thickness: u32) {
        self.push(DrawCommand::Line {
            from,
            to,
            color,
            thickness,
        });
    }
}

/// Draw `points`, the projection of a model of the given kind.
pub fn render_model(kind: &ModelKind, points: &[Pt2], target: &mut dyn RenderTarget) -> Result<()> {
    if let Some(n) = kind.expected_point_count() {
        if points.len() != n {
            return Err(Error::invalid(format!(
                "{:?} overlay needs {n} points, got {}",
                kind.tag(),
                points.len()
            )));
        }
    }

    match kind {
        ModelKind::CornerMarkers => {
            for p in points {
                target.circle(*p, CORNER_RADIUS, RED);
            }
        }
        ModelKind::AxisMarkers => {
            for (tip, color) in points[1..].iter().zip([BLUE, GREEN, RED]) {
                target.line(points[0], *tip, color, AXIS_THICKNESS);
            }
        }
        ModelKind::Mesh { faces } => draw_mesh(faces, points, target)?,
        ModelKind::AnimatedPolygonPair => {
            draw_triangle(&points[..3], BLUE, GREEN, target);
            draw_triangle(&points[3..], GREEN, BLACK, target);
        }
    }
    Ok(())
}

/// Draw detected pattern corners in detection order.
///
/// Each run of `pattern.rows` corners gets its own colour and is joined by a
/// polyline; the last corner of a run links to the first of the next.
pub fn render_detections(corners: &[Pt2], pattern: PatternSize, target: &mut dyn RenderTarget) {
    const CYCLE: [Color; 3] = [RED, GREEN, BLUE];
    let run = pattern.rows.max(1);
    for (i, p) in corners.iter().enumerate() {
        let color = CYCLE[(i / run) % CYCLE.len()];
        if let Some(next) = corners.get(i + 1) {
            target.line(*p, *next, color, 1);
        }
        target.circle(*p, DETECTION_RADIUS, color);
    }
}

fn draw_mesh(faces: &[[usize; 3]], points: &[Pt2], target: &mut dyn RenderTarget) -> Result<()> {
    let vertex = |i: usize| {
        i.checked_sub(1)
            .and_then(|i| points.get(i))
            .copied()
            .ok_or_else(|| {
                Error::invalid(format!(
                    "face index {i} outside 1..={} projected vertices",
                    points.len()
                ))
            })
    };
    for face in faces {
        let [a, b, c] = [vertex(face[0])?, vertex(face[1])?, vertex(face[2])?];
        target.line(a, b, BLUE, MESH_THICKNESS);
        target.line(b, c, BLUE, MESH_THICKNESS);
        target.line(c, a, BLUE, MESH_THICKNESS);
    }
    Ok(())
}

fn draw_triangle(tri: &[Pt2], vertex_color: Color, edge_color: Color, target: &mut dyn RenderTarget) {
    for p in tri {
        target.circle(*p, STAR_VERTEX_RADIUS, vertex_color);
    }
    for i in 0..tri.len() {
        target.line(
            tri[i],
            tri[(i + 1) % tri.len()],
            edge_color,
            STAR_EDGE_THICKNESS,
        );
    }
}
