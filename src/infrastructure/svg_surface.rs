// SVG drawing surface
use crate::application::drawing_surface::{
    DrawingSurface, LineCap, LineJoin, RenderTarget, Rgb, Stroke, SurfaceFactory,
};
use std::f64::consts::{PI, TAU};

const EPSILON: f64 = 1e-9;

/// Records drawing calls as SVG `<path>` elements.
#[derive(Debug, Default)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    offset: (f64, f64),
    saved: Vec<(f64, f64)>,
    path: String,
    current: Option<(f64, f64)>,
    subpath_start: Option<(f64, f64)>,
    elements: Vec<String>,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    fn device(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.offset.0, y + self.offset.1)
    }

    fn push_point(&mut self, command: char, point: (f64, f64)) {
        self.path
            .push_str(&format!("{}{} {} ", command, fmt_num(point.0), fmt_num(point.1)));
        self.current = Some(point);
    }

    fn arc_segment(&mut self, radius: f64, large: bool, sweep: bool, to: (f64, f64)) {
        self.path.push_str(&format!(
            "A{r} {r} 0 {} {} {} {} ",
            large as u8,
            sweep as u8,
            fmt_num(to.0),
            fmt_num(to.1),
            r = fmt_num(radius)
        ));
        self.current = Some(to);
    }

    /// Finish the document
    pub fn into_svg(self) -> String {
        let mut svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            w = fmt_num(self.width),
            h = fmt_num(self.height)
        );
        for element in &self.elements {
            svg.push_str(element);
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Compact number formatting: two decimals, trailing zeros trimmed
fn fmt_num(value: f64) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

impl RenderTarget for SvgSurface {
    fn surface(&mut self) -> &mut dyn DrawingSurface {
        self
    }

    fn finish(self: Box<Self>) -> String {
        self.into_svg()
    }
}

/// Hands out empty SVG documents
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgSurfaceFactory;

impl SurfaceFactory for SvgSurfaceFactory {
    fn create(&self, width: f64, height: f64) -> Box<dyn RenderTarget> {
        Box::new(SvgSurface::new(width, height))
    }
}

fn cap_name(cap: LineCap) -> &'static str {
    match cap {
        LineCap::Butt => "butt",
        LineCap::Round => "round",
    }
}

fn join_name(join: LineJoin) -> &'static str {
    match join {
        LineJoin::Miter => "miter",
        LineJoin::Round => "round",
    }
}

impl DrawingSurface for SvgSurface {
    fn save(&mut self) {
        self.saved.push(self.offset);
    }

    fn restore(&mut self) {
        if let Some(offset) = self.saved.pop() {
            self.offset = offset;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.offset = (self.offset.0 + dx, self.offset.1 + dy);
    }

    fn begin_path(&mut self) {
        self.path.clear();
        self.current = None;
        self.subpath_start = None;
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let point = self.device(x, y);
        self.push_point('M', point);
        self.subpath_start = Some(point);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let point = self.device(x, y);
        if self.current.is_none() {
            self.move_to(x, y);
        } else {
            self.push_point('L', point);
        }
    }

    fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, anticlockwise: bool) {
        let (cx, cy) = self.device(cx, cy);
        let at = |angle: f64| (cx + radius * angle.cos(), cy + radius * angle.sin());

        let sweep = if anticlockwise { start - end } else { end - start };
        let full_circle = sweep >= TAU - EPSILON;
        let span = if full_circle { TAU } else { sweep.rem_euclid(TAU) };

        let from = at(start);
        if self.current.is_none() {
            self.push_point('M', from);
            self.subpath_start = Some(from);
        } else {
            self.push_point('L', from);
        }
        if span < EPSILON {
            return;
        }

        // SVG sweep-flag 1 runs toward increasing angles, the canvas's clockwise
        let sweep_flag = !anticlockwise;
        let direction = if anticlockwise { -1.0 } else { 1.0 };
        if full_circle {
            // A single SVG arc cannot close on itself
            self.arc_segment(radius, false, sweep_flag, at(start + direction * PI));
            self.arc_segment(radius, false, sweep_flag, at(start));
        } else {
            self.arc_segment(radius, span > PI, sweep_flag, at(start + direction * span));
        }
    }

    fn close_path(&mut self) {
        self.path.push_str("Z ");
        self.current = self.subpath_start;
    }

    fn fill(&mut self, color: Rgb) {
        if self.path.is_empty() {
            return;
        }
        self.elements.push(format!(
            "<path d=\"{}\" fill=\"{}\"/>",
            self.path.trim_end(),
            color
        ));
    }

    fn stroke(&mut self, stroke: &Stroke) {
        if self.path.is_empty() {
            return;
        }
        self.elements.push(format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\" stroke-linecap=\"{}\" stroke-linejoin=\"{}\"/>",
            self.path.trim_end(),
            stroke.color,
            fmt_num(stroke.width),
            cap_name(stroke.cap),
            join_name(stroke.join)
        ));
    }
}
