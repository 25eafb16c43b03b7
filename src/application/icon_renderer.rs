// Icon renderer - Weather glyphs composed from vector primitives
//
// Every routine works in units of `u`, half the icon cell height. Offsets and
// scale factors of the composite icons are tuned to the DMI icon set.
use crate::application::drawing_surface::{DrawingSurface, LineCap, LineJoin, Rgb, Stroke};
use crate::domain::icon::{IconType, darkness_ratio, effective_rain};
use std::f64::consts::{PI, TAU};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

const SUN_RAY: Rgb = Rgb::hex(0xe8a000);
const SUN_DISC: Rgb = Rgb::hex(0xffd700);
const SUN_RIM: Rgb = Rgb::hex(0xcc8800);
const RAIN: Rgb = Rgb::hex(0x2255aa);
const SNOW: Rgb = Rgb::hex(0x6699cc);
const BOLT_FILL: Rgb = Rgb::hex(0xffe000);
const BOLT_RIM: Rgb = Rgb::hex(0xc89000);
const FOG: Rgb = Rgb::hex(0xaab4be);
const STAR_FILL: Rgb = Rgb::hex(0xf8d400);
const STAR_RIM: Rgb = Rgb::hex(0xc89400);

/// Cloud colours at darkness 0 and 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudPalette {
    pub body: Rgb,
    pub underside: Rgb,
    pub outline: Rgb,
}

impl CloudPalette {
    pub const CLEAR: CloudPalette = CloudPalette {
        body: Rgb::hex(0xeef2f8),
        underside: Rgb::hex(0xa8b4c4),
        outline: Rgb::hex(0x788898),
    };

    pub const STORM: CloudPalette = CloudPalette {
        body: Rgb::hex(0x626a72),
        underside: Rgb::hex(0x323e4a),
        outline: Rgb::hex(0x242e38),
    };

    /// Palette for a precipitation amount in mm
    pub fn for_rain(rain: f64) -> CloudPalette {
        let t = darkness_ratio(rain);
        CloudPalette {
            body: Self::CLEAR.body.lerp(Self::STORM.body, t),
            underside: Self::CLEAR.underside.lerp(Self::STORM.underside, t),
            outline: Self::CLEAR.outline.lerp(Self::STORM.outline, t),
        }
    }
}

/// Draw one icon centred on `center`, `size` being the full cell height.
///
/// `precipitation` (mm) and `code` only affect cloud shading; the code sets a
/// darkness floor so severe weather never renders as a pale cloud.
pub fn draw_icon(
    surface: &mut dyn DrawingSurface,
    icon: IconType,
    center: Point,
    size: f64,
    precipitation: f64,
    code: Option<u32>,
) {
    surface.save();
    surface.translate(center.x, center.y);
    let u = size * 0.5;
    let rain = effective_rain(precipitation, code);

    match icon {
        IconType::Sun => sun(surface, 0.0, 0.0, u),
        IconType::NightClear => stars(surface, 0.0, 0.0, u),
        IconType::SunCloud => {
            sun(surface, -u * 0.44, -u * 0.44, u * 0.58);
            cloud(surface, u * 0.14, u * 0.22, u * 0.68, 0.0);
        }
        IconType::NightPartly => {
            stars(surface, -u * 0.50, -u * 0.40, u * 0.60);
            cloud(surface, u * 0.14, u * 0.24, u * 0.68, 0.0);
        }
        IconType::CloudSun => {
            sun(surface, -u * 0.46, -u * 0.46, u * 0.52);
            cloud(surface, u * 0.05, u * 0.08, u * 0.90, 0.0);
        }
        IconType::Cloud => cloud(surface, 0.0, 0.0, u, 0.0),
        IconType::Drizzle => {
            cloud(surface, 0.0, -u * 0.24, u, rain);
            rain_ticks(surface, 0.0, u * 0.54, u, 2);
        }
        IconType::Rain => {
            cloud(surface, 0.0, -u * 0.24, u, rain);
            rain_ticks(surface, 0.0, u * 0.54, u, 3);
        }
        IconType::Shower => {
            sun(surface, -u * 0.44, -u * 0.52, u * 0.50);
            cloud(surface, u * 0.05, u * 0.02, u * 0.88, rain);
            rain_ticks(surface, u * 0.05, u * 0.58, u, 3);
        }
        IconType::Snow => {
            cloud(surface, 0.0, -u * 0.24, u, 0.0);
            snowflakes(surface, 0.0, u * 0.56, u);
        }
        IconType::Thunder => {
            cloud(surface, 0.0, -u * 0.30, u, rain);
            bolt(surface, 0.0, u * 0.36, u);
        }
        IconType::Fog => {
            cloud(surface, 0.0, -u * 0.24, u, 0.0);
            fog_lines(surface, 0.0, u * 0.48, u);
        }
    }

    surface.restore();
}

fn line(surface: &mut dyn DrawingSurface, from: (f64, f64), to: (f64, f64), stroke: &Stroke) {
    surface.begin_path();
    surface.move_to(from.0, from.1);
    surface.line_to(to.0, to.1);
    surface.stroke(stroke);
}

/// Yellow disc with 8 short straight rays
fn sun(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64) {
    surface.save();
    surface.translate(ox, oy);
    let disc = u * 0.36;
    let inner = disc + u * 0.06;
    let outer = disc + u * 0.30;

    let rays = Stroke::new(SUN_RAY, (u * 0.09).max(0.8));
    for i in 0..8 {
        let a = i as f64 / 8.0 * TAU;
        let (sin, cos) = a.sin_cos();
        line(surface, (cos * inner, sin * inner), (cos * outer, sin * outer), &rays);
    }

    surface.begin_path();
    surface.arc(0.0, 0.0, disc, 0.0, TAU, false);
    surface.fill(SUN_DISC);
    surface.stroke(&Stroke::new(SUN_RIM, (u * 0.05).max(0.5)));
    surface.restore();
}

#[derive(Debug, Clone, Copy)]
struct Bump {
    x: f64,
    y: f64,
    r: f64,
}

/// Far-left small, left-centre medium, right-centre large peak, far-right medium
fn cloud_bumps(u: f64) -> [Bump; 4] {
    [
        Bump { x: -u * 0.50, y: u * 0.08, r: u * 0.26 },
        Bump { x: -u * 0.14, y: -u * 0.08, r: u * 0.38 },
        Bump { x: u * 0.22, y: -u * 0.18, r: u * 0.44 },
        Bump { x: u * 0.56, y: 0.0, r: u * 0.32 },
    ]
}

/// Trace the cloud silhouette as one closed path.
///
/// Each bump contributes the arc over its top, handing off to the next bump
/// in the direction of that bump's centre, so overlaps leave no seams.
fn trace_cloud(surface: &mut dyn DrawingSurface, u: f64) {
    let bumps = cloud_bumps(u);
    let n = bumps.len();
    let bottom = u * 0.36;
    let toward = |from: &Bump, to: &Bump| (to.y - from.y).atan2(to.x - from.x);

    surface.begin_path();
    surface.move_to(bumps[0].x - bumps[0].r * 0.7, bottom);
    for (i, bump) in bumps.iter().enumerate() {
        let start = if i > 0 { toward(bump, &bumps[i - 1]) } else { PI };
        let end = if i < n - 1 { toward(bump, &bumps[i + 1]) } else { 0.0 };
        // Increasing angle from the left hand-off runs over the top of the bump
        surface.arc(bump.x, bump.y, bump.r, start, end, false);
    }
    surface.line_to(bumps[n - 1].x + bumps[n - 1].r * 0.7, bottom);
    surface.close_path();
}

/// Multi-bump cloud with flat bottom, shaded by precipitation
fn cloud(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64, rain: f64) {
    let palette = CloudPalette::for_rain(rain);
    surface.save();
    surface.translate(ox, oy);

    // Underside shadow: the silhouette dropped slightly
    surface.save();
    surface.translate(0.0, u * 0.10);
    trace_cloud(surface, u);
    surface.fill(palette.underside);
    surface.restore();

    trace_cloud(surface, u);
    surface.fill(palette.body);
    surface.stroke(&Stroke::new(palette.outline, (u * 0.07).max(0.8)).join(LineJoin::Round));
    surface.restore();
}

/// `n` short parallel diagonal ticks
fn rain_ticks(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64, n: usize) {
    surface.save();
    surface.translate(ox, oy);
    let stroke = Stroke::new(RAIN, (u * 0.08).max(0.8)).cap(LineCap::Round);
    let spacing = u * 0.28;
    let x0 = -((n as f64 - 1.0) / 2.0) * spacing;
    for i in 0..n {
        let x = x0 + i as f64 * spacing;
        line(surface, (x, 0.0), (x - u * 0.07, u * 0.30), &stroke);
    }
    surface.restore();
}

/// Three flakes: a vertical bar with a chevron above and below the centre
fn snowflakes(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64) {
    surface.save();
    surface.translate(ox, oy);
    let stroke = Stroke::new(SNOW, (u * 0.08).max(0.8)).cap(LineCap::Round);
    for i in 0..3 {
        let x = (i as f64 - 1.0) * u * 0.30;
        line(surface, (x, -u * 0.20), (x, u * 0.20), &stroke);
        for arm in [-u * 0.10, u * 0.10] {
            surface.begin_path();
            surface.move_to(x - u * 0.12, arm);
            surface.line_to(x, 0.0);
            surface.line_to(x + u * 0.12, arm);
            surface.stroke(&stroke);
        }
    }
    surface.restore();
}

/// Filled zigzag lightning bolt
fn bolt(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64) {
    const OUTLINE: [(f64, f64); 6] = [
        (0.14, -0.02),
        (-0.04, 0.22),
        (0.06, 0.22),
        (-0.14, 0.50),
        (0.04, 0.24),
        (-0.06, 0.24),
    ];

    surface.save();
    surface.translate(ox, oy);
    surface.begin_path();
    for (i, (x, y)) in OUTLINE.iter().enumerate() {
        if i == 0 {
            surface.move_to(u * x, u * y);
        } else {
            surface.line_to(u * x, u * y);
        }
    }
    surface.close_path();
    surface.fill(BOLT_FILL);
    surface.stroke(&Stroke::new(BOLT_RIM, (u * 0.05).max(0.6)).join(LineJoin::Round));
    surface.restore();
}

fn fog_lines(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64) {
    surface.save();
    surface.translate(ox, oy);
    let stroke = Stroke::new(FOG, (u * 0.09).max(0.8)).cap(LineCap::Round);
    for i in 0..2 {
        let y = i as f64 * u * 0.24;
        line(surface, (-u * 0.42, y), (u * 0.42, y), &stroke);
    }
    surface.restore();
}

/// Four scattered 8-point sparkle stars
fn stars(surface: &mut dyn DrawingSurface, ox: f64, oy: f64, u: f64) {
    let sparkles = [
        (-u * 0.40, -u * 0.44, u * 0.26),
        (u * 0.36, -u * 0.24, u * 0.19),
        (u * 0.08, u * 0.40, u * 0.15),
        (-u * 0.16, u * 0.10, u * 0.12),
    ];

    surface.save();
    surface.translate(ox, oy);
    for (x, y, r) in sparkles {
        surface.save();
        surface.translate(x, y);
        surface.begin_path();
        for i in 0..8 {
            let a = i as f64 / 8.0 * TAU - PI / 2.0;
            // Sharp inner radius gives pointy tips
            let rr = if i % 2 == 0 { r } else { r * 0.25 };
            let (px, py) = (a.cos() * rr, a.sin() * rr);
            if i == 0 {
                surface.move_to(px, py);
            } else {
                surface.line_to(px, py);
            }
        }
        surface.close_path();
        surface.fill(STAR_FILL);
        surface.stroke(&Stroke::new(STAR_RIM, (r * 0.08).max(0.4)));
        surface.restore();
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Fill(Rgb),
        Stroke(Rgb),
    }

    /// Surface recording paint operations and the extent of every path point
    struct RecordingSurface {
        offset: (f64, f64),
        saved: Vec<(f64, f64)>,
        ops: Vec<Op>,
        min: (f64, f64),
        max: (f64, f64),
    }

    impl RecordingSurface {
        fn new() -> Self {
            Self {
                offset: (0.0, 0.0),
                saved: Vec::new(),
                ops: Vec::new(),
                min: (f64::INFINITY, f64::INFINITY),
                max: (f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        fn extend(&mut self, x: f64, y: f64) {
            let (x, y) = (x + self.offset.0, y + self.offset.1);
            self.min = (self.min.0.min(x), self.min.1.min(y));
            self.max = (self.max.0.max(x), self.max.1.max(y));
        }

        fn fills(&self) -> Vec<Rgb> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Fill(c) => Some(*c),
                    _ => None,
                })
                .collect()
        }
    }

    impl DrawingSurface for RecordingSurface {
        fn save(&mut self) {
            self.saved.push(self.offset);
        }
        fn restore(&mut self) {
            self.offset = self.saved.pop().expect("restore without save");
        }
        fn translate(&mut self, dx: f64, dy: f64) {
            self.offset = (self.offset.0 + dx, self.offset.1 + dy);
        }
        fn begin_path(&mut self) {}
        fn move_to(&mut self, x: f64, y: f64) {
            self.extend(x, y);
        }
        fn line_to(&mut self, x: f64, y: f64) {
            self.extend(x, y);
        }
        fn arc(&mut self, cx: f64, cy: f64, radius: f64, _start: f64, _end: f64, _acw: bool) {
            // Conservative: the whole circle
            self.extend(cx - radius, cy - radius);
            self.extend(cx + radius, cy + radius);
        }
        fn close_path(&mut self) {}
        fn fill(&mut self, color: Rgb) {
            self.ops.push(Op::Fill(color));
        }
        fn stroke(&mut self, stroke: &Stroke) {
            self.ops.push(Op::Stroke(stroke.color));
        }
    }

    fn render(icon: IconType, rain: f64, code: Option<u32>) -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        draw_icon(&mut surface, icon, Point::new(50.0, 40.0), 40.0, rain, code);
        surface
    }

    #[test]
    fn test_every_icon_stays_inside_its_cell() {
        for icon in IconType::ALL {
            let surface = render(icon, 0.0, None);
            assert!(!surface.ops.is_empty(), "{} drew nothing", icon);
            // u = 20, centre (50, 40)
            assert!(surface.min.0 >= 50.0 - 22.0 && surface.max.0 <= 50.0 + 22.0, "{} x {:?}..{:?}", icon, surface.min, surface.max);
            assert!(surface.min.1 >= 40.0 - 22.0 && surface.max.1 <= 40.0 + 22.0, "{} y {:?}..{:?}", icon, surface.min, surface.max);
            assert!(surface.saved.is_empty(), "{} left unbalanced save", icon);
            assert_eq!(surface.offset, (0.0, 0.0));
        }
    }

    #[test]
    fn test_cloud_palette_endpoints() {
        assert_eq!(CloudPalette::for_rain(0.0), CloudPalette::CLEAR);
        assert_eq!(CloudPalette::for_rain(6.0), CloudPalette::STORM);
        assert_eq!(CloudPalette::for_rain(30.0), CloudPalette::STORM);
    }

    #[test]
    fn test_code_floor_darkens_dry_thunder_cloud() {
        let dry = render(IconType::Thunder, 0.0, None);
        let coded = render(IconType::Thunder, 0.0, Some(95));

        let pale = CloudPalette::CLEAR.body;
        assert!(dry.fills().contains(&pale));
        assert!(!coded.fills().contains(&pale));
        assert!(coded.fills().contains(&CloudPalette::for_rain(0.70 * 6.0).body));
    }

    #[test]
    fn test_measured_rain_above_floor_wins() {
        let heavy = render(IconType::Rain, 6.0, Some(61));
        assert!(heavy.fills().contains(&CloudPalette::STORM.body));
    }

    #[test]
    fn test_snow_and_fog_clouds_stay_pale() {
        for icon in [IconType::Snow, IconType::Fog, IconType::Cloud] {
            let surface = render(icon, 5.0, Some(95));
            assert!(surface.fills().contains(&CloudPalette::CLEAR.body), "{}", icon);
        }
    }

    #[test]
    fn test_glyph_composition() {
        let count = |s: &RecordingSurface, color: Rgb| {
            s.ops.iter().filter(|op| **op == Op::Stroke(color)).count()
        };

        // 8 rays + disc rim
        let sun_only = render(IconType::Sun, 0.0, None);
        assert_eq!(count(&sun_only, SUN_RAY), 8);
        assert_eq!(count(&sun_only, SUN_RIM), 1);

        assert_eq!(count(&render(IconType::Drizzle, 0.0, None), RAIN), 2);
        assert_eq!(count(&render(IconType::Rain, 0.0, None), RAIN), 3);
        assert_eq!(count(&render(IconType::Shower, 0.0, None), RAIN), 3);
        // bar + two chevrons per flake
        assert_eq!(count(&render(IconType::Snow, 0.0, None), SNOW), 9);
        assert_eq!(count(&render(IconType::Fog, 0.0, None), FOG), 2);
        assert_eq!(count(&render(IconType::NightClear, 0.0, None), STAR_RIM), 4);
        assert_eq!(count(&render(IconType::Thunder, 0.0, None), BOLT_RIM), 1);
    }
}
