// Icon service - Use case for rendering weather icons into documents
use crate::application::drawing_surface::SurfaceFactory;
use crate::application::icon_renderer::{Point, draw_icon};
use crate::domain::icon::{IconType, classify_icon};
use crate::domain::sun_times::SunTimeTable;
use std::sync::Arc;

pub const DEFAULT_ICON_SIZE: f64 = 48.0;
const MIN_ICON_SIZE: f64 = 8.0;
const MAX_ICON_SIZE: f64 = 512.0;

/// One weather observation to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub code: u32,
    pub time: Option<String>,
    pub precipitation: f64,
}

#[derive(Clone)]
pub struct IconService {
    sun_times: Arc<SunTimeTable>,
    surfaces: Arc<dyn SurfaceFactory>,
}

impl IconService {
    pub fn new(sun_times: Arc<SunTimeTable>, surfaces: Arc<dyn SurfaceFactory>) -> Self {
        Self {
            sun_times,
            surfaces,
        }
    }

    pub fn classify(&self, code: u32, time: Option<&str>) -> IconType {
        classify_icon(code, time, &self.sun_times)
    }

    /// Classify an observation and render it
    pub fn render_observation(&self, observation: &Observation, size: f64) -> (IconType, String) {
        let icon = self.classify(observation.code, observation.time.as_deref());
        let svg = self.render(icon, observation.precipitation, Some(observation.code), size);
        (icon, svg)
    }

    /// Render an icon type into a square document of `size` pixels
    pub fn render(&self, icon: IconType, precipitation: f64, code: Option<u32>, size: f64) -> String {
        let size = if size.is_finite() {
            size.clamp(MIN_ICON_SIZE, MAX_ICON_SIZE)
        } else {
            DEFAULT_ICON_SIZE
        };
        // Glyphs reach about 1.1 half-sizes from centre
        let cell = size * 1.1;
        let mut target = self.surfaces.create(cell, cell);
        draw_icon(
            target.surface(),
            icon,
            Point::new(cell / 2.0, cell / 2.0),
            size,
            precipitation,
            code,
        );
        tracing::debug!("Rendered {} icon at {}px", icon, size);
        target.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::drawing_surface::{DrawingSurface, RenderTarget, Rgb, Stroke};
    use crate::domain::sun_times::SunTimes;
    use crate::infrastructure::svg_surface::SvgSurfaceFactory;
    use std::sync::Mutex;

    fn table() -> Arc<SunTimeTable> {
        let mut table = SunTimeTable::new();
        table.insert("2024-06-15", SunTimes::new(4.5, 21.8));
        Arc::new(table)
    }

    fn service() -> IconService {
        IconService::new(table(), Arc::new(SvgSurfaceFactory))
    }

    /// Counts fills and reports the requested cell size
    struct CountingTarget {
        width: f64,
        fills: usize,
    }

    impl DrawingSurface for CountingTarget {
        fn save(&mut self) {}
        fn restore(&mut self) {}
        fn translate(&mut self, _dx: f64, _dy: f64) {}
        fn begin_path(&mut self) {}
        fn move_to(&mut self, _x: f64, _y: f64) {}
        fn line_to(&mut self, _x: f64, _y: f64) {}
        fn arc(&mut self, _cx: f64, _cy: f64, _r: f64, _start: f64, _end: f64, _ccw: bool) {}
        fn close_path(&mut self) {}
        fn fill(&mut self, _color: Rgb) {
            self.fills += 1;
        }
        fn stroke(&mut self, _stroke: &Stroke) {}
    }

    impl RenderTarget for CountingTarget {
        fn surface(&mut self) -> &mut dyn DrawingSurface {
            self
        }

        fn finish(self: Box<Self>) -> String {
            format!("{}x{}", self.width, self.fills)
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        requested: Mutex<Vec<(f64, f64)>>,
    }

    impl SurfaceFactory for CountingFactory {
        fn create(&self, width: f64, height: f64) -> Box<dyn RenderTarget> {
            self.requested.lock().unwrap().push((width, height));
            Box::new(CountingTarget { width, fills: 0 })
        }
    }

    #[test]
    fn test_render_uses_injected_surface() {
        let factory = Arc::new(CountingFactory::default());
        let service = IconService::new(table(), factory.clone());

        // Sun: disc fill only
        assert_eq!(service.render(IconType::Sun, 0.0, None, 40.0), "44x1");
        assert_eq!(*factory.requested.lock().unwrap(), vec![(44.0, 44.0)]);
    }

    #[test]
    fn test_rain_scenario() {
        let observation = Observation {
            code: 61,
            time: Some("2024-06-15T14:30".to_string()),
            precipitation: 0.0,
        };
        let (icon, svg) = service().render_observation(&observation, 48.0);

        assert_eq!(icon, IconType::Rain);
        // Cloud shaded for 1.8mm even though none was measured
        let floor = crate::domain::icon::effective_rain(0.0, Some(61));
        assert!((floor - 1.8).abs() < 1e-9);
        let body = crate::application::icon_renderer::CloudPalette::for_rain(floor).body;
        assert!(svg.contains(&format!("fill=\"{}\"", body)), "{}", svg);
    }

    #[test]
    fn test_night_observation() {
        let observation = Observation {
            code: 0,
            time: Some("2024-06-15T23:00".to_string()),
            precipitation: 0.0,
        };
        let (icon, _) = service().render_observation(&observation, 48.0);
        assert_eq!(icon, IconType::NightClear);
    }

    #[test]
    fn test_every_icon_renders_well_formed_svg() {
        let service = service();
        for icon in IconType::ALL {
            let svg = service.render(icon, 2.0, None, 48.0);
            assert!(svg.starts_with("<svg "), "{}", icon);
            assert!(svg.ends_with("</svg>"), "{}", icon);
            assert!(svg.matches("<path ").count() >= 2, "{}", icon);
            assert!(!svg.contains("NaN"), "{}", icon);
        }
    }

    #[test]
    fn test_size_is_clamped() {
        let service = service();
        let tiny = service.render(IconType::Sun, 0.0, None, 1.0);
        assert!(tiny.contains("width=\"8.8\""), "{}", tiny);

        let fallback = service.render(IconType::Sun, 0.0, None, f64::NAN);
        assert!(fallback.contains("width=\"52.8\""), "{}", fallback);
    }
}
