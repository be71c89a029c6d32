//! Headless demo driver: loads synthetic flows, replays a scripted
//! interaction session, and prints what each frame would draw.

use foundation::math::sphere::LonLat;
use scene::countries::{CountryCollection, CountryPolygon};
use viewer::config::GlobeOptions;
use viewer::controller::TickOutcome;
use viewer::gestures::GestureHandler;
use viewer::session::{GlobeSession, SurfaceSize};
use streaming::error::FetchError;
use streaming::loader::{PageRequest, RowSource};
use streaming::rows::{Cell, FlowRow};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let options: GlobeOptions = serde_json::from_str(
        r#"{
            "destination_sizing": true,
            "show_point_limit_warning": true,
            "point_limit": 100
        }"#,
    )
    .map_err(|e| format!("options: {e}"))?;

    let mut session = GlobeSession::new(
        SurfaceSize::new(960.0, 720.0),
        &options,
        demo_countries(),
    )
    .map_err(|e| format!("setup: {e}"))?;

    session.load(&mut DemoSource::new(40));
    print_frame("after load", &session);

    // Initial reveal, run to completion.
    session.start_reveal();
    while session.tick() != TickOutcome::Completed {}
    print_frame("after reveal", &session);

    // Drag east, then zoom in twice.
    session.on_drag_start();
    session.on_drag_move(80.0, -20.0);
    session.on_drag_end();
    session.zoom_in();
    session.zoom_in();
    print_frame("after drag + zoom", &session);

    // Click the first visible origin point, then reset home.
    if let Some(point) = session
        .current_frame()
        .points
        .iter()
        .find(|p| p.visible && p.is_origin)
    {
        let at = point.screen;
        session.click(at);
        for intent in session.take_intents() {
            println!("intent: {intent:?}");
        }
    }
    session.reset_home();
    while session.tick() != TickOutcome::Completed {}
    print_frame("after reset", &session);

    session.teardown();
    Ok(())
}

fn print_frame(label: &str, session: &GlobeSession) {
    let frame = session.current_frame();
    let visible_points = frame.points.iter().filter(|p| p.visible).count();
    println!(
        "{label}: {} arcs, {visible_points}/{} points visible, {} countries, zoom {}%",
        frame.arcs.len(),
        frame.points.len(),
        frame.countries.len(),
        frame.zoom_percent
    );
    if let Some(warning) = &frame.warning {
        println!("  warning: {warning}");
    }
    if let Some(error) = &frame.error {
        println!("  error: {error}");
    }
}

/// A deterministic in-memory source: one hub fanning out along a spiral.
struct DemoSource {
    rows: Vec<FlowRow>,
}

impl DemoSource {
    fn new(count: u32) -> Self {
        let mut rows = Vec::new();
        for i in 0..count {
            let angle = f64::from(i) * 23.0;
            let lon = ((angle + 180.0).rem_euclid(360.0)) - 180.0;
            let lat = -60.0 + f64::from(i % 25) * 5.0;
            rows.push(FlowRow([
                Cell::number(10.0),
                Cell::number(8.0),
                Cell::label("hub", 0),
                Cell::number(lat),
                Cell::number(lon),
                Cell::label(format!("city-{i}"), i + 1),
                Cell::number(f64::from(1 + i % 9)),
                Cell::number(f64::from(i % 13)),
            ]));
        }
        Self { rows }
    }
}

impl RowSource for DemoSource {
    fn fetch(&mut self, request: PageRequest) -> Result<Vec<FlowRow>, FetchError> {
        let start = request.offset.min(self.rows.len());
        let end = (request.offset + request.height).min(self.rows.len());
        Ok(self.rows[start..end].to_vec())
    }
}

fn demo_countries() -> CountryCollection {
    let square = |name: &str, lon0: f64, lat0: f64, side: f64| {
        CountryPolygon::new(
            name,
            vec![vec![
                LonLat::new(lon0, lat0),
                LonLat::new(lon0 + side, lat0),
                LonLat::new(lon0 + side, lat0 + side),
                LonLat::new(lon0, lat0 + side),
                LonLat::new(lon0, lat0),
            ]],
        )
    };
    CountryCollection::new(vec![
        square("westland", -40.0, -10.0, 30.0),
        square("eastland", 5.0, 0.0, 25.0),
        square("northland", -15.0, 45.0, 20.0),
    ])
}
