//! The render session: one surface, one shared projection, one owner.
//!
//! `GlobeSession` is the explicit session-scoped context that every
//! component reads through: projection, selection, cache, flows, country
//! polygons, configuration, trace bus, and cancellation epoch all live
//! here, are created together at surface setup, and die together at
//! teardown. Every accepted mutation synchronously recomputes the full
//! visible set; the embedding only ever draws the latest `RenderFrame`.

use foundation::math::Vec2;
use foundation::math::ortho::Orthographic;
use layers::arcs::FlowArcLayer;
use layers::cache::PathCache;
use layers::outlines::OutlineLayer;
use layers::points::{PointLayer, PointSizing};
use layers::symbology::{arc_opacity, country_shade, flow_width};
use runtime::animation::CameraPose;
use runtime::cancel::Epoch;
use runtime::event_bus::{EventBus, EventKind};
use runtime::frame::Frame;
use scene::countries::CountryCollection;
use scene::flow::{FlowRecord, PointEntity, build_point_entities};
use scene::selection::{SelectionChange, SelectionMachine};
use scene::snapshot::SelectionSnapshot;
use streaming::loader::{FlowLoader, LoadOutcome, RowSource};
use tracing::{debug, info, warn};

use crate::config::{GlobeConfig, GlobeOptions};
use crate::controller::{GestureMode, InteractionController, TickOutcome, surface_center};
use crate::error::SetupError;
use crate::frame::{ArcRender, CountryShape, RenderFrame};
use crate::gestures::GestureHandler;
use crate::intent::{
    DESTINATION_LABEL_COLUMN, ORIGIN_LABEL_COLUMN, SelectionIntent, SelectionSink,
};
use crate::picking::{Hit, PickSettings, pick};

/// Home rotation: the reset/initial view.
pub const HOME_ROTATION: [f64; 3] = [0.0, -25.0, 0.0];
/// The reveal animation enters from the side.
pub const REVEAL_ROTATION: [f64; 3] = [90.0, -25.0, 0.0];

pub const RESET_DURATION_S: f64 = 1.0;
pub const REVEAL_DURATION_S: f64 = 2.0;
pub const GO_TO_SELECTION_DURATION_S: f64 = 1.0;

/// Fixed tick rate for animation frames.
pub const TICK_DT_S: f64 = 1.0 / 60.0;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub struct GlobeSession {
    config: GlobeConfig,
    /// Globe radius implied by the surface, in pixels.
    radius: f64,
    projection: Orthographic,
    controller: InteractionController,
    selection: SelectionMachine,
    cache: PathCache,
    flows: Vec<FlowRecord>,
    points: Vec<PointEntity>,
    countries: CountryCollection,
    arc_layer: FlowArcLayer,
    point_layer: PointLayer,
    outline_layer: OutlineLayer,
    bus: EventBus,
    epoch: Epoch,
    frame: Frame,
    locked: bool,
    warning: Option<String>,
    data_error: Option<String>,
    pending_intents: Vec<SelectionIntent>,
    current: RenderFrame,
    torn_down: bool,
}

impl GlobeSession {
    /// Build a session for a surface.
    ///
    /// The only fatal error in the engine: a surface without positive,
    /// finite dimensions cannot host a projection at all.
    pub fn new(
        size: SurfaceSize,
        options: &GlobeOptions,
        countries: CountryCollection,
    ) -> Result<Self, SetupError> {
        if !(size.width.is_finite() && size.height.is_finite())
            || size.width <= 0.0
            || size.height <= 0.0
        {
            return Err(SetupError::InvalidSurface {
                width: size.width,
                height: size.height,
            });
        }

        let config = options.resolve();
        let radius = size.width.min(size.height) / 2.5;
        let min_scale = radius * config.min_zoom_scale;
        let max_scale = radius * config.max_zoom_scale;
        let initial_scale = radius * config.initial_zoom;

        let projection = Orthographic::new(
            HOME_ROTATION,
            initial_scale,
            surface_center(size.width, size.height),
        );
        let controller = InteractionController::new(
            min_scale,
            max_scale,
            config.zoom_speed,
            config.wheel_zoom_enabled,
        );

        let mut session = Self {
            config,
            radius,
            projection,
            controller,
            selection: SelectionMachine::new(),
            cache: PathCache::new(),
            flows: Vec::new(),
            points: Vec::new(),
            countries,
            arc_layer: FlowArcLayer::new(1),
            point_layer: PointLayer::new(2),
            outline_layer: OutlineLayer::new(3),
            bus: EventBus::new(),
            epoch: Epoch::new(),
            frame: Frame::new(0, TICK_DT_S),
            locked: false,
            warning: None,
            data_error: None,
            pending_intents: Vec::new(),
            current: RenderFrame::default(),
            torn_down: false,
        };
        session.redraw();
        Ok(session)
    }

    pub fn config(&self) -> &GlobeConfig {
        &self.config
    }

    pub fn projection(&self) -> &Orthographic {
        &self.projection
    }

    pub fn selection(&self) -> &SelectionMachine {
        &self.selection
    }

    pub fn epoch(&self) -> &Epoch {
        &self.epoch
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn controller_mode(&self) -> GestureMode {
        self.controller.mode()
    }

    /// The latest fully recomputed frame.
    pub fn current_frame(&self) -> &RenderFrame {
        &self.current
    }

    /// Host-side interaction lock; while set, point/arc/country clicks are
    /// ignored entirely.
    pub fn set_interaction_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    // ------------------------------------------------------------------
    // Data intake
    // ------------------------------------------------------------------

    /// A loader stamped against the current session epoch.
    ///
    /// Asynchronous hosts drive `next_request`/`apply_page` themselves and
    /// hand the loader back to `finish_load`.
    pub fn begin_load(&mut self) -> FlowLoader {
        self.data_error = None;
        self.warning = None;
        FlowLoader::new(self.config.point_limit, self.epoch.stamp())
    }

    /// Ingest a completed load, unless the surface epoch moved on.
    pub fn finish_load(&mut self, loader: FlowLoader) -> bool {
        if self.torn_down || !self.epoch.is_current(loader.stamp()) {
            debug!("discarding load for a torn-down surface");
            return false;
        }

        match loader.outcome().cloned() {
            Some(LoadOutcome::Failed(err)) => {
                warn!(error = %err, "data load failed");
                self.data_error = Some(err.to_string());
            }
            Some(LoadOutcome::Truncated { .. }) if self.config.show_point_limit_warning => {
                self.warning = Some(self.config.warning_text());
            }
            _ => {}
        }

        let pages = loader.pages_fetched();
        self.flows = loader.into_rows().iter().map(|r| r.to_record()).collect();
        self.points = build_point_entities(&self.flows);
        self.cache.clear();
        info!(
            pages,
            flows = self.flows.len(),
            points = self.points.len(),
            "flow data loaded"
        );
        self.bus.emit(
            self.frame,
            EventKind::Data,
            format!("loaded {} flows over {} pages", self.flows.len(), pages),
        );
        self.redraw();
        true
    }

    /// Blocking load convenience for synchronous sources.
    pub fn load(&mut self, source: &mut dyn RowSource) -> LoadOutcome {
        let mut loader = self.begin_load();
        let outcome = loader.run(&self.epoch, source);
        self.finish_load(loader);
        outcome
    }

    // ------------------------------------------------------------------
    // Programmatic transitions
    // ------------------------------------------------------------------

    /// Initial reveal: swing in from the side to the home view.
    pub fn start_reveal(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.projection.set_rotate_deg(REVEAL_ROTATION);
        let to = CameraPose::new(HOME_ROTATION, self.projection.scale());
        let started =
            self.controller
                .start_transition(&self.projection, to, self.frame.time, REVEAL_DURATION_S);
        if started {
            self.bus
                .emit(self.frame, EventKind::Animation, "reveal started");
            self.redraw();
        }
        started
    }

    /// Home button: clear the selection and glide back to the initial view.
    pub fn reset_home(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.selection.clear();
        let to = CameraPose::new(HOME_ROTATION, self.radius * self.config.initial_zoom);
        let started = self.controller.start_transition(
            &self.projection,
            to,
            self.frame.time,
            RESET_DURATION_S,
        );
        self.bus.emit(self.frame, EventKind::Animation, "reset to home");
        self.redraw();
        started
    }

    /// Advance one animation tick.
    ///
    /// Dependent layers recompute on every advanced tick; the zoom readout
    /// and country outlines are part of the same frame, so nothing lags.
    pub fn tick(&mut self) -> TickOutcome {
        if self.torn_down {
            return TickOutcome::Idle;
        }
        self.frame = self.frame.next();
        let outcome = self.controller.tick(self.frame.time, &mut self.projection);
        match outcome {
            TickOutcome::Idle => {}
            TickOutcome::Advanced => self.redraw(),
            TickOutcome::Completed => {
                self.bus
                    .emit(self.frame, EventKind::Animation, "transition completed");
                self.redraw();
            }
        }
        outcome
    }

    // ------------------------------------------------------------------
    // Zoom buttons
    // ------------------------------------------------------------------

    pub fn zoom_in(&mut self) -> bool {
        self.button_zoom(true)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.button_zoom(false)
    }

    fn button_zoom(&mut self, zoom_in: bool) -> bool {
        if self.torn_down {
            return false;
        }
        let changed = self
            .controller
            .zoom_step(zoom_in, &mut self.projection, &mut self.cache);
        if changed {
            self.emit_zoom();
            self.redraw();
        }
        changed
    }

    fn emit_zoom(&mut self) {
        self.bus.emit(
            self.frame,
            EventKind::Gesture,
            format!("zoom to {:.1}px", self.projection.scale()),
        );
    }

    // ------------------------------------------------------------------
    // Clicks
    // ------------------------------------------------------------------

    /// Route a click through hit testing and the selection machine.
    ///
    /// Point, arc, and country clicks are ignored while the host lock is
    /// set; background clicks always clear.
    pub fn click(&mut self, at: Vec2) -> SelectionChange {
        if self.torn_down {
            return SelectionChange::Unchanged;
        }
        let hit = pick(
            &self.current,
            &self.projection,
            &self.countries,
            at,
            PickSettings::default(),
        );

        let change = match hit {
            Hit::Point(i) => {
                if self.locked {
                    SelectionChange::Unchanged
                } else {
                    let entity = self.points[self.current.points[i].entity_index].clone();
                    let change = self.selection.click_point(&entity, &self.countries);
                    self.emit_point_intent(&entity, &change);
                    change
                }
            }
            Hit::Arc(i) => {
                if self.locked {
                    SelectionChange::Unchanged
                } else {
                    let flow = self.flows[self.current.arcs[i].flow_index].clone();
                    self.click_arc(&flow)
                }
            }
            Hit::Country(_) => {
                if self.locked || !self.config.enable_country_selection {
                    SelectionChange::Unchanged
                } else if let Some(lon_lat) = self.projection.invert(at) {
                    self.selection.click_country(lon_lat, &self.countries)
                } else {
                    SelectionChange::Unchanged
                }
            }
            Hit::Background => self.selection.click_background(),
        };

        if change != SelectionChange::Unchanged {
            self.bus
                .emit(self.frame, EventKind::Selection, format!("{change:?}"));
            self.redraw();
        }
        change
    }

    fn click_arc(&mut self, flow: &FlowRecord) -> SelectionChange {
        let same_origin = self.selection.selected_origin() == Some(flow.origin.element);
        let change = self.selection.click_arc(flow);

        if let SelectionChange::ArcSelected { origin, .. } = &change {
            if !same_origin {
                self.pending_intents.push(SelectionIntent::SelectByElements {
                    column: ORIGIN_LABEL_COLUMN,
                    elements: vec![origin.0],
                });
            }
            self.pending_intents.push(SelectionIntent::SelectByElements {
                column: DESTINATION_LABEL_COLUMN,
                elements: self.selection.destinations().iter().map(|e| e.0).collect(),
            });
        }

        // Bring the selected flow into view; the transition is skipped if
        // another one is still running.
        let mid = CameraPose::new(
            [
                -(flow.origin.position.lon + flow.destination.position.lon) / 2.0,
                -(flow.origin.position.lat + flow.destination.position.lat) / 2.0,
                0.0,
            ],
            self.projection.scale(),
        );
        self.controller.start_transition(
            &self.projection,
            mid,
            self.frame.time,
            GO_TO_SELECTION_DURATION_S,
        );
        change
    }

    fn emit_point_intent(&mut self, entity: &PointEntity, change: &SelectionChange) {
        let column = if entity.is_origin {
            ORIGIN_LABEL_COLUMN
        } else {
            DESTINATION_LABEL_COLUMN
        };
        match change {
            SelectionChange::OriginSelected { .. } | SelectionChange::DestinationToggled { .. } => {
                self.pending_intents.push(SelectionIntent::SelectByLabel {
                    column,
                    label: entity.point.name.clone(),
                });
            }
            _ => {}
        }
    }

    /// Intents accumulated since the last drain.
    pub fn take_intents(&mut self) -> Vec<SelectionIntent> {
        std::mem::take(&mut self.pending_intents)
    }

    /// Push pending intents into the host's selection sink.
    pub fn flush_intents(&mut self, sink: &mut dyn SelectionSink) -> usize {
        let intents = self.take_intents();
        for intent in &intents {
            let ack = sink.apply(intent);
            debug!(?intent, ?ack, "selection intent flushed");
        }
        intents.len()
    }

    // ------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------

    pub fn selection_snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot::capture(&self.selection)
    }

    /// Restore a previously captured selection verbatim.
    pub fn restore_selection(&mut self, snapshot: &SelectionSnapshot) {
        snapshot.restore_into(&mut self.selection);
        self.redraw();
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Invalidate in-flight work and stop accepting mutations.
    ///
    /// Pending pages and queued animation ticks issued before this call
    /// can no longer touch the session.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.epoch.invalidate();
        self.controller.interrupt();
        self.bus.emit(self.frame, EventKind::Render, "surface torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // ------------------------------------------------------------------
    // Frame recomputation
    // ------------------------------------------------------------------

    /// Recompute the full visible set under the current projection and
    /// selection. Never incremental.
    fn redraw(&mut self) {
        let outlines = self.outline_layer.extract(&self.countries, &self.projection);
        let countries: Vec<CountryShape> = outlines
            .into_iter()
            .map(|o| CountryShape {
                shade: country_shade(self.selection.is_country_highlighted(&o.name)),
                name: o.name,
                segments: o.segments,
            })
            .collect();

        let mut arcs = Vec::new();
        for (flow_index, flow) in self.flows.iter().enumerate() {
            let Some(path) = self.arc_layer.build_arc(flow, &self.projection, &mut self.cache)
            else {
                continue;
            };
            let emphasis = self.selection.classify_arc(flow);
            arcs.push(ArcRender {
                flow_index,
                path,
                width: flow_width(
                    flow.value,
                    self.config.base_line_width,
                    self.config.line_width_scale,
                ),
                opacity: arc_opacity(emphasis, self.config.flow_opacity),
                emphasis,
            });
        }

        let points = self.point_layer.extract(
            &self.points,
            &self.projection,
            PointSizing {
                base_radius: self.config.point_size,
                magnitude_sizing: self.config.destination_sizing,
                min_radius: self.config.min_destination_point_size,
                max_radius: self.config.max_destination_point_size,
            },
        );

        // Size-threshold eviction: the render pass is the caller that
        // notices the cache has outgrown its bound.
        self.cache.clear_if_over_bound();

        self.current = RenderFrame {
            ocean_radius: self.projection.scale(),
            zoom_percent: ((self.projection.scale() / self.radius) * 100.0).round() as u32,
            countries,
            arcs,
            points,
            warning: self.warning.clone(),
            error: self.data_error.clone(),
        };
    }
}

impl GestureHandler for GlobeSession {
    fn on_drag_start(&mut self) {
        if self.torn_down {
            return;
        }
        if self.controller.drag_start() {
            self.bus.emit(self.frame, EventKind::Gesture, "drag start");
        }
    }

    fn on_drag_move(&mut self, dx_px: f64, dy_px: f64) {
        if self.torn_down {
            return;
        }
        if self.controller.drag_move(dx_px, dy_px, &mut self.projection) {
            self.redraw();
        }
    }

    fn on_drag_end(&mut self) {
        if self.torn_down {
            return;
        }
        if self.controller.drag_end() {
            self.bus.emit(self.frame, EventKind::Gesture, "drag end");
        }
    }

    fn on_wheel(&mut self, delta_y: f64) {
        if self.torn_down {
            return;
        }
        if self
            .controller
            .wheel(delta_y, &mut self.projection, &mut self.cache)
        {
            self.emit_zoom();
            self.redraw();
        }
    }

    fn on_pinch_start(&mut self, distance_px: f64) {
        if self.torn_down {
            return;
        }
        self.controller.pinch_start(distance_px, &self.projection);
    }

    fn on_pinch_move(&mut self, distance_px: f64) {
        if self.torn_down {
            return;
        }
        if self.controller.pinch_move(distance_px, &mut self.projection) {
            self.emit_zoom();
            self.redraw();
        }
    }
}
