use std::collections::VecDeque;

use crate::{
    assets::source::{AssetResolver, ImageLoader},
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::{Canvas, NormVec},
        error::{DepthliftError, DepthliftResult},
    },
    input::tracker::{InputAction, InputEvent, InputState, InputTracker},
    provider::{
        response::ProviderResponse,
        source::{DepthProvider, Upload},
    },
    render::backend::{FrameRGBA, Presenter},
    session::{
        build::{PreparedStrategy, StrategyKind, prepare_strategy},
        config::SessionConfig,
        frame_loop::FrameLoop,
    },
};

/// Lifecycle of a [`RenderSessionController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing is built or presented.
    Idle,
    /// A build was started and has not resolved yet.
    Building,
    /// A strategy is attached and the frame loop runs.
    Active(StrategyKind),
}

/// Identifies one build request. Only the most recent ticket may complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BuildTicket(u64);

/// How a completed build was applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The build became the active session.
    Active(StrategyKind),
    /// A newer build or a teardown superseded this one; its result was dropped.
    Discarded,
}

/// Result of one frame-loop entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The loop is not scheduled; nothing ran.
    Stopped,
    /// A frame was computed and presented.
    Presented {
        /// Tick index since the controller was created.
        tick: u64,
        /// Whether the smoothed input vector moved this tick.
        moving: bool,
    },
}

/// Top-level owner of a parallax viewer session.
///
/// Holds the config, the input state, at most one active strategy, and the presenter. Input
/// events are queued by the host and drained at the start of the next tick, so they never
/// interleave with a frame's computation.
pub struct RenderSessionController {
    config: SessionConfig,
    presenter: Box<dyn Presenter>,
    viewport: Canvas,
    tracker: InputTracker,
    input: InputState,
    mesh_target: NormVec,
    strategy: Option<PreparedStrategy>,
    state: SessionState,
    next_ticket: u64,
    pending: Option<BuildTicket>,
    events: VecDeque<InputEvent>,
    frame_loop: FrameLoop,
    last_error: Option<String>,
}

impl RenderSessionController {
    /// Create an idle controller presenting into a `viewport`-sized area at the client origin.
    pub fn new(config: SessionConfig, presenter: Box<dyn Presenter>, viewport: Canvas) -> Self {
        let config = config.sanitized();
        let tracker = InputTracker::new(viewport.to_rect(), config.pointer_ease);
        Self {
            config,
            presenter,
            viewport,
            tracker,
            input: InputState::default(),
            mesh_target: NormVec::ZERO,
            strategy: None,
            state: SessionState::Idle,
            next_ticket: 0,
            pending: None,
            events: VecDeque::new(),
            frame_loop: FrameLoop::default(),
            last_error: None,
        }
    }

    /// Current settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable settings; changes are picked up on the next tick.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// Lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Strategy of the active session, if any.
    pub fn strategy_kind(&self) -> Option<StrategyKind> {
        self.strategy.as_ref().map(PreparedStrategy::kind)
    }

    /// The active strategy, if any.
    pub fn strategy(&self) -> Option<&PreparedStrategy> {
        self.strategy.as_ref()
    }

    /// Smoothed and target input vectors.
    pub fn input_state(&self) -> InputState {
        self.input
    }

    /// Message of the last failed build, cleared by the next successful one.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Viewer size.
    pub fn viewport(&self) -> Canvas {
        self.viewport
    }

    /// Input vector driving mesh rotation. Pointer input reaches it without the response curve.
    pub fn mesh_target(&self) -> NormVec {
        self.mesh_target
    }

    /// Whether the frame loop is scheduled.
    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    /// Most recently presented frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.presenter.last_frame()
    }

    /// Tear down the current session and start a new build.
    ///
    /// Any build still in flight is invalidated; completing it later is a no-op.
    pub fn begin_build(&mut self) -> BuildTicket {
        self.teardown();
        self.next_ticket += 1;
        let ticket = BuildTicket(self.next_ticket);
        self.pending = Some(ticket);
        self.state = SessionState::Building;
        tracing::debug!(ticket = ticket.0, "build started");
        ticket
    }

    /// Resolve a build started with [`RenderSessionController::begin_build`].
    ///
    /// Stale tickets are discarded without touching the session. A failed build leaves the
    /// controller idle and returns the error.
    pub fn complete_build(
        &mut self,
        ticket: BuildTicket,
        result: DepthliftResult<PreparedStrategy>,
    ) -> DepthliftResult<BuildOutcome> {
        if self.pending != Some(ticket) {
            tracing::debug!(ticket = ticket.0, "stale build discarded");
            return Ok(BuildOutcome::Discarded);
        }
        self.pending = None;

        let strategy = match result.and_then(|s| self.attach(&s).map(|()| s)) {
            Ok(strategy) => strategy,
            Err(err) => {
                tracing::warn!(error = %err, "build failed");
                self.presenter.release();
                self.state = SessionState::Idle;
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let kind = strategy.kind();
        self.strategy = Some(strategy);
        self.state = SessionState::Active(kind);
        self.last_error = None;
        self.frame_loop.start();
        tracing::info!(strategy = ?kind, "session active");
        Ok(BuildOutcome::Active(kind))
    }

    /// Build synchronously from a provider response.
    pub fn load(
        &mut self,
        response: &ProviderResponse,
        loader: &dyn ImageLoader,
    ) -> DepthliftResult<StrategyKind> {
        let ticket = self.begin_build();
        let result = prepare_strategy(
            response,
            loader,
            &self.config,
            self.presenter.supports_mesh(),
            self.viewport,
        );
        self.finish(ticket, result)
    }

    /// Send `upload` to `provider` and build from its response.
    ///
    /// Relative image references resolve against the provider's assets root.
    pub fn upload(
        &mut self,
        provider: &mut dyn DepthProvider,
        upload: &Upload,
    ) -> DepthliftResult<StrategyKind> {
        let ticket = self.begin_build();
        let result = provider.process(upload).and_then(|response| {
            let loader = AssetResolver::new(provider.assets_root());
            prepare_strategy(
                &response,
                &loader,
                &self.config,
                self.presenter.supports_mesh(),
                self.viewport,
            )
        });
        self.finish(ticket, result)
    }

    /// Queue an input event for the next tick.
    pub fn push_event(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Follow a viewer size change.
    pub fn resize(&mut self, viewport: Canvas) -> DepthliftResult<()> {
        self.viewport = viewport;
        self.tracker.set_viewport(viewport.to_rect());
        match &mut self.strategy {
            Some(PreparedStrategy::Mesh(mesh)) => {
                mesh.resize(viewport);
                self.presenter.resize(mesh.render_size())
            }
            _ => self.presenter.resize(viewport),
        }
    }

    /// One frame-loop entry: drain queued input, advance smoothing, update the active
    /// compositor, and present.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(tick) = self.frame_loop.enter() else {
            return TickOutcome::Stopped;
        };
        if !matches!(self.state, SessionState::Active(_)) {
            self.frame_loop.stop();
            return TickOutcome::Stopped;
        }

        self.tracker.set_pointer_ease(self.config.pointer_ease);
        while let Some(event) = self.events.pop_front() {
            let action = self.tracker.handle(&event, self.config.gyro_enabled);
            self.apply(action);
        }
        let moving = self.input.advance(self.config.smoothness);

        match &mut self.strategy {
            Some(PreparedStrategy::Layers(layers)) => {
                let frame = layers.update(self.input.current, &self.config);
                self.presenter.present_layers(layers.layers(), &frame);
            }
            Some(PreparedStrategy::Mesh(mesh)) => {
                if let Some(frame) = mesh.update(self.mesh_target, &self.config)
                    && let Some(surface) = mesh.surface()
                {
                    self.presenter.present_mesh(surface, &frame);
                }
            }
            None => {}
        }
        tracing::trace!(tick, moving, "tick");
        TickOutcome::Presented { tick, moving }
    }

    /// Run `ticks` frames, feeding each frame to `sink`.
    ///
    /// `script` is called before every tick and returns the events to queue for it.
    pub fn record(
        &mut self,
        ticks: u64,
        sink: &mut dyn FrameSink,
        mut script: impl FnMut(u64) -> Vec<InputEvent>,
    ) -> DepthliftResult<u64> {
        if !matches!(self.state, SessionState::Active(_)) {
            return Err(DepthliftError::validation("record requires an active session"));
        }
        let mut begun = false;
        let mut pushed = 0;
        for i in 0..ticks {
            for event in script(i) {
                self.push_event(event);
            }
            let TickOutcome::Presented { tick, .. } = self.tick() else {
                break;
            };
            let Some(frame) = self.presenter.last_frame() else {
                continue;
            };
            if !begun {
                sink.begin(SinkConfig {
                    width: frame.width,
                    height: frame.height,
                })?;
                begun = true;
            }
            sink.push_frame(tick, frame)?;
            pushed += 1;
        }
        if begun {
            sink.end()?;
        }
        Ok(pushed)
    }

    /// Stop the frame loop and release the active strategy. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.frame_loop.stop();
        self.pending = None;
        self.events.clear();
        self.input.reset();
        self.mesh_target = NormVec::ZERO;
        if let Some(strategy) = self.strategy.take() {
            if let PreparedStrategy::Mesh(mut mesh) = strategy {
                mesh.teardown();
            }
            tracing::debug!("session torn down");
        }
        self.presenter.release();
        self.state = SessionState::Idle;
    }

    fn attach(&mut self, strategy: &PreparedStrategy) -> DepthliftResult<()> {
        match strategy {
            PreparedStrategy::Layers(layers) => {
                self.presenter.attach_layers(self.viewport, layers.layers())
            }
            PreparedStrategy::Mesh(mesh) => match mesh.surface() {
                Some(surface) => self.presenter.attach_mesh(mesh.render_size(), surface),
                None => Err(DepthliftError::validation("mesh strategy has no surface")),
            },
        }
    }

    fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::SetTarget(v) => {
                self.input.target = v;
                self.mesh_target = v;
            }
            InputAction::SetPointer { eased, raw } => {
                self.input.target = eased;
                self.mesh_target = raw;
            }
            InputAction::ResetTarget => {
                self.input.target = NormVec::ZERO;
                self.mesh_target = NormVec::ZERO;
            }
            InputAction::Zoom { delta_y } => {
                if let Some(PreparedStrategy::Mesh(mesh)) = &mut self.strategy {
                    mesh.zoom_by_wheel(delta_y);
                }
            }
            InputAction::AdjustStrength(steps) => self.config.nudge_strength(steps),
            InputAction::Ignore => {}
        }
    }

    fn finish(
        &mut self,
        ticket: BuildTicket,
        result: DepthliftResult<PreparedStrategy>,
    ) -> DepthliftResult<StrategyKind> {
        match self.complete_build(ticket, result)? {
            BuildOutcome::Active(kind) => Ok(kind),
            BuildOutcome::Discarded => Err(DepthliftError::validation(
                "build was superseded before it completed",
            )),
        }
    }
}

impl Drop for RenderSessionController {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/controller.rs"]
mod tests;
