use std::path::Path;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use crate::actuator::{ActuationError, PointerActuator};
use crate::calibration::{CalibrationProgress, CalibrationSession};
use crate::classifier::GestureClassifier;
use crate::config::EngineConfig;
use crate::confirm::{ConfirmOutcome, ConfirmationSession};
use crate::homography::PerspectiveTransform;
use crate::smoothing::MovingAverage;
use crate::types::{
    Command, ConfirmOption, EngineState, FrameInput, GestureKind, GestureVerdict, OperationMode,
    OverlaySnapshot, PixelPoint,
};
use crate::zoom::ZoomDetector;

/// Reserved pointer positions; an actuation targeting one of these is
/// skipped so the operator can always regain control of the machine.
const FAILSAFE_POINTS: &[(i32, i32)] = &[(0, 0)];

const FALLBACK_SCREEN: (u32, u32) = (1920, 1080);

/// Result of processing one frame.
pub struct FrameOutcome {
    pub overlay: OverlaySnapshot,
    /// Set on the frame a calibration is confirmed; the caller persists it.
    pub published: Option<PerspectiveTransform>,
}

/// Executes resolved gestures against the pointer backend, owning the
/// click/drag/zoom timing state and the fail-safe boundary check.
struct ActionEngine {
    actuator: Box<dyn PointerActuator>,
    scroll_ticks: i32,
    zoom_cooldown: Duration,
    last_zoom_at: Option<Instant>,
    last_click_at: Option<Instant>,
    drag_armed: bool,
    cursor: Option<PixelPoint>,
}

impl ActionEngine {
    fn new(actuator: Box<dyn PointerActuator>, config: &EngineConfig) -> Self {
        Self {
            actuator,
            scroll_ticks: config.gestures.scroll_ticks,
            zoom_cooldown: config.gestures.zoom_cooldown(),
            last_zoom_at: None,
            last_click_at: None,
            drag_armed: false,
            cursor: None,
        }
    }

    fn screen_size(&mut self) -> (u32, u32) {
        match self.actuator.screen_size() {
            Ok(size) => size,
            Err(err) => {
                log::warn!("screen size query failed ({err}); assuming {FALLBACK_SCREEN:?}");
                FALLBACK_SCREEN
            }
        }
    }

    fn pointer_position(&mut self) -> Option<PixelPoint> {
        match self.actuator.position() {
            Ok(p) => Some(p),
            Err(err) => {
                log::warn!("pointer position query failed: {err}");
                None
            }
        }
    }

    fn guard(target: PixelPoint) -> Result<(), ActuationError> {
        if FAILSAFE_POINTS.contains(&(target.x, target.y)) {
            return Err(ActuationError::BoundaryRejected {
                x: target.x,
                y: target.y,
            });
        }
        Ok(())
    }

    /// Click-type actuations fire wherever the pointer currently sits, so
    /// the guard checks the live position, falling back to the last
    /// engine-issued target when the query fails.
    fn guard_pointer(&mut self) -> Result<(), ActuationError> {
        if let Some(p) = self.pointer_position() {
            self.cursor = Some(p);
        }
        match self.cursor {
            Some(p) => Self::guard(p),
            None => Ok(()),
        }
    }

    /// Runs one actuation. Boundary violations and backend failures are
    /// logged and swallowed; the control loop never sees them.
    fn apply(&mut self, kind: GestureKind, target: Option<PixelPoint>, now: Instant) {
        let result = match kind {
            GestureKind::Cursor => match target {
                Some(p) => self.move_cursor(p, now),
                None => Ok(()),
            },
            GestureKind::LeftClick => self.left_click(now),
            GestureKind::DoubleClick => self
                .guard_pointer()
                .and_then(|_| self.actuator.double_click()),
            GestureKind::RightClick => self
                .guard_pointer()
                .and_then(|_| self.actuator.right_click()),
            GestureKind::ZoomIn => self.zoom(self.scroll_ticks, now),
            GestureKind::ZoomOut => self.zoom(-self.scroll_ticks, now),
            GestureKind::NoGesture => Ok(()),
        };

        if let Err(err) = result {
            match err {
                ActuationError::BoundaryRejected { .. } => {
                    log::warn!("fail-safe boundary hit, {} skipped: {err}", kind.label());
                }
                ActuationError::Backend(_) => {
                    log::warn!("{} actuation failed: {err}", kind.label());
                }
            }
        }
    }

    fn move_cursor(&mut self, target: PixelPoint, now: Instant) -> Result<(), ActuationError> {
        Self::guard(target)?;
        self.actuator.move_to(target)?;
        self.cursor = Some(target);
        if self.drag_armed {
            self.drag_armed = false;
            if let Some(at) = self.last_click_at.take() {
                log::debug!("drag released after {:?}", now.duration_since(at));
            }
        }
        Ok(())
    }

    fn left_click(&mut self, now: Instant) -> Result<(), ActuationError> {
        self.guard_pointer()?;
        self.actuator.click()?;
        self.last_click_at = Some(now);
        self.drag_armed = true;
        Ok(())
    }

    fn zoom(&mut self, ticks: i32, now: Instant) -> Result<(), ActuationError> {
        if let Some(last) = self.last_zoom_at {
            if now.duration_since(last) < self.zoom_cooldown {
                return Ok(());
            }
        }
        self.guard_pointer()?;
        self.actuator.scroll(ticks)?;
        self.last_zoom_at = Some(now);
        Ok(())
    }
}

/// Top-level per-session state: operation mode, engine state, the
/// published transform and the active sub-session. Owned by the single
/// control-loop thread; no component touches it concurrently.
pub struct EngineContext {
    config: EngineConfig,
    mode: OperationMode,
    state: EngineState,
    transform: PerspectiveTransform,
    calibrated: bool,
    session: Option<CalibrationSession>,
    confirm: Option<ConfirmationSession>,
    classifier: GestureClassifier,
    zoom: ZoomDetector,
    smoother: MovingAverage,
    actions: ActionEngine,
    commands: Receiver<Command>,
    screen: (u32, u32),
    overlay_visible: bool,
    last_verdict: GestureKind,
    cursor: Option<PixelPoint>,
    running: bool,
}

impl EngineContext {
    pub fn new(
        config: EngineConfig,
        mode: OperationMode,
        actuator: Box<dyn PointerActuator>,
        commands: Receiver<Command>,
    ) -> Self {
        let classifier = GestureClassifier::new(&config.gestures);
        let zoom = ZoomDetector::new(&config.gestures);
        let smoother = MovingAverage::new(config.gestures.smoothing_window);
        let overlay_visible = config.overlay.visible_by_default;
        let mut actions = ActionEngine::new(actuator, &config);
        let screen = actions.screen_size();
        log::info!(
            "engine starting in {} mode, screen {}x{}",
            mode.label(),
            screen.0,
            screen.1
        );

        Self {
            config,
            mode,
            state: EngineState::Idle,
            transform: PerspectiveTransform::identity(),
            calibrated: false,
            session: None,
            confirm: None,
            classifier,
            zoom,
            smoother,
            actions,
            commands,
            screen,
            overlay_visible,
            last_verdict: GestureKind::NoGesture,
            cursor: None,
            running: true,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_calibrated(&self) -> bool {
        self.calibrated
    }

    pub fn transform(&self) -> &PerspectiveTransform {
        &self.transform
    }

    /// Adopts a previously persisted transform, skipping calibration.
    /// Only meaningful in projected mode.
    pub fn load_persisted_transform(&mut self, path: &Path) {
        if self.mode != OperationMode::Projected {
            return;
        }
        match PerspectiveTransform::load(path) {
            Ok(transform) => {
                log::info!("loaded calibration from {}", path.display());
                self.transform = transform;
                self.calibrated = true;
                self.state = EngineState::Active;
            }
            Err(err) => {
                log::warn!(
                    "could not load calibration from {} ({err}); starting uncalibrated",
                    path.display()
                );
            }
        }
    }

    /// Processes one frame end to end: pending commands, then the state
    /// machine, then actuation, then the overlay description.
    pub fn step(&mut self, frame: &FrameInput) -> FrameOutcome {
        // Commands are applied between frames, never mid-classification.
        while let Ok(command) = self.commands.try_recv() {
            self.apply_command(command);
        }

        let mut published = None;
        let mut verdict = GestureVerdict::none();

        if self.running {
            match self.state {
                EngineState::Calibrating => self.step_calibrating(frame),
                EngineState::ConfirmPending => published = self.step_confirming(frame),
                EngineState::Idle | EngineState::Active => verdict = self.step_control(frame),
            }
        }

        self.last_verdict = verdict.kind;
        FrameOutcome {
            overlay: self.snapshot(frame),
            published,
        }
    }

    pub fn apply_command(&mut self, command: Command) {
        match command {
            Command::ToggleOverlay => {
                self.overlay_visible = !self.overlay_visible;
                log::info!(
                    "overlay {}",
                    if self.overlay_visible { "shown" } else { "hidden" }
                );
            }
            Command::SwitchMode => self.switch_mode(),
            Command::StartCalibration => self.start_calibration(),
            Command::UndoCalibrationPoint => {
                if let (EngineState::Calibrating, Some(session)) =
                    (self.state, self.session.as_mut())
                {
                    session.undo();
                }
            }
            Command::ResetCalibration => self.reset_calibration(),
            Command::Quit => {
                log::info!("quit requested");
                self.running = false;
            }
        }
    }

    fn switch_mode(&mut self) {
        match self.mode {
            OperationMode::Direct => {
                self.mode = OperationMode::Projected;
                self.state = EngineState::Idle;
                log::info!("switched to projected mode (uncalibrated)");
            }
            OperationMode::Projected => {
                // Leaving projected mode discards any calibration in
                // progress and the published transform with it.
                self.mode = OperationMode::Direct;
                self.state = EngineState::Idle;
                self.session = None;
                self.confirm = None;
                self.transform = PerspectiveTransform::identity();
                self.calibrated = false;
                log::info!("switched to direct mode; calibration cleared");
            }
        }
    }

    fn start_calibration(&mut self) {
        if self.mode != OperationMode::Projected {
            log::warn!("calibration is only available in projected mode");
            return;
        }
        log::info!(
            "calibration started; dwell on each corner with the pointing gesture, \
             top-left first"
        );
        self.session = Some(CalibrationSession::new(
            self.config.gestures.calibration_dwell(),
        ));
        self.confirm = None;
        self.state = EngineState::Calibrating;
    }

    fn reset_calibration(&mut self) {
        self.zoom.reset();
        self.smoother.reset();
        if self.mode == OperationMode::Projected {
            self.session = None;
            self.confirm = None;
            self.transform = PerspectiveTransform::identity();
            self.calibrated = false;
            self.state = EngineState::Idle;
            log::info!("calibration reset");
        }
    }

    fn step_calibrating(&mut self, frame: &FrameInput) {
        let Some(session) = self.session.as_mut() else {
            self.state = EngineState::Idle;
            return;
        };
        let Some(hand) = frame.hands.first() else {
            session.interrupt();
            return;
        };

        let actions = &mut self.actions;
        let progress = session.update(hand, frame.width, frame.height, frame.timestamp, || {
            actions.pointer_position()
        });

        if progress == CalibrationProgress::Complete {
            self.finalize_calibration();
        }
    }

    fn finalize_calibration(&mut self) {
        let Some(pairs) = self.session.as_ref().and_then(|s| s.correspondences()) else {
            return;
        };
        match PerspectiveTransform::from_correspondences(&pairs) {
            Ok(pending) => {
                self.confirm = Some(ConfirmationSession::new(
                    pending,
                    self.config.gestures.confirm_dwell(),
                ));
                self.state = EngineState::ConfirmPending;
                log::info!("all corners captured; awaiting confirmation");
            }
            Err(err) => {
                log::error!("{err}; restarting calibration");
                if let Some(session) = self.session.as_mut() {
                    session.restart();
                }
            }
        }
    }

    fn step_confirming(&mut self, frame: &FrameInput) -> Option<PerspectiveTransform> {
        let Some(confirm) = self.confirm.as_mut() else {
            self.state = EngineState::Idle;
            return None;
        };
        let Some(hand) = frame.hands.first() else {
            confirm.interrupt();
            return None;
        };

        match confirm.update(hand, frame.width, frame.height, frame.timestamp) {
            ConfirmOutcome::Pending => None,
            ConfirmOutcome::Committed(ConfirmOption::Confirm) => {
                let pending = self.confirm.take().map(ConfirmationSession::into_pending)?;
                self.transform = pending.clone();
                self.calibrated = true;
                self.session = None;
                self.state = EngineState::Active;
                log::info!("calibration confirmed and published");
                Some(pending)
            }
            ConfirmOutcome::Committed(ConfirmOption::Recalibrate) => {
                log::info!("recalibrating from the first corner");
                self.confirm = None;
                self.session = Some(CalibrationSession::new(
                    self.config.gestures.calibration_dwell(),
                ));
                self.state = EngineState::Calibrating;
                None
            }
            ConfirmOutcome::Committed(ConfirmOption::Cancel) => {
                log::info!("calibration cancelled");
                self.confirm = None;
                self.session = None;
                self.state = EngineState::Idle;
                None
            }
        }
    }

    fn step_control(&mut self, frame: &FrameInput) -> GestureVerdict {
        let verdict = match frame.hands.as_slice() {
            [] => GestureVerdict::none(),
            [hand] => self
                .classifier
                .classify(hand, frame.width, frame.height, frame.timestamp),
            [first, second, ..] if self.config.detection.max_hands >= 2 => {
                self.zoom.detect(first, second, frame.width, frame.height)
            }
            [hand, ..] => self
                .classifier
                .classify(hand, frame.width, frame.height, frame.timestamp),
        };

        match verdict.kind {
            GestureKind::Cursor => {
                if let Some(raw) = verdict.position {
                    let smoothed = self.smoother.push(raw);
                    let mapped = self.map_position(smoothed, frame.width, frame.height);
                    self.actions
                        .apply(GestureKind::Cursor, Some(mapped), frame.timestamp);
                    self.cursor = Some(mapped);
                }
            }
            GestureKind::NoGesture => {}
            // Clicks and zooms act at the current pointer location; their
            // verdict positions are diagnostic only.
            kind => self.actions.apply(kind, None, frame.timestamp),
        }

        verdict
    }

    /// Camera-frame pixels to screen pixels. Projected mode uses the
    /// published homography; before one is published it behaves like
    /// direct mode.
    fn map_position(&self, p: PixelPoint, frame_width: u32, frame_height: u32) -> PixelPoint {
        if self.mode == OperationMode::Projected && self.calibrated {
            return self.transform.apply(p);
        }
        let (sw, sh) = self.screen;
        PixelPoint {
            x: (p.x as i64 * sw as i64 / frame_width.max(1) as i64) as i32,
            y: (p.y as i64 * sh as i64 / frame_height.max(1) as i64) as i32,
        }
    }

    fn snapshot(&self, frame: &FrameInput) -> OverlaySnapshot {
        OverlaySnapshot {
            state: self.state,
            mode: self.mode,
            verdict: self.last_verdict,
            cursor: self.cursor,
            corners_collected: self.session.as_ref().map_or(0, |s| s.corner_index()),
            current_corner: self.session.as_ref().and_then(|s| s.corner_name()),
            dwell_progress: self
                .session
                .as_ref()
                .and_then(|s| s.dwell_progress(frame.timestamp)),
            highlighted: self.confirm.as_ref().map(|c| c.highlighted()),
            calibrated: self.calibrated,
            overlay_visible: self.overlay_visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{ActuationError, PointerActuator};
    use crate::config::EngineConfig;
    use crate::testutil::{pinch_index_hand, pointing_hand, FRAME_H, FRAME_W};
    use crate::types::HandLandmarkSet;
    use crossbeam_channel::unbounded;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Call {
        Move(i32, i32),
        Click,
        DoubleClick,
        RightClick,
        Scroll(i32),
    }

    #[derive(Default)]
    pub struct Recording {
        pub calls: Vec<Call>,
        pub pointer: (i32, i32),
    }

    pub struct RecordingActuator {
        pub log: Rc<RefCell<Recording>>,
    }

    impl PointerActuator for RecordingActuator {
        fn position(&mut self) -> Result<PixelPoint, ActuationError> {
            let (x, y) = self.log.borrow().pointer;
            Ok(PixelPoint::new(x, y))
        }

        fn screen_size(&mut self) -> Result<(u32, u32), ActuationError> {
            Ok((1920, 1080))
        }

        fn move_to(&mut self, target: PixelPoint) -> Result<(), ActuationError> {
            self.log.borrow_mut().calls.push(Call::Move(target.x, target.y));
            Ok(())
        }

        fn click(&mut self) -> Result<(), ActuationError> {
            self.log.borrow_mut().calls.push(Call::Click);
            Ok(())
        }

        fn double_click(&mut self) -> Result<(), ActuationError> {
            self.log.borrow_mut().calls.push(Call::DoubleClick);
            Ok(())
        }

        fn right_click(&mut self) -> Result<(), ActuationError> {
            self.log.borrow_mut().calls.push(Call::RightClick);
            Ok(())
        }

        fn scroll(&mut self, ticks: i32) -> Result<(), ActuationError> {
            self.log.borrow_mut().calls.push(Call::Scroll(ticks));
            Ok(())
        }
    }

    fn engine(mode: OperationMode) -> (EngineContext, Rc<RefCell<Recording>>, crossbeam_channel::Sender<Command>) {
        let log = Rc::new(RefCell::new(Recording::default()));
        let actuator = RecordingActuator { log: log.clone() };
        let (tx, rx) = unbounded();
        let engine = EngineContext::new(EngineConfig::default(), mode, Box::new(actuator), rx);
        (engine, log, tx)
    }

    fn frame(hands: Vec<HandLandmarkSet>, at: Instant) -> FrameInput {
        FrameInput {
            hands,
            width: FRAME_W,
            height: FRAME_H,
            timestamp: at,
        }
    }

    #[test]
    fn direct_mode_scales_cursor_to_screen() {
        let (mut engine, log, _tx) = engine(OperationMode::Direct);
        let hand = pointing_hand(0.5, 0.5);
        engine.step(&frame(vec![hand], Instant::now()));

        let calls = &log.borrow().calls;
        // 0.5 of a 640x480 frame lands at 0.5 of the 1920x1080 screen.
        assert_eq!(calls.as_slice(), &[Call::Move(960, 540)]);
    }

    #[test]
    fn pinch_actuates_a_click_at_the_current_pointer() {
        let (mut engine, log, _tx) = engine(OperationMode::Direct);
        log.borrow_mut().pointer = (500, 500);
        engine.step(&frame(vec![pinch_index_hand()], Instant::now()));
        assert_eq!(log.borrow().calls.as_slice(), &[Call::Click]);
    }

    #[test]
    fn failsafe_corner_move_is_skipped() {
        let (mut engine, log, _tx) = engine(OperationMode::Direct);
        // Index tip at the origin maps onto the reserved (0, 0) corner.
        let hand = pointing_hand(0.0, 0.0);
        engine.step(&frame(vec![hand], Instant::now()));
        assert!(log.borrow().calls.is_empty());
    }

    #[test]
    fn click_with_pointer_on_failsafe_corner_is_skipped() {
        let (mut engine, log, _tx) = engine(OperationMode::Direct);
        // The OS pointer rests on the reserved corner; no engine move has
        // happened yet.
        log.borrow_mut().pointer = (0, 0);
        engine.step(&frame(vec![pinch_index_hand()], Instant::now()));
        assert!(log.borrow().calls.is_empty());
    }

    #[test]
    fn zoom_actuation_respects_the_cooldown() {
        let (mut engine, log, _tx) = engine(OperationMode::Direct);
        log.borrow_mut().pointer = (400, 400);
        let t0 = Instant::now();

        let hands = |d: f32| {
            let half = d / 2.0 / FRAME_W as f32;
            vec![
                crate::testutil::hand_with_wrist(0.5 - half, 0.5),
                crate::testutil::hand_with_wrist(0.5 + half, 0.5),
            ]
        };

        // Establish baseline, then two zoom-in frames 20ms apart: only the
        // first may scroll.
        engine.step(&frame(hands(100.0), t0));
        engine.step(&frame(hands(120.0), t0 + Duration::from_millis(10)));
        engine.step(&frame(hands(140.0), t0 + Duration::from_millis(30)));

        let scrolls: Vec<_> = log
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Scroll(_)))
            .copied()
            .collect();
        assert_eq!(scrolls, vec![Call::Scroll(3)]);
    }

    #[test]
    fn start_calibration_requires_projected_mode() {
        let (mut engine, _log, tx) = engine(OperationMode::Direct);
        tx.send(Command::StartCalibration).unwrap();
        engine.step(&frame(vec![], Instant::now()));
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn switching_to_direct_clears_calibration_state() {
        let (mut engine, _log, tx) = engine(OperationMode::Projected);
        tx.send(Command::StartCalibration).unwrap();
        engine.step(&frame(vec![], Instant::now()));
        assert_eq!(engine.state(), EngineState::Calibrating);

        tx.send(Command::SwitchMode).unwrap();
        engine.step(&frame(vec![], Instant::now()));
        assert_eq!(engine.mode(), OperationMode::Direct);
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(engine.transform().is_identity());
        assert!(!engine.is_calibrated());
    }

    #[test]
    fn quit_command_stops_the_loop() {
        let (mut engine, _log, tx) = engine(OperationMode::Direct);
        assert!(engine.is_running());
        tx.send(Command::Quit).unwrap();
        engine.step(&frame(vec![], Instant::now()));
        assert!(!engine.is_running());
    }

    #[test]
    fn undo_with_no_points_is_harmless() {
        let (mut engine, _log, tx) = engine(OperationMode::Projected);
        tx.send(Command::StartCalibration).unwrap();
        tx.send(Command::UndoCalibrationPoint).unwrap();
        let outcome = engine.step(&frame(vec![], Instant::now()));
        assert_eq!(engine.state(), EngineState::Calibrating);
        assert_eq!(outcome.overlay.corners_collected, 0);
    }
}
