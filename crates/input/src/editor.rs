//! The editor's gesture table and drag tracking

use geometry::Point;
use tracing::debug;

use crate::machine::{Deferred, StateMachine, StateTable, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorState {
    Wait,
    Complete,
    RecordMouse,
    RecordMouseWheel,
    Select,
    Selecting,
    Paint,
    Painting,
    Push,
    BackgroundSelect,
    BackgroundLink,
    BackgroundUpload,
    OpacitySelect,
    OpacityDisplay,
    OpacityRender,
    UpdateDisplayOpacity,
    UpdateRenderOpacity,
    RemoteZoomIn,
    RemoteZoomOut,
    RotateClock,
    Obscure,
    Reveal,
    Zoom,
}

impl EditorState {
    /// States that follow the pointer while a button is held
    pub fn is_drag(self) -> bool {
        matches!(
            self,
            EditorState::RecordMouse | EditorState::Selecting | EditorState::Painting
        )
    }
}

/// Inputs: raw pointer events plus the toolbar actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorInput {
    Down,
    Move,
    Up,
    Out,
    Wheel,
    Done,
    Wait,
    Select,
    Paint,
    Push,
    Background,
    Link,
    Upload,
    Opacity,
    Display,
    Render,
    Change,
    RemoteZoomIn,
    RemoteZoomOut,
    Rotate,
    Obscure,
    Reveal,
    Zoom,
}

pub struct EditorTable;

impl EditorTable {
    /// Actions reachable from the idle states
    fn from_idle(input: EditorInput) -> Option<EditorState> {
        use EditorInput as I;
        use EditorState as S;
        Some(match input {
            I::Down => S::RecordMouse,
            I::Wheel => S::RecordMouseWheel,
            I::Select => S::Select,
            I::Paint => S::Paint,
            I::Push => S::Push,
            I::Background => S::BackgroundSelect,
            I::Opacity => S::OpacitySelect,
            I::RemoteZoomIn => S::RemoteZoomIn,
            I::RemoteZoomOut => S::RemoteZoomOut,
            I::Rotate => S::RotateClock,
            _ => return None,
        })
    }
}

impl StateTable for EditorTable {
    type State = EditorState;
    type Input = EditorInput;

    fn initial() -> EditorState {
        EditorState::Wait
    }

    fn next(state: EditorState, input: EditorInput) -> Option<EditorState> {
        use EditorInput as I;
        use EditorState as S;
        match (state, input) {
            (S::Wait, input) => Self::from_idle(input),
            (S::Complete, I::Done) => Some(S::Wait),
            (S::Complete, input) => Self::from_idle(input),

            (S::RecordMouse, I::Move) => Some(S::RecordMouse),
            (S::RecordMouse, I::Up | I::Out) => Some(S::Complete),

            (S::RecordMouseWheel, I::Wheel) => Some(S::RecordMouseWheel),
            (S::RecordMouseWheel, I::Down) => Some(S::RecordMouse),
            (S::RecordMouseWheel, I::Done) => Some(S::Wait),

            (S::Paint, I::Move) => Some(S::Paint),
            (S::Paint, I::Down) => Some(S::Painting),
            (S::Paint, I::Select) => Some(S::Select),
            (S::Paint, I::Wait) => Some(S::Wait),
            (S::Painting, I::Move) => Some(S::Painting),
            (S::Painting, I::Up | I::Out) => Some(S::Paint),

            (S::Select, I::Down) => Some(S::Selecting),
            (S::Select, I::Obscure) => Some(S::Obscure),
            (S::Select, I::Reveal) => Some(S::Reveal),
            (S::Select, I::Zoom) => Some(S::Zoom),
            (S::Select, I::Paint) => Some(S::Paint),
            (S::Select, I::Wait) => Some(S::Wait),
            (S::Selecting, I::Move) => Some(S::Selecting),
            (S::Selecting, I::Up | I::Out) => Some(S::Select),

            (S::Obscure | S::Reveal | S::Zoom, I::Done) => Some(S::Select),
            (S::Obscure | S::Reveal | S::Zoom, I::Wait) => Some(S::Wait),

            (S::BackgroundSelect, I::Link) => Some(S::BackgroundLink),
            (S::BackgroundSelect, I::Upload) => Some(S::BackgroundUpload),
            (S::BackgroundSelect, I::Wait) => Some(S::Wait),
            (S::BackgroundLink | S::BackgroundUpload, I::Done | I::Wait) => Some(S::Wait),

            (S::OpacitySelect, I::Display) => Some(S::OpacityDisplay),
            (S::OpacitySelect, I::Render) => Some(S::OpacityRender),
            (S::OpacitySelect, I::Wait) => Some(S::Wait),
            (S::OpacityDisplay | S::UpdateDisplayOpacity, I::Change) => {
                Some(S::UpdateDisplayOpacity)
            }
            (S::OpacityRender | S::UpdateRenderOpacity, I::Change) => Some(S::UpdateRenderOpacity),
            (
                S::OpacityDisplay | S::OpacityRender | S::UpdateDisplayOpacity | S::UpdateRenderOpacity,
                I::Done | I::Wait,
            ) => Some(S::Wait),

            (S::Push | S::RemoteZoomIn | S::RemoteZoomOut | S::RotateClock, I::Done) => {
                Some(S::Wait)
            }

            _ => None,
        }
    }
}

/// Pointer position and held buttons at the time of an input
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub buttons: u32,
}

impl Pointer {
    pub fn new(x: f64, y: f64, buttons: u32) -> Self {
        Self { x, y, buttons }
    }
}

/// Start and end of the current drag in canvas coordinates.
/// `None` until the gesture sees its first pointer position; drags may leave
/// the canvas, so any coordinate is a real one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gesture {
    pub start: Option<Point>,
    pub end: Option<Point>,
}

impl Gesture {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    fn track(&mut self, pointer: Pointer) {
        let at = Point::new(pointer.x, pointer.y);
        self.start.get_or_insert(at);
        self.end = Some(at);
    }
}

/// Arguments every editor callback receives
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditorArgs {
    pub pointer: Pointer,
    pub delta_y: f64,
    pub gesture: Gesture,
}

pub type EditorStep = Step<EditorState, EditorInput>;

/// The editor gesture machine.
///
/// Entering a drag state from a different state resets the tracked
/// [`Gesture`] before any callback runs, so coordinates from the previous
/// gesture never leak into the next one.
pub struct EditorMachine<C> {
    machine: StateMachine<EditorTable, EditorArgs, C>,
    gesture: Gesture,
    last_pointer: Pointer,
}

impl<C> Default for EditorMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> EditorMachine<C> {
    pub fn new() -> Self {
        Self {
            machine: StateMachine::new(),
            gesture: Gesture::default(),
            last_pointer: Pointer::default(),
        }
    }

    pub fn state(&self) -> EditorState {
        self.machine.state()
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn on<F>(&mut self, state: EditorState, callback: F)
    where
        F: FnMut(&EditorStep, &EditorArgs, &mut C, &mut Deferred<EditorInput>) + Send + 'static,
    {
        self.machine.on(state, callback);
    }

    /// Feed a pointer-less input (toolbar action, `done`)
    pub fn action(&mut self, input: EditorInput, ctx: &mut C) -> bool {
        self.input(input, self.last_pointer, 0.0, ctx)
    }

    /// Feed an input with the pointer state it came with
    pub fn input(&mut self, input: EditorInput, pointer: Pointer, delta_y: f64, ctx: &mut C) -> bool {
        let from = self.machine.state();
        let Some(to) = self.machine.peek(input) else {
            let args = self.args(pointer, delta_y);
            return self.machine.transition(input, &args, ctx);
        };

        if to.is_drag() {
            if from != to {
                self.gesture.reset();
                debug!("EditorMachine: new {:?} gesture", to);
            }
            self.gesture.track(pointer);
        }
        self.last_pointer = pointer;

        let args = self.args(pointer, delta_y);
        self.machine.transition(input, &args, ctx)
    }

    /// Apply inputs queued by callbacks
    pub fn pump(&mut self, ctx: &mut C) -> usize {
        let args = self.args(self.last_pointer, 0.0);
        self.machine.pump(&args, ctx)
    }

    pub fn pending(&self) -> usize {
        self.machine.pending()
    }

    fn args(&self, pointer: Pointer, delta_y: f64) -> EditorArgs {
        EditorArgs {
            pointer,
            delta_y,
            gesture: self.gesture,
        }
    }
}
