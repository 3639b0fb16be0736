//! Generic state machine engine

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use tracing::{debug, trace};

/// A transition table. `next` returns `None` when the input is not defined
/// for the state; the machine treats that as a no-op.
pub trait StateTable {
    type State: Copy + Eq + Hash + Debug;
    type Input: Copy + Eq + Debug;

    fn initial() -> Self::State;

    fn next(state: Self::State, input: Self::Input) -> Option<Self::State>;
}

/// One applied transition, handed to entry callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step<S, I> {
    pub from: S,
    pub to: S,
    pub input: I,
}

/// Inputs scheduled by callbacks. They are applied by the next `pump`,
/// never inside the transition that queued them.
#[derive(Debug)]
pub struct Deferred<I> {
    queue: VecDeque<I>,
}

impl<I> Default for Deferred<I> {
    fn default() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl<I> Deferred<I> {
    pub fn push(&mut self, input: I) {
        self.queue.push_back(input);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn take(&mut self) -> VecDeque<I> {
        std::mem::take(&mut self.queue)
    }
}

type Callback<T, A, C> = Box<
    dyn FnMut(
            &Step<<T as StateTable>::State, <T as StateTable>::Input>,
            &A,
            &mut C,
            &mut Deferred<<T as StateTable>::Input>,
        ) + Send,
>;

/// Table-driven state machine with per-state entry callbacks.
///
/// `A` is the per-transition argument bundle, `C` the mutable context the
/// callbacks act on. Callbacks cannot reach the machine itself, so a
/// transition never re-enters another transition.
pub struct StateMachine<T: StateTable, A, C> {
    state: T::State,
    callbacks: HashMap<T::State, Vec<Callback<T, A, C>>>,
    deferred: Deferred<T::Input>,
}

impl<T: StateTable, A, C> Default for StateMachine<T, A, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: StateTable, A, C> StateMachine<T, A, C> {
    pub fn new() -> Self {
        Self {
            state: T::initial(),
            callbacks: HashMap::new(),
            deferred: Deferred::default(),
        }
    }

    pub fn state(&self) -> T::State {
        self.state
    }

    /// Register a callback run every time `state` is entered,
    /// including self transitions.
    pub fn on<F>(&mut self, state: T::State, callback: F)
    where
        F: FnMut(&Step<T::State, T::Input>, &A, &mut C, &mut Deferred<T::Input>) + Send + 'static,
    {
        self.callbacks
            .entry(state)
            .or_default()
            .push(Box::new(callback));
    }

    /// Where `input` would lead from the current state
    pub fn peek(&self, input: T::Input) -> Option<T::State> {
        T::next(self.state, input)
    }

    /// Apply `input`. Returns false, changing nothing, when the current
    /// state has no transition for it.
    pub fn transition(&mut self, input: T::Input, args: &A, ctx: &mut C) -> bool {
        let Some(to) = T::next(self.state, input) else {
            trace!("StateMachine: {:?} ignores {:?}", self.state, input);
            return false;
        };

        let step = Step {
            from: self.state,
            to,
            input,
        };
        debug!("StateMachine: {:?} --{:?}--> {:?}", step.from, input, to);
        self.state = to;

        if let Some(callbacks) = self.callbacks.get_mut(&to) {
            for callback in callbacks.iter_mut() {
                callback(&step, args, ctx, &mut self.deferred);
            }
        }
        true
    }

    /// Number of inputs waiting for `pump`
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }

    /// Apply the inputs deferred so far. Inputs deferred while pumping wait
    /// for the next call. Returns how many transitions were applied.
    pub fn pump(&mut self, args: &A, ctx: &mut C) -> usize {
        let queued = self.deferred.take();
        queued
            .into_iter()
            .filter(|input| self.transition(*input, args, ctx))
            .count()
    }
}
