//! Generic state machine engine shared by every agent type.
//!
//! States are small `Copy` values (usually a fieldless enum) whose behaviour
//! lives in the [`State`] impl. The owning agent exposes its
//! [`StateMachine`] through the [`Agent`] trait, and every transition goes
//! through the agent so that `enter`/`exit` hooks receive full mutable
//! access to it.

use std::fmt::Debug;

/// Behaviour of one state for agent type `A` receiving messages of type `M`.
pub trait State<A, M>: Copy + PartialEq + Debug {
    /// Stable name for snapshots and debug overlays.
    fn name(self) -> &'static str;

    fn enter(self, _agent: &mut A) {}

    fn execute(self, _agent: &mut A) {}

    fn exit(self, _agent: &mut A) {}

    /// Returns `true` if the message was consumed.
    fn on_message(self, _agent: &mut A, _message: &M) -> bool {
        false
    }
}

/// Current, previous and global state of one agent.
///
/// Holds no behaviour itself; see [`Agent`] for the operations.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachine<S> {
    current: Option<S>,
    previous: Option<S>,
    global: Option<S>,
}

impl<S: Copy + PartialEq> StateMachine<S> {
    /// A machine with no states. An initial state must be entered through
    /// [`Agent::change_state`] before the first update.
    pub fn new() -> Self {
        Self {
            current: None,
            previous: None,
            global: None,
        }
    }

    /// A machine whose global state runs every tick before the current one.
    pub fn with_global(global: S) -> Self {
        Self {
            global: Some(global),
            ..Self::new()
        }
    }

    pub fn current(&self) -> Option<S> {
        self.current
    }

    pub fn previous(&self) -> Option<S> {
        self.previous
    }

    pub fn global(&self) -> Option<S> {
        self.global
    }

    /// Identity comparison against the current state.
    pub fn is_in(&self, state: S) -> bool {
        self.current == Some(state)
    }

    fn swap_current(&mut self, next: S) {
        self.previous = self.current;
        self.current = Some(next);
    }
}

impl<S: Copy + PartialEq> Default for StateMachine<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// An entity driven by a [`StateMachine`].
///
/// Implementors only provide access to the machine; the transition
/// operations are provided methods so that every agent type shares the
/// same enter/execute/exit ordering.
pub trait Agent: Sized {
    type Message;
    type State: State<Self, Self::Message>;

    fn state_machine(&self) -> &StateMachine<Self::State>;

    fn state_machine_mut(&mut self) -> &mut StateMachine<Self::State>;

    /// Exit the current state (if any), then enter `next`.
    fn change_state(&mut self, next: Self::State) {
        if let Some(current) = self.state_machine().current() {
            current.exit(self);
            tracing::trace!(from = current.name(), to = next.name(), "state change");
        }
        self.state_machine_mut().swap_current(next);
        next.enter(self);
    }

    /// Go back to the state active before the last transition.
    fn revert_to_previous_state(&mut self) {
        if let Some(previous) = self.state_machine().previous() {
            self.change_state(previous);
        }
    }

    /// Run the global state, then the current state.
    fn update_state(&mut self) {
        debug_assert!(
            self.state_machine().current().is_some(),
            "state machine updated before an initial state was set"
        );
        if let Some(global) = self.state_machine().global() {
            global.execute(self);
        }
        // The global state may have transitioned; run whatever is current now.
        if let Some(current) = self.state_machine().current() {
            current.execute(self);
        }
    }

    /// Offer a message to the global state, then the current state.
    /// Returns `false` when neither consumed it.
    fn handle_message(&mut self, message: &Self::Message) -> bool {
        if let Some(global) = self.state_machine().global()
            && global.on_message(self, message)
        {
            return true;
        }
        match self.state_machine().current() {
            Some(current) => current.on_message(self, message),
            None => false,
        }
    }

    fn is_in_state(&self, state: Self::State) -> bool {
        self.state_machine().is_in(state)
    }

    fn state_name(&self) -> &'static str {
        self.state_machine()
            .current()
            .map(|s| s.name())
            .unwrap_or("NONE")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Light {
        Global,
        Red,
        Green,
        Bouncer,
    }

    #[derive(Debug, PartialEq)]
    enum Call {
        Enter(Light),
        Exit(Light),
        Execute(Light),
    }

    #[derive(Default)]
    struct Lamp {
        machine: StateMachine<Light>,
        log: Vec<Call>,
        ticks: u32,
        consumed_by: Option<Light>,
    }

    impl State<Lamp, u32> for Light {
        fn name(self) -> &'static str {
            match self {
                Light::Global => "GLOBAL",
                Light::Red => "RED",
                Light::Green => "GREEN",
                Light::Bouncer => "BOUNCER",
            }
        }

        fn enter(self, lamp: &mut Lamp) {
            lamp.log.push(Call::Enter(self));
            if self == Light::Bouncer {
                lamp.change_state(Light::Red);
            }
        }

        fn execute(self, lamp: &mut Lamp) {
            lamp.log.push(Call::Execute(self));
            if self == Light::Global {
                lamp.ticks += 1;
            }
        }

        fn exit(self, lamp: &mut Lamp) {
            lamp.log.push(Call::Exit(self));
        }

        fn on_message(self, lamp: &mut Lamp, message: &u32) -> bool {
            let consumed = match self {
                Light::Global => *message == 1,
                Light::Red => *message == 2,
                _ => false,
            };
            if consumed {
                lamp.consumed_by = Some(self);
            }
            consumed
        }
    }

    impl Agent for Lamp {
        type Message = u32;
        type State = Light;

        fn state_machine(&self) -> &StateMachine<Light> {
            &self.machine
        }

        fn state_machine_mut(&mut self) -> &mut StateMachine<Light> {
            &mut self.machine
        }
    }

    #[test]
    fn first_change_only_enters() {
        let mut lamp = Lamp::default();
        lamp.change_state(Light::Red);
        assert_eq!(lamp.log, vec![Call::Enter(Light::Red)]);
        assert!(lamp.is_in_state(Light::Red));
        assert_eq!(lamp.state_machine().previous(), None);
    }

    #[test]
    fn change_exits_once_then_enters_once() {
        let mut lamp = Lamp::default();
        lamp.change_state(Light::Red);
        lamp.log.clear();

        lamp.change_state(Light::Green);
        assert_eq!(
            lamp.log,
            vec![Call::Exit(Light::Red), Call::Enter(Light::Green)]
        );
        assert!(lamp.is_in_state(Light::Green));
        assert!(!lamp.is_in_state(Light::Red));
        assert_eq!(lamp.state_machine().previous(), Some(Light::Red));
    }

    #[test]
    fn self_transition_reenters() {
        let mut lamp = Lamp::default();
        lamp.change_state(Light::Red);
        lamp.log.clear();
        lamp.change_state(Light::Red);
        assert_eq!(lamp.log, vec![Call::Exit(Light::Red), Call::Enter(Light::Red)]);
    }

    #[test]
    fn transition_from_enter_is_honoured() {
        let mut lamp = Lamp::default();
        lamp.change_state(Light::Green);
        lamp.change_state(Light::Bouncer);
        assert!(lamp.is_in_state(Light::Red));
        assert_eq!(lamp.state_machine().previous(), Some(Light::Bouncer));
    }

    #[test]
    fn update_runs_global_before_current() {
        let mut lamp = Lamp {
            machine: StateMachine::with_global(Light::Global),
            ..Default::default()
        };
        lamp.change_state(Light::Green);
        lamp.log.clear();

        lamp.update_state();
        assert_eq!(
            lamp.log,
            vec![Call::Execute(Light::Global), Call::Execute(Light::Green)]
        );
        assert_eq!(lamp.ticks, 1);
    }

    #[test]
    fn messages_try_global_first() {
        let mut lamp = Lamp {
            machine: StateMachine::with_global(Light::Global),
            ..Default::default()
        };
        lamp.change_state(Light::Red);

        assert!(lamp.handle_message(&1));
        assert_eq!(lamp.consumed_by, Some(Light::Global));

        assert!(lamp.handle_message(&2));
        assert_eq!(lamp.consumed_by, Some(Light::Red));
    }

    #[test]
    fn unhandled_message_is_dropped() {
        let mut lamp = Lamp::default();
        lamp.change_state(Light::Green);
        assert!(!lamp.handle_message(&99));
        assert!(lamp.is_in_state(Light::Green));
    }

    #[test]
    fn message_without_any_state_is_dropped() {
        let mut lamp = Lamp::default();
        assert!(!lamp.handle_message(&1));
    }

    #[test]
    fn revert_returns_to_previous() {
        let mut lamp = Lamp::default();
        lamp.change_state(Light::Red);
        lamp.change_state(Light::Green);
        lamp.revert_to_previous_state();
        assert!(lamp.is_in_state(Light::Red));
    }

    #[test]
    fn state_name_reports_current() {
        let mut lamp = Lamp::default();
        assert_eq!(lamp.state_name(), "NONE");
        lamp.change_state(Light::Green);
        assert_eq!(lamp.state_name(), "GREEN");
    }
}
