/// Keyboard input: physical key codes mapped onto named actions
use std::cell::RefCell;
use std::rc::Rc;

/// Platform key identifier (DOM `keyCode` numbering)
pub type KeyCode = u32;

/// Logical game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Up,
    Down,
    Shoot,
}

/// Fixed key table: arrow keys and space. There is no remapping.
pub const KEY_BINDINGS: [(KeyCode, Action); 5] = [
    (37, Action::Left),
    (39, Action::Right),
    (38, Action::Up),
    (40, Action::Down),
    (32, Action::Shoot),
];

impl Action {
    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        KEY_BINDINGS
            .iter()
            .find(|(bound, _)| *bound == code)
            .map(|(_, action)| *action)
    }
}

/// Held state of every action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub shoot: bool,
}

impl ControlState {
    pub fn get(&self, action: Action) -> bool {
        match action {
            Action::Left => self.left,
            Action::Right => self.right,
            Action::Up => self.up,
            Action::Down => self.down,
            Action::Shoot => self.shoot,
        }
    }

    pub fn set(&mut self, action: Action, held: bool) {
        let slot = match action {
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
            Action::Up => &mut self.up,
            Action::Down => &mut self.down,
            Action::Shoot => &mut self.shoot,
        };
        *slot = held;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEventKind {
    Press,
    Release,
}

impl KeyEventKind {
    pub fn is_press(self) -> bool {
        self == KeyEventKind::Press
    }

    /// DOM event type name
    pub fn event_type(self) -> &'static str {
        match self {
            KeyEventKind::Press => "keydown",
            KeyEventKind::Release => "keyup",
        }
    }
}

/// What the source should do with an event after the handler saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    /// Suppress default platform handling and further propagation
    Stop,
}

pub type KeyHandler = Box<dyn FnMut(KeyCode) -> Propagation>;

/// Something that delivers key press/release events
pub trait InputSource {
    type Error;

    /// Install a handler that lives as long as the source
    fn subscribe(&mut self, kind: KeyEventKind, handler: KeyHandler) -> Result<(), Self::Error>;
}

/// Shared handle to the action states.
///
/// Clones observe the same state. Construction has no side effects; call
/// [`Controls::attach`] to start listening.
#[derive(Clone, Default)]
pub struct Controls {
    states: Rc<RefCell<ControlState>>,
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to press and release events of `source`
    pub fn attach<S: InputSource + ?Sized>(&self, source: &mut S) -> Result<(), S::Error> {
        for kind in [KeyEventKind::Press, KeyEventKind::Release] {
            let controls = self.clone();
            source.subscribe(
                kind,
                Box::new(move |code| controls.on_key_event(kind.is_press(), code)),
            )?;
        }
        tracing::debug!("controls attached to input source");
        Ok(())
    }

    /// Apply one key event. Unmapped codes are ignored.
    pub fn on_key_event(&self, pressed: bool, code: KeyCode) -> Propagation {
        match Action::from_key_code(code) {
            Some(action) => {
                self.states.borrow_mut().set(action, pressed);
                Propagation::Stop
            }
            None => Propagation::Continue,
        }
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.states.borrow().get(action)
    }

    /// Copy of the current state, taken once per frame
    pub fn snapshot(&self) -> ControlState {
        *self.states.borrow()
    }
}

/// In-process input source; the native host feeds window events through it
#[derive(Default)]
pub struct KeyRouter {
    press: Vec<KeyHandler>,
    release: Vec<KeyHandler>,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every handler for `kind`; stops if any handler asked to
    pub fn dispatch(&mut self, kind: KeyEventKind, code: KeyCode) -> Propagation {
        let handlers = match kind {
            KeyEventKind::Press => &mut self.press,
            KeyEventKind::Release => &mut self.release,
        };
        let mut result = Propagation::Continue;
        for handler in handlers.iter_mut() {
            if handler(code) == Propagation::Stop {
                result = Propagation::Stop;
            }
        }
        result
    }

    pub fn handler_count(&self) -> usize {
        self.press.len() + self.release.len()
    }
}

impl InputSource for KeyRouter {
    type Error = std::convert::Infallible;

    fn subscribe(&mut self, kind: KeyEventKind, handler: KeyHandler) -> Result<(), Self::Error> {
        match kind {
            KeyEventKind::Press => self.press.push(handler),
            KeyEventKind::Release => self.release.push(handler),
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::{Document, KeyboardEvent};

    /// Keyboard events of a browser document
    pub struct DocumentKeys {
        document: Document,
    }

    impl DocumentKeys {
        pub fn new(document: Document) -> Self {
            Self { document }
        }
    }

    impl InputSource for DocumentKeys {
        type Error = JsValue;

        fn subscribe(&mut self, kind: KeyEventKind, mut handler: KeyHandler) -> Result<(), JsValue> {
            let listener = Closure::wrap(Box::new(move |e: KeyboardEvent| {
                if handler(e.key_code()) == Propagation::Stop {
                    e.prevent_default();
                    e.stop_propagation();
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            self.document
                .add_event_listener_with_callback(kind.event_type(), listener.as_ref().unchecked_ref())?;
            // Subscriptions live for the whole page
            listener.forget();
            Ok(())
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod native {
    use super::KeyCode;
    use winit::keyboard::KeyCode as WinitKey;

    /// Translate a winit physical key into the DOM numbering the key table uses
    pub fn key_code_from_winit(key: WinitKey) -> Option<KeyCode> {
        match key {
            WinitKey::ArrowLeft => Some(37),
            WinitKey::ArrowUp => Some(38),
            WinitKey::ArrowRight => Some(39),
            WinitKey::ArrowDown => Some(40),
            WinitKey::Space => Some(32),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_table_covers_every_action() {
        for action in [Action::Left, Action::Right, Action::Up, Action::Down, Action::Shoot] {
            assert!(KEY_BINDINGS.iter().any(|(_, a)| *a == action), "{action:?} unbound");
        }
        assert_eq!(Action::from_key_code(37), Some(Action::Left));
        assert_eq!(Action::from_key_code(32), Some(Action::Shoot));
        assert_eq!(Action::from_key_code(65), None);
    }

    #[test]
    fn test_actions_are_independent() {
        let controls = Controls::new();
        controls.on_key_event(true, 37);
        controls.on_key_event(true, 32);
        assert!(controls.is_held(Action::Left));
        assert!(controls.is_held(Action::Shoot));

        controls.on_key_event(false, 37);
        assert!(!controls.is_held(Action::Left));
        assert!(controls.is_held(Action::Shoot));
    }

    #[test]
    fn test_unmapped_code_is_ignored() {
        let controls = Controls::new();
        assert_eq!(controls.on_key_event(true, 87), Propagation::Continue);
        assert_eq!(controls.snapshot(), ControlState::default());
    }

    #[test]
    fn test_attach_subscribes_press_and_release() {
        let controls = Controls::new();
        let mut router = KeyRouter::new();
        controls.attach(&mut router).unwrap();
        assert_eq!(router.handler_count(), 2);

        assert_eq!(router.dispatch(KeyEventKind::Press, 38), Propagation::Stop);
        assert!(controls.snapshot().up);
        assert_eq!(router.dispatch(KeyEventKind::Release, 38), Propagation::Stop);
        assert!(!controls.snapshot().up);
        assert_eq!(router.dispatch(KeyEventKind::Press, 13), Propagation::Continue);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let controls = Controls::new();
        controls.on_key_event(true, 40);
        let frame = controls.snapshot();
        controls.on_key_event(false, 40);
        assert!(frame.down);
        assert!(!controls.snapshot().down);
    }
}
