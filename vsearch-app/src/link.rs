use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;
use vsearch_core::{Key, Screen};
use vsearch_experiment::{Frontend, FrontendError, KeyPress};
use winit::event_loop::EventLoopProxy;
use winit::keyboard::{Key as LogicalKey, KeyCode, PhysicalKey};

/// Requests from the experiment thread to the event loop.
#[derive(Debug)]
pub enum UserEvent {
    Present(Screen),
    Finished,
}

/// A key press stamped on the shared timer when the window received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStamp {
    pub key: Key,
    pub at_ns: u64,
}

/// Event-loop end of the link: reports frame onsets and key presses.
pub struct DisplaySide {
    pub onsets: Sender<u64>,
    pub keys: Sender<KeyStamp>,
}

/// `Frontend` backed by the window. `present` blocks until the frame is on
/// screen; reaction times are measured from that onset.
pub struct WindowFrontend {
    proxy: EventLoopProxy<UserEvent>,
    onsets: Receiver<u64>,
    keys: Receiver<KeyStamp>,
    abort_key: Key,
    onset_ns: u64,
}

pub fn channel(proxy: EventLoopProxy<UserEvent>, abort_key: Key) -> (WindowFrontend, DisplaySide) {
    let (onset_tx, onset_rx) = mpsc::channel();
    let (key_tx, key_rx) = mpsc::channel();
    let frontend = WindowFrontend {
        proxy,
        onsets: onset_rx,
        keys: key_rx,
        abort_key,
        onset_ns: 0,
    };
    let display = DisplaySide {
        onsets: onset_tx,
        keys: key_tx,
    };
    (frontend, display)
}

impl WindowFrontend {
    /// Tells the event loop the run is over.
    pub fn finish(&self) {
        let _ = self.proxy.send_event(UserEvent::Finished);
    }
}

impl Frontend for WindowFrontend {
    fn present(&mut self, screen: &Screen) -> Result<(), FrontendError> {
        self.proxy
            .send_event(UserEvent::Present(screen.clone()))
            .map_err(|_| FrontendError::DisplayClosed)?;
        self.onset_ns = self.onsets.recv().map_err(|_| FrontendError::DisplayClosed)?;
        Ok(())
    }

    fn wait_for_key(&mut self, allowed: Option<&[Key]>) -> Result<KeyPress, FrontendError> {
        next_response(&self.keys, self.onset_ns, allowed, self.abort_key)
    }
}

/// Pulls key presses until one is acceptable. Presses made before the onset
/// are stale and dropped, except the abort key.
pub fn next_response(
    keys: &Receiver<KeyStamp>,
    onset_ns: u64,
    allowed: Option<&[Key]>,
    abort_key: Key,
) -> Result<KeyPress, FrontendError> {
    loop {
        let stamp = keys.recv().map_err(|_| FrontendError::InputClosed)?;
        if stamp.at_ns < onset_ns && stamp.key != abort_key {
            continue;
        }
        if !allowed.is_none_or(|keys| keys.contains(&stamp.key)) {
            continue;
        }
        let rt = Duration::from_nanos(stamp.at_ns.saturating_sub(onset_ns));
        return Ok(KeyPress {
            key: stamp.key,
            reaction_time_ms: rt.as_millis() as u64,
        });
    }
}

/// Named keys come from the physical layout; letters and digits from the
/// logical key so the user's keyboard layout applies.
pub fn map_key(physical: PhysicalKey, logical: &LogicalKey) -> Key {
    if let PhysicalKey::Code(code) = physical {
        match code {
            KeyCode::ArrowLeft => return Key::ArrowLeft,
            KeyCode::ArrowRight => return Key::ArrowRight,
            KeyCode::ArrowUp => return Key::ArrowUp,
            KeyCode::ArrowDown => return Key::ArrowDown,
            KeyCode::Space => return Key::Space,
            KeyCode::Enter | KeyCode::NumpadEnter => return Key::Enter,
            KeyCode::Escape => return Key::Escape,
            _ => {}
        }
    }
    match logical {
        LogicalKey::Character(text) => text
            .chars()
            .next()
            .filter(|c| !c.is_whitespace())
            .map_or(Key::Other, |c| Key::Char(c.to_ascii_lowercase())),
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::{NamedKey, NativeKey};

    fn stamp(key: Key, ms: u64) -> KeyStamp {
        KeyStamp {
            key,
            at_ns: ms * 1_000_000,
        }
    }

    fn queue(stamps: &[KeyStamp]) -> Receiver<KeyStamp> {
        let (tx, rx) = mpsc::channel();
        for s in stamps {
            tx.send(*s).unwrap();
        }
        rx
    }

    const RESPONSES: [Key; 3] = [Key::ArrowRight, Key::ArrowLeft, Key::Escape];

    #[test]
    fn reaction_time_is_measured_from_onset() {
        let rx = queue(&[stamp(Key::ArrowLeft, 1_432)]);
        let press = next_response(&rx, 1_000 * 1_000_000, Some(&RESPONSES), Key::Escape).unwrap();
        assert_eq!(press.key, Key::ArrowLeft);
        assert_eq!(press.reaction_time_ms, 432);
    }

    #[test]
    fn stale_and_disallowed_presses_are_skipped() {
        let rx = queue(&[
            stamp(Key::ArrowRight, 900),
            stamp(Key::Char('x'), 1_100),
            stamp(Key::ArrowRight, 1_250),
        ]);
        let press = next_response(&rx, 1_000 * 1_000_000, Some(&RESPONSES), Key::Escape).unwrap();
        assert_eq!(press.reaction_time_ms, 250);
    }

    #[test]
    fn early_abort_is_kept() {
        let rx = queue(&[stamp(Key::Escape, 900)]);
        let press = next_response(&rx, 1_000 * 1_000_000, Some(&RESPONSES), Key::Escape).unwrap();
        assert_eq!(press.key, Key::Escape);
        assert_eq!(press.reaction_time_ms, 0);
    }

    #[test]
    fn closed_input_is_an_error() {
        let rx = queue(&[stamp(Key::Char('x'), 1_100)]);
        let err = next_response(&rx, 0, Some(&RESPONSES), Key::Escape).unwrap_err();
        assert!(matches!(err, FrontendError::InputClosed));
    }

    #[test]
    fn maps_named_and_character_keys() {
        let none = LogicalKey::Unidentified(NativeKey::Unidentified);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ArrowRight), &none), Key::ArrowRight);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::NumpadEnter), &none), Key::Enter);
        assert_eq!(
            map_key(PhysicalKey::Code(KeyCode::KeyC), &LogicalKey::Character("C".into())),
            Key::Char('c')
        );
        assert_eq!(
            map_key(PhysicalKey::Code(KeyCode::Tab), &LogicalKey::Named(NamedKey::Tab)),
            Key::Other
        );
    }
}
