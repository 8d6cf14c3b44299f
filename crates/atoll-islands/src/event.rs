//! Semantic page events: raw DOM events mapped to an island-agnostic
//! vocabulary so islands never interpret key codes or mouse buttons directly.
//!
//! # Usage
//!
//! The page shell calls [`to_page_event`] on every [`DomEvent`], or
//! [`to_page_event_insert`] while focus is inside an editable control, and
//! matches on the returned [`PageEvent`].
//!
//! # Keybindings
//!
//! | Input                              | Event            |
//! |------------------------------------|------------------|
//! | shortcut key (default `/`)         | `OpenSearch`     |
//! | `Escape`                           | `Dismiss`        |
//! | `Enter`                            | `Submit`         |
//! | text input into a control          | `QueryChanged`   |
//! | click                              | `Click`          |
//! | scroll                             | `Scrolled`       |
//! | history back / forward             | `Back`/`Forward` |
//!
//! ## Insert mode
//!
//! While an editable element has focus the shortcut key is just a
//! character, so typing `/` into a comment box never opens the dialog.
//! `Escape`, `Enter`, input, clicks and history keep their meaning.

use atoll_core::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
    Enter,
    Tab,
    Backspace,
    /// Any other named key (`"F5"`, `"ArrowUp"`, ...).
    Named(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        meta: false,
        shift: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    pub const META: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    /// No command modifier held. Shift alone still counts as plain because
    /// some layouts need it to type the shortcut character.
    pub fn is_plain(self) -> bool {
        !self.ctrl && !self.alt && !self.meta
    }

    pub fn is_empty(self) -> bool {
        self == Modifiers::NONE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
}

/// A raw event as the browser would deliver it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    KeyDown { key: Key, modifiers: Modifiers },
    /// The value of a form control changed.
    Input { target: NodeId, value: String },
    Click {
        target: NodeId,
        button: MouseButton,
        modifiers: Modifiers,
    },
    /// Viewport moved. `tops` are heading ids with their top offset relative
    /// to the viewport, in pixels.
    Scroll { scroll_y: u32, tops: Vec<(String, i32)> },
    Back,
    Forward,
}

/// A semantic event derived from a [`DomEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    OpenSearch,
    /// Close the active modal.
    Dismiss,
    /// Run the pending query now instead of waiting for the debounce.
    Submit,
    QueryChanged { target: NodeId, value: String },
    /// `plain` is a primary-button click with no modifier held, the only
    /// kind of activation the partial-update layer may intercept.
    Click { target: NodeId, plain: bool },
    Scrolled { scroll_y: u32, tops: Vec<(String, i32)> },
    Back,
    Forward,
}

/// Map a [`DomEvent`] to a [`PageEvent`] (focus outside editable controls).
///
/// Returns `None` for events with no meaning to the page (unbound keys,
/// modified shortcut presses).
pub fn to_page_event(event: DomEvent, shortcut: char) -> Option<PageEvent> {
    match event {
        DomEvent::KeyDown {
            key: Key::Char(c),
            modifiers,
        } if c == shortcut && modifiers.is_plain() => Some(PageEvent::OpenSearch),
        other => map_common(other),
    }
}

/// Map a [`DomEvent`] to a [`PageEvent`] while an editable control has focus.
pub fn to_page_event_insert(event: DomEvent) -> Option<PageEvent> {
    map_common(event)
}

fn map_common(event: DomEvent) -> Option<PageEvent> {
    match event {
        DomEvent::KeyDown { key, modifiers } => match key {
            Key::Escape => Some(PageEvent::Dismiss),
            Key::Enter if modifiers.is_empty() => Some(PageEvent::Submit),
            _ => None,
        },
        DomEvent::Input { target, value } => Some(PageEvent::QueryChanged { target, value }),
        DomEvent::Click {
            target,
            button,
            modifiers,
        } => Some(PageEvent::Click {
            target,
            plain: button == MouseButton::Primary && modifiers.is_empty(),
        }),
        DomEvent::Scroll { scroll_y, tops } => Some(PageEvent::Scrolled { scroll_y, tops }),
        DomEvent::Back => Some(PageEvent::Back),
        DomEvent::Forward => Some(PageEvent::Forward),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
