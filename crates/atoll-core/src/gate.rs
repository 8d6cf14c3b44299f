//! Sequence-number gating and debounce tokens.
//!
//! Asynchronous completions are never cancelled at the transport. Instead
//! every request is tagged with a [`Seq`] from a [`SeqGate`] and every timer
//! with a [`DebounceToken`]; a completion is applied only if its tag is still
//! the latest one issued. Anything older is dropped on arrival.

use std::time::Duration;

/// Sequence number attached to an issued request. Strictly increasing per gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seq(u64);

impl Seq {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Seq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues sequence numbers and decides which completion is current.
#[derive(Debug, Default)]
pub struct SeqGate {
    issued: u64,
    /// The sequence number a completion must carry to be applied, if any.
    current: Option<u64>,
}

impl SeqGate {
    /// Issue the next sequence number. It supersedes every earlier one.
    pub fn issue(&mut self) -> Seq {
        self.issued += 1;
        self.current = Some(self.issued);
        Seq(self.issued)
    }

    /// True when `seq` is the latest issued and has not been superseded.
    pub fn is_current(&self, seq: Seq) -> bool {
        self.current == Some(seq.0)
    }

    /// Invalidate whatever is in flight without issuing a new number.
    pub fn supersede(&mut self) {
        self.current = None;
    }

    /// Mark `seq` as settled so a duplicate completion is treated as stale.
    /// Returns false if `seq` was not current.
    pub fn settle(&mut self, seq: Seq) -> bool {
        if self.is_current(seq) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// True while the latest issued sequence number awaits its completion.
    pub fn in_flight(&self) -> bool {
        self.current.is_some()
    }

    /// Highest sequence number issued so far (0 before the first issue).
    pub fn issued(&self) -> u64 {
        self.issued
    }
}

/// Identifies one armed debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DebounceToken(u64);

/// A resettable debounce: each [`touch`](Debounce::touch) re-arms the timer
/// and invalidates the previous token, so only the last keystroke's timer
/// fires.
#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    generation: u64,
    armed: bool,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            armed: false,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Re-arm the timer. The returned token is the only one that may fire.
    pub fn touch(&mut self) -> DebounceToken {
        self.generation += 1;
        self.armed = true;
        DebounceToken(self.generation)
    }

    /// Consume a timer expiry. Returns true exactly once, for the latest
    /// token, and only while armed.
    pub fn fire(&mut self, token: DebounceToken) -> bool {
        if self.armed && token.0 == self.generation {
            self.armed = false;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.armed = false;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}
