// src/integrations/enablement.rs
//
// Enablement Gate - the host's "record activity?" toggle.
// The engine only asks; the policy lives outside.

use std::sync::atomic::{AtomicBool, Ordering};

/// Predicate consulted before gated engine actions
pub trait EnablementGate: Send + Sync {
    fn is_enabled(&self) -> bool;
}

impl<F> EnablementGate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_enabled(&self) -> bool {
        self()
    }
}

/// Runtime-switchable gate
#[derive(Debug)]
pub struct EnablementToggle {
    enabled: AtomicBool,
}

impl EnablementToggle {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

impl Default for EnablementToggle {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EnablementGate for EnablementToggle {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_gate() {
        let gate = || false;
        assert!(!gate.is_enabled());
    }

    #[test]
    fn test_toggle() {
        let toggle = EnablementToggle::default();
        assert!(toggle.is_enabled());
        toggle.set(false);
        assert!(!toggle.is_enabled());
    }
}
