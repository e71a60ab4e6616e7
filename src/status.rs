#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionPhase {
    Connecting,
    Ready,
    Disconnected,
}

impl ConnectionPhase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Connecting => "Connecting…",
            Self::Ready => "Ready",
            Self::Disconnected => "Disconnected",
        }
    }
}

/// Display-only connection phase. No history is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusIndicator {
    phase: Option<ConnectionPhase>,
}

impl StatusIndicator {
    pub fn set(&mut self, phase: ConnectionPhase) {
        self.phase = Some(phase);
    }

    pub fn phase(&self) -> Option<ConnectionPhase> {
        self.phase
    }

    pub fn label(&self) -> &'static str {
        self.phase.map(ConnectionPhase::label).unwrap_or("")
    }
}
