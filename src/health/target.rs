// src/health/target.rs
use std::fmt;

/// One of the two services the panel watches. Paths are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeTarget {
    Hello,
    Greet,
}

impl ProbeTarget {
    /// Probe order. `Greet` is only requested after `Hello` answers.
    pub const ALL: [ProbeTarget; 2] = [ProbeTarget::Hello, ProbeTarget::Greet];

    pub fn path(&self) -> &'static str {
        match self {
            ProbeTarget::Hello => "/hello",
            ProbeTarget::Greet => "/greet",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProbeTarget::Hello => "hello",
            ProbeTarget::Greet => "greet",
        }
    }

    /// Heading text used by the panel.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeTarget::Hello => "\"hello, world!\"",
            ProbeTarget::Greet => "\"greet\"",
        }
    }
}

impl fmt::Display for ProbeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
