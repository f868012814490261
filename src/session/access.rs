use serde::{Deserialize, Serialize};

use crate::foundation::error::{ShotreelError, ShotreelResult};

/// Execution environment of a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Env {
    /// Live preview attached to a display surface.
    Interactive,
    /// Headless, deterministic file export.
    #[default]
    Export,
}

impl Env {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Export => "export",
        }
    }
}

/// Requirements an operation places on the session before it may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessPrivilege {
    pub method_name: &'static str,
    /// Environment the operation is restricted to, if any.
    pub env: Option<Env>,
    /// Needs a built timeline.
    pub is_ready: bool,
    /// Needs a live drawing surface.
    pub has_canvas: bool,
}

impl AccessPrivilege {
    pub const fn new(method_name: &'static str) -> Self {
        Self {
            method_name,
            env: None,
            is_ready: false,
            has_canvas: false,
        }
    }

    pub const fn only(mut self, env: Env) -> Self {
        self.env = Some(env);
        self
    }

    pub const fn ready(mut self) -> Self {
        self.is_ready = true;
        self
    }

    pub const fn canvas(mut self) -> Self {
        self.has_canvas = true;
        self
    }
}

/// What a session currently offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub env: Env,
    pub is_ready: bool,
    pub has_canvas: bool,
}

/// Check `privilege` against `caps`; the first unmet requirement is reported.
pub fn validate_access(privilege: &AccessPrivilege, caps: Capabilities) -> ShotreelResult<()> {
    let method = privilege.method_name;
    if let Some(env) = privilege.env
        && env != caps.env
    {
        return Err(ShotreelError::capability_missing(
            method,
            format!(
                "only supported in {} sessions (current: {})",
                env.as_str(),
                caps.env.as_str()
            ),
        ));
    }
    if privilege.is_ready && !caps.is_ready {
        return Err(ShotreelError::not_ready(format!(
            "run generate before calling '{method}'"
        )));
    }
    if privilege.has_canvas && !caps.has_canvas {
        return Err(ShotreelError::capability_missing(
            method,
            "a live drawing surface is required",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/session/access.rs"]
mod tests;
