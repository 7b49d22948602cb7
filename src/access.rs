//! Access resolution: which role a viewer holds on a project, and which
//! surface that role opens.
//!
//! Link-level edit beats a named edit invite, which beats link-level view,
//! which beats a named view invite. Everything here is pure.

use serde::{Deserialize, Serialize};

use crate::projects::{GeneralAccess, InviteRole, Project};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRole {
    Editor,
    Viewer,
    None,
}

impl AccessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Viewer => "viewer",
            Self::None => "none",
        }
    }
}

impl std::fmt::Display for AccessRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to present for a project link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Editor,
    Viewer,
    NotFound,
}

/// How invite addresses are compared with the viewer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailMatching {
    /// Case-sensitive equality.
    #[default]
    Exact,
    /// Trimmed, lower-cased equality.
    Normalized,
}

impl EmailMatching {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Normalized => "normalized",
        }
    }
}

impl std::fmt::Display for EmailMatching {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmailMatching {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "normalized" => Ok(Self::Normalized),
            _ => Err(format!("unknown email matching mode: {s}")),
        }
    }
}

/// Whether an invite address names `identity`. The anonymous (empty) identity
/// never matches.
pub fn identity_matches(invite_email: &str, identity: &str, matching: EmailMatching) -> bool {
    match matching {
        EmailMatching::Exact => !identity.is_empty() && invite_email == identity,
        EmailMatching::Normalized => {
            let identity = identity.trim();
            !identity.is_empty() && invite_email.trim().eq_ignore_ascii_case(identity)
        }
    }
}

pub fn resolve_access(project: &Project, viewer: &str, matching: EmailMatching) -> AccessRole {
    let invited_as = |role: InviteRole| {
        project
            .invites
            .iter()
            .any(|i| i.role == role && identity_matches(&i.email, viewer, matching))
    };

    if project.general_access == GeneralAccess::Edit || invited_as(InviteRole::Edit) {
        AccessRole::Editor
    } else if project.general_access == GeneralAccess::View || invited_as(InviteRole::View) {
        AccessRole::Viewer
    } else {
        AccessRole::None
    }
}

/// Surface for a resolved role. A role of `None` never opens the editor.
pub fn surface_for(role: AccessRole) -> Surface {
    match role {
        AccessRole::Editor => Surface::Editor,
        AccessRole::Viewer => Surface::Viewer,
        AccessRole::None => Surface::NotFound,
    }
}

/// Resolve a looked-up project (or its absence) straight to a surface.
pub fn resolve_surface(project: Option<&Project>, viewer: &str, matching: EmailMatching) -> Surface {
    match project {
        Some(project) => surface_for(resolve_access(project, viewer, matching)),
        None => Surface::NotFound,
    }
}
