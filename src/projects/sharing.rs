//! Share-dialog edits on a project's access settings. These only change the
//! in-memory record; persist with [`ProjectStore::update`](super::ProjectStore::update).

use super::types::{GeneralAccess, Invite, InviteRole, Project};

impl Project {
    pub fn set_general_access(&mut self, access: GeneralAccess) {
        self.general_access = access;
    }

    /// Grant `role` to `email`. An existing invite for the same address keeps
    /// its position and takes the new role. Blank addresses are ignored.
    pub fn add_invite(&mut self, email: &str, role: InviteRole) {
        let email = email.trim();
        if email.is_empty() {
            return;
        }
        match self.invites.iter_mut().find(|i| i.email == email) {
            Some(existing) => existing.role = role,
            None => self.invites.push(Invite {
                email: email.to_string(),
                role,
            }),
        }
    }

    /// Drop every invite for `email`. Returns whether anything was removed.
    pub fn remove_invite(&mut self, email: &str) -> bool {
        let before = self.invites.len();
        self.invites.retain(|i| i.email != email);
        self.invites.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_invite_replaces_role_in_place() {
        let mut project = Project::new_default("Shared");
        project.add_invite("a@x.edu", InviteRole::View);
        project.add_invite("b@x.edu", InviteRole::View);
        project.add_invite("a@x.edu", InviteRole::Edit);

        assert_eq!(project.invites.len(), 2);
        assert_eq!(project.invites[0].email, "a@x.edu");
        assert_eq!(project.invites[0].role, InviteRole::Edit);
    }

    #[test]
    fn blank_invite_is_ignored() {
        let mut project = Project::new_default("Shared");
        project.add_invite("   ", InviteRole::Edit);
        assert!(project.invites.is_empty());
    }

    #[test]
    fn remove_invite_reports_change() {
        let mut project = Project::new_default("Shared");
        project.add_invite("a@x.edu", InviteRole::View);
        assert!(project.remove_invite("a@x.edu"));
        assert!(!project.remove_invite("a@x.edu"));
    }
}
