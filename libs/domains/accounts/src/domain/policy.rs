use super::user::User;

/// Authorization rules for acting on accounts other than one's own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyService;

impl PolicyService {
    pub fn new() -> Self {
        Self
    }

    pub fn can_edit_others(&self, actor: &User) -> bool {
        actor.state().is_active() && actor.status().is_admin()
    }

    // Not consumed by any workflow yet; reads of other accounts will use it.
    pub fn can_read_others(&self, actor: &User) -> bool {
        actor.state().is_active() && actor.status().is_admin()
    }
}
