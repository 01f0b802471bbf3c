// Reaction roles module - emoji toggles on one designated message.

mod reaction_role_service;

pub use reaction_role_service::{ReactionEvent, ReactionRoleBinder, ReactionRoleBinding, RoleChange};
