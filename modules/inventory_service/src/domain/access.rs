//! Role gate over the pre-authenticated security context

use crate::contract::{InventoryError, Role, SecurityContext};
use uuid::Uuid;

/// What the caller is trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Any tenant member
    Read,
    /// Items, schema, receiving and imports
    Mutate,
    /// Undo of audit entries and operations
    Undo,
    /// Wiping the tenant's inventory
    Reset,
}

fn allowed_roles(permission: Permission) -> &'static [Role] {
    match permission {
        Permission::Read => &[Role::Owner, Role::Boss, Role::Staff],
        Permission::Mutate => &[Role::Owner, Role::Boss],
        Permission::Undo | Permission::Reset => &[Role::Owner],
    }
}

/// Check the caller may perform `permission` and return their actor id
pub fn authorize(ctx: &SecurityContext, permission: Permission) -> Result<Uuid, InventoryError> {
    let actor_id = ctx.actor_id.ok_or(InventoryError::Unauthorized)?;

    if !allowed_roles(permission).contains(&ctx.role) {
        return Err(InventoryError::forbidden(format!(
            "Role {:?} may not perform {:?}",
            ctx.role, permission
        )));
    }

    Ok(actor_id)
}
