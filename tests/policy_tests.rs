use padron_portal::models::Role;
use padron_portal::policy::{Decision, Operation, decide};

const ALL_ROLES: [Role; 3] = [Role::Admin, Role::Read, Role::UpdateAddress];

fn allowed(role: Role, op: Operation) -> bool {
    decide(role, op, &[]) == Decision::Allow
}

#[test]
fn admin_is_allowed_every_operation() {
    for op in [
        Operation::Create,
        Operation::ListAll,
        Operation::ListAddresses,
        Operation::Replace,
        Operation::Patch,
        Operation::PatchAddress,
        Operation::Delete,
    ] {
        assert!(allowed(Role::Admin, op), "admin denied {op:?}");
    }
}

#[test]
fn read_role_is_read_only() {
    assert!(allowed(Role::Read, Operation::ListAll));
    assert!(allowed(Role::Read, Operation::ListAddresses));

    assert!(!allowed(Role::Read, Operation::Create));
    assert!(!allowed(Role::Read, Operation::Replace));
    assert!(!allowed(Role::Read, Operation::Patch));
    assert!(!allowed(Role::Read, Operation::PatchAddress));
    assert!(!allowed(Role::Read, Operation::Delete));
}

#[test]
fn update_address_role_sees_addresses_only() {
    assert!(allowed(Role::UpdateAddress, Operation::ListAddresses));
    assert!(allowed(Role::UpdateAddress, Operation::PatchAddress));

    assert!(!allowed(Role::UpdateAddress, Operation::ListAll));
    assert!(!allowed(Role::UpdateAddress, Operation::Create));
    assert!(!allowed(Role::UpdateAddress, Operation::Replace));
    assert!(!allowed(Role::UpdateAddress, Operation::Patch));
    assert!(!allowed(Role::UpdateAddress, Operation::Delete));
}

#[test]
fn patch_address_with_extra_set_field_is_denied_for_every_role() {
    // The single-field restriction is operation-scoped, not role-scoped:
    // even an admin carrying a second concrete field is denied.
    for role in ALL_ROLES {
        assert_eq!(
            decide(role, Operation::PatchAddress, &["address", "phone"]),
            Decision::Deny,
            "{role:?} was not denied the extra field"
        );
    }
}

#[test]
fn patch_address_with_only_address_set_is_allowed_for_eligible_roles() {
    assert_eq!(
        decide(Role::Admin, Operation::PatchAddress, &["address"]),
        Decision::Allow
    );
    assert_eq!(
        decide(Role::UpdateAddress, Operation::PatchAddress, &["address"]),
        Decision::Allow
    );
    assert_eq!(
        decide(Role::Read, Operation::PatchAddress, &["address"]),
        Decision::Deny
    );
}

#[test]
fn patch_address_ignores_absent_fields() {
    // An omitted (or null, hence not "set") field is not a violation; only
    // present values count against the restriction.
    assert_eq!(
        decide(Role::UpdateAddress, Operation::PatchAddress, &[]),
        Decision::Allow
    );
}
