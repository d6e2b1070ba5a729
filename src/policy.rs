use crate::models::Role;

/// Operation
///
/// Every record-service operation a caller can request. The decision table
/// below is keyed on this together with the caller's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    ListAll,
    ListAddresses,
    Replace,
    Patch,
    PatchAddress,
    Delete,
}

/// Decision
///
/// The outcome of the pure authorization check. A `Deny` must surface as
/// `Forbidden` before any store access is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// decide
///
/// Pure decision table, role x operation -> allow/deny:
///
/// | Role           | create | list-all | list-addresses | replace | patch | patch-address | delete |
/// |----------------|--------|----------|----------------|---------|-------|---------------|--------|
/// | admin          |   yes  |    yes   |       yes      |   yes   |  yes  |      yes      |   yes  |
/// | read           |   no   |    yes   |       yes      |   no    |  no   |      no       |   no   |
/// | update_address |   no   |    no    |       yes      |   no    |  no   |  address only |   no   |
///
/// `requested_fields` is the set of fields carried with a concrete value.
/// For `PatchAddress` the restriction to `address` is operation-scoped, not
/// role-scoped: an admin sending any other non-null field is denied too. A
/// null or absent field is not a violation.
pub fn decide(role: Role, op: Operation, requested_fields: &[&str]) -> Decision {
    let role_allows = match op {
        Operation::Create | Operation::Replace | Operation::Patch | Operation::Delete => {
            role == Role::Admin
        }
        Operation::ListAll => matches!(role, Role::Admin | Role::Read),
        Operation::ListAddresses => {
            matches!(role, Role::Admin | Role::Read | Role::UpdateAddress)
        }
        Operation::PatchAddress => matches!(role, Role::Admin | Role::UpdateAddress),
    };

    if !role_allows {
        return Decision::Deny;
    }

    if op == Operation::PatchAddress && requested_fields.iter().any(|f| *f != "address") {
        return Decision::Deny;
    }

    Decision::Allow
}
