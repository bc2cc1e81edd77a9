use loancore_api::{AgentAssignment, Customer, ManagerPermissions, Role, User};
use loancore_db::{AgentAssignmentModel, CustomerModel, UserModel};

/// `ManagerPermissions` is denormalized onto `UserModel` as three booleans
/// regardless of role; it is only meaningful (and only surfaced in the
/// domain shape) when `role == Manager`.
pub fn user_to_domain(model: &UserModel) -> User {
    User {
        id: model.id,
        email: model.email.clone(),
        full_name: model.full_name.clone(),
        role: model.role,
        is_active: model.is_active,
        password_hash: model.password_hash.clone(),
        manager_permissions: matches!(model.role, Role::Manager).then_some(ManagerPermissions {
            may_delete_collections: model.may_delete_collections,
            may_delete_customers: model.may_delete_customers,
            may_delete_users: model.may_delete_users,
        }),
        created_at: model.created_at,
        last_updated_at: model.last_updated_at,
    }
}

pub fn user_to_model(user: &User) -> UserModel {
    let permissions = user.manager_permissions.unwrap_or_default();
    UserModel {
        id: user.id,
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        role: user.role,
        is_active: user.is_active,
        password_hash: user.password_hash.clone(),
        may_delete_collections: permissions.may_delete_collections,
        may_delete_customers: permissions.may_delete_customers,
        may_delete_users: permissions.may_delete_users,
        created_at: user.created_at,
        last_updated_at: user.last_updated_at,
    }
}

pub fn customer_to_domain(model: &CustomerModel) -> Customer {
    Customer {
        user_id: model.user_id,
        kyc_status: model.kyc_status,
        date_of_birth: model.date_of_birth,
        id_proof: model.id_proof.clone(),
        created_at: model.created_at,
    }
}

pub fn customer_to_model(customer: &Customer) -> CustomerModel {
    CustomerModel {
        user_id: customer.user_id,
        kyc_status: customer.kyc_status,
        date_of_birth: customer.date_of_birth,
        id_proof: customer.id_proof.clone(),
        created_at: customer.created_at,
    }
}

pub fn assignment_to_domain(model: &AgentAssignmentModel) -> AgentAssignment {
    AgentAssignment {
        id: model.id,
        agent_user_id: model.agent_user_id,
        customer_id: model.customer_id,
        is_active: model.is_active,
        assigned_at: model.assigned_at,
        unassigned_at: model.unassigned_at,
    }
}
