use loancore_api::AuditEntry;
use loancore_db::AuditEntryModel;

pub fn to_domain(model: &AuditEntryModel) -> AuditEntry {
    AuditEntry {
        id: model.id,
        actor_user_id: model.actor_user_id,
        action: model.action,
        entity_type: model.entity_type.clone(),
        entity_id: model.entity_id,
        before: model.before.clone(),
        after: model.after.clone(),
        ip: model.ip.clone(),
        user_agent: model.user_agent.clone(),
        remarks: model.remarks.clone(),
        created_at: model.created_at,
    }
}
