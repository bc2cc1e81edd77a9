use loancore_api::{Collection, LateFee, Penalty};
use loancore_db::{CollectionModel, LateFeeModel, PenaltyModel};

pub fn to_domain(model: &CollectionModel) -> Collection {
    Collection {
        id: model.id,
        loan_id: model.loan_id,
        agent_id: model.agent_id,
        amount: model.amount,
        principal_allocation: model.principal_allocation,
        interest_allocation: model.interest_allocation,
        fee_allocation: model.fee_allocation,
        penalty_allocation: model.penalty_allocation,
        collection_date: model.collection_date,
        payment_method: model.payment_method,
        receipt_number: model.receipt_number.clone(),
        remarks: model.remarks.clone(),
        created_at: model.created_at,
    }
}

pub fn to_model(collection: &Collection) -> CollectionModel {
    CollectionModel {
        id: collection.id,
        loan_id: collection.loan_id,
        agent_id: collection.agent_id,
        amount: collection.amount,
        principal_allocation: collection.principal_allocation,
        interest_allocation: collection.interest_allocation,
        fee_allocation: collection.fee_allocation,
        penalty_allocation: collection.penalty_allocation,
        collection_date: collection.collection_date,
        payment_method: collection.payment_method,
        receipt_number: collection.receipt_number.clone(),
        remarks: collection.remarks.clone(),
        created_at: collection.created_at,
    }
}

pub fn late_fee_to_domain(model: &LateFeeModel) -> LateFee {
    LateFee {
        id: model.id,
        loan_id: model.loan_id,
        schedule_row_id: model.schedule_row_id,
        amount: model.amount,
        paid_amount: model.paid_amount,
        overdue_days: model.overdue_days,
        applied_at: model.applied_at,
        paid: model.paid,
    }
}

pub fn penalty_to_domain(model: &PenaltyModel) -> Penalty {
    Penalty {
        id: model.id,
        loan_id: model.loan_id,
        amount: model.amount,
        paid_amount: model.paid_amount,
        reason: model.reason.clone(),
        applied_at: model.applied_at,
        paid: model.paid,
    }
}
