use loancore_api::{Loan, LoanCharge, LoanTerms, ScheduleRow};
use loancore_db::{LoanChargeModel, LoanModel, ScheduleRowModel};

pub fn to_domain(model: &LoanModel) -> Loan {
    Loan {
        id: model.id,
        loan_number: model.loan_number,
        terms: LoanTerms {
            principal: model.principal,
            annual_interest_percent: model.annual_interest_percent,
            tenure_installments: model.tenure_installments as u32,
            frequency: model.frequency,
            repayment_type: model.repayment_type,
            grace_period_days: model.grace_period_days as u32,
            late_fee_daily_percent: model.late_fee_daily_percent,
            penalty_percent: model.penalty_percent,
        },
        installment_amount: model.installment_amount,
        total_interest: model.total_interest,
        total_amount: model.total_amount,
        disbursed_amount: model.disbursed_amount,
        disbursed_at: model.disbursed_at,
        start_date: model.start_date,
        end_date: model.end_date,
        outstanding_principal: model.outstanding_principal,
        outstanding_interest: model.outstanding_interest,
        total_collected: model.total_collected,
        total_late_fees_paid: model.total_late_fees_paid,
        total_penalties_paid: model.total_penalties_paid,
        status: model.status,
        closed_at: model.closed_at,
        is_top_up: model.is_top_up,
        original_loan_id: model.original_loan_id,
        top_up_amount: model.top_up_amount,
        customer_id: model.customer_id,
        created_by: model.created_by,
        remarks: model.remarks.clone(),
        created_at: model.created_at,
        last_updated_at: model.last_updated_at,
    }
}

pub fn to_model(loan: &Loan) -> LoanModel {
    LoanModel {
        id: loan.id,
        loan_number: loan.loan_number,
        principal: loan.terms.principal,
        annual_interest_percent: loan.terms.annual_interest_percent,
        tenure_installments: loan.terms.tenure_installments as i32,
        frequency: loan.terms.frequency,
        repayment_type: loan.terms.repayment_type,
        grace_period_days: loan.terms.grace_period_days as i32,
        late_fee_daily_percent: loan.terms.late_fee_daily_percent,
        penalty_percent: loan.terms.penalty_percent,
        installment_amount: loan.installment_amount,
        total_interest: loan.total_interest,
        total_amount: loan.total_amount,
        disbursed_amount: loan.disbursed_amount,
        disbursed_at: loan.disbursed_at,
        start_date: loan.start_date,
        end_date: loan.end_date,
        outstanding_principal: loan.outstanding_principal,
        outstanding_interest: loan.outstanding_interest,
        total_collected: loan.total_collected,
        total_late_fees_paid: loan.total_late_fees_paid,
        total_penalties_paid: loan.total_penalties_paid,
        status: loan.status,
        closed_at: loan.closed_at,
        is_top_up: loan.is_top_up,
        original_loan_id: loan.original_loan_id,
        top_up_amount: loan.top_up_amount,
        customer_id: loan.customer_id,
        created_by: loan.created_by,
        remarks: loan.remarks.clone(),
        created_at: loan.created_at,
        last_updated_at: loan.last_updated_at,
    }
}

pub fn charge_to_domain(model: &LoanChargeModel) -> LoanCharge {
    LoanCharge {
        id: model.id,
        loan_id: model.loan_id,
        charge_type: model.charge_type,
        amount: model.amount,
    }
}

pub fn charge_to_model(charge: &LoanCharge) -> LoanChargeModel {
    LoanChargeModel {
        id: charge.id,
        loan_id: charge.loan_id,
        charge_type: charge.charge_type,
        amount: charge.amount,
    }
}

pub fn schedule_row_to_domain(model: &ScheduleRowModel) -> ScheduleRow {
    ScheduleRow {
        id: model.id,
        loan_id: model.loan_id,
        installment_number: model.installment_number as u32,
        due_date: model.due_date,
        principal_due: model.principal_due,
        interest_due: model.interest_due,
        total_due: model.total_due,
        principal_paid: model.principal_paid,
        interest_paid: model.interest_paid,
        total_paid: model.total_paid,
        status: model.status,
        paid_at: model.paid_at,
    }
}

pub fn schedule_row_to_model(row: &ScheduleRow) -> ScheduleRowModel {
    ScheduleRowModel {
        id: row.id,
        loan_id: row.loan_id,
        installment_number: row.installment_number as i32,
        due_date: row.due_date,
        principal_due: row.principal_due,
        interest_due: row.interest_due,
        total_due: row.total_due,
        principal_paid: row.principal_paid,
        interest_paid: row.interest_paid,
        total_paid: row.total_paid,
        status: row.status,
        paid_at: row.paid_at,
    }
}
