use loancore_api::{Borrowing, Investment};
use loancore_db::{BorrowingModel, InvestmentModel};

pub fn investment_to_domain(model: &InvestmentModel) -> Investment {
    Investment {
        id: model.id,
        amount: model.amount,
        source: model.source.clone(),
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status,
        created_at: model.created_at,
    }
}

pub fn borrowing_to_domain(model: &BorrowingModel) -> Borrowing {
    Borrowing {
        id: model.id,
        amount: model.amount,
        lender: model.lender.clone(),
        start_date: model.start_date,
        end_date: model.end_date,
        status: model.status,
        created_at: model.created_at,
    }
}
