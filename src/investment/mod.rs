//! Investments and their capital/profit-loss transaction histories.

mod db;
mod models;

pub use db::{
    create_investment, create_investment_table, create_investment_transaction,
    create_investment_transaction_table, delete_investment, delete_investment_transaction,
    get_investment, get_investment_transaction, list_investment_transactions, list_investments,
    map_investment_row, map_investment_transaction_row, set_investment_totals, update_investment,
    update_investment_transaction,
};
pub use models::{
    InvestmentBuilder, InvestmentEntry, InvestmentTransaction, InvestmentTransactionBuilder,
};
