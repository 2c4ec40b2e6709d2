use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::rules::payroll::{Allowances, Deductions};

pub const PAYMENT_PENDING: &str = "pending";
pub const PAYMENT_PROCESSED: &str = "processed";
pub const PAYMENT_PAID: &str = "paid";

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Payroll {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub basic_salary: f64,

    pub allowance_housing: f64,
    pub allowance_transport: f64,
    pub allowance_medical: f64,
    pub allowance_food: f64,
    pub allowance_overtime: f64,
    pub allowance_bonus: f64,
    pub allowance_other: f64,

    pub deduction_tax: f64,
    pub deduction_social_security: f64,
    pub deduction_insurance: f64,
    pub deduction_provident_fund: f64,
    pub deduction_loan: f64,
    pub deduction_advance: f64,
    pub deduction_other: f64,

    pub unpaid_leaves: f64,
    pub leave_deduction_amount: f64,

    pub working_days: f64,
    pub present_days: f64,
    pub absent_days: f64,
    pub half_days: f64,
    pub overtime_hours: f64,
    pub late_arrivals: i32,
    pub early_departures: i32,

    pub gross_salary: f64,
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub net_salary: f64,

    pub payment_status: String,
    pub payment_method: String,
    pub payment_date: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
    pub notes: Option<String>,

    pub generated_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Payroll {
    pub fn allowances(&self) -> Allowances {
        Allowances {
            housing: self.allowance_housing,
            transport: self.allowance_transport,
            medical: self.allowance_medical,
            food: self.allowance_food,
            overtime: self.allowance_overtime,
            bonus: self.allowance_bonus,
            other: self.allowance_other,
        }
    }

    pub fn deductions(&self) -> Deductions {
        Deductions {
            tax: self.deduction_tax,
            social_security: self.deduction_social_security,
            insurance: self.deduction_insurance,
            provident_fund: self.deduction_provident_fund,
            loan: self.deduction_loan,
            advance: self.deduction_advance,
            other: self.deduction_other,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status == PAYMENT_PAID
    }
}
