/// Itemized allowances for one pay period. Absent fields default to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Allowances {
    pub housing: f64,
    pub transport: f64,
    pub medical: f64,
    pub food: f64,
    pub overtime: f64,
    pub bonus: f64,
    pub other: f64,
}

impl Allowances {
    pub fn sum(&self) -> f64 {
        self.housing + self.transport + self.medical + self.food + self.overtime + self.bonus
            + self.other
    }
}

/// Itemized deductions for one pay period.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deductions {
    pub tax: f64,
    pub social_security: f64,
    pub insurance: f64,
    pub provident_fund: f64,
    pub loan: f64,
    pub advance: f64,
    pub other: f64,
}

impl Deductions {
    pub fn sum(&self) -> f64 {
        self.tax + self.social_security + self.insurance + self.provident_fund + self.loan
            + self.advance + self.other
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub gross_salary: f64,
    pub net_salary: f64,
}

/// Derive the four payroll totals from the itemized fields. Runs on every
/// save of a payroll record so partial updates cannot leave stale totals.
pub fn compute_totals(
    basic_salary: f64,
    allowances: &Allowances,
    deductions: &Deductions,
    leave_deduction_amount: f64,
) -> Totals {
    let total_allowances = allowances.sum();
    let total_deductions = deductions.sum() + leave_deduction_amount;
    let gross_salary = basic_salary + total_allowances;
    let net_salary = gross_salary - total_deductions;
    Totals {
        total_allowances,
        total_deductions,
        gross_salary,
        net_salary,
    }
}

/// Pro-rate the basic salary by attendance: `basic * (present / working)`,
/// minus a half-day penalty of `(basic / working) * half_days * 0.5`.
///
/// Returns the adjusted basic salary; callers must feed the result back
/// through `compute_totals` to keep the derived fields consistent.
pub fn attendance_adjusted_basic(
    basic_salary: f64,
    working_days: f64,
    present_days: f64,
    half_days: f64,
) -> f64 {
    if working_days <= 0.0 {
        return basic_salary;
    }
    let proportional = basic_salary * (present_days / working_days);
    let half_day_penalty = (basic_salary / working_days) * half_days * 0.5;
    proportional - half_day_penalty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_sum_all_itemized_fields() {
        let allowances = Allowances {
            housing: 500.0,
            transport: 100.0,
            medical: 50.0,
            food: 25.0,
            overtime: 75.0,
            bonus: 200.0,
            other: 10.0,
        };
        let deductions = Deductions {
            tax: 300.0,
            social_security: 120.0,
            insurance: 40.0,
            provident_fund: 60.0,
            loan: 0.0,
            advance: 0.0,
            other: 5.0,
        };

        let totals = compute_totals(3000.0, &allowances, &deductions, 80.0);

        assert_eq!(totals.total_allowances, 960.0);
        assert_eq!(totals.total_deductions, 605.0);
        assert_eq!(totals.gross_salary, 3960.0);
        assert_eq!(totals.net_salary, 3355.0);
    }

    #[test]
    fn totals_default_to_zero_when_fields_absent() {
        let totals = compute_totals(
            2500.0,
            &Allowances::default(),
            &Deductions::default(),
            0.0,
        );
        assert_eq!(totals.total_allowances, 0.0);
        assert_eq!(totals.total_deductions, 0.0);
        assert_eq!(totals.gross_salary, 2500.0);
        assert_eq!(totals.net_salary, 2500.0);
    }

    #[test]
    fn net_salary_identity_holds() {
        let allowances = Allowances {
            housing: 123.45,
            ..Default::default()
        };
        let deductions = Deductions {
            tax: 67.89,
            ..Default::default()
        };
        let totals = compute_totals(1000.0, &allowances, &deductions, 12.0);
        assert!(
            (totals.net_salary - (1000.0 + totals.total_allowances - totals.total_deductions))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn full_attendance_leaves_basic_unchanged() {
        let adjusted = attendance_adjusted_basic(2200.0, 22.0, 22.0, 0.0);
        assert!((adjusted - 2200.0).abs() < 1e-9);
    }

    #[test]
    fn missed_days_and_half_days_reduce_basic() {
        // 20 of 22 days present, 2 half days: 2200 * 20/22 - 100 * 2 * 0.5
        let adjusted = attendance_adjusted_basic(2200.0, 22.0, 20.0, 2.0);
        assert!((adjusted - 1900.0).abs() < 1e-9);
    }

    #[test]
    fn zero_working_days_is_a_no_op() {
        assert_eq!(attendance_adjusted_basic(2200.0, 0.0, 0.0, 0.0), 2200.0);
    }
}
