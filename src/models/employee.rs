use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ROLE_EMPLOYEE: &str = "employee";
pub const ROLE_HR: &str = "hr";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_ADMIN: &str = "admin";

pub const ROLES: &[&str] = &[ROLE_EMPLOYEE, ROLE_HR, ROLE_MANAGER, ROLE_ADMIN];

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";
pub const STATUS_TERMINATED: &str = "terminated";
pub const STATUS_SUSPENDED: &str = "suspended";

pub const STATUSES: &[&str] = &[
    STATUS_ACTIVE,
    STATUS_INACTIVE,
    STATUS_TERMINATED,
    STATUS_SUSPENDED,
];

/// HR and admin see every employee record in full.
pub fn is_privileged(role: &str) -> bool {
    role == ROLE_HR || role == ROLE_ADMIN
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Employee {
    pub id: Uuid,
    pub employee_code: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,

    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
    pub address_country: Option<String>,
    pub profile_picture: Option<String>,

    pub department: String,
    pub designation: String,
    pub joining_date: NaiveDate,
    pub employment_type: String,
    pub work_location: String,
    pub reporting_manager: Option<Uuid>,
    pub basic_salary: f64,
    pub salary_allowances: f64,
    pub currency: String,

    pub balance_annual: f64,
    pub balance_sick: f64,
    pub balance_casual: f64,
    pub balance_maternity: f64,
    pub balance_paternity: f64,

    pub status: String,
    pub is_first_login: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeaveBalance {
    pub annual: f64,
    pub sick: f64,
    pub casual: f64,
    pub maternity: f64,
    pub paternity: f64,
}

impl Employee {
    pub fn leave_balance(&self) -> LeaveBalance {
        LeaveBalance {
            annual: self.balance_annual,
            sick: self.balance_sick,
            casual: self.balance_casual,
            maternity: self.balance_maternity,
            paternity: self.balance_paternity,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// What a given viewer is allowed to see of an employee record. Compensation
/// fields are present only for HR, admins, and the employee themselves.
#[derive(Debug, Serialize)]
pub struct EmployeeView {
    pub id: Uuid,
    pub employee_code: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub address_street: Option<String>,
    pub address_city: Option<String>,
    pub address_state: Option<String>,
    pub address_zip: Option<String>,
    pub address_country: Option<String>,
    pub profile_picture: Option<String>,
    pub department: String,
    pub designation: String,
    pub joining_date: NaiveDate,
    pub employment_type: String,
    pub work_location: String,
    pub reporting_manager: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_salary: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_allowances: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub leave_balance: LeaveBalance,
    pub status: String,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The one place employee records are shaped for a response. Every route
/// that returns employee data goes through here.
pub fn project(employee: &Employee, viewer_id: Uuid, viewer_role: &str) -> EmployeeView {
    let sees_salary = is_privileged(viewer_role) || viewer_id == employee.id;
    EmployeeView {
        id: employee.id,
        employee_code: employee.employee_code.clone(),
        email: employee.email.clone(),
        role: employee.role.clone(),
        first_name: employee.first_name.clone(),
        last_name: employee.last_name.clone(),
        phone: employee.phone.clone(),
        date_of_birth: employee.date_of_birth,
        address_street: employee.address_street.clone(),
        address_city: employee.address_city.clone(),
        address_state: employee.address_state.clone(),
        address_zip: employee.address_zip.clone(),
        address_country: employee.address_country.clone(),
        profile_picture: employee.profile_picture.clone(),
        department: employee.department.clone(),
        designation: employee.designation.clone(),
        joining_date: employee.joining_date,
        employment_type: employee.employment_type.clone(),
        work_location: employee.work_location.clone(),
        reporting_manager: employee.reporting_manager,
        basic_salary: sees_salary.then_some(employee.basic_salary),
        salary_allowances: sees_salary.then_some(employee.salary_allowances),
        currency: sees_salary.then(|| employee.currency.clone()),
        leave_balance: employee.leave_balance(),
        status: employee.status.clone(),
        last_login: employee.last_login,
        created_at: employee.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: Uuid) -> Employee {
        Employee {
            id,
            employee_code: "EMP001".into(),
            email: "jess@example.com".into(),
            password_hash: "x".into(),
            role: ROLE_EMPLOYEE.into(),
            first_name: "Jess".into(),
            last_name: "Lane".into(),
            phone: None,
            date_of_birth: None,
            address_street: None,
            address_city: None,
            address_state: None,
            address_zip: None,
            address_country: None,
            profile_picture: None,
            department: "Engineering".into(),
            designation: "Developer".into(),
            joining_date: NaiveDate::from_ymd_opt(2023, 1, 9).unwrap(),
            employment_type: "full-time".into(),
            work_location: "Office".into(),
            reporting_manager: None,
            basic_salary: 4000.0,
            salary_allowances: 500.0,
            currency: "USD".into(),
            balance_annual: 25.0,
            balance_sick: 10.0,
            balance_casual: 7.0,
            balance_maternity: 90.0,
            balance_paternity: 15.0,
            status: STATUS_ACTIVE.into(),
            is_first_login: false,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn coworkers_do_not_see_salary() {
        let employee = sample(Uuid::now_v7());
        let view = project(&employee, Uuid::now_v7(), ROLE_EMPLOYEE);
        assert!(view.basic_salary.is_none());
        assert!(view.currency.is_none());
    }

    #[test]
    fn hr_and_self_see_salary() {
        let employee = sample(Uuid::now_v7());

        let hr_view = project(&employee, Uuid::now_v7(), ROLE_HR);
        assert_eq!(hr_view.basic_salary, Some(4000.0));

        let self_view = project(&employee, employee.id, ROLE_EMPLOYEE);
        assert_eq!(self_view.basic_salary, Some(4000.0));
    }

    #[test]
    fn managers_are_not_privileged() {
        assert!(is_privileged(ROLE_HR));
        assert!(is_privileged(ROLE_ADMIN));
        assert!(!is_privileged(ROLE_MANAGER));
        assert!(!is_privileged(ROLE_EMPLOYEE));
    }

    #[test]
    fn password_hash_never_serializes() {
        let employee = sample(Uuid::now_v7());
        let json = serde_json::to_value(&employee).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
