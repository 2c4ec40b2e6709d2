pub mod attendance;
pub mod certifications;
pub mod employees;
pub mod leaves;
pub mod password_resets;
pub mod payroll;
pub mod performance_reviews;
