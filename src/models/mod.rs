pub mod attendance;
pub mod certification;
pub mod employee;
pub mod leave;
pub mod password_reset;
pub mod payroll;
pub mod performance_review;

pub use attendance::Attendance;
pub use certification::Certification;
pub use employee::{Employee, EmployeeView, LeaveBalance};
pub use leave::Leave;
pub use password_reset::PasswordReset;
pub use payroll::Payroll;
pub use performance_review::PerformanceReview;
