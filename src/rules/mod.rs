//! Business rules as pure functions, invoked explicitly at the persistence
//! boundary so they stay unit-testable without a database.

pub mod attendance;
pub mod certification;
pub mod leave;
pub mod payroll;
