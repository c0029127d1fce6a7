pub mod job;
pub mod quota;
pub mod users;

pub use job::{JobService, PgJobStore};
pub use quota::{CallerContext, QuotaService};
pub use users::UsersService;
