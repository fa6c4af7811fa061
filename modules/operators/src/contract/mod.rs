pub mod model;

pub use model::{Admin, AdminId, Credentials, LoginSession, NewAdmin, Role, SeedOutcome};
