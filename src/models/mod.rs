pub mod user;
pub mod issue;
pub mod record;

pub use user::*;
pub use issue::*;
pub use record::*;
