pub mod account;
pub mod announcement;
pub mod membership;
pub mod neighborhood;
pub mod residence;
pub mod visit;

pub use account::{AccountRepository, SqliteAccountRepository};
pub use announcement::{AnnouncementRepository, SqliteAnnouncementRepository};
pub use membership::{MembershipRepository, SqliteMembershipRepository};
pub use neighborhood::{NeighborhoodRepository, SqliteNeighborhoodRepository};
pub use residence::{ResidenceRepository, SqliteResidenceRepository};
pub use visit::{SqliteVisitRepository, VisitRepository};
