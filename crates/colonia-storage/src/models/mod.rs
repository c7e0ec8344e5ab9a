pub mod account;
pub mod announcement;
pub mod membership;
pub mod neighborhood;
pub mod residence;
pub mod temporal_validity;
pub mod visit;

pub use account::{Account, AccountPatch, NewAccount};
pub use announcement::{Announcement, AnnouncementPatch, NewAnnouncement};
pub use membership::{NewMembership, ResidenceMembership};
pub use neighborhood::{NewNeighborhood, Neighborhood, NeighborhoodPatch};
pub use residence::{NewResidence, Residence, ResidencePatch};
pub use temporal_validity::TemporalValidity;
pub use visit::{NewVisitorPass, VisitorPass, VisitorPassPatch};
