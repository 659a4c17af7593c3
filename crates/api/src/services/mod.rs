pub mod member_directory;
pub mod notification_service;
pub mod venue_directory;

pub use member_directory::{MemberDirectory, MemberProfile, PgMemberDirectory};
pub use notification_service::{notify, BroadcastDispatcher, DispatchError, NotificationDispatcher};
pub use venue_directory::{PgVenueDirectory, VenueDirectory, VenueProfile};
