pub mod bed;
pub mod building;
pub mod floor;
pub mod member;
pub mod owner;
pub mod payment;
pub mod property;
pub mod room;
pub mod session;

pub use bed::Bed;
pub use building::Building;
pub use floor::Floor;
pub use member::Member;
pub use owner::{Owner, OwnerProfile};
pub use payment::Payment;
pub use property::Property;
pub use room::Room;
pub use session::RefreshSession;
