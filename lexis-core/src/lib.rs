pub mod condition;
pub mod input;
pub mod phase;
pub mod session;
pub mod trial;

pub use condition::Condition;
pub use input::InputKey;
pub use phase::{Frame, Screen};
pub use session::{FormAction, SessionInfo, SetupForm};
pub use trial::{Response, ResponseKey, ResponseRecord, Trial};
