mod creator;
mod status;

pub use creator::{Creator, CreatorUpdate};
pub use status::{CreatorStatus, DailyStatus, Progress, StatusItem};
