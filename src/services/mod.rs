mod lookup;
mod note_url;

pub use lookup::{profile_update, CreatorProfile, LookupPurpose, NoteClient};
pub use note_url::parse_identifier;
