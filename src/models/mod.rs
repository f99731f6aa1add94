mod events;
mod item;
mod like;
mod preferences;

pub use events::{LikeEvent, SearchEvent, ViewEvent};
pub use item::{Item, ItemSpace, PriceTier};
pub use like::{LikeKey, LikeRecord};
pub use preferences::{PreferenceProfile, TimeOfDay, CATEGORY_KEYWORDS};
