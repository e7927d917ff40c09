pub mod engine;
pub mod gateway;
pub mod save;

pub use engine::{SyncEngine, SyncReport};
pub use gateway::{ConnectivityProbe, Gateway};
pub use save::{
    publish_version, save_form_response, save_markups, save_pins, SaveReceipt, FLOORPLAN_BUCKET,
    PIN_PHOTO_BUCKET,
};
