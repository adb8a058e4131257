pub mod codec;
pub mod config;
mod errors;
pub mod model;
pub mod preferences;
pub mod qr;
pub mod scan;
pub mod storage;
pub mod store;

pub use codec::{decode, encode, AvatarCodec};
pub use config::Config;
pub use errors::{AvatarError, Result};
pub use model::{
    Accessory, Avatar, AvatarColor, BackgroundStyle, ClothingStyle,
    FacialFeature, Features, GlassesStyle, HairStyle,
};
pub use preferences::Preferences;
pub use qr::QrAdapter;
pub use scan::{ScanOutcome, ScanSession};
pub use store::AvatarStore;

pub const APP_FOLDER: &str = "avatar-qr";
