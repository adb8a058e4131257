use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AvatarError, Result};

pub const DEFAULT_AVATAR_NAME: &str = "My Avatar";

/// Declares a closed set of feature choices.
///
/// Every member gets a stable tag, used both by the QR payload and by
/// the persisted collection, and a human readable name.
macro_rules! feature_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $tag:literal, $display:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn tag(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            pub fn display_name(self) -> &'static str {
                match self {
                    $($name::$variant => $display,)+
                }
            }

            fn pick_random() -> Self {
                Self::ALL[fastrand::usize(..Self::ALL.len())]
            }
        }

        impl FromStr for $name {
            type Err = AvatarError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    other => Err(AvatarError::UnknownFeatureValue {
                        field: stringify!($name),
                        value: other.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.tag())
            }
        }
    };
}

feature_enum! {
    pub enum HairStyle {
        Bald => "bald", "Bald";
        Short => "short", "Short";
        Long => "long", "Long";
        Curly => "curly", "Curly";
    }
}

feature_enum! {
    pub enum FacialFeature {
        None => "none", "None";
        Smile => "smile", "Smile";
        Serious => "serious", "Serious";
    }
}

feature_enum! {
    pub enum GlassesStyle {
        None => "none", "None";
        Round => "round", "Round";
        Square => "square", "Square";
        Aviator => "aviator", "Aviator";
        Sunglasses => "sunglasses", "Sunglasses";
    }
}

feature_enum! {
    pub enum ClothingStyle {
        None => "none", "None";
        Tshirt => "tshirt", "T-Shirt";
        Hoodie => "hoodie", "Hoodie";
        Sweater => "sweater", "Sweater";
        Suit => "suit", "Suit";
        Dress => "dress", "Dress";
    }
}

feature_enum! {
    pub enum Accessory {
        None => "none", "None";
        Hat => "hat", "Hat";
        Bowtie => "bowtie", "Bowtie";
        Necklace => "necklace", "Necklace";
    }
}

feature_enum! {
    pub enum BackgroundStyle {
        Solid => "solid", "Solid";
        Gradient => "gradient", "Gradient";
    }
}

feature_enum! {
    /// The palette shared by every colored feature.
    pub enum AvatarColor {
        Red => "red", "Red";
        Blue => "blue", "Blue";
        Green => "green", "Green";
        Yellow => "yellow", "Yellow";
        Purple => "purple", "Purple";
        Orange => "orange", "Orange";
        Pink => "pink", "Pink";
        Brown => "brown", "Brown";
        Black => "black", "Black";
        White => "white", "White";
        Gray => "gray", "Gray";
        Tan => "tan", "Tan";
        LightBlue => "lightBlue", "Light Blue";
    }
}

/// The customizable part of an [`Avatar`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Features {
    pub hair_style: HairStyle,
    pub hair_color: AvatarColor,
    pub skin_tone: AvatarColor,
    pub eye_color: AvatarColor,
    pub facial_feature: FacialFeature,
    pub glasses: GlassesStyle,
    pub glasses_color: AvatarColor,
    pub clothing: ClothingStyle,
    pub clothing_color: AvatarColor,
    pub accessory: Accessory,
    pub accessory_color: AvatarColor,
    pub background_style: BackgroundStyle,
    /// Only drawn when `background_style` is solid.
    pub background_color: AvatarColor,
    pub gradient_start_color: AvatarColor,
    pub gradient_end_color: AvatarColor,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            hair_style: HairStyle::Short,
            hair_color: AvatarColor::Black,
            skin_tone: AvatarColor::Tan,
            eye_color: AvatarColor::Blue,
            facial_feature: FacialFeature::Smile,
            glasses: GlassesStyle::None,
            glasses_color: AvatarColor::Black,
            clothing: ClothingStyle::Tshirt,
            clothing_color: AvatarColor::Blue,
            accessory: Accessory::None,
            accessory_color: AvatarColor::Red,
            background_style: BackgroundStyle::Solid,
            background_color: AvatarColor::LightBlue,
            gradient_start_color: AvatarColor::LightBlue,
            gradient_end_color: AvatarColor::Purple,
        }
    }
}

impl Features {
    pub fn random() -> Self {
        Self {
            hair_style: HairStyle::pick_random(),
            hair_color: AvatarColor::pick_random(),
            skin_tone: AvatarColor::pick_random(),
            eye_color: AvatarColor::pick_random(),
            facial_feature: FacialFeature::pick_random(),
            glasses: GlassesStyle::pick_random(),
            glasses_color: AvatarColor::pick_random(),
            clothing: ClothingStyle::pick_random(),
            clothing_color: AvatarColor::pick_random(),
            accessory: Accessory::pick_random(),
            accessory_color: AvatarColor::pick_random(),
            background_style: BackgroundStyle::pick_random(),
            background_color: AvatarColor::pick_random(),
            gradient_start_color: AvatarColor::pick_random(),
            gradient_end_color: AvatarColor::pick_random(),
        }
    }
}

/// A named bundle of features.
///
/// Two avatars are equal when they share an id, whatever their features.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    pub id: Uuid,
    pub name: String,
    pub date_created: DateTime<Utc>,
    #[serde(flatten)]
    pub features: Features,
}

impl Avatar {
    pub fn new(name: impl Into<String>, features: Features) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date_created: Utc::now(),
            features,
        }
    }

    /// Give this avatar a new identity, as if it was just created.
    pub(crate) fn reissue(&mut self) {
        self.id = Uuid::new_v4();
        self.date_created = Utc::now();
    }
}

impl Default for Avatar {
    fn default() -> Self {
        Self::new(DEFAULT_AVATAR_NAME, Features::default())
    }
}

impl PartialEq for Avatar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Avatar {}

impl Hash for Avatar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_avatar() {
        let avatar = Avatar::default();
        assert_eq!(avatar.name, "My Avatar");
        assert_eq!(avatar.features.hair_style, HairStyle::Short);
        assert_eq!(avatar.features.hair_color, AvatarColor::Black);
        assert_eq!(avatar.features.skin_tone, AvatarColor::Tan);
        assert_eq!(avatar.features.eye_color, AvatarColor::Blue);
        assert_eq!(avatar.features.facial_feature, FacialFeature::Smile);
        assert_eq!(avatar.features.accessory, Accessory::None);
        assert_eq!(avatar.features.accessory_color, AvatarColor::Red);
        assert_eq!(avatar.features.background_color, AvatarColor::LightBlue);
    }

    #[test]
    fn equality_is_by_id() {
        let first = Avatar::default();
        let mut second = Avatar::default();
        assert_ne!(first, second);

        second.id = first.id;
        second.features.hair_style = HairStyle::Curly;
        assert_eq!(first, second);
    }

    #[test]
    fn reissue_changes_identity() {
        let mut avatar = Avatar::default();
        let id = avatar.id;
        avatar.reissue();
        assert_ne!(avatar.id, id);
    }

    #[rstest]
    #[case(AvatarColor::Red, "red", "Red")]
    #[case(AvatarColor::LightBlue, "lightBlue", "Light Blue")]
    #[case(AvatarColor::Gray, "gray", "Gray")]
    fn color_names(
        #[case] color: AvatarColor,
        #[case] tag: &str,
        #[case] display: &str,
    ) {
        assert_eq!(color.tag(), tag);
        assert_eq!(color.display_name(), display);
        assert_eq!(tag.parse::<AvatarColor>().unwrap(), color);
    }

    #[test]
    fn every_tag_parses_back() {
        for style in ClothingStyle::ALL {
            assert_eq!(style.tag().parse::<ClothingStyle>().unwrap(), *style);
        }
        for style in GlassesStyle::ALL {
            let parsed: GlassesStyle = style.to_string().parse().unwrap();
            assert_eq!(parsed, *style);
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "mohawk".parse::<HairStyle>().unwrap_err();
        match err {
            AvatarError::UnknownFeatureValue { field, value } => {
                assert_eq!(field, "HairStyle");
                assert_eq!(value, "mohawk");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // tags are case sensitive
        assert!("LightBlue".parse::<AvatarColor>().is_err());
    }

    #[test]
    fn serialized_with_tags() {
        let avatar = Avatar::new("Zed", Features::default());
        let json = serde_json::to_value(&avatar).unwrap();
        assert_eq!(json["backgroundColor"], "lightBlue");
        assert_eq!(json["hairStyle"], "short");
        assert_eq!(json["name"], "Zed");

        let restored: Avatar = serde_json::from_value(json).unwrap();
        assert_eq!(restored.id, avatar.id);
        assert_eq!(restored.features, avatar.features);
    }
}
