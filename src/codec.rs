use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::model::{
    Accessory, Avatar, AvatarColor, BackgroundStyle, ClothingStyle,
    FacialFeature, Features, GlassesStyle, HairStyle,
};
use crate::{AvatarError, Result};

pub const PAYLOAD_VERSION: u64 = 1;
pub const DEFAULT_MAX_NAME_CHARS: usize = 32;
/// Comfortably inside what a level H symbol holds (1273 bytes at version 40),
/// while keeping the symbol small enough for a phone camera.
pub const DEFAULT_PAYLOAD_CAPACITY: usize = 512;

const VERSION_KEY: &str = "v";
const ID_KEY: &str = "id";
const NAME_KEY: &str = "n";

/// Wire layout of the payload. Field order here is the order in the text.
#[derive(Serialize)]
struct Payload<'a> {
    v: u64,
    id: Uuid,
    n: &'a str,
    hs: HairStyle,
    hc: AvatarColor,
    sk: AvatarColor,
    ec: AvatarColor,
    ff: FacialFeature,
    gl: GlassesStyle,
    gc: AvatarColor,
    cl: ClothingStyle,
    cc: AvatarColor,
    ac: Accessory,
    acc: AvatarColor,
    bs: BackgroundStyle,
    bg: AvatarColor,
    g1: AvatarColor,
    g2: AvatarColor,
}

impl<'a> Payload<'a> {
    fn new(id: Uuid, name: &'a str, f: &Features) -> Self {
        Self {
            v: PAYLOAD_VERSION,
            id,
            n: name,
            hs: f.hair_style,
            hc: f.hair_color,
            sk: f.skin_tone,
            ec: f.eye_color,
            ff: f.facial_feature,
            gl: f.glasses,
            gc: f.glasses_color,
            cl: f.clothing,
            cc: f.clothing_color,
            ac: f.accessory,
            acc: f.accessory_color,
            bs: f.background_style,
            bg: f.background_color,
            g1: f.gradient_start_color,
            g2: f.gradient_end_color,
        }
    }

    fn to_text(&self) -> String {
        // Every field is a string, a number or a uuid.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Converts avatars to QR payload text and back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvatarCodec {
    pub max_name_chars: usize,
    pub payload_capacity: usize,
}

impl Default for AvatarCodec {
    fn default() -> Self {
        Self {
            max_name_chars: DEFAULT_MAX_NAME_CHARS,
            payload_capacity: DEFAULT_PAYLOAD_CAPACITY,
        }
    }
}

impl AvatarCodec {
    pub fn new(max_name_chars: usize, payload_capacity: usize) -> Self {
        Self {
            max_name_chars,
            payload_capacity,
        }
    }

    /// Serialize the avatar into payload text.
    ///
    /// Never fails: a name that does not fit is shortened, first to
    /// `max_name_chars` characters and then one character at a time
    /// until the whole payload is within `payload_capacity` bytes.
    pub fn encode(&self, avatar: &Avatar) -> String {
        let mut name = truncate_chars(&avatar.name, self.max_name_chars);
        loop {
            let text =
                Payload::new(avatar.id, &name, &avatar.features).to_text();
            if text.len() <= self.payload_capacity || name.pop().is_none() {
                if name.chars().count() < avatar.name.chars().count() {
                    log::debug!(
                        "[codec] name of {} shortened to {} chars",
                        avatar.id,
                        name.chars().count()
                    );
                }
                return text;
            }
        }
    }

    /// Parse payload text into a new avatar.
    ///
    /// The result always has a fresh id and creation date: scanning
    /// produces a copy, never a restore of the sender's record.
    pub fn decode(&self, text: &str) -> Result<Avatar> {
        let value: Value = serde_json::from_str(text)
            .map_err(|err| AvatarError::MalformedPayload(err.to_string()))?;
        let fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(AvatarError::MalformedPayload(format!(
                    "expected an object, found {}",
                    json_kind(&other)
                )))
            }
        };

        let version = fields
            .get(VERSION_KEY)
            .ok_or(AvatarError::MissingField(VERSION_KEY))?;
        if version.as_u64() != Some(PAYLOAD_VERSION) {
            return Err(AvatarError::MalformedPayload(format!(
                "unsupported payload version {}",
                version
            )));
        }

        if let Some(source) = fields.get(ID_KEY) {
            log::debug!("[codec] decoding avatar shared as {}", source);
        }

        let name = string_field(&fields, NAME_KEY)?;
        let features = Features {
            hair_style: feature(&fields, "hs")?,
            hair_color: feature(&fields, "hc")?,
            skin_tone: feature(&fields, "sk")?,
            eye_color: feature(&fields, "ec")?,
            facial_feature: feature(&fields, "ff")?,
            glasses: feature(&fields, "gl")?,
            glasses_color: feature(&fields, "gc")?,
            clothing: feature(&fields, "cl")?,
            clothing_color: feature(&fields, "cc")?,
            accessory: feature(&fields, "ac")?,
            accessory_color: feature(&fields, "acc")?,
            background_style: feature(&fields, "bs")?,
            background_color: feature(&fields, "bg")?,
            gradient_start_color: feature(&fields, "g1")?,
            gradient_end_color: feature(&fields, "g2")?,
        };

        Ok(Avatar::new(
            truncate_chars(name, self.max_name_chars),
            features,
        ))
    }
}

/// Encode with the default limits.
pub fn encode(avatar: &Avatar) -> String {
    AvatarCodec::default().encode(avatar)
}

/// Decode with the default limits.
pub fn decode(text: &str) -> Result<Avatar> {
    AvatarCodec::default().decode(text)
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn string_field<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str> {
    match fields.get(key) {
        None => Err(AvatarError::MissingField(key)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(AvatarError::MalformedPayload(format!(
            "field `{}` should be a string, found {}",
            key,
            json_kind(other)
        ))),
    }
}

fn feature<T: FromStr>(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<T> {
    let tag = string_field(fields, key)?;
    tag.parse().map_err(|_| AvatarError::UnknownFeatureValue {
        field: key,
        value: tag.to_owned(),
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn zed() -> Avatar {
        let features = Features {
            hair_style: HairStyle::Long,
            hair_color: AvatarColor::Red,
            background_color: AvatarColor::LightBlue,
            ..Features::default()
        };
        Avatar::new("Zed", features)
    }

    fn payload_with(key: &str, value: Value) -> String {
        let mut fields: Map<String, Value> =
            serde_json::from_str(&encode(&zed())).unwrap();
        fields.insert(key.to_owned(), value);
        Value::Object(fields).to_string()
    }

    fn payload_without(key: &str) -> String {
        let mut fields: Map<String, Value> =
            serde_json::from_str(&encode(&zed())).unwrap();
        fields.remove(key);
        Value::Object(fields).to_string()
    }

    #[test]
    fn zed_survives_round_trip() {
        let original = zed();
        let decoded = decode(&encode(&original)).unwrap();

        assert_eq!(decoded.name, "Zed");
        assert_eq!(decoded.features.hair_style, HairStyle::Long);
        assert_eq!(decoded.features.hair_color, AvatarColor::Red);
        assert_eq!(decoded.features.background_color, AvatarColor::LightBlue);
        assert_eq!(decoded.features, original.features);
    }

    #[test]
    fn random_features_survive_round_trip() {
        for _ in 0..50 {
            let original = Avatar::new("random", Features::random());
            let decoded = decode(&encode(&original)).unwrap();
            assert_eq!(decoded.features, original.features);
        }
    }

    #[test]
    fn decoded_avatar_is_a_copy() {
        let original = zed();
        let decoded = decode(&encode(&original)).unwrap();
        assert_ne!(decoded.id, original.id);
        assert!(decoded.date_created >= original.date_created);
    }

    #[test]
    fn encoding_is_stable() {
        let avatar = zed();
        assert_eq!(encode(&avatar), encode(&avatar));
        assert_eq!(encode(&avatar), encode(&avatar.clone()));
    }

    #[test]
    fn payload_layout() {
        let avatar = zed();
        let text = encode(&avatar);
        let expected_prefix = format!(
            r#"{{"v":1,"id":"{}","n":"Zed","hs":"long","hc":"red""#,
            avatar.id
        );
        assert!(text.starts_with(&expected_prefix), "{text}");
        assert!(text.ends_with(r#""g1":"lightBlue","g2":"purple"}"#), "{text}");
    }

    #[test]
    fn long_name_is_truncated() {
        let long = "x".repeat(200);
        let avatar = Avatar::new(long, Features::default());

        let text = encode(&avatar);
        assert_eq!(text, encode(&avatar));
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.name, "x".repeat(DEFAULT_MAX_NAME_CHARS));
        assert_eq!(decoded.features, avatar.features);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let avatar = Avatar::new("é".repeat(40), Features::default());
        let decoded = decode(&encode(&avatar)).unwrap();
        assert_eq!(decoded.name.chars().count(), DEFAULT_MAX_NAME_CHARS);
        assert!(decoded.name.chars().all(|c| c == 'é'));
    }

    #[test]
    fn worst_case_payload_fits_capacity() {
        let features = Features {
            glasses: GlassesStyle::Sunglasses,
            clothing: ClothingStyle::Sweater,
            accessory: Accessory::Necklace,
            background_style: BackgroundStyle::Gradient,
            hair_color: AvatarColor::LightBlue,
            skin_tone: AvatarColor::LightBlue,
            eye_color: AvatarColor::LightBlue,
            glasses_color: AvatarColor::LightBlue,
            clothing_color: AvatarColor::LightBlue,
            accessory_color: AvatarColor::LightBlue,
            ..Features::default()
        };
        // control characters take six bytes each once escaped
        let avatar = Avatar::new("\u{1}".repeat(100), features);
        let text = encode(&avatar);
        assert!(text.len() <= DEFAULT_PAYLOAD_CAPACITY, "{}", text.len());
        assert_eq!(decode(&text).unwrap().features, features);
    }

    #[test]
    fn tight_capacity_drops_more_of_the_name() {
        let codec = AvatarCodec::new(32, 400);
        let avatar = Avatar::new("\u{1}".repeat(32), Features::default());
        let text = codec.encode(&avatar);
        assert!(text.len() <= 400);
        let decoded = codec.decode(&text).unwrap();
        assert!(decoded.name.chars().count() < 32);
    }

    #[rstest]
    #[case("")]
    #[case("not structured data")]
    #[case("{\"v\":1,")]
    #[case("[1, 2, 3]")]
    #[case("\"just a string\"")]
    fn malformed_payload(#[case] text: &str) {
        assert!(matches!(
            decode(text),
            Err(AvatarError::MalformedPayload(_))
        ));
    }

    #[test]
    fn unknown_hair_style() {
        let text = payload_with("hs", Value::from("mohawk"));
        match decode(&text) {
            Err(AvatarError::UnknownFeatureValue { field, value }) => {
                assert_eq!(field, "hs");
                assert_eq!(value, "mohawk");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_color() {
        let text = payload_with("g2", Value::from("chartreuse"));
        assert!(matches!(
            decode(&text),
            Err(AvatarError::UnknownFeatureValue { field: "g2", .. })
        ));
    }

    #[rstest]
    #[case("n")]
    #[case("v")]
    #[case("hs")]
    #[case("acc")]
    #[case("g2")]
    fn missing_field(#[case] key: &'static str) {
        match decode(&payload_without(key)) {
            Err(AvatarError::MissingField(field)) => assert_eq!(field, key),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn id_is_optional() {
        let decoded = decode(&payload_without("id")).unwrap();
        assert_eq!(decoded.name, "Zed");
    }

    #[test]
    fn wrong_types_are_malformed() {
        assert!(matches!(
            decode(&payload_with("hc", Value::from(3))),
            Err(AvatarError::MalformedPayload(_))
        ));
        assert!(matches!(
            decode(&payload_with("v", Value::from(2))),
            Err(AvatarError::MalformedPayload(_))
        ));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let text = payload_with("future", Value::from("ignored"));
        assert_eq!(decode(&text).unwrap().features, zed().features);
    }

    #[test]
    fn oversized_decoded_name_is_truncated() {
        let text = payload_with("n", Value::from("y".repeat(100)));
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.name.len(), DEFAULT_MAX_NAME_CHARS);
    }
}
