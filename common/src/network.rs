/// Serde string round-trip for a type with `Display` + `FromStr`.
///
/// Every value type in this module serializes as its canonical text form and
/// deserializes by re-parsing it, so malformed input surfaces as a decode
/// error rather than a panic.
macro_rules! impl_string_serde {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}
pub(crate) use impl_string_serde;

pub mod address;
pub mod dns_server;
pub mod endpoint;
pub mod range;
