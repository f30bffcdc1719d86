//! Stable, monotonic addresses for heap slots and environment records.
//!
//! Both address kinds wrap a plain `u64` serial. They are never reused and
//! never decremented; equality and ordering compare the serial directly, and
//! `Display`/`serde` render the `kind@n` text form used throughout
//! (`heap@0`, `env@3`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! address_type {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(serial: u64) -> Self {
                Self(serial)
            }

            pub const fn serial(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}@{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = AddressParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let rest = s
                    .strip_prefix(concat!($prefix, "@"))
                    .ok_or_else(|| AddressParseError(s.to_string()))?;
                let serial = rest
                    .parse::<u64>()
                    .map_err(|_| AddressParseError(s.to_string()))?;
                Ok(Self(serial))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

address_type!(HeapAddress, "heap");
address_type!(EnvironmentAddress, "env");

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed address: {0:?}")]
pub struct AddressParseError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        let a = HeapAddress::new(42);
        assert_eq!(a.to_string(), "heap@42");
        assert_eq!("heap@42".parse::<HeapAddress>().unwrap(), a);
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert!("env@1".parse::<HeapAddress>().is_err());
    }

    #[test]
    fn orders_by_serial() {
        assert!(HeapAddress::new(1) < HeapAddress::new(2));
    }

    #[test]
    fn serde_round_trip() {
        let a = EnvironmentAddress::new(7);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, "\"env@7\"");
        let back: EnvironmentAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
