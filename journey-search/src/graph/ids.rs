//! Typed entity identifiers.
//!
//! Every cross-reference in a search response is a plain string ID. Each
//! collection gets its own newtype so a leg ID can never be looked up in
//! the locations table by mistake.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

entity_id!(
    /// Key into the `journeys` collection.
    JourneyId
);
entity_id!(
    /// Key into the `legs` collection.
    LegId
);
entity_id!(
    /// Key into the `sections` collection.
    SectionId
);
entity_id!(
    /// Key into the `alternatives` collection.
    AlternativeId
);
entity_id!(
    /// Key into the `fares` collection.
    FareId
);
entity_id!(
    /// Key into the `locations` collection.
    LocationId
);
entity_id!(
    /// Key into the `carriers` collection.
    CarrierId
);
entity_id!(
    /// Key into the `transportModes` collection.
    TransportModeId
);
entity_id!(
    /// Key into the `fareTypes` collection.
    FareTypeId
);
