//! Typed document identifiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! document_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

document_id!(
    /// Unique course identifier
    CourseId
);
document_id!(
    /// Unique module identifier
    ModuleId
);
document_id!(
    /// Unique lecture identifier
    LectureId
);
document_id!(
    /// Unique user identifier
    UserId
);
document_id!(
    /// Unique review identifier
    ReviewId
);
document_id!(
    /// Unique announcement identifier
    AnnouncementId
);
document_id!(
    /// Unique purchase attempt identifier
    PurchaseId
);
