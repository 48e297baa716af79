//! Typed views of the CAP enumerated fields.
//!
//! The feed carries these as free text. Values outside the CAP vocabulary
//! map to `Unknown` rather than failing, since the NWS occasionally
//! publishes blank or non-standard values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// CAP `urgency`: how soon responsive action should be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Immediate,
    Expected,
    Future,
    Past,
    Unknown,
}

/// CAP `severity`: the intensity of impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Extreme,
    Severe,
    Moderate,
    Minor,
    Unknown,
}

/// CAP `certainty`: confidence in the observation or prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Certainty {
    Observed,
    Likely,
    Possible,
    Unlikely,
    Unknown,
}

macro_rules! cap_enum_text {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $ty {
            /// The value as written in the feed.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => stringify!($variant),)+
                    $ty::Unknown => "Unknown",
                }
            }
        }

        impl FromStr for $ty {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                $(
                    if s.eq_ignore_ascii_case(stringify!($variant)) {
                        return Ok($ty::$variant);
                    }
                )+
                Ok($ty::Unknown)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

cap_enum_text!(Urgency { Immediate, Expected, Future, Past });
cap_enum_text!(Severity { Extreme, Severe, Moderate, Minor });
cap_enum_text!(Certainty { Observed, Likely, Possible, Unlikely });
