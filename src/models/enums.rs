use std::fmt;
use std::str::FromStr;

use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};

/// Error returned when a stored or submitted enum label is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

/// Maps a unit-variant enum onto a lowercase TEXT column
macro_rules! text_enum {
    ($ty:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in ascending order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// The label stored in the database and sent over the wire
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownLabel;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($ty::$variant),)+
                    other => Err(UnknownLabel { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl FromSql<Text, Sqlite> for $ty {
            fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
                let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
                Ok(text.parse::<$ty>()?)
            }
        }

        impl ToSql<Text, Sqlite> for $ty {
            fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
                out.set_value(self.as_str());
                Ok(IsNull::No)
            }
        }
    };
}

/// How quickly a maintenance request needs attention
///
/// Ordered from least to most urgent so that merges can keep the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    High,
    Emergency,
}

text_enum!(Urgency, "urgency", {
    Low => "low",
    Normal => "normal",
    High => "high",
    Emergency => "emergency",
});

impl Urgency {
    /// Interprets the free-form urgency wording a voice agent collects
    ///
    /// Returns `None` for wording that does not map to any level.
    pub fn parse_lenient(input: &str) -> Option<Self> {
        let lowered = input.trim().to_lowercase();
        match lowered.as_str() {
            "emergency" | "emergent" | "critical" | "life safety" | "911" => Some(Urgency::Emergency),
            "high" | "urgent" | "asap" | "priority" => Some(Urgency::High),
            "normal" | "medium" | "moderate" | "standard" => Some(Urgency::Normal),
            "low" | "routine" | "minor" | "whenever" => Some(Urgency::Low),
            _ => None,
        }
    }
}

/// Workflow status of a maintenance request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    New,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

text_enum!(RequestStatus, "status", {
    New => "new",
    Assigned => "assigned",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

/// How far the voice platform has progressed with the call behind a request
///
/// Ordered so that a late `conversation.ended` never rolls back a request
/// that already received its transcription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    #[default]
    Started,
    Ended,
    Transcribed,
}

text_enum!(CallStatus, "call status", {
    Started => "started",
    Ended => "ended",
    Transcribed => "transcribed",
});
