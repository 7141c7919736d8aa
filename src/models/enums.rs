use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $s:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Life-cycle anchor a message's timing is offset from.
str_enum!(SendBase {
    Edd => "edd",
    Over => "over",
    Dd => "dd",
    Visit => "visit",
    Signup => "signup",
    Connect => "connect",
    Bounce => "bounce",
    Loss => "loss",
    Stop => "stop",
});

str_enum!(MessageGroup {
    Control => "control",
    OneWay => "one-way",
    TwoWay => "two-way",
});

str_enum!(#[derive(Default)] Condition {
    Art => "art",
    Adolescent => "adolescent",
    First => "first",
    #[default]
    Normal => "normal",
    NoBaby => "nbaby",
});

str_enum!(Language {
    English => "english",
    Swahili => "swahili",
    Luo => "luo",
});

impl SendBase {
    /// Human-readable label used in admin listings.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Edd => "Before EDD",
            Self::Over => "Post Dates",
            Self::Dd => "Postpartum",
            Self::Visit => "Visit",
            Self::Signup => "From Signup",
            Self::Connect => "Reconnect",
            Self::Bounce => "Bounce",
            Self::Loss => "Loss",
            Self::Stop => "Stop",
        }
    }
}

impl Condition {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Art => "Starting ART",
            Self::Adolescent => "Adolescent",
            Self::First => "First Time Mother",
            Self::Normal => "Normal",
            Self::NoBaby => "No Baby",
        }
    }
}
