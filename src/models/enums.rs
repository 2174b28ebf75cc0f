//! Shared domain enums (matching the original wire values)
//!
//! The legacy application stored these as free-form strings. Here they are
//! closed enums: serialized with the original Spanish labels, stored as TEXT,
//! and unrecognized values are rejected at every boundary.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error raised when parsing an unrecognized enum label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl std::fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} value: {}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Defines a closed string enum stored as TEXT in Postgres and serialized
/// with its legacy wire labels.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <&str as sqlx::Type<sqlx::Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <&str as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl<'q> sqlx::Encode<'q, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                <&str as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <&str as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                s.parse::<$name>().map_err(Into::into)
            }
        }
    };
}

string_enum! {
    /// Borrower category for a loan
    BorrowerType {
        Student => "Estudiante",
        External => "Externo",
    }
}

string_enum! {
    /// Loan lifecycle status
    LoanStatus {
        Active => "Vigente",
        Returned => "Devuelto",
    }
}

string_enum! {
    /// Operational status of an item or part
    AssetStatus {
        Available => "Disponible",
        Damaged => "Dañado",
        Lost => "Perdido",
        Maintenance => "Mantenimiento",
    }
}

string_enum! {
    /// Condition an asset came back in when a loan line is returned
    ReturnCondition {
        Ok => "OK",
        Available => "Disponible",
        Damaged => "Dañado",
        Lost => "Perdido",
        Maintenance => "Mantenimiento",
    }
}

string_enum! {
    /// Incident classification
    IncidentKind {
        Damaged => "Dañado",
        Lost => "Perdido",
        Maintenance => "Mantenimiento",
        Fault => "Falla",
    }
}

impl ReturnCondition {
    /// Whether the asset came back in a degraded condition. Degraded returns
    /// trigger an incident report.
    pub fn is_degraded(&self) -> bool {
        !matches!(self, ReturnCondition::Ok | ReturnCondition::Available)
    }

    /// Incident classification for a degraded return, `None` otherwise
    pub fn incident_kind(&self) -> Option<IncidentKind> {
        match self {
            ReturnCondition::Ok | ReturnCondition::Available => None,
            ReturnCondition::Damaged => Some(IncidentKind::Damaged),
            ReturnCondition::Lost => Some(IncidentKind::Lost),
            ReturnCondition::Maintenance => Some(IncidentKind::Maintenance),
        }
    }

    /// The asset status recorded after this return
    pub fn as_asset_status(&self) -> AssetStatus {
        match self {
            ReturnCondition::Ok | ReturnCondition::Available => AssetStatus::Available,
            ReturnCondition::Damaged => AssetStatus::Damaged,
            ReturnCondition::Lost => AssetStatus::Lost,
            ReturnCondition::Maintenance => AssetStatus::Maintenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_labels_round_trip() {
        assert_eq!("Vigente".parse::<LoanStatus>().unwrap(), LoanStatus::Active);
        assert_eq!(LoanStatus::Returned.as_str(), "Devuelto");
        assert_eq!(
            "Dañado".parse::<ReturnCondition>().unwrap(),
            ReturnCondition::Damaged
        );
        assert_eq!(
            "Estudiante".parse::<BorrowerType>().unwrap(),
            BorrowerType::Student
        );
    }

    #[test]
    fn unknown_labels_are_rejected() {
        let err = "Prestado".parse::<LoanStatus>().unwrap_err();
        assert_eq!(err.kind, "LoanStatus");
        assert!("disponible".parse::<AssetStatus>().is_err()); // case-sensitive
    }

    #[test]
    fn degraded_conditions() {
        assert!(!ReturnCondition::Ok.is_degraded());
        assert!(!ReturnCondition::Available.is_degraded());
        assert!(ReturnCondition::Damaged.is_degraded());
        assert!(ReturnCondition::Lost.is_degraded());
        assert!(ReturnCondition::Maintenance.is_degraded());
        assert_eq!(ReturnCondition::Ok.incident_kind(), None);
        assert_eq!(
            ReturnCondition::Lost.incident_kind(),
            Some(IncidentKind::Lost)
        );
    }

    #[test]
    fn serde_uses_wire_labels() {
        let json = serde_json::to_string(&ReturnCondition::Maintenance).unwrap();
        assert_eq!(json, "\"Mantenimiento\"");
        let parsed: BorrowerType = serde_json::from_str("\"Externo\"").unwrap();
        assert_eq!(parsed, BorrowerType::External);
        assert!(serde_json::from_str::<AssetStatus>("\"Roto\"").is_err());
    }
}
