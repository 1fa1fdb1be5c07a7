use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

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

str_enum!(CaseStatus {
    Scheduled => "scheduled",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    Postponed => "postponed",
    NoShow => "no_show",
});

impl CaseStatus {
    /// Whether a case in this status can still move to another one.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Cancelled | Self::Postponed | Self::NoShow
        )
    }

    /// Allowed lifecycle moves. Staying put is always allowed.
    pub fn can_transition_to(&self, next: CaseStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            Self::Scheduled => matches!(
                next,
                Self::InProgress | Self::Cancelled | Self::Postponed | Self::NoShow
            ),
            Self::InProgress => matches!(next, Self::Completed | Self::Cancelled),
            _ => false,
        }
    }
}

str_enum!(InsightCategory {
    DemandForecast => "demand_forecast",
    Inventory => "inventory",
    Revenue => "revenue",
    SurgeonPerformance => "surgeon_performance",
    Scheduling => "scheduling",
    Risk => "risk",
});

str_enum!(ProcedureComplexity {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

str_enum!(TraumaLevel {
    LevelI => "level_1",
    LevelII => "level_2",
    LevelIII => "level_3",
    LevelIV => "level_4",
    LevelV => "level_5",
});

str_enum!(OpportunityStage {
    Prospecting => "prospecting",
    Qualification => "qualification",
    Proposal => "proposal",
    Negotiation => "negotiation",
    ClosedWon => "closed_won",
    ClosedLost => "closed_lost",
});

impl OpportunityStage {
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ClosedWon | Self::ClosedLost)
    }
}

str_enum!(InvoiceStatus {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Overdue => "overdue",
    Void => "void",
});
