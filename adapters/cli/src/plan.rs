//! Defense plans: scripted, timed placement requests replayed against a
//! session, plus the policy for handling resource pickups along the way.
//!
//! Plans are authored as TOML with 1-based rows and columns, mirroring the
//! level wire format, and validated once on load.

use std::{error::Error, fmt};

use serde::{Deserialize, Serialize};

use lane_defence_core::{playfield, DefenderKind, GridCoord};

/// Scripted defense replayed by the headless runner.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct DefensePlan {
    /// Optional name echoed in the run log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    /// How the plan treats resource pickups the session produces.
    #[serde(default)]
    pub(crate) collection: CollectionPolicy,
    /// Placement requests, replayed at their scheduled times.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) placements: Vec<PlannedPlacement>,
}

impl DefensePlan {
    /// Parses a plan from TOML text and validates its coordinates.
    pub(crate) fn from_toml(text: &str) -> Result<Self, PlanError> {
        let plan: Self = toml::from_str(text).map_err(PlanError::Malformed)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Renders the plan as TOML.
    #[must_use]
    pub(crate) fn to_toml(&self) -> String {
        toml::to_string_pretty(self).expect("defense plan serialization never fails")
    }

    /// Checks every placement against the playfield bounds.
    pub(crate) fn validate(&self) -> Result<(), PlanError> {
        for (index, placement) in self.placements.iter().enumerate() {
            if placement.row == 0 || placement.row > playfield::GRID_ROWS {
                return Err(PlanError::RowOutOfRange {
                    index: index + 1,
                    row: placement.row,
                });
            }
            if placement.column == 0 || placement.column > playfield::GRID_COLUMNS {
                return Err(PlanError::ColumnOutOfRange {
                    index: index + 1,
                    column: placement.column,
                });
            }
        }
        Ok(())
    }

    /// Placements ordered by scheduled time, authored order kept on ties.
    #[must_use]
    pub(crate) fn schedule(&self) -> Vec<PlannedPlacement> {
        let mut ordered = self.placements.clone();
        ordered.sort_by_key(|placement| placement.at);
        ordered
    }
}

/// How the runner responds to resource pickups appearing on the playfield.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CollectionPolicy {
    /// Collect every pickup on the tick after it appears.
    #[default]
    Eager,
    /// Leave every pickup to expire where it fell.
    Never,
}

/// One scheduled placement request within a plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct PlannedPlacement {
    /// Defender kind to request.
    #[serde(rename = "type")]
    pub(crate) kind: DefenderKind,
    /// Row to place in, 1-based as authored.
    pub(crate) row: u32,
    /// Column to place in, 1-based as authored.
    pub(crate) column: u32,
    /// Delay from session start in milliseconds.
    pub(crate) at: u64,
}

impl PlannedPlacement {
    /// Grid cell the placement targets, converted from 1-based authoring.
    #[must_use]
    pub(crate) fn cell(&self) -> GridCoord {
        GridCoord::new(self.row - 1, self.column - 1)
    }
}

/// Errors raised while parsing or validating a defense plan.
#[derive(Debug)]
pub(crate) enum PlanError {
    /// The text was not valid TOML for the plan shape.
    Malformed(toml::de::Error),
    /// A placement references a row outside the playfield.
    RowOutOfRange {
        /// One-based position of the offending placement.
        index: usize,
        /// Row value found in the plan.
        row: u32,
    },
    /// A placement references a column outside the playfield.
    ColumnOutOfRange {
        /// One-based position of the offending placement.
        index: usize,
        /// Column value found in the plan.
        column: u32,
    },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(error) => write!(f, "plan is not valid TOML: {error}"),
            Self::RowOutOfRange { index, row } => write!(
                f,
                "placement {index} references row {row}, expected 1..={}",
                playfield::GRID_ROWS
            ),
            Self::ColumnOutOfRange { index, column } => write!(
                f,
                "placement {index} references column {column}, expected 1..={}",
                playfield::GRID_COLUMNS
            ),
        }
    }
}

impl Error for PlanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CollectionPolicy, DefensePlan, PlanError, PlannedPlacement};
    use lane_defence_core::{DefenderKind, GridCoord};

    #[test]
    fn an_empty_plan_defaults_to_eager_collection() {
        let plan = DefensePlan::from_toml("").expect("empty plan parses");
        assert_eq!(plan.collection, CollectionPolicy::Eager);
        assert!(plan.placements.is_empty());
        assert!(plan.name.is_none());
    }

    #[test]
    fn placements_parse_from_one_based_coordinates() {
        let plan = DefensePlan::from_toml(
            r#"
            collection = "never"

            [[placements]]
            type = "sunflower"
            row = 1
            column = 1
            at = 0

            [[placements]]
            type = "peashooter"
            row = 3
            column = 2
            at = 1500
            "#,
        )
        .expect("plan parses");

        assert_eq!(plan.collection, CollectionPolicy::Never);
        assert_eq!(plan.placements.len(), 2);
        assert_eq!(plan.placements[0].kind, DefenderKind::Sunflower);
        assert_eq!(plan.placements[0].cell(), GridCoord::new(0, 0));
        assert_eq!(plan.placements[1].cell(), GridCoord::new(2, 1));
        assert_eq!(plan.placements[1].at, 1500);
    }

    #[test]
    fn the_schedule_orders_by_time_and_keeps_tied_order() {
        let placement = |kind, at| PlannedPlacement {
            kind,
            row: 1,
            column: 1,
            at,
        };
        let plan = DefensePlan {
            name: None,
            collection: CollectionPolicy::Eager,
            placements: vec![
                placement(DefenderKind::Wallnut, 2_000),
                placement(DefenderKind::Sunflower, 0),
                placement(DefenderKind::Peashooter, 2_000),
            ],
        };

        let kinds: Vec<DefenderKind> = plan
            .schedule()
            .iter()
            .map(|placement| placement.kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                DefenderKind::Sunflower,
                DefenderKind::Wallnut,
                DefenderKind::Peashooter
            ]
        );
    }

    #[test]
    fn rows_outside_the_grid_are_rejected() {
        let error = DefensePlan::from_toml(
            r#"
            [[placements]]
            type = "wallnut"
            row = 6
            column = 1
            at = 0
            "#,
        )
        .expect_err("row 6 is invalid");
        assert!(matches!(
            error,
            PlanError::RowOutOfRange { index: 1, row: 6 }
        ));
    }

    #[test]
    fn columns_outside_the_grid_are_rejected() {
        let error = DefensePlan::from_toml(
            r#"
            [[placements]]
            type = "wallnut"
            row = 1
            column = 0
            at = 0
            "#,
        )
        .expect_err("column 0 is invalid");
        assert!(matches!(
            error,
            PlanError::ColumnOutOfRange {
                index: 1,
                column: 0
            }
        ));
    }

    #[test]
    fn unknown_keys_are_refused() {
        let error =
            DefensePlan::from_toml("retries = 3\n").expect_err("unknown keys are invalid");
        assert!(matches!(error, PlanError::Malformed(_)));
    }

    #[test]
    fn plans_round_trip_through_toml() {
        let plan = DefensePlan {
            name: Some(String::from("two lane hold")),
            collection: CollectionPolicy::Never,
            placements: vec![
                PlannedPlacement {
                    kind: DefenderKind::Sunflower,
                    row: 2,
                    column: 1,
                    at: 0,
                },
                PlannedPlacement {
                    kind: DefenderKind::Snowpea,
                    row: 2,
                    column: 2,
                    at: 7_500,
                },
            ],
        };

        let rendered = plan.to_toml();
        let reparsed = DefensePlan::from_toml(&rendered).expect("rendered plan parses");
        assert_eq!(plan, reparsed);
    }
}
