// Player pool entities with dual captain/flex salary and projection figures.

use serde::{Deserialize, Serialize};

/// Salary and projection multiplier applied to the captain slot.
pub const CAPTAIN_MULTIPLIER: f64 = 1.5;

// ---------------------------------------------------------------------------
// Roles
// ---------------------------------------------------------------------------

/// The role a player occupies within a lineup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Captain,
    Flex,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::Captain => "CPT",
            Role::Flex => "FLEX",
        }
    }
}

/// Salary and projection for one role, as read from the source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleFigures {
    pub salary: u32,
    pub projection: f64,
    /// Platform display identifier for this role (e.g. "Player Name (12345)").
    /// Captain and flex rows usually carry different ids on the platform.
    pub display_id: Option<String>,
}

impl RoleFigures {
    pub fn new(salary: u32, projection: f64) -> Self {
        RoleFigures {
            salary,
            projection,
            display_id: None,
        }
    }

    pub fn with_display_id(mut self, display_id: impl Into<String>) -> Self {
        self.display_id = Some(display_id.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlayerError {
    #[error("player '{name}' has neither captain nor flex figures")]
    MissingFigures { name: String },

    #[error("player '{name}' has non-positive flex salary")]
    NonPositiveSalary { name: String },

    #[error("player '{name}' has a non-finite projection")]
    NonFiniteProjection { name: String },
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A roster-eligible entity. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    flex: RoleFigures,
    captain: RoleFigures,
}

impl Player {
    /// Build a player from whichever role figures are available.
    ///
    /// A missing side is synthesized from the other using the 1.5x captain
    /// multiplier. Salaries are rounded to whole dollars.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        team: impl Into<String>,
        position: impl Into<String>,
        flex: Option<RoleFigures>,
        captain: Option<RoleFigures>,
    ) -> Result<Self, PlayerError> {
        let name = name.into();

        let (flex, captain) = match (flex, captain) {
            (Some(flex), Some(captain)) => (flex, captain),
            (Some(flex), None) => {
                let captain = RoleFigures::new(
                    (flex.salary as f64 * CAPTAIN_MULTIPLIER).round() as u32,
                    flex.projection * CAPTAIN_MULTIPLIER,
                );
                (flex, captain)
            }
            (None, Some(captain)) => {
                let flex = RoleFigures::new(
                    (captain.salary as f64 / CAPTAIN_MULTIPLIER).round() as u32,
                    captain.projection / CAPTAIN_MULTIPLIER,
                );
                (flex, captain)
            }
            (None, None) => return Err(PlayerError::MissingFigures { name }),
        };

        if flex.salary == 0 {
            return Err(PlayerError::NonPositiveSalary { name });
        }
        if !flex.projection.is_finite() || !captain.projection.is_finite() {
            return Err(PlayerError::NonFiniteProjection { name });
        }

        Ok(Player {
            id: id.into(),
            name,
            team: team.into(),
            position: position.into(),
            flex,
            captain,
        })
    }

    pub fn flex_salary(&self) -> u32 {
        self.flex.salary
    }

    pub fn flex_projection(&self) -> f64 {
        self.flex.projection
    }

    pub fn cpt_salary(&self) -> u32 {
        self.captain.salary
    }

    pub fn cpt_projection(&self) -> f64 {
        self.captain.projection
    }

    /// Salary for the given role.
    pub fn salary(&self, role: Role) -> u32 {
        self.figures(role).salary
    }

    /// Projection for the given role.
    pub fn projection(&self, role: Role) -> f64 {
        self.figures(role).projection
    }

    /// Projected points per $1000 of flex salary. Drives generation sampling.
    pub fn value(&self) -> f64 {
        self.flex.projection / (self.flex.salary as f64 / 1000.0)
    }

    /// Display identifier for the given role, falling back to `"name (id)"`.
    pub fn label(&self, role: Role) -> String {
        match &self.figures(role).display_id {
            Some(display) => display.clone(),
            None => format!("{} ({})", self.name, self.id),
        }
    }

    fn figures(&self, role: Role) -> &RoleFigures {
        match role {
            Role::Captain => &self.captain,
            Role::Flex => &self.flex,
        }
    }
}

/// Keep only players whose flex projection reaches `floor_percent` of the
/// pool's best flex projection.
pub fn eligible_players(pool: &[Player], floor_percent: f64) -> Vec<Player> {
    let max_projection = pool
        .iter()
        .map(|p| p.flex_projection())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_projection.is_finite() {
        return Vec::new();
    }
    let floor = max_projection * floor_percent / 100.0;

    pool.iter()
        .filter(|p| p.flex_projection() >= floor && p.flex_salary() > 0)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn flex_only(name: &str, salary: u32, projection: f64) -> Player {
        Player::new(
            name.to_lowercase(),
            name,
            "KC",
            "WR",
            Some(RoleFigures::new(salary, projection)),
            None,
        )
        .unwrap()
    }

    #[test]
    fn captain_figures_synthesized_from_flex() {
        let p = flex_only("Travis Kelce", 10_000, 20.0);
        assert_eq!(p.cpt_salary(), 15_000);
        assert!(approx_eq(p.cpt_projection(), 30.0));
    }

    #[test]
    fn flex_figures_synthesized_from_captain() {
        let p = Player::new(
            "1",
            "Patrick Mahomes",
            "KC",
            "QB",
            None,
            Some(RoleFigures::new(16_500, 33.0)),
        )
        .unwrap();
        assert_eq!(p.flex_salary(), 11_000);
        assert!(approx_eq(p.flex_projection(), 22.0));
    }

    #[test]
    fn explicit_figures_are_kept() {
        let p = Player::new(
            "1",
            "Patrick Mahomes",
            "KC",
            "QB",
            Some(RoleFigures::new(11_000, 22.0)),
            Some(RoleFigures::new(16_600, 31.0)),
        )
        .unwrap();
        assert_eq!(p.salary(Role::Captain), 16_600);
        assert!(approx_eq(p.projection(Role::Captain), 31.0));
        assert_eq!(p.salary(Role::Flex), 11_000);
    }

    #[test]
    fn rejects_missing_figures() {
        let err = Player::new("1", "Nobody", "KC", "QB", None, None).unwrap_err();
        assert_eq!(
            err,
            PlayerError::MissingFigures {
                name: "Nobody".into()
            }
        );
    }

    #[test]
    fn rejects_zero_flex_salary() {
        let err = Player::new(
            "1",
            "Free Agent",
            "KC",
            "QB",
            Some(RoleFigures::new(0, 5.0)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PlayerError::NonPositiveSalary { .. }));
    }

    #[test]
    fn rejects_nan_projection() {
        let err = Player::new(
            "1",
            "Broken",
            "KC",
            "QB",
            Some(RoleFigures::new(5_000, f64::NAN)),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PlayerError::NonFiniteProjection { .. }));
    }

    #[test]
    fn value_is_points_per_thousand() {
        let p = flex_only("Rashee Rice", 8_000, 16.0);
        assert!(approx_eq(p.value(), 2.0));
    }

    #[test]
    fn label_prefers_display_id() {
        let p = Player::new(
            "42",
            "Isiah Pacheco",
            "KC",
            "RB",
            Some(RoleFigures::new(7_000, 12.0).with_display_id("Isiah Pacheco (900042)")),
            None,
        )
        .unwrap();
        assert_eq!(p.label(Role::Flex), "Isiah Pacheco (900042)");
        assert_eq!(p.label(Role::Captain), "Isiah Pacheco (42)");
    }

    #[test]
    fn eligible_players_applies_floor() {
        let pool = vec![
            flex_only("A", 10_000, 20.0),
            flex_only("B", 5_000, 10.0),
            flex_only("C", 2_000, 3.0),
        ];
        let eligible = eligible_players(&pool, 25.0);
        let names: Vec<&str> = eligible.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn eligible_players_empty_pool() {
        assert!(eligible_players(&[], 10.0).is_empty());
    }
}
