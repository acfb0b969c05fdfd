//! Least-loaded assignment of enrollees to the two ad-hoc teams of a session.
//!
//! The decision is recomputed from committed state on every call; storage
//! backends invoke [`place`] inside the same transaction that records the
//! resulting membership.

/// Upper bound of session-scoped teams in one balancing context.
pub const MAX_SESSION_TEAMS: usize = 2;

/// Current member count of one session-scoped team.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamLoad {
    /// Session-scoped team.
    pub team_id: i32,
    /// Players currently on the team.
    pub members: usize,
}

/// Where the next enrollee goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Seed a new team with this display name.
    Create { name: String },
    /// Join the existing team with this identifier.
    Join(i32),
}

/// Observable stage of a session's balancing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalancingStage {
    /// Nobody enrolled yet.
    NoTeams,
    /// The first team exists, the next enrollee seeds the second.
    OneTeam,
    /// Both teams exist and enrollees join the smaller one.
    TwoTeamsBalancing,
}

impl BalancingStage {
    /// Stage implied by the number of session-scoped teams.
    pub fn from_team_count(count: usize) -> Self {
        match count {
            0 => BalancingStage::NoTeams,
            1 => BalancingStage::OneTeam,
            _ => BalancingStage::TwoTeamsBalancing,
        }
    }
}

/// Decide the placement of the next enrollee given the existing teams.
///
/// With fewer than two teams a new one named `Team N` is seeded. Otherwise the
/// smallest team wins and ties go to the lowest team id.
pub fn place(loads: &[TeamLoad]) -> Placement {
    if loads.len() < MAX_SESSION_TEAMS {
        return Placement::Create {
            name: team_name(loads.len() + 1),
        };
    }

    loads
        .iter()
        .min_by_key(|load| (load.members, load.team_id))
        .map(|load| Placement::Join(load.team_id))
        .unwrap_or_else(|| Placement::Create {
            name: team_name(1),
        })
}

/// Display name of the `ordinal`-th session team.
pub fn team_name(ordinal: usize) -> String {
    format!("Team {ordinal}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(team_id: i32, members: usize) -> TeamLoad {
        TeamLoad { team_id, members }
    }

    #[test]
    fn first_enrollee_seeds_team_one() {
        assert_eq!(
            place(&[]),
            Placement::Create {
                name: "Team 1".into()
            }
        );
    }

    #[test]
    fn second_enrollee_seeds_team_two_even_if_team_one_is_bigger() {
        assert_eq!(
            place(&[load(7, 1)]),
            Placement::Create {
                name: "Team 2".into()
            }
        );
    }

    #[test]
    fn smaller_team_wins_once_both_exist() {
        assert_eq!(place(&[load(3, 4), load(9, 3)]), Placement::Join(9));
    }

    #[test]
    fn ties_go_to_lowest_team_id_regardless_of_input_order() {
        assert_eq!(place(&[load(12, 2), load(5, 2)]), Placement::Join(5));
        assert_eq!(place(&[load(5, 2), load(12, 2)]), Placement::Join(5));
    }

    #[test]
    fn never_asks_for_a_third_team() {
        let placement = place(&[load(1, 0), load(2, 0)]);
        assert_eq!(placement, Placement::Join(1));
    }

    #[test]
    fn replaying_five_enrollments_alternates_members() {
        let mut teams: Vec<(i32, Vec<u32>)> = Vec::new();
        for player in 1..=5u32 {
            let loads: Vec<TeamLoad> = teams
                .iter()
                .map(|(id, members)| load(*id, members.len()))
                .collect();
            match place(&loads) {
                Placement::Create { .. } => teams.push((teams.len() as i32 + 1, vec![player])),
                Placement::Join(id) => teams
                    .iter_mut()
                    .find(|(team_id, _)| *team_id == id)
                    .map(|(_, members)| members.push(player))
                    .unwrap(),
            }
        }

        assert_eq!(teams, vec![(1, vec![1, 3, 5]), (2, vec![2, 4])]);
    }

    #[test]
    fn stage_follows_team_count() {
        assert_eq!(BalancingStage::from_team_count(0), BalancingStage::NoTeams);
        assert_eq!(BalancingStage::from_team_count(1), BalancingStage::OneTeam);
        assert_eq!(
            BalancingStage::from_team_count(2),
            BalancingStage::TwoTeamsBalancing
        );
    }
}
