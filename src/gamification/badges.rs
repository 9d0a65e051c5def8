//! Badge threshold kinds and the static catalog seed.

use crate::db::models::badge::Badge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Streak,
    Level,
    Tracks,
    Wins,
    Onboarding,
    Hybrid,
}

impl BadgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BadgeKind::Streak => "streak",
            BadgeKind::Level => "level",
            BadgeKind::Tracks => "tracks",
            BadgeKind::Wins => "wins",
            BadgeKind::Onboarding => "onboarding",
            BadgeKind::Hybrid => "hybrid",
        }
    }
}

/// Badges of one kind whose threshold the observed value satisfies.
pub fn satisfied(defs: &[Badge], value: i64) -> impl Iterator<Item = &Badge> {
    defs.iter().filter(move |b| b.requirement_value <= value)
}

fn def(
    badge_id: &str,
    name: &str,
    description: &str,
    icon: &str,
    category: &str,
    requirement_type: BadgeKind,
    requirement_value: i64,
    xp_reward: i64,
    rarity: &str,
) -> Badge {
    Badge {
        badge_id: badge_id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        category: category.to_string(),
        requirement_type: requirement_type.as_str().to_string(),
        requirement_value,
        xp_reward,
        rarity: rarity.to_string(),
    }
}

/// The seed catalog. Stored once and treated as read-only afterwards.
pub fn catalog() -> Vec<Badge> {
    vec![
        def(
            "first_steps",
            "First Steps",
            "Completed onboarding",
            "rocket",
            "general",
            BadgeKind::Onboarding,
            1,
            100,
            "common",
        ),
        def(
            "week_warrior",
            "Week Warrior",
            "7-day attendance streak",
            "flame",
            "attendance",
            BadgeKind::Streak,
            7,
            200,
            "rare",
        ),
        def(
            "monthly_legend",
            "Monthly Legend",
            "30-day attendance streak",
            "trophy",
            "attendance",
            BadgeKind::Streak,
            30,
            500,
            "epic",
        ),
        def(
            "century_club",
            "Century Club",
            "100-day attendance streak",
            "crown",
            "attendance",
            BadgeKind::Streak,
            100,
            1000,
            "legendary",
        ),
        def(
            "rising_star",
            "Rising Star",
            "Reached level 5",
            "star",
            "level",
            BadgeKind::Level,
            5,
            100,
            "common",
        ),
        def(
            "veteran",
            "Veteran",
            "Reached level 10",
            "medal",
            "level",
            BadgeKind::Level,
            10,
            250,
            "rare",
        ),
        def(
            "elite_member",
            "Elite Member",
            "Reached level 25",
            "gem",
            "level",
            BadgeKind::Level,
            25,
            500,
            "epic",
        ),
        def(
            "legend",
            "Legend",
            "Reached level 50",
            "crown",
            "level",
            BadgeKind::Level,
            50,
            1000,
            "legendary",
        ),
        def(
            "track_creator",
            "Track Creator",
            "Created your first track",
            "music",
            "music",
            BadgeKind::Tracks,
            1,
            150,
            "common",
        ),
        def(
            "producer",
            "Producer",
            "Created 10 tracks",
            "headphones",
            "music",
            BadgeKind::Tracks,
            10,
            500,
            "rare",
        ),
        def(
            "gamer",
            "Gamer",
            "Won your first match",
            "gamepad",
            "gaming",
            BadgeKind::Wins,
            1,
            150,
            "common",
        ),
        def(
            "champion",
            "Champion",
            "Won 25 matches",
            "trophy",
            "gaming",
            BadgeKind::Wins,
            25,
            500,
            "epic",
        ),
        def(
            "hybrid_hero",
            "Hybrid Hero",
            "Active in music, gaming, and attendance",
            "star",
            "hybrid",
            BadgeKind::Hybrid,
            1,
            300,
            "rare",
        ),
    ]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn catalog_has_all_kinds() {
        let defs = catalog();
        assert!(defs.len() >= 12);

        for kind in ["streak", "level", "tracks", "wins", "onboarding", "hybrid"] {
            assert!(
                defs.iter().any(|b| b.requirement_type == kind),
                "no badge with kind {kind}"
            );
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let defs = catalog();
        let mut ids: Vec<_> = defs.iter().map(|b| b.badge_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), defs.len());
    }

    #[test]
    fn satisfied_selects_thresholds_at_or_below_value() {
        let defs = catalog();
        let streaks: Vec<Badge> = defs
            .into_iter()
            .filter(|b| b.requirement_type == "streak")
            .collect();

        let earned: Vec<&str> = satisfied(&streaks, 30)
            .map(|b| b.badge_id.as_str())
            .collect();
        assert_eq!(earned, vec!["week_warrior", "monthly_legend"]);

        assert_eq!(satisfied(&streaks, 6).count(), 0);
    }
}
