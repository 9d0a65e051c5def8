pub mod attendance;
pub mod badge;
pub mod events;
pub mod gaming;
pub mod leaderboard;
pub mod season;
pub mod session;
pub mod track;
pub mod user;

pub mod sql_fragment {
    pub const USER_FIELDS: &str = r#"
        user_id,
        email,
        name,
        picture,
        roles,
        level,
        xp,
        streak_days,
        last_active,
        onboarding_completed,
        goals,
        is_admin,
        created_at
    "#;

    pub const ATTENDANCE_FIELDS: &str = r#"
        attendance_id,
        user_id,
        session_id,
        check_in,
        check_out,
        duration_minutes,
        xp_earned
    "#;

    pub const SCORE_FIELDS: &str = r#"
        score_id,
        match_id,
        user_id,
        score,
        kills,
        deaths,
        assists,
        rank_position,
        xp_earned,
        created_at
    "#;
}
