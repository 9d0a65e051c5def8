//! The four ranking formulas, each a pure function from raw event rows to
//! scored users. Grouping uses BTreeMap so identical inputs always produce
//! identical output order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::{Value, json};

use crate::leaderboard::rows::{AttendanceRow, ContributionRow, ScoreRow, TrackRow};

#[derive(Debug, Clone)]
pub struct ScoredUser {
    pub user_id: String,
    pub score: f64,
    pub details: Value,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `session_count + (total_duration_minutes / 60) * 2`
pub fn attendance_impact(rows: &[AttendanceRow]) -> Vec<ScoredUser> {
    let mut grouped: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for row in rows {
        let entry = grouped.entry(row.user_id.as_str()).or_default();
        entry.0 += 1;
        entry.1 += i64::from(row.duration_minutes);
    }

    grouped
        .into_iter()
        .map(|(user_id, (sessions, duration))| ScoredUser {
            user_id: user_id.to_string(),
            score: round2(sessions as f64 + (duration as f64 / 60.0) * 2.0),
            details: json!({
                "total_sessions": sessions,
                "total_duration": duration,
            }),
        })
        .collect()
}

/// `tracks*50 + listens/10 + likes*5 + contributions*30`. Contribution
/// counts are lifetime and only attach to users who created at least one
/// track, matching the reference formula.
pub fn music_impact(tracks: &[TrackRow], contributions: &[ContributionRow]) -> Vec<ScoredUser> {
    let mut contrib_counts: BTreeMap<&str, i64> = BTreeMap::new();
    for c in contributions {
        *contrib_counts.entry(c.user_id.as_str()).or_default() += 1;
    }

    let mut grouped: BTreeMap<&str, (i64, i64, i64)> = BTreeMap::new();
    for t in tracks {
        let entry = grouped.entry(t.created_by.as_str()).or_default();
        entry.0 += 1;
        entry.1 += t.listens;
        entry.2 += t.likes;
    }

    grouped
        .into_iter()
        .map(|(user_id, (created, listens, likes))| {
            let contribs = contrib_counts.get(user_id).copied().unwrap_or(0);
            let score = created as f64 * 50.0
                + listens as f64 / 10.0
                + likes as f64 * 5.0
                + contribs as f64 * 30.0;

            ScoredUser {
                user_id: user_id.to_string(),
                score: round2(score),
                details: json!({
                    "tracks_created": created,
                    "total_listens": listens,
                    "total_likes": likes,
                    "contributions": contribs,
                }),
            }
        })
        .collect()
}

/// `wins*100 + total_score/1000 + total_kills*2`; a win is rank_position 1.
/// The k/d ratio is reported but not part of the score.
pub fn gaming_ranked(rows: &[ScoreRow]) -> Vec<ScoredUser> {
    #[derive(Default)]
    struct Acc {
        total_score: i64,
        kills: i64,
        deaths: i64,
        wins: i64,
        matches: i64,
    }

    let mut grouped: BTreeMap<&str, Acc> = BTreeMap::new();
    for row in rows {
        let acc = grouped.entry(row.user_id.as_str()).or_default();
        acc.total_score += row.score;
        acc.kills += i64::from(row.kills);
        acc.deaths += i64::from(row.deaths);
        acc.matches += 1;
        if row.rank_position == 1 {
            acc.wins += 1;
        }
    }

    grouped
        .into_iter()
        .map(|(user_id, acc)| {
            let kd_ratio = if acc.deaths > 0 {
                acc.kills as f64 / acc.deaths as f64
            } else {
                acc.kills as f64
            };
            let score =
                acc.wins as f64 * 100.0 + acc.total_score as f64 / 1000.0 + acc.kills as f64 * 2.0;

            ScoredUser {
                user_id: user_id.to_string(),
                score: round2(score),
                details: json!({
                    "wins": acc.wins,
                    "matches": acc.matches,
                    "total_score": acc.total_score,
                    "total_kills": acc.kills,
                    "total_deaths": acc.deaths,
                    "kd_ratio": round2(kd_ratio),
                }),
            }
        })
        .collect()
}

/// Lifetime composite: `att_count*10 * 0.3 + (tracks*50 + contribs*30) *
/// 0.35 + (sum(scores)/100) * 0.35`, keeping only users with a positive
/// total.
pub fn hybrid_master(
    attendance: &[AttendanceRow],
    tracks: &[TrackRow],
    contributions: &[ContributionRow],
    scores: &[ScoreRow],
) -> Vec<ScoredUser> {
    let mut att_counts: BTreeMap<&str, i64> = BTreeMap::new();
    for a in attendance {
        *att_counts.entry(a.user_id.as_str()).or_default() += 1;
    }

    let mut track_counts: BTreeMap<&str, i64> = BTreeMap::new();
    for t in tracks {
        *track_counts.entry(t.created_by.as_str()).or_default() += 1;
    }

    let mut contrib_counts: BTreeMap<&str, i64> = BTreeMap::new();
    for c in contributions {
        *contrib_counts.entry(c.user_id.as_str()).or_default() += 1;
    }

    let mut score_sums: BTreeMap<&str, i64> = BTreeMap::new();
    for s in scores {
        *score_sums.entry(s.user_id.as_str()).or_default() += s.score;
    }

    let mut users: BTreeMap<&str, ()> = BTreeMap::new();
    users.extend(att_counts.keys().map(|k| (*k, ())));
    users.extend(track_counts.keys().map(|k| (*k, ())));
    users.extend(contrib_counts.keys().map(|k| (*k, ())));
    users.extend(score_sums.keys().map(|k| (*k, ())));

    users
        .into_keys()
        .filter_map(|user_id| {
            let att_score = att_counts.get(user_id).copied().unwrap_or(0) * 10;
            let music_score = track_counts.get(user_id).copied().unwrap_or(0) * 50
                + contrib_counts.get(user_id).copied().unwrap_or(0) * 30;
            let gaming_score = score_sums.get(user_id).copied().unwrap_or(0) as f64 / 100.0;

            let total =
                att_score as f64 * 0.3 + music_score as f64 * 0.35 + gaming_score * 0.35;
            if total <= 0.0 {
                return None;
            }

            Some(ScoredUser {
                user_id: user_id.to_string(),
                score: round2(total),
                details: json!({
                    "att_score": att_score,
                    "music_score": music_score,
                    "gaming_score": round2(gaming_score),
                }),
            })
        })
        .collect()
}

/// Descending by score; equal scores fall back to ascending user id so the
/// ordering is total and the output deterministic. Truncates to `limit`.
pub fn rank(mut scored: Vec<ScoredUser>, limit: usize) -> Vec<ScoredUser> {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.user_id.cmp(&b.user_id))
    });
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod test {
    use super::*;

    fn att(user_id: &str, duration_minutes: i32) -> AttendanceRow {
        AttendanceRow {
            user_id: user_id.to_string(),
            duration_minutes,
        }
    }

    fn track(created_by: &str, listens: i64, likes: i64) -> TrackRow {
        TrackRow {
            created_by: created_by.to_string(),
            listens,
            likes,
        }
    }

    fn contrib(user_id: &str) -> ContributionRow {
        ContributionRow {
            user_id: user_id.to_string(),
        }
    }

    fn score(user_id: &str, points: i64, kills: i32, deaths: i32, rank_position: i32) -> ScoreRow {
        ScoreRow {
            user_id: user_id.to_string(),
            score: points,
            kills,
            deaths,
            rank_position,
        }
    }

    #[test]
    fn attendance_scores_sessions_plus_weighted_hours() {
        // 2 sessions, 90 minutes: 2 + 1.5 * 2 = 5
        let rows = vec![att("ada", 60), att("ada", 30)];
        let scored = attendance_impact(&rows);

        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].user_id, "ada");
        assert_eq!(scored[0].score, 5.0);
        assert_eq!(scored[0].details["total_sessions"], 2);
        assert_eq!(scored[0].details["total_duration"], 90);
    }

    #[test]
    fn music_counts_contributions_for_track_creators_only() {
        let tracks = vec![track("ada", 100, 2)];
        let contributions = vec![contrib("ada"), contrib("ada"), contrib("bob")];
        let scored = music_impact(&tracks, &contributions);

        // bob contributed but never created a track, so no entry for bob
        assert_eq!(scored.len(), 1);
        // 1*50 + 100/10 + 2*5 + 2*30 = 130
        assert_eq!(scored[0].score, 130.0);
        assert_eq!(scored[0].details["contributions"], 2);
    }

    #[test]
    fn gaming_scores_wins_and_kills_but_not_kd() {
        let rows = vec![
            score("ada", 5000, 10, 5, 1),
            score("ada", 3000, 6, 0, 2),
            score("bob", 9000, 1, 2, 1),
        ];
        let scored = gaming_ranked(&rows);

        let ada = scored.iter().find(|s| s.user_id == "ada").unwrap();
        // 1 win * 100 + 8000/1000 + 16 kills * 2 = 140
        assert_eq!(ada.score, 140.0);
        assert_eq!(ada.details["wins"], 1);
        assert_eq!(ada.details["kd_ratio"], 3.2);

        let bob = scored.iter().find(|s| s.user_id == "bob").unwrap();
        // 100 + 9 + 2 = 111
        assert_eq!(bob.score, 111.0);
    }

    #[test]
    fn gaming_kd_falls_back_to_kills_with_zero_deaths() {
        let rows = vec![score("ada", 1000, 7, 0, 3)];
        let scored = gaming_ranked(&rows);
        assert_eq!(scored[0].details["kd_ratio"], 7.0);
    }

    #[test]
    fn hybrid_filters_zero_scores() {
        let scored = hybrid_master(&[], &[], &[], &[score("ada", 0, 0, 0, 5)]);
        assert!(scored.is_empty());
    }

    #[test]
    fn hybrid_blends_weighted_sub_scores() {
        let attendance = vec![att("ada", 60), att("ada", 60)];
        let tracks = vec![track("ada", 0, 0)];
        let contributions = vec![contrib("ada")];
        let scores = vec![score("ada", 2000, 0, 0, 2)];

        let scored = hybrid_master(&attendance, &tracks, &contributions, &scores);
        assert_eq!(scored.len(), 1);
        // att 20 * 0.3 + music 80 * 0.35 + gaming 20 * 0.35 = 6 + 28 + 7
        assert_eq!(scored[0].score, 41.0);
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let scored = vec![
            ScoredUser {
                user_id: "low".into(),
                score: 1.0,
                details: json!({}),
            },
            ScoredUser {
                user_id: "high".into(),
                score: 10.0,
                details: json!({}),
            },
            ScoredUser {
                user_id: "mid".into(),
                score: 5.0,
                details: json!({}),
            },
        ];

        let ranked = rank(scored, 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].user_id, "high");
        assert_eq!(ranked[1].user_id, "mid");
    }

    #[test]
    fn rank_breaks_ties_by_user_id() {
        let scored = vec![
            ScoredUser {
                user_id: "zed".into(),
                score: 5.0,
                details: json!({}),
            },
            ScoredUser {
                user_id: "ada".into(),
                score: 5.0,
                details: json!({}),
            },
        ];

        let ranked = rank(scored, 10);
        assert_eq!(ranked[0].user_id, "ada");
        assert_eq!(ranked[1].user_id, "zed");
    }

    #[test]
    fn formulas_are_deterministic() {
        let rows = vec![att("ada", 45), att("bob", 200), att("cyd", 45)];
        let first = attendance_impact(&rows);
        let second = attendance_impact(&rows);

        let ids = |v: &[ScoredUser]| v.iter().map(|s| s.user_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(
            first.iter().map(|s| s.score).collect::<Vec<_>>(),
            second.iter().map(|s| s.score).collect::<Vec<_>>()
        );
    }
}
