//! Football fixtures: next match, live score, or recent result for one
//! tracked team, via the football-data.org v4 API.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::{ApiKeys, FootballConfig};
use crate::fetch::{ApiClient, AuthHeader, FetchError};
use crate::select::{
    most_relevant, RecordPhase, RelevanceTier, TemporalRecord, TemporalWindow,
};
use crate::sources::Source;
use crate::summary::Summary;

pub const FOOTBALL_API_URL: &str = "https://api.football-data.org/v4";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    InPlay,
    Paused,
    Halftime,
    Live,
    Scheduled,
    Timed,
    Finished,
    #[serde(other)]
    Other,
}

impl MatchStatus {
    fn live_label(self) -> &'static str {
        match self {
            Self::InPlay | Self::Live => "LIVE",
            Self::Paused => "PAUSED",
            Self::Halftime => "HALFTIME",
            _ => "LIVE",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    pub status: MatchStatus,
    #[serde(rename = "utcDate", default)]
    pub utc_date: Option<DateTime<Utc>>,
    #[serde(rename = "homeTeam", default)]
    pub home_team: TeamRef,
    #[serde(rename = "awayTeam", default)]
    pub away_team: TeamRef,
    #[serde(default)]
    pub competition: Competition,
    #[serde(default)]
    pub score: Score,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TeamRef {
    #[serde(rename = "shortName", default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

impl TeamRef {
    fn display(&self, fallback: &'static str) -> String {
        self.short_name
            .clone()
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Competition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Score {
    #[serde(rename = "fullTime", default)]
    pub full_time: ScorePair,
    #[serde(rename = "halfTime", default)]
    pub half_time: ScorePair,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ScorePair {
    pub home: Option<u32>,
    pub away: Option<u32>,
}

impl TemporalRecord for MatchRecord {
    fn phase(&self) -> RecordPhase {
        match self.status {
            MatchStatus::InPlay
            | MatchStatus::Paused
            | MatchStatus::Halftime
            | MatchStatus::Live => RecordPhase::InProgress,
            MatchStatus::Scheduled | MatchStatus::Timed => RecordPhase::Scheduled,
            MatchStatus::Finished => RecordPhase::Finished,
            MatchStatus::Other => RecordPhase::Other,
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.utc_date
    }
}

#[derive(Debug, Deserialize)]
struct MatchesResponse {
    #[serde(default)]
    matches: Vec<MatchRecord>,
}

/// Shortened competition name for the display.
fn competition_name(competition: &Competition) -> String {
    let short = competition.code.as_deref().and_then(|code| match code {
        "PL" => Some("Premier League"),
        "CL" => Some("Champions League"),
        "EL" => Some("Europa League"),
        "FAC" => Some("FA Cup"),
        "EFL" => Some("League Cup"),
        "CS" => Some("Community Shield"),
        _ => None,
    });
    match short {
        Some(name) => name.to_string(),
        None => {
            let name = competition.name.as_deref().unwrap_or_default();
            name.chars().take(20).collect()
        }
    }
}

/// Format a kickoff time for display, e.g. "Sat Jan 20 15:00".
fn format_kickoff(ts: DateTime<Utc>) -> String {
    ts.format("%a %b %d %H:%M").to_string()
}

/// Score for the display. A live match may only have a half-time score yet,
/// so the full-time pair falls back to half-time unless `full_time_only`.
fn score_line(score: &Score, full_time_only: bool) -> String {
    let fallback = if full_time_only {
        ScorePair::default()
    } else {
        score.half_time
    };
    let home = score.full_time.home.or(fallback.home).unwrap_or(0);
    let away = score.full_time.away.or(fallback.away).unwrap_or(0);
    format!("{home} - {away}")
}

pub struct FootballSource {
    client: ApiClient,
    team_id: u32,
    team_name: String,
    window: TemporalWindow,
}

impl FootballSource {
    pub fn new(config: &FootballConfig, keys: &ApiKeys, http: reqwest::Client) -> Self {
        let auth = AuthHeader::when_configured("X-Auth-Token", &keys.football);
        Self {
            client: ApiClient::new("football", FOOTBALL_API_URL, auth, http),
            team_id: config.team_id,
            team_name: config.team_name.clone(),
            window: TemporalWindow::default(),
        }
    }

    async fn fetch_matches(&self) -> Result<Vec<MatchRecord>, FetchError> {
        let resp: MatchesResponse = self
            .client
            .get_json(&format!("/teams/{}/matches/", self.team_id), &[])
            .await?;
        Ok(resp.matches)
    }

    fn build_summary(&self, matches: &[MatchRecord], now: DateTime<Utc>) -> Summary {
        let selection = match most_relevant(matches, now, self.window) {
            Some(selection) => selection,
            None => return self.empty_summary(),
        };

        let m = selection.record;
        let teams = format!(
            "{} vs {}",
            m.home_team.display("Home"),
            m.away_team.display("Away")
        );
        let competition = competition_name(&m.competition);

        match selection.tier {
            RelevanceTier::Live => Summary::new(&self.team_name, m.status.live_label())
                .with_detail(vec![competition, teams, score_line(&m.score, false)]),
            RelevanceTier::Upcoming => {
                let kickoff = m.utc_date.map(format_kickoff).unwrap_or_default();
                Summary::new(&self.team_name, "Kickoff")
                    .with_detail(vec![competition, teams, kickoff])
            }
            RelevanceTier::Recent => Summary::new(&self.team_name, "Full Time")
                .with_detail(vec![competition, teams, score_line(&m.score, true)]),
        }
    }
}

#[async_trait]
impl Source for FootballSource {
    fn name(&self) -> &'static str {
        "football"
    }

    fn empty_summary(&self) -> Summary {
        Summary::new(&self.team_name, "No upcoming matches")
    }

    async fn refresh(&self) -> Result<Summary, FetchError> {
        let matches = self.fetch_matches().await?;
        Ok(self.build_summary(&matches, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn source() -> FootballSource {
        let cfg = AppConfig::default();
        FootballSource::new(&cfg.football, &cfg.keys, reqwest::Client::new())
    }

    fn now() -> DateTime<Utc> {
        "2024-01-18T12:00:00Z".parse().expect("reference time")
    }

    fn record(raw: serde_json::Value) -> MatchRecord {
        serde_json::from_value(raw).expect("match record")
    }

    #[test]
    fn upstream_match_payload_parses() {
        let matches: MatchesResponse = serde_json::from_value(serde_json::json!({
            "matches": [{
                "status": "FINISHED",
                "utcDate": "2024-01-17T15:00:00Z",
                "homeTeam": { "shortName": "Arsenal" },
                "awayTeam": { "shortName": "Spurs" },
                "competition": { "name": "Premier League", "code": "PL" },
                "score": { "fullTime": { "home": 2, "away": 1 } }
            }]
        }))
        .expect("parse");

        assert_eq!(matches.matches.len(), 1);
        let m = &matches.matches[0];
        assert_eq!(m.status, MatchStatus::Finished);
        assert_eq!(m.score.full_time.home, Some(2));
    }

    #[test]
    fn unknown_status_parses_as_other() {
        let m = record(serde_json::json!({ "status": "POSTPONED" }));
        assert_eq!(m.status, MatchStatus::Other);
        assert_eq!(m.phase(), RecordPhase::Other);
    }

    #[test]
    fn upcoming_match_renders_kickoff() {
        let matches = vec![
            record(serde_json::json!({
                "status": "FINISHED",
                "utcDate": "2024-01-17T12:00:00Z",
                "homeTeam": { "shortName": "Arsenal" },
                "awayTeam": { "shortName": "Chelsea" },
                "competition": { "code": "PL" },
                "score": { "fullTime": { "home": 1, "away": 0 } }
            })),
            record(serde_json::json!({
                "status": "TIMED",
                "utcDate": "2024-01-20T15:00:00Z",
                "homeTeam": { "shortName": "Arsenal" },
                "awayTeam": { "shortName": "Spurs" },
                "competition": { "code": "FAC" }
            })),
        ];

        let summary = source().build_summary(&matches, now());
        assert_eq!(summary.status, "Kickoff", "upcoming beats recent");
        assert_eq!(
            summary.detail,
            vec!["FA Cup", "Arsenal vs Spurs", "Sat Jan 20 15:00"]
        );
        assert!(summary.available);
    }

    #[test]
    fn live_match_shows_running_score() {
        let matches = vec![record(serde_json::json!({
            "status": "HALFTIME",
            "utcDate": "2024-01-18T11:00:00Z",
            "homeTeam": { "shortName": "Arsenal" },
            "awayTeam": { "shortName": "Liverpool" },
            "competition": { "code": "CL" },
            "score": { "halfTime": { "home": 1, "away": 1 } }
        }))];

        let summary = source().build_summary(&matches, now());
        assert_eq!(summary.status, "HALFTIME");
        assert_eq!(
            summary.detail,
            vec!["Champions League", "Arsenal vs Liverpool", "1 - 1"]
        );
    }

    #[test]
    fn finished_match_shows_full_time_score() {
        let matches = vec![record(serde_json::json!({
            "status": "FINISHED",
            "utcDate": "2024-01-17T20:00:00Z",
            "homeTeam": { "shortName": "Arsenal" },
            "awayTeam": { "shortName": "Brighton" },
            "competition": { "name": "Some Very Long Competition Name", },
            "score": { "fullTime": { "home": 3, "away": 0 } }
        }))];

        let summary = source().build_summary(&matches, now());
        assert_eq!(summary.status, "Full Time");
        assert_eq!(summary.detail[0], "Some Very Long Compe", "name truncates to 20 chars");
        assert_eq!(summary.detail[2], "3 - 0");
    }

    #[test]
    fn no_relevant_match_is_the_empty_summary() {
        let matches = vec![record(serde_json::json!({
            "status": "FINISHED",
            "utcDate": "2023-11-01T15:00:00Z"
        }))];

        let summary = source().build_summary(&matches, now());
        assert_eq!(summary.status, "No upcoming matches");
        assert_eq!(summary.title, "Arsenal FC");
        assert!(summary.available);
    }
}
