use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub type Id = u64;

// Wire conventions differ per entity family: tournaments and teams travel in
// camelCase, everything else in snake_case. Reads tolerate the other
// convention; writes always use the declared one.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    #[default]
    #[serde(alias = "UPCOMING")]
    Upcoming,
    #[serde(alias = "ONGOING")]
    Ongoing,
    #[serde(alias = "COMPLETED")]
    Completed,
    #[serde(alias = "CANCELLED")]
    Cancelled,
}

impl TournamentStatus {
    pub const ALL: [TournamentStatus; 4] = [
        TournamentStatus::Upcoming,
        TournamentStatus::Ongoing,
        TournamentStatus::Completed,
        TournamentStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamCategory {
    #[default]
    #[serde(alias = "AMATEUR")]
    Amateur,
    #[serde(alias = "PROFESSIONAL")]
    Professional,
    #[serde(alias = "YOUTH")]
    Youth,
}

impl TeamCategory {
    pub const ALL: [TeamCategory; 3] = [
        TeamCategory::Amateur,
        TeamCategory::Professional,
        TeamCategory::Youth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TeamCategory::Amateur => "amateur",
            TeamCategory::Professional => "professional",
            TeamCategory::Youth => "youth",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    #[serde(alias = "SCHEDULED")]
    Scheduled,
    // Older backends report live matches as "ongoing".
    #[serde(alias = "LIVE", alias = "ongoing", alias = "ONGOING")]
    Live,
    #[serde(alias = "COMPLETED")]
    Completed,
    #[serde(alias = "POSTPONED")]
    Postponed,
    #[serde(alias = "CANCELLED")]
    Cancelled,
}

impl MatchStatus {
    pub const ALL: [MatchStatus; 5] = [
        MatchStatus::Scheduled,
        MatchStatus::Live,
        MatchStatus::Completed,
        MatchStatus::Postponed,
        MatchStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    #[default]
    #[serde(alias = "INVITED")]
    Invited,
    #[serde(alias = "REGISTERED")]
    Registered,
    #[serde(alias = "DECLINED")]
    Declined,
    #[serde(alias = "CANCELLED")]
    Cancelled,
}

impl RegistrationStatus {
    pub const ALL: [RegistrationStatus; 4] = [
        RegistrationStatus::Invited,
        RegistrationStatus::Registered,
        RegistrationStatus::Declined,
        RegistrationStatus::Cancelled,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RegistrationStatus::Invited => "invited",
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Declined => "declined",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientType {
    #[serde(alias = "TEAM")]
    Team,
    #[serde(alias = "PARTICIPANT")]
    Participant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    #[serde(alias = "SCHEDULE")]
    Schedule,
    #[serde(alias = "RESULT")]
    Result,
    #[serde(alias = "UPDATE")]
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    #[serde(alias = "admin")]
    Admin,
    #[default]
    #[serde(alias = "participant")]
    Participant,
}

impl UserRole {
    pub const ALL: [UserRole; 2] = [UserRole::Admin, UserRole::Participant];

    pub fn label(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Participant => "PARTICIPANT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: Id,
    pub name: String,
    #[serde(alias = "sport_type")]
    pub sport_type: String,
    #[serde(alias = "start_date")]
    pub start_date: String,
    #[serde(alias = "end_date")]
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: TournamentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: Id,
    pub name: String,
    pub category: TeamCategory,
    // Derived by the backend; absent on create responses.
    #[serde(default, alias = "member_count", skip_serializing_if = "Option::is_none")]
    pub member_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: Id,
    #[serde(alias = "firstName")]
    pub first_name: String,
    #[serde(alias = "lastName")]
    pub last_name: String,
    pub email: String,
    pub category: TeamCategory,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, alias = "teamMemberships", skip_serializing_if = "Vec::is_empty")]
    pub team_memberships: Vec<TeamMembership>,
}

impl Participant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Read-only projection assembled by the backend on participant payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMembership {
    #[serde(alias = "teamId")]
    pub team_id: Id,
    #[serde(alias = "teamName")]
    pub team_name: String,
    #[serde(default, alias = "teamCategory", skip_serializing_if = "Option::is_none")]
    pub team_category: Option<TeamCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "jerseyNumber", skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
    #[serde(default, alias = "addedAt", skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Id,
    #[serde(alias = "participantId")]
    pub participant_id: Id,
    #[serde(default, alias = "participantName")]
    pub participant_name: String,
    #[serde(default, alias = "participantEmail")]
    pub participant_email: String,
    #[serde(alias = "teamId")]
    pub team_id: Id,
    #[serde(default, alias = "teamName")]
    pub team_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "jerseyNumber", skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
    #[serde(default, alias = "addedAt")]
    pub added_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Venue {
    pub id: Id,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: Id,
    #[serde(alias = "tournamentId")]
    pub tournament_id: Id,
    #[serde(alias = "homeTeam")]
    pub home_team: Team,
    #[serde(alias = "awayTeam")]
    pub away_team: Team,
    pub venue: Venue,
    #[serde(alias = "scheduledAt")]
    pub scheduled_at: String,
    pub status: MatchStatus,
    #[serde(default, alias = "homeScore", skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(default, alias = "awayScore", skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    #[serde(alias = "teamId")]
    pub team_id: Id,
    pub team: Team,
    #[serde(alias = "tournamentId")]
    pub tournament_id: Id,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(alias = "teamId")]
    pub team_id: Id,
    #[serde(alias = "teamName")]
    pub team_name: String,
    #[serde(default)]
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Id,
    #[serde(alias = "recipientType")]
    pub recipient_type: RecipientType,
    #[serde(alias = "recipientId")]
    pub recipient_id: Id,
    #[serde(rename = "type", alias = "notificationType")]
    pub kind: NotificationType,
    pub message: String,
    #[serde(default, alias = "tournamentId", skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<Id>,
    #[serde(default, alias = "matchId", skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Id>,
    #[serde(default, alias = "createdAt")]
    pub created_at: String,
    #[serde(default)]
    pub read: bool,
}

// Create payloads. The backend assigns ids and derived fields.

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub name: String,
    pub sport_type: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub status: TournamentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTeam {
    pub name: String,
    pub category: TeamCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewParticipant {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub category: TeamCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewVenue {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewMatch {
    pub home_team_id: Id,
    pub away_team_id: Id,
    pub venue_id: Id,
    pub scheduled_at: String,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTeamMember {
    pub participant_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewRegistration {
    pub team_id: Id,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    pub recipient_type: RecipientType,
    pub recipient_id: Id,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<Id>,
}

// Patch payloads: only the set fields are serialized and changed.

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TournamentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rules: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TeamCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParticipantPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<TeamCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VenuePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_team_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_team_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue_id: Option<Id>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<MatchStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamMemberPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jersey_number: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
}

// Backend timestamps arrive as naive local strings, sometimes with
// fractional seconds, sometimes date-only.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.trim().trim_end_matches('Z');
    if cleaned.is_empty() {
        return None;
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(cleaned, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    None
}

pub fn format_datetime(raw: &str) -> String {
    if raw.trim().is_empty() {
        return "TBD".to_string();
    }
    if let Some(dt) = parse_datetime(raw) {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    let cleaned = raw.trim();
    if cleaned.len() >= 16 {
        return cleaned[..16].replace('T', " ");
    }
    cleaned.replace('T', " ")
}

/// Unparseable dates fail open so the affected feature stays reachable.
pub fn starts_in_future(start_date: &str, now: NaiveDateTime) -> bool {
    match parse_datetime(start_date) {
        Some(start) => start > now,
        None => true,
    }
}
