use std::fs;
use std::path::PathBuf;

use serde_json::{Value, json};

use tourney_terminal::api::{member_rows_from_value, unwrap_envelope};
use tourney_terminal::http::{ErrorKind, classify_error_body};
use tourney_terminal::model::{
    Match, MatchPatch, MatchStatus, NewMatch, NewNotification, NewTournament, NotificationType,
    RecipientType, Tournament, TournamentPatch, TournamentStatus,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn tournament_rows_parse_in_either_naming_convention() {
    let raw = read_fixture("tournaments_page.json");
    let rows: Vec<Tournament> = serde_json::from_str(&raw).expect("fixture should parse");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].name, "Spring Invitational");
    assert_eq!(rows[0].sport_type, "football");
    assert_eq!(rows[0].status, TournamentStatus::Upcoming);
    assert_eq!(rows[0].location.as_deref(), Some("Riverside Park"));

    assert_eq!(rows[1].sport_type, "futsal");
    assert_eq!(rows[1].start_date, "2026-01-10");
    assert_eq!(rows[1].status, TournamentStatus::Completed);
    assert!(rows[1].location.is_none());
    assert!(rows[1].rules.is_none());
}

#[test]
fn older_backends_report_live_matches_as_ongoing() {
    let raw = r#"{
        "id": 9,
        "tournament_id": 4,
        "home_team": {"id": 1, "name": "Lions", "category": "amateur"},
        "away_team": {"id": 2, "name": "Tigers", "category": "professional"},
        "venue": {"id": 3, "name": "Main Hall"},
        "scheduled_at": "2026-05-01T18:00",
        "status": "ongoing",
        "home_score": 1,
        "away_score": 0
    }"#;
    let fixture: Match = serde_json::from_str(raw).expect("snake payload should parse");
    assert_eq!(fixture.status, MatchStatus::Live);
    assert_eq!(fixture.home_team.name, "Lions");
    assert_eq!(fixture.home_score, Some(1));

    let status: MatchStatus = serde_json::from_value(json!("ONGOING")).expect("alias should parse");
    assert_eq!(status, MatchStatus::Live);
    assert_eq!(serde_json::to_value(MatchStatus::Live).expect("serialize"), json!("live"));
}

#[test]
fn envelopes_unwrap_to_the_innermost_data() {
    let doubled = json!({"success": true, "data": {"data": [1, 2], "total": 2}});
    assert_eq!(unwrap_envelope(doubled), json!([1, 2]));

    let bare = json!([{"id": 1}]);
    assert_eq!(unwrap_envelope(bare.clone()), bare);

    let plain = json!({"id": 7, "name": "x"});
    assert_eq!(unwrap_envelope(plain.clone()), plain);
}

#[test]
fn member_rows_accept_envelopes_and_sparse_fields() {
    let raw = read_fixture("members_envelope.json");
    let value: Value = serde_json::from_str(&raw).expect("fixture should parse");
    let rows = member_rows_from_value(value).expect("envelope should unwrap");
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].participant_name, "Alice Stone");
    assert_eq!(rows[0].role.as_deref(), Some("captain"));
    assert_eq!(rows[0].jersey_number, Some(7));

    assert_eq!(rows[1].participant_id, 6);
    assert!(rows[1].participant_name.is_empty());
    assert!(rows[1].role.is_none());
    assert!(rows[1].jersey_number.is_none());
}

#[test]
fn member_rows_treat_null_as_an_empty_roster() {
    assert!(member_rows_from_value(Value::Null).expect("null is fine").is_empty());
    let wrapped_null = json!({"success": true, "data": null});
    assert!(member_rows_from_value(wrapped_null).expect("wrapped null is fine").is_empty());
}

#[test]
fn tournament_writes_use_camel_case_and_skip_unset_options() {
    let draft = NewTournament {
        name: "Spring Invitational".to_string(),
        sport_type: "football".to_string(),
        start_date: "2026-04-01T09:00".to_string(),
        end_date: "2026-04-14T18:00".to_string(),
        location: None,
        status: TournamentStatus::Upcoming,
        rules: None,
    };
    let value = serde_json::to_value(&draft).expect("serialize");
    let object = value.as_object().expect("object payload");
    assert_eq!(object["sportType"], json!("football"));
    assert_eq!(object["startDate"], json!("2026-04-01T09:00"));
    assert_eq!(object["status"], json!("upcoming"));
    assert!(!object.contains_key("location"));
    assert!(!object.contains_key("rules"));
}

#[test]
fn match_writes_use_snake_case() {
    let draft = NewMatch {
        home_team_id: 1,
        away_team_id: 2,
        venue_id: 3,
        scheduled_at: "2026-05-01T18:00".to_string(),
        status: MatchStatus::Scheduled,
    };
    let value = serde_json::to_value(&draft).expect("serialize");
    let object = value.as_object().expect("object payload");
    assert_eq!(object["home_team_id"], json!(1));
    assert_eq!(object["away_team_id"], json!(2));
    assert_eq!(object["venue_id"], json!(3));
    assert_eq!(object["status"], json!("scheduled"));
}

#[test]
fn patches_serialize_only_the_set_fields() {
    let patch = MatchPatch {
        status: Some(MatchStatus::Completed),
        home_score: Some(2),
        away_score: Some(1),
        ..MatchPatch::default()
    };
    let value = serde_json::to_value(&patch).expect("serialize");
    let object = value.as_object().expect("object payload");
    assert_eq!(object.len(), 3);
    assert_eq!(object["status"], json!("completed"));
    assert_eq!(object["home_score"], json!(2));

    let rename = TournamentPatch {
        name: Some("Renamed".to_string()),
        ..TournamentPatch::default()
    };
    let value = serde_json::to_value(&rename).expect("serialize");
    let object = value.as_object().expect("object payload");
    assert_eq!(object.len(), 1);
    assert_eq!(object["name"], json!("Renamed"));
}

#[test]
fn notification_kind_travels_under_the_type_key() {
    let note = NewNotification {
        recipient_type: RecipientType::Team,
        recipient_id: 4,
        kind: NotificationType::Schedule,
        message: "Lions vs Tigers scheduled for 2026-05-01 18:00".to_string(),
        tournament_id: Some(9),
        match_id: None,
    };
    let value = serde_json::to_value(&note).expect("serialize");
    let object = value.as_object().expect("object payload");
    assert_eq!(object["type"], json!("schedule"));
    assert_eq!(object["recipient_type"], json!("team"));
    assert!(!object.contains_key("kind"));
    assert!(!object.contains_key("match_id"));
}

#[test]
fn error_bodies_classify_structured_and_prose() {
    let (kind, message) =
        classify_error_body(r#"{"code": "HAS_DEPENDENTS", "message": "team has members"}"#);
    assert_eq!(kind, Some(ErrorKind::HasDependents));
    assert_eq!(message.as_deref(), Some("team has members"));

    let (kind, message) = classify_error_body(r#"{"error": "no such tournament"}"#);
    assert!(kind.is_none());
    assert_eq!(message.as_deref(), Some("no such tournament"));

    let (kind, message) = classify_error_body("upstream proxy fell over");
    assert!(kind.is_none());
    assert_eq!(message.as_deref(), Some("upstream proxy fell over"));

    assert_eq!(classify_error_body(""), (None, None));
    assert_eq!(classify_error_body("null"), (None, None));

    assert_eq!(ErrorKind::from_code("has_dependents"), ErrorKind::HasDependents);
    assert_eq!(ErrorKind::from_code("VALIDATION_ERROR"), ErrorKind::Validation);
}
