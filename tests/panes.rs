use tourney_terminal::forms::TournamentForm;
use tourney_terminal::model::{
    LeaderboardEntry, Participant, Team, TeamCategory, TeamMember, Tournament, TournamentStatus,
    UserRole,
};
use tourney_terminal::session::SessionUser;
use tourney_terminal::state::{
    AppState, Delta, ListPane, PaneKind, Screen, active_tournaments, apply_delta,
    distinct_roles, filter_candidates, registration_open, sort_leaderboard, team_delete_block,
};

fn tournament(id: u64, name: &str, start: &str, status: TournamentStatus) -> Tournament {
    Tournament {
        id,
        name: name.to_string(),
        sport_type: "football".to_string(),
        start_date: start.to_string(),
        end_date: "2026-12-01T18:00:00".to_string(),
        location: None,
        status,
        rules: None,
    }
}

fn team(id: u64, name: &str, member_count: Option<u32>) -> Team {
    Team {
        id,
        name: name.to_string(),
        category: TeamCategory::Amateur,
        member_count,
    }
}

fn participant(id: u64, first: &str, last: &str, email: &str) -> Participant {
    Participant {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: email.to_string(),
        category: TeamCategory::Amateur,
        created_at: None,
        updated_at: None,
        team_memberships: Vec::new(),
    }
}

fn member(id: u64, role: Option<&str>) -> TeamMember {
    TeamMember {
        id,
        participant_id: id + 100,
        participant_name: String::new(),
        participant_email: String::new(),
        team_id: 1,
        team_name: String::new(),
        role: role.map(str::to_string),
        jersey_number: None,
        added_at: String::new(),
    }
}

fn entry(team_id: u64, name: &str, wins: u32) -> LeaderboardEntry {
    LeaderboardEntry {
        team_id,
        team_name: name.to_string(),
        wins,
    }
}

fn admin() -> SessionUser {
    SessionUser {
        id: 1,
        username: "admin".to_string(),
        role: UserRole::Admin,
    }
}

#[test]
fn a_failed_load_keeps_the_rows_already_on_screen() {
    let mut pane: ListPane<Team, TournamentForm> = ListPane::default();
    pane.set_items(vec![team(1, "Lions", None), team(2, "Tigers", None)]);

    pane.begin_load();
    assert!(pane.loading);
    pane.set_error("backend unreachable".to_string());

    assert!(!pane.loading);
    assert_eq!(pane.error.as_deref(), Some("backend unreachable"));
    assert_eq!(pane.items.len(), 2, "stale rows stay visible next to the error");

    pane.set_items(vec![team(1, "Lions", None)]);
    assert!(pane.error.is_none(), "a later success clears the error");
}

#[test]
fn set_items_clamps_the_selection() {
    let mut pane: ListPane<Team, TournamentForm> = ListPane::default();
    pane.set_items(vec![
        team(1, "A", None),
        team(2, "B", None),
        team(3, "C", None),
    ]);
    pane.select_next();
    pane.select_next();
    assert_eq!(pane.selected, 2);

    pane.set_items(vec![team(1, "A", None)]);
    assert_eq!(pane.selected, 0);
    assert_eq!(pane.selected_item().map(|t| t.id), Some(1));

    pane.set_items(Vec::new());
    assert_eq!(pane.selected, 0);
    assert!(pane.selected_item().is_none());
    pane.select_next();
    assert_eq!(pane.selected, 0, "selection cannot move in an empty list");
}

#[test]
fn deletes_require_an_explicit_confirmation() {
    let mut pane: ListPane<Team, TournamentForm> = ListPane::default();
    pane.request_delete(7);
    assert_eq!(pane.pending_delete, Some(7));

    assert_eq!(pane.take_confirmed_delete(), Some(7));
    assert_eq!(pane.take_confirmed_delete(), None, "confirmation is consumed once");

    pane.request_delete(8);
    pane.cancel_delete();
    assert_eq!(pane.pending_delete, None);
}

#[test]
fn saved_closes_the_form_and_a_failure_leaves_it_open() {
    let mut state = AppState::new();
    state.screen = Screen::Tournaments;
    state.tournaments.open_form(TournamentForm::blank());

    apply_delta(
        &mut state,
        Delta::SaveFailed {
            pane: PaneKind::Tournaments,
            message: "name is required".to_string(),
        },
    );
    assert!(state.tournaments.form.is_some(), "a failed save keeps the editor open");
    assert_eq!(state.tournaments.error.as_deref(), Some("name is required"));

    apply_delta(&mut state, Delta::Saved(PaneKind::Tournaments));
    assert!(state.tournaments.form.is_none());
}

#[test]
fn detail_rows_keyed_to_another_parent_are_dropped() {
    let mut state = AppState::new();
    state.screen = Screen::TournamentDetail(1);

    apply_delta(
        &mut state,
        Delta::SetLeaderboard {
            tournament_id: 2,
            rows: vec![entry(1, "Lions", 3)],
        },
    );
    assert!(
        state.tournament_detail.leaderboard.items.is_empty(),
        "rows for a tournament the user already left are ignored"
    );

    apply_delta(
        &mut state,
        Delta::SetLeaderboard {
            tournament_id: 1,
            rows: vec![entry(1, "Lions", 3)],
        },
    );
    assert_eq!(state.tournament_detail.leaderboard.items.len(), 1);

    state.screen = Screen::TeamDetail(4);
    apply_delta(
        &mut state,
        Delta::SetMembers {
            team_id: 9,
            rows: vec![member(1, Some("captain"))],
        },
    );
    assert!(state.team_detail.members.items.is_empty());

    apply_delta(
        &mut state,
        Delta::SetMembers {
            team_id: 4,
            rows: vec![member(1, Some("captain"))],
        },
    );
    assert_eq!(state.team_detail.members.items.len(), 1);
}

#[test]
fn leaderboard_rows_arrive_sorted_by_wins_then_name() {
    let mut state = AppState::new();
    state.screen = Screen::TournamentDetail(1);

    apply_delta(
        &mut state,
        Delta::SetLeaderboard {
            tournament_id: 1,
            rows: vec![
                entry(1, "Zebras", 2),
                entry(2, "Lions", 5),
                entry(3, "Antelopes", 2),
            ],
        },
    );
    let names: Vec<&str> = state
        .tournament_detail
        .leaderboard
        .items
        .iter()
        .map(|e| e.team_name.as_str())
        .collect();
    assert_eq!(names, vec!["Lions", "Antelopes", "Zebras"]);

    let mut rows = vec![entry(1, "B", 1), entry(2, "A", 1)];
    sort_leaderboard(&mut rows);
    assert_eq!(rows[0].team_name, "A", "equal wins fall back to the name");
}

#[test]
fn signing_in_lands_on_the_dashboard() {
    let mut state = AppState::new();
    assert_eq!(state.screen, Screen::Login);

    apply_delta(&mut state, Delta::SessionChanged(Some(admin())));
    assert!(state.session_checked);
    assert_eq!(state.screen, Screen::Dashboard);
    assert_eq!(state.user.as_ref().map(|u| u.username.as_str()), Some("admin"));
}

#[test]
fn logging_out_resets_everything_but_the_console() {
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SessionChanged(Some(admin())));
    state.screen = Screen::Teams;
    state.teams.set_items(vec![team(1, "Lions", None)]);
    state.push_log("[INFO] first");
    state.push_log("[INFO] second");

    apply_delta(&mut state, Delta::SessionChanged(None));
    assert_eq!(state.screen, Screen::Login);
    assert!(state.user.is_none());
    assert!(state.teams.items.is_empty());
    assert!(state.session_checked);
    assert_eq!(state.logs.len(), 2, "console history survives the reset");
}

#[test]
fn console_history_is_bounded() {
    let mut state = AppState::new();
    for i in 0..210 {
        state.push_log(format!("line {i}"));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("line 10"));
    assert_eq!(state.logs.back().map(String::as_str), Some("line 209"));
}

#[test]
fn candidate_filter_matches_name_and_email() {
    let candidates = vec![
        participant(1, "Alice", "Stone", "alice@club.example"),
        participant(2, "Bob", "Rivers", "bob@elsewhere.example"),
        participant(3, "Carol", "Stonebridge", "carol@club.example"),
    ];

    assert_eq!(filter_candidates(&candidates, "").len(), 3);
    assert_eq!(filter_candidates(&candidates, "  ").len(), 3);

    let stones: Vec<u64> = filter_candidates(&candidates, "STONE")
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(stones, vec![1, 3]);

    let club: Vec<u64> = filter_candidates(&candidates, "@club")
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(club, vec![1, 3]);

    assert!(filter_candidates(&candidates, "zzz").is_empty());
}

#[test]
fn teams_with_rostered_members_resist_deletion() {
    let blocked = team_delete_block(&team(1, "Lions", Some(3)));
    let message = blocked.expect("a populated roster should block deletion");
    assert!(message.contains("Lions"));
    assert!(message.contains("3 member(s)"));

    assert!(team_delete_block(&team(2, "Tigers", Some(0))).is_none());
    assert!(team_delete_block(&team(3, "Bears", None)).is_none());
}

#[test]
fn registration_stays_open_until_kickoff_and_fails_open() {
    let now = chrono::NaiveDate::from_ymd_opt(2026, 6, 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .expect("valid test clock");

    let future = tournament(1, "Cup", "2026-06-02T09:00:00", TournamentStatus::Upcoming);
    assert!(registration_open(&future, now));

    let started = tournament(2, "Cup", "2026-05-30T09:00:00", TournamentStatus::Ongoing);
    assert!(!registration_open(&started, now));

    let garbage = tournament(3, "Cup", "sometime next week", TournamentStatus::Upcoming);
    assert!(
        registration_open(&garbage, now),
        "an unreadable start date must not lock teams out"
    );
}

#[test]
fn distinct_roles_dedupe_and_sort() {
    let members = vec![
        member(1, Some("striker")),
        member(2, Some("keeper")),
        member(3, Some("striker")),
        member(4, None),
    ];
    assert_eq!(distinct_roles(&members), vec!["keeper", "striker"]);
    assert!(distinct_roles(&[]).is_empty());
}

#[test]
fn every_status_except_completed_counts_as_active() {
    let items = vec![
        tournament(1, "A", "2026-01-01", TournamentStatus::Upcoming),
        tournament(2, "B", "2026-01-01", TournamentStatus::Ongoing),
        tournament(3, "C", "2026-01-01", TournamentStatus::Completed),
        tournament(4, "D", "2026-01-01", TournamentStatus::Cancelled),
    ];
    assert_eq!(active_tournaments(&items), 3);
}
