use tourney_terminal::forms::{
    AuthTab, Form, LoginForm, MatchForm, MemberAddForm, MemberEditForm, RegistrationForm, SaveOp,
    SelectOption, TeamForm, TournamentForm, VenueForm,
};
use tourney_terminal::model::{
    Match, MatchStatus, Participant, Registration, RegistrationStatus, Team, TeamCategory,
    TeamMember, Tournament, TournamentStatus, Venue,
};
use tourney_terminal::state::filter_candidates;

fn team_options() -> Vec<SelectOption> {
    vec![
        SelectOption { id: 1, label: "Lions".to_string() },
        SelectOption { id: 2, label: "Tigers".to_string() },
    ]
}

fn venue_options() -> Vec<SelectOption> {
    vec![SelectOption { id: 3, label: "Main Hall".to_string() }]
}

fn sample_tournament() -> Tournament {
    Tournament {
        id: 5,
        name: "Spring Invitational".to_string(),
        sport_type: "football".to_string(),
        start_date: "2026-04-01T09:00:00".to_string(),
        end_date: "2026-04-14T18:00:00".to_string(),
        location: None,
        status: TournamentStatus::Upcoming,
        rules: Some("No late entries.".to_string()),
    }
}

fn sample_team(id: u64, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        category: TeamCategory::Amateur,
        member_count: None,
    }
}

fn sample_match() -> Match {
    Match {
        id: 40,
        tournament_id: 5,
        home_team: sample_team(1, "Lions"),
        away_team: sample_team(2, "Tigers"),
        venue: Venue { id: 3, name: "Main Hall".to_string(), address: None, capacity: None },
        scheduled_at: "2026-05-01T18:00".to_string(),
        status: MatchStatus::Scheduled,
        home_score: None,
        away_score: None,
    }
}

fn sample_participant(id: u64, first: &str, last: &str) -> Participant {
    Participant {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        category: TeamCategory::Amateur,
        created_at: None,
        updated_at: None,
        team_memberships: Vec::new(),
    }
}

fn type_into<F: Form>(form: &mut F, text: &str) {
    for c in text.chars() {
        form.insert_char(c);
    }
}

#[test]
fn tournament_form_validates_in_field_order() {
    let mut form = TournamentForm::blank();
    assert_eq!(form.save_op().unwrap_err().0, "name is required");

    form.name = "Cup".to_string();
    assert_eq!(form.save_op().unwrap_err().0, "sport type is required");

    form.sport_type = "football".to_string();
    assert_eq!(form.save_op().unwrap_err().0, "start date is required");

    form.start_date = "next tuesday".to_string();
    assert_eq!(
        form.save_op().unwrap_err().0,
        "start date is not a recognized date (try 2026-06-01T18:00)"
    );

    form.start_date = "2026-06-01T18:00".to_string();
    form.end_date = "2026-06-03".to_string();
    let op = form.save_op().expect("complete form should validate");
    match op {
        SaveOp::Create(draft) => {
            assert_eq!(draft.name, "Cup");
            assert!(draft.location.is_none(), "blank optional fields stay unset");
        }
        SaveOp::Update(..) => panic!("a blank form creates"),
    }
}

#[test]
fn tournament_edit_produces_a_full_update() {
    let tournament = sample_tournament();
    let form = TournamentForm::for_edit(&tournament);
    assert_eq!(form.editing_id, Some(5));

    match form.save_op().expect("prefilled form should validate") {
        SaveOp::Update(id, patch) => {
            assert_eq!(id, 5);
            assert_eq!(patch.name.as_deref(), Some("Spring Invitational"));
            assert_eq!(patch.status, Some(TournamentStatus::Upcoming));
            assert_eq!(patch.rules.as_deref(), Some("No late entries."));
            assert!(patch.location.is_none());
        }
        SaveOp::Create(_) => panic!("an edit updates"),
    }
}

#[test]
fn team_form_cycles_category_and_types_a_name() {
    let mut form = TeamForm::blank();
    type_into(&mut form, "Lions");
    form.next_field();
    form.cycle(1);
    assert_eq!(form.category, TeamCategory::Professional);
    form.cycle(1);
    form.cycle(1);
    assert_eq!(form.category, TeamCategory::Amateur, "cycling wraps around");
    form.cycle(-1);
    assert_eq!(form.category, TeamCategory::Youth);

    match form.save_op().expect("named team should validate") {
        SaveOp::Create(draft) => {
            assert_eq!(draft.name, "Lions");
            assert_eq!(draft.category, TeamCategory::Youth);
        }
        SaveOp::Update(..) => panic!("a blank form creates"),
    }
}

#[test]
fn match_form_reports_every_missing_field_at_once() {
    let form = MatchForm::blank(Vec::new(), Vec::new());
    assert_eq!(
        form.save_op().unwrap_err().0,
        "missing home team, away team, venue, kickoff time"
    );
}

#[test]
fn match_form_rejects_a_team_playing_itself() {
    let mut form = MatchForm::blank(team_options(), venue_options());
    form.home = Some(0);
    form.away = Some(0);
    form.venue = Some(0);
    form.scheduled_at = "2026-05-01T18:00".to_string();
    assert_eq!(form.save_op().unwrap_err().0, "home and away team must differ");

    form.away = Some(1);
    match form.save_op().expect("distinct pairing should validate") {
        SaveOp::Create(draft) => {
            assert_eq!(draft.home_team_id, 1);
            assert_eq!(draft.away_team_id, 2);
            assert_eq!(draft.venue_id, 3);
        }
        SaveOp::Update(..) => panic!("a blank form creates"),
    }
}

#[test]
fn match_form_locks_scores_on_create_and_the_pairing_on_edit() {
    let creating = MatchForm::blank(team_options(), venue_options());
    assert!(creating.locked(5) && creating.locked(6));
    assert!(!creating.locked(0));

    let mut editing = MatchForm::for_edit(&sample_match(), team_options(), venue_options());
    assert!(editing.locked(0) && editing.locked(1) && editing.locked(2));
    assert!(!editing.locked(5));
    assert_eq!(editing.home, Some(0), "the pairing is resolved against the options");
    assert_eq!(editing.away, Some(1));

    editing.focus = 0;
    editing.cycle(1);
    assert_eq!(editing.home, Some(0), "a locked selector does not move");

    editing.focus = 5;
    editing.insert_char('2');
    editing.focus = 6;
    editing.insert_char('x');
    editing.insert_char('1');
    editing.status = MatchStatus::Completed;

    match editing.save_op().expect("score update should validate") {
        SaveOp::Update(id, patch) => {
            assert_eq!(id, 40);
            assert!(patch.home_team_id.is_none(), "the pairing never travels on an edit");
            assert!(patch.away_team_id.is_none());
            assert!(patch.venue_id.is_none());
            assert_eq!(patch.home_score, Some(2));
            assert_eq!(patch.away_score, Some(1));
            assert_eq!(patch.status, Some(MatchStatus::Completed));
        }
        SaveOp::Create(_) => panic!("an edit updates"),
    }
}

#[test]
fn registration_edit_requires_a_backend_id_and_pins_the_team() {
    let orphan = Registration {
        id: None,
        team_id: 1,
        team: sample_team(1, "Lions"),
        tournament_id: 5,
        status: RegistrationStatus::Invited,
    };
    assert!(
        RegistrationForm::for_edit(&orphan, team_options()).is_none(),
        "rows without an id cannot be edited in place"
    );

    let registration = Registration { id: Some(77), ..orphan };
    let mut form = RegistrationForm::for_edit(&registration, team_options())
        .expect("a row with an id is editable");
    assert!(form.locked(0));

    form.focus = 0;
    form.cycle(1);
    assert_eq!(form.team, Some(0), "the team selector is pinned while editing");

    form.focus = 1;
    form.cycle(1);
    match form.save_op().expect("pinned team should validate") {
        SaveOp::Update(id, draft) => {
            assert_eq!(id, 77, "updates go by registration id, not team id");
            assert_eq!(draft.team_id, 1);
            assert_eq!(draft.status, RegistrationStatus::Registered);
        }
        SaveOp::Create(_) => panic!("an edit updates"),
    }
}

#[test]
fn blank_registration_form_needs_a_team() {
    let form = RegistrationForm::blank(Vec::new());
    assert_eq!(form.save_op().unwrap_err().0, "select a team");
}

#[test]
fn member_add_drafts_from_the_filtered_candidates() {
    let candidates = vec![
        sample_participant(5, "Alice", "Stone"),
        sample_participant(6, "Bob", "Rivers"),
    ];

    let mut form = MemberAddForm::blank();
    type_into(&mut form, "riv");
    form.selected = 9;
    form.role = "keeper".to_string();
    form.jersey = "10".to_string();

    let filtered = filter_candidates(&candidates, &form.query);
    assert_eq!(filtered.len(), 1);
    let draft = form.draft(&filtered).expect("one candidate should draft");
    assert_eq!(draft.participant_id, 6, "an out-of-range selection clamps to the list");
    assert_eq!(draft.role.as_deref(), Some("keeper"));
    assert_eq!(draft.jersey_number, Some(10));

    let none = filter_candidates(&candidates, "zzz");
    assert_eq!(form.draft(&none).unwrap_err().0, "no matching participant");
}

#[test]
fn typing_in_the_member_search_resets_the_selection() {
    let mut form = MemberAddForm::blank();
    form.focus = 1;
    form.cycle(1);
    form.cycle(1);
    assert_eq!(form.selected, 2);

    form.focus = 0;
    form.insert_char('a');
    assert_eq!(form.selected, 0, "narrowing the search restarts from the top");

    form.focus = 1;
    form.cycle(-1);
    form.cycle(-1);
    assert_eq!(form.selected, 0, "moving up saturates at the first candidate");
}

#[test]
fn member_edit_patches_role_and_jersey() {
    let member = TeamMember {
        id: 21,
        participant_id: 5,
        participant_name: "Alice Stone".to_string(),
        participant_email: "alice@example.com".to_string(),
        team_id: 3,
        team_name: "Lions".to_string(),
        role: Some("captain".to_string()),
        jersey_number: Some(7),
        added_at: "2026-02-01T10:00:00".to_string(),
    };
    let mut form = MemberEditForm::for_edit(&member);
    assert_eq!(form.member_id, 21);
    assert_eq!(form.role, "captain");
    assert_eq!(form.jersey, "7");

    form.role.clear();
    form.jersey = "12".to_string();
    let patch = form.patch().expect("digits should validate");
    assert!(patch.role.is_none(), "a cleared role is dropped, not sent empty");
    assert_eq!(patch.jersey_number, Some(12));

    form.jersey = "n/a".to_string();
    assert_eq!(form.patch().unwrap_err().0, "jersey number must be a number");
}

#[test]
fn login_form_switches_tabs_in_place() {
    let mut form = LoginForm::new();
    assert_eq!(form.field_count(), 3);

    form.error = Some("bad credentials".to_string());
    form.cycle(1);
    assert_eq!(form.tab, AuthTab::Register);
    assert_eq!(form.field_count(), 5);
    assert!(form.error.is_none(), "switching tabs clears the old error");

    form.reg_name = "Alice".to_string();
    form.reg_email = "alice".to_string();
    form.reg_password = "secret".to_string();
    assert_eq!(
        form.register_request().unwrap_err().0,
        "email does not look like an email"
    );

    form.reg_email = "alice@example.com".to_string();
    let request = form.register_request().expect("complete form should validate");
    assert_eq!(request.name, "Alice");

    form.cycle(1);
    assert_eq!(form.tab, AuthTab::Login);
    assert_eq!(
        form.login_request().unwrap_err().0,
        "email is required",
        "the two tabs keep separate fields"
    );
}

#[test]
fn focus_wraps_in_both_directions() {
    let mut form = VenueForm::blank();
    assert_eq!(form.focus(), 0);
    form.prev_field();
    assert_eq!(form.focus(), 2);
    form.next_field();
    assert_eq!(form.focus(), 0);
    form.next_field();
    form.next_field();
    form.next_field();
    assert_eq!(form.focus(), 0);
}

#[test]
fn venue_capacity_accepts_digits_only() {
    let mut form = VenueForm::blank();
    type_into(&mut form, "Main Hall");
    form.next_field();
    form.next_field();
    type_into(&mut form, "4a2");
    assert_eq!(form.capacity, "42");

    match form.save_op().expect("digits should validate") {
        SaveOp::Create(draft) => {
            assert_eq!(draft.name, "Main Hall");
            assert!(draft.address.is_none());
            assert_eq!(draft.capacity, Some(42));
        }
        SaveOp::Update(..) => panic!("a blank form creates"),
    }
}
