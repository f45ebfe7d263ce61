use std::cell::{Cell, RefCell};

use tourney_terminal::api::ResourceApi;
use tourney_terminal::forms::SaveOp;
use tourney_terminal::http::{ApiError, ErrorKind};
use tourney_terminal::model::{
    Id, Match, MatchPatch, MatchStatus, NewMatch, NewTeam, Team, TeamCategory, TeamPatch, Venue,
};
use tourney_terminal::worker::{delete_and_reload, save_and_reload};

fn not_found() -> ApiError {
    ApiError::Http {
        status: 404,
        kind: Some(ErrorKind::NotFound),
        message: None,
    }
}

fn team(id: Id, name: &str) -> Team {
    Team {
        id,
        name: name.to_string(),
        category: TeamCategory::Amateur,
        member_count: Some(0),
    }
}

/// In-memory stand-in for the teams endpoint, counting list calls so the
/// mutate-then-reload order is observable.
struct FakeTeams {
    rows: RefCell<Vec<Team>>,
    next_id: Cell<Id>,
    list_calls: Cell<usize>,
}

impl FakeTeams {
    fn new(seed: Vec<Team>) -> Self {
        let next_id = seed.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            rows: RefCell::new(seed),
            next_id: Cell::new(next_id),
            list_calls: Cell::new(0),
        }
    }
}

impl ResourceApi for FakeTeams {
    type Entity = Team;
    type Create = NewTeam;
    type Patch = TeamPatch;

    fn list(&self) -> Result<Vec<Team>, ApiError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self.rows.borrow().clone())
    }

    fn get(&self, id: Id) -> Result<Team, ApiError> {
        self.rows
            .borrow()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    fn create(&self, draft: &NewTeam) -> Result<Team, ApiError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let row = Team {
            id,
            name: draft.name.clone(),
            category: draft.category,
            member_count: Some(0),
        };
        self.rows.borrow_mut().push(row.clone());
        Ok(row)
    }

    fn update(&self, id: Id, patch: &TeamPatch) -> Result<Team, ApiError> {
        let mut rows = self.rows.borrow_mut();
        let row = rows.iter_mut().find(|t| t.id == id).ok_or_else(not_found)?;
        if let Some(name) = &patch.name {
            row.name = name.clone();
        }
        if let Some(category) = patch.category {
            row.category = category;
        }
        Ok(row.clone())
    }

    fn delete(&self, id: Id) -> Result<(), ApiError> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|t| t.id != id);
        if rows.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

/// Fixture-backed matches endpoint; creates resolve team and venue ids the
/// way the backend would.
struct FakeMatches {
    teams: Vec<Team>,
    venue: Venue,
    rows: RefCell<Vec<Match>>,
    next_id: Cell<Id>,
}

impl FakeMatches {
    fn new(teams: Vec<Team>) -> Self {
        Self {
            teams,
            venue: Venue {
                id: 3,
                name: "Main Hall".to_string(),
                address: None,
                capacity: None,
            },
            rows: RefCell::new(Vec::new()),
            next_id: Cell::new(100),
        }
    }

    fn team(&self, id: Id) -> Team {
        self.teams
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .expect("fixture team id")
    }
}

impl ResourceApi for FakeMatches {
    type Entity = Match;
    type Create = NewMatch;
    type Patch = MatchPatch;

    fn list(&self) -> Result<Vec<Match>, ApiError> {
        Ok(self.rows.borrow().clone())
    }

    fn get(&self, id: Id) -> Result<Match, ApiError> {
        self.rows
            .borrow()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    fn create(&self, draft: &NewMatch) -> Result<Match, ApiError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let row = Match {
            id,
            tournament_id: 5,
            home_team: self.team(draft.home_team_id),
            away_team: self.team(draft.away_team_id),
            venue: self.venue.clone(),
            scheduled_at: draft.scheduled_at.clone(),
            status: draft.status,
            home_score: None,
            away_score: None,
        };
        self.rows.borrow_mut().push(row.clone());
        Ok(row)
    }

    fn update(&self, id: Id, patch: &MatchPatch) -> Result<Match, ApiError> {
        let mut rows = self.rows.borrow_mut();
        let row = rows.iter_mut().find(|m| m.id == id).ok_or_else(not_found)?;
        if let Some(when) = &patch.scheduled_at {
            row.scheduled_at = when.clone();
        }
        if let Some(status) = patch.status {
            row.status = status;
        }
        if let Some(score) = patch.home_score {
            row.home_score = Some(score);
        }
        if let Some(score) = patch.away_score {
            row.away_score = Some(score);
        }
        Ok(row.clone())
    }

    fn delete(&self, id: Id) -> Result<(), ApiError> {
        let mut rows = self.rows.borrow_mut();
        let before = rows.len();
        rows.retain(|m| m.id != id);
        if rows.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}

#[test]
fn creating_returns_the_saved_row_and_a_fresh_list() {
    let api = FakeTeams::new(vec![team(1, "Lions")]);
    let draft = NewTeam {
        name: "Tigers".to_string(),
        category: TeamCategory::Professional,
    };

    let (saved, rows) =
        save_and_reload(&api, SaveOp::Create(draft)).expect("create should succeed");
    assert_eq!(saved.id, 2, "the fake assigns the next id");
    assert_eq!(saved.name, "Tigers");
    assert_eq!(rows.len(), 2, "the reloaded list already contains the new row");
    assert!(rows.iter().any(|t| t.id == saved.id));
    assert_eq!(api.list_calls.get(), 1);
}

#[test]
fn updating_edits_the_row_in_place() {
    let api = FakeTeams::new(vec![team(1, "Lions"), team(2, "Tigers")]);
    let patch = TeamPatch {
        name: Some("Lions FC".to_string()),
        category: None,
    };

    let (saved, rows) =
        save_and_reload(&api, SaveOp::Update(1, patch)).expect("update should succeed");
    assert_eq!(saved.name, "Lions FC");
    assert_eq!(saved.category, TeamCategory::Amateur, "unset patch fields keep their value");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Lions FC");
}

#[test]
fn deleting_refreshes_the_list() {
    let api = FakeTeams::new(vec![team(1, "Lions"), team(2, "Tigers")]);
    let rows = delete_and_reload(&api, 1).expect("delete should succeed");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, 2);
}

#[test]
fn a_failed_delete_skips_the_reload() {
    let api = FakeTeams::new(vec![team(1, "Lions")]);
    let err = delete_and_reload(&api, 99).expect_err("unknown id should fail");
    assert!(err.is_not_found());
    assert_eq!(api.list_calls.get(), 0, "no reload after a failed mutation");
    assert_eq!(api.rows.borrow().len(), 1);
}

#[test]
fn a_match_reaches_its_final_score() {
    let api = FakeMatches::new(vec![team(1, "Lions"), team(2, "Tigers")]);

    let draft = NewMatch {
        home_team_id: 1,
        away_team_id: 2,
        venue_id: 3,
        scheduled_at: "2026-05-01T18:00".to_string(),
        status: MatchStatus::Scheduled,
    };
    let (created, rows) =
        save_and_reload(&api, SaveOp::Create(draft)).expect("create should succeed");
    assert_eq!(created.home_team.name, "Lions");
    assert_eq!(created.status, MatchStatus::Scheduled);
    assert!(created.home_score.is_none());
    assert_eq!(rows.len(), 1);

    let patch = MatchPatch {
        status: Some(MatchStatus::Completed),
        home_score: Some(2),
        away_score: Some(1),
        ..MatchPatch::default()
    };
    let (finished, rows) =
        save_and_reload(&api, SaveOp::Update(created.id, patch)).expect("update should succeed");
    assert_eq!(finished.status, MatchStatus::Completed);
    assert_eq!(finished.home_score, Some(2));
    assert_eq!(finished.away_score, Some(1));
    assert_eq!(rows.len(), 1, "the rescored match replaces the scheduled one");
    assert_eq!(rows[0].status, MatchStatus::Completed);
}
