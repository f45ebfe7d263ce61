//! Shared state between the terminal UI and the background worker. The UI
//! mutates panes through the methods here and sends [`Command`]s; the worker
//! answers with [`Delta`]s that [`apply_delta`] folds back in.

use std::collections::VecDeque;

use chrono::NaiveDateTime;

use crate::forms::{
    LoginForm, MatchForm, MemberAddForm, MemberEditForm, ParticipantForm, RegistrationForm,
    SaveOp, TeamForm, TournamentForm, VenueForm,
};
use crate::model::{
    Id, LeaderboardEntry, LoginRequest, Match, MatchPatch, NewMatch, NewParticipant,
    NewRegistration, NewTeam, NewTeamMember, NewTournament, NewVenue, Participant,
    ParticipantPatch, RegisterRequest, Registration, Team, TeamMember, TeamMemberPatch, TeamPatch,
    Tournament, TournamentPatch, TournamentStatus, Venue, VenuePatch, starts_in_future,
};
use crate::session::SessionUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
    Tournaments,
    Teams,
    Participants,
    Venues,
    TournamentDetail(Id),
    TeamDetail(Id),
}

/// Which list a worker result or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneKind {
    Tournaments,
    Teams,
    Participants,
    Venues,
    Members,
    Candidates,
    Registrations,
    Matches,
    Leaderboard,
}

/// One scrollable list with its editor popup and delete confirmation.
#[derive(Debug, Clone)]
pub struct ListPane<E, F> {
    pub items: Vec<E>,
    pub selected: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub form: Option<F>,
    pub pending_delete: Option<Id>,
}

impl<E, F> Default for ListPane<E, F> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: 0,
            loading: false,
            error: None,
            form: None,
            pending_delete: None,
        }
    }
}

impl<E, F> ListPane<E, F> {
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// A successful load replaces rows wholesale and clears any stale error.
    pub fn set_items(&mut self, items: Vec<E>) {
        self.items = items;
        self.loading = false;
        self.error = None;
        if self.selected >= self.items.len() {
            self.selected = self.items.len().saturating_sub(1);
        }
    }

    /// Failures keep whatever rows were already on screen.
    pub fn set_error(&mut self, message: String) {
        self.loading = false;
        self.error = Some(message);
    }

    pub fn open_form(&mut self, form: F) {
        self.form = Some(form);
        self.error = None;
    }

    pub fn close_form(&mut self) {
        self.form = None;
    }

    pub fn form_saved(&mut self) {
        self.form = None;
    }

    pub fn request_delete(&mut self, id: Id) {
        self.pending_delete = Some(id);
    }

    pub fn take_confirmed_delete(&mut self) -> Option<Id> {
        self.pending_delete.take()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.selected = (self.selected + 1).min(self.items.len() - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_item(&self) -> Option<&E> {
        self.items.get(self.selected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailFocus {
    #[default]
    Registrations,
    Matches,
    Leaderboard,
}

impl DetailFocus {
    pub fn next(self) -> Self {
        match self {
            DetailFocus::Registrations => DetailFocus::Matches,
            DetailFocus::Matches => DetailFocus::Leaderboard,
            DetailFocus::Leaderboard => DetailFocus::Registrations,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailFocus::Registrations => "registrations",
            DetailFocus::Matches => "matches",
            DetailFocus::Leaderboard => "leaderboard",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TournamentDetailState {
    pub tournament: Option<Tournament>,
    pub focus: DetailFocus,
    pub registrations: ListPane<Registration, RegistrationForm>,
    pub matches: ListPane<Match, MatchForm>,
    pub leaderboard: ListPane<LeaderboardEntry, ()>,
}

/// The roster popup is either adding a participant or editing an existing
/// member's role and jersey.
#[derive(Debug, Clone)]
pub enum MemberForm {
    Add(MemberAddForm),
    Edit(MemberEditForm),
}

#[derive(Debug, Clone, Default)]
pub struct TeamDetailState {
    pub team: Option<Team>,
    pub members: ListPane<TeamMember, MemberForm>,
    pub candidates: Vec<Participant>,
    pub role_filter: Option<String>,
}

/// Overlay on the participants screen listing one participant's teams, with
/// its own two-step removal.
#[derive(Debug, Clone)]
pub struct MembershipView {
    pub participant_id: Id,
    pub selected: usize,
    pub pending_remove: Option<Id>,
}

pub struct AppState {
    pub screen: Screen,
    pub user: Option<SessionUser>,
    pub session_checked: bool,
    pub login: LoginForm,
    pub tournaments: ListPane<Tournament, TournamentForm>,
    pub teams: ListPane<Team, TeamForm>,
    pub participants: ListPane<Participant, ParticipantForm>,
    pub venues: ListPane<Venue, VenueForm>,
    pub tournament_detail: TournamentDetailState,
    pub team_detail: TeamDetailState,
    pub membership_view: Option<MembershipView>,
    pub logs: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Login,
            user: None,
            session_checked: false,
            login: LoginForm::new(),
            tournaments: ListPane::default(),
            teams: ListPane::default(),
            participants: ListPane::default(),
            venues: ListPane::default(),
            tournament_detail: TournamentDetailState::default(),
            team_detail: TeamDetailState::default(),
            membership_view: None,
            logs: VecDeque::with_capacity(200),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

/// UI to worker. Every variant maps to one or more HTTP calls.
#[derive(Debug)]
pub enum Command {
    RestoreSession,
    Login(LoginRequest),
    Register(RegisterRequest),
    Logout,
    LoadTournaments,
    SaveTournament(SaveOp<NewTournament, TournamentPatch>),
    DeleteTournament(Id),
    LoadTeams,
    SaveTeam(SaveOp<NewTeam, TeamPatch>),
    DeleteTeam(Id),
    LoadParticipants,
    SaveParticipant(SaveOp<NewParticipant, ParticipantPatch>),
    DeleteParticipant(Id),
    LoadVenues,
    SaveVenue(SaveOp<NewVenue, VenuePatch>),
    DeleteVenue(Id),
    OpenTournament(Id),
    LoadRegistrations(Id),
    SaveRegistration {
        tournament_id: Id,
        op: SaveOp<NewRegistration, NewRegistration>,
    },
    WithdrawRegistration {
        tournament_id: Id,
        team_id: Id,
    },
    LoadMatches(Id),
    SaveMatch {
        tournament_id: Id,
        op: SaveOp<NewMatch, MatchPatch>,
    },
    DeleteMatch {
        tournament_id: Id,
        match_id: Id,
    },
    LoadLeaderboard(Id),
    OpenTeam(Id),
    LoadMembers {
        team_id: Id,
        role: Option<String>,
    },
    AddMember {
        team_id: Id,
        draft: NewTeamMember,
    },
    UpdateMember {
        team_id: Id,
        member_id: Id,
        patch: TeamMemberPatch,
    },
    RemoveMember {
        team_id: Id,
        member_id: Id,
    },
    RemoveMembership {
        participant_id: Id,
        team_id: Id,
    },
    LoadCandidates(Id),
}

/// Worker to UI. Detail payloads carry their parent id so answers for a
/// screen the user already left are dropped.
#[derive(Debug)]
pub enum Delta {
    SessionChanged(Option<SessionUser>),
    LoginFailed(String),
    RegisterOk(String),
    RegisterFailed(String),
    SetTournaments(Vec<Tournament>),
    SetTeams(Vec<Team>),
    SetParticipants(Vec<Participant>),
    SetVenues(Vec<Venue>),
    SetTournament(Tournament),
    SetTeam(Team),
    SetRegistrations {
        tournament_id: Id,
        rows: Vec<Registration>,
    },
    SetMatches {
        tournament_id: Id,
        rows: Vec<Match>,
    },
    SetLeaderboard {
        tournament_id: Id,
        rows: Vec<LeaderboardEntry>,
    },
    SetMembers {
        team_id: Id,
        rows: Vec<TeamMember>,
    },
    SetCandidates {
        team_id: Id,
        rows: Vec<Participant>,
    },
    Saved(PaneKind),
    SaveFailed {
        pane: PaneKind,
        message: String,
    },
    LoadFailed {
        pane: PaneKind,
        message: String,
    },
    DeleteFailed {
        pane: PaneKind,
        message: String,
    },
    Log(String),
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SessionChanged(user) => {
            state.session_checked = true;
            match user {
                Some(user) => {
                    state.user = Some(user);
                    state.login = LoginForm::new();
                    if state.screen == Screen::Login {
                        state.screen = Screen::Dashboard;
                    }
                }
                None => {
                    // Logged out: drop everything except the console history.
                    if state.user.is_some() || state.screen != Screen::Login {
                        let logs = std::mem::take(&mut state.logs);
                        *state = AppState::new();
                        state.session_checked = true;
                        state.logs = logs;
                    }
                }
            }
        }
        Delta::LoginFailed(message) => {
            state.login.busy = false;
            state.login.error = Some(message);
        }
        Delta::RegisterOk(message) => {
            state.login.busy = false;
            state.login.error = None;
            state.login.notice = Some(message);
        }
        Delta::RegisterFailed(message) => {
            state.login.busy = false;
            state.login.error = Some(message);
        }
        Delta::SetTournaments(rows) => state.tournaments.set_items(rows),
        Delta::SetTeams(rows) => state.teams.set_items(rows),
        Delta::SetParticipants(rows) => state.participants.set_items(rows),
        Delta::SetVenues(rows) => state.venues.set_items(rows),
        Delta::SetTournament(tournament) => {
            if let Some(row) = state
                .tournaments
                .items
                .iter_mut()
                .find(|t| t.id == tournament.id)
            {
                *row = tournament.clone();
            }
            if state.screen == Screen::TournamentDetail(tournament.id) {
                state.tournament_detail.tournament = Some(tournament);
            }
        }
        Delta::SetTeam(team) => {
            if let Some(row) = state.teams.items.iter_mut().find(|t| t.id == team.id) {
                *row = team.clone();
            }
            if state.screen == Screen::TeamDetail(team.id) {
                state.team_detail.team = Some(team);
            }
        }
        Delta::SetRegistrations {
            tournament_id,
            rows,
        } => {
            if state.screen == Screen::TournamentDetail(tournament_id) {
                state.tournament_detail.registrations.set_items(rows);
            }
        }
        Delta::SetMatches {
            tournament_id,
            rows,
        } => {
            if state.screen == Screen::TournamentDetail(tournament_id) {
                state.tournament_detail.matches.set_items(rows);
            }
        }
        Delta::SetLeaderboard {
            tournament_id,
            mut rows,
        } => {
            if state.screen == Screen::TournamentDetail(tournament_id) {
                sort_leaderboard(&mut rows);
                state.tournament_detail.leaderboard.set_items(rows);
            }
        }
        Delta::SetMembers { team_id, rows } => {
            if state.screen == Screen::TeamDetail(team_id) {
                state.team_detail.members.set_items(rows);
            }
        }
        Delta::SetCandidates { team_id, rows } => {
            if state.screen == Screen::TeamDetail(team_id) {
                state.team_detail.candidates = rows;
            }
        }
        Delta::Saved(pane) => match pane {
            PaneKind::Tournaments => state.tournaments.form_saved(),
            PaneKind::Teams => state.teams.form_saved(),
            PaneKind::Participants => state.participants.form_saved(),
            PaneKind::Venues => state.venues.form_saved(),
            PaneKind::Registrations => state.tournament_detail.registrations.form_saved(),
            PaneKind::Matches => state.tournament_detail.matches.form_saved(),
            PaneKind::Members | PaneKind::Candidates => state.team_detail.members.form_saved(),
            PaneKind::Leaderboard => {}
        },
        // A failed save leaves the form open with the message next to it.
        Delta::SaveFailed { pane, message }
        | Delta::LoadFailed { pane, message }
        | Delta::DeleteFailed { pane, message } => pane_set_error(state, pane, message),
        Delta::Log(msg) => state.push_log(msg),
    }
}

fn pane_set_error(state: &mut AppState, pane: PaneKind, message: String) {
    match pane {
        PaneKind::Tournaments => state.tournaments.set_error(message),
        PaneKind::Teams => state.teams.set_error(message),
        PaneKind::Participants => state.participants.set_error(message),
        PaneKind::Venues => state.venues.set_error(message),
        PaneKind::Registrations => state.tournament_detail.registrations.set_error(message),
        PaneKind::Matches => state.tournament_detail.matches.set_error(message),
        PaneKind::Leaderboard => state.tournament_detail.leaderboard.set_error(message),
        PaneKind::Members | PaneKind::Candidates => state.team_detail.members.set_error(message),
    }
}

pub fn filter_candidates<'a>(candidates: &'a [Participant], query: &str) -> Vec<&'a Participant> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return candidates.iter().collect();
    }
    candidates
        .iter()
        .filter(|p| {
            p.first_name.to_lowercase().contains(&needle)
                || p.last_name.to_lowercase().contains(&needle)
                || p.email.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Standings order: wins descending, name as the tiebreak.
pub fn sort_leaderboard(rows: &mut [LeaderboardEntry]) {
    rows.sort_by(|a, b| b.wins.cmp(&a.wins).then_with(|| a.team_name.cmp(&b.team_name)));
}

/// Teams with members on the roster cannot be deleted. The backend would
/// refuse anyway; checking here spares the round trip.
pub fn team_delete_block(team: &Team) -> Option<String> {
    match team.member_count {
        Some(count) if count > 0 => Some(format!(
            "{} still has {count} member(s); remove them first",
            team.name
        )),
        _ => None,
    }
}

pub fn distinct_roles(members: &[TeamMember]) -> Vec<String> {
    let mut roles: Vec<String> = members.iter().filter_map(|m| m.role.clone()).collect();
    roles.sort();
    roles.dedup();
    roles
}

/// Teams can register until the tournament has started.
pub fn registration_open(tournament: &Tournament, now: NaiveDateTime) -> bool {
    starts_in_future(&tournament.start_date, now)
}

pub fn active_tournaments(items: &[Tournament]) -> usize {
    items
        .iter()
        .filter(|t| t.status != TournamentStatus::Completed)
        .count()
}
