use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

mod api;
mod config;
mod forms;
mod http;
mod model;
mod session;
mod state;
mod worker;

use crate::config::Config;
use crate::forms::{
    AuthTab, Form, MatchForm, MemberAddForm, MemberEditForm, ParticipantForm, RegistrationForm,
    SelectOption, TeamForm, TournamentForm, VenueForm,
};
use crate::model::{
    format_datetime, Id, LeaderboardEntry, Match, Registration, Team, Tournament,
};
use crate::session::SessionStore;
use crate::state::{
    active_tournaments, apply_delta, distinct_roles, filter_candidates, registration_open,
    team_delete_block, AppState, Command, Delta, DetailFocus, MemberForm, MembershipView, Screen,
    TeamDetailState, TournamentDetailState,
};

enum FormAction {
    None,
    Submit,
    Cancel,
}

fn form_key<F: Form>(form: &mut F, key: KeyEvent) -> FormAction {
    match key.code {
        KeyCode::Esc => FormAction::Cancel,
        KeyCode::Enter => FormAction::Submit,
        KeyCode::Tab | KeyCode::Down => {
            form.next_field();
            FormAction::None
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.prev_field();
            FormAction::None
        }
        KeyCode::Left => {
            form.cycle(-1);
            FormAction::None
        }
        KeyCode::Right => {
            form.cycle(1);
            FormAction::None
        }
        KeyCode::Backspace => {
            form.backspace();
            FormAction::None
        }
        KeyCode::Char(c) => {
            form.insert_char(c);
            FormAction::None
        }
        _ => FormAction::None,
    }
}

struct App {
    state: AppState,
    should_quit: bool,
    help_overlay: bool,
    bootstrapped: bool,
    cmd_tx: Option<mpsc::Sender<Command>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<Command>>) -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
            help_overlay: false,
            bootstrapped: false,
            cmd_tx,
        }
    }

    fn send(&mut self, command: Command) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[WARN] Background worker unavailable");
            return;
        };
        if tx.send(command).is_err() {
            self.state.push_log("[WARN] Background worker unavailable");
        }
    }

    /// Kick off the first round of loads once a session is in place.
    fn maybe_bootstrap(&mut self) {
        if self.state.user.is_some() {
            if !self.bootstrapped {
                self.bootstrapped = true;
                self.reload_all();
            }
        } else {
            self.bootstrapped = false;
        }
    }

    fn reload_all(&mut self) {
        self.state.tournaments.begin_load();
        self.state.teams.begin_load();
        self.state.participants.begin_load();
        self.state.venues.begin_load();
        self.send(Command::LoadTournaments);
        self.send(Command::LoadTeams);
        self.send(Command::LoadParticipants);
        self.send(Command::LoadVenues);
    }

    fn team_options(&self) -> Vec<SelectOption> {
        self.state
            .teams
            .items
            .iter()
            .map(|t| SelectOption {
                id: t.id,
                label: t.name.clone(),
            })
            .collect()
    }

    fn venue_options(&self) -> Vec<SelectOption> {
        self.state
            .venues
            .items
            .iter()
            .map(|v| SelectOption {
                id: v.id,
                label: v.name.clone(),
            })
            .collect()
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.screen == Screen::Login {
            self.on_login_key(key);
            return;
        }
        if self.form_open() {
            self.on_form_key(key);
            return;
        }
        if self.state.membership_view.is_some() {
            self.on_membership_key(key);
            return;
        }
        if self.confirm_pending() {
            self.on_confirm_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('?') => {
                self.help_overlay = !self.help_overlay;
                return;
            }
            KeyCode::Char('L') => {
                self.send(Command::Logout);
                return;
            }
            KeyCode::Char('1') => {
                self.state.screen = Screen::Dashboard;
                return;
            }
            KeyCode::Char('2') => {
                self.state.screen = Screen::Tournaments;
                return;
            }
            KeyCode::Char('3') => {
                self.state.screen = Screen::Teams;
                return;
            }
            KeyCode::Char('4') => {
                self.state.screen = Screen::Participants;
                return;
            }
            KeyCode::Char('5') => {
                self.state.screen = Screen::Venues;
                return;
            }
            _ => {}
        }
        match self.state.screen {
            Screen::Dashboard => self.on_dashboard_key(key),
            Screen::Tournaments => self.on_tournaments_key(key),
            Screen::Teams => self.on_teams_key(key),
            Screen::Participants => self.on_participants_key(key),
            Screen::Venues => self.on_venues_key(key),
            Screen::TournamentDetail(id) => self.on_tournament_detail_key(id, key),
            Screen::TeamDetail(id) => self.on_team_detail_key(id, key),
            Screen::Login => {}
        }
    }

    fn form_open(&self) -> bool {
        match self.state.screen {
            Screen::Tournaments => self.state.tournaments.form.is_some(),
            Screen::Teams => self.state.teams.form.is_some(),
            Screen::Participants => self.state.participants.form.is_some(),
            Screen::Venues => self.state.venues.form.is_some(),
            Screen::TournamentDetail(_) => {
                self.state.tournament_detail.registrations.form.is_some()
                    || self.state.tournament_detail.matches.form.is_some()
            }
            Screen::TeamDetail(_) => self.state.team_detail.members.form.is_some(),
            _ => false,
        }
    }

    fn confirm_pending(&self) -> bool {
        match self.state.screen {
            Screen::Tournaments => self.state.tournaments.pending_delete.is_some(),
            Screen::Teams => self.state.teams.pending_delete.is_some(),
            Screen::Participants => self.state.participants.pending_delete.is_some(),
            Screen::Venues => self.state.venues.pending_delete.is_some(),
            Screen::TournamentDetail(_) => {
                self.state.tournament_detail.registrations.pending_delete.is_some()
                    || self.state.tournament_detail.matches.pending_delete.is_some()
            }
            Screen::TeamDetail(_) => self.state.team_detail.members.pending_delete.is_some(),
            _ => false,
        }
    }

    fn on_login_key(&mut self, key: KeyEvent) {
        if self.state.login.busy {
            if key.code == KeyCode::Esc {
                self.should_quit = true;
            }
            return;
        }
        match form_key(&mut self.state.login, key) {
            FormAction::Cancel => self.should_quit = true,
            FormAction::Submit => self.submit_login(),
            FormAction::None => {}
        }
    }

    fn submit_login(&mut self) {
        match self.state.login.tab {
            AuthTab::Login => {
                let request = self.state.login.login_request();
                match request {
                    Ok(request) => {
                        self.state.login.busy = true;
                        self.state.login.error = None;
                        self.state.login.notice = None;
                        self.send(Command::Login(request));
                    }
                    Err(err) => self.state.login.error = Some(err.0),
                }
            }
            AuthTab::Register => {
                let request = self.state.login.register_request();
                match request {
                    Ok(request) => {
                        self.state.login.busy = true;
                        self.state.login.error = None;
                        self.state.login.notice = None;
                        self.send(Command::Register(request));
                    }
                    Err(err) => self.state.login.error = Some(err.0),
                }
            }
        }
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('r') {
            self.reload_all();
        }
    }

    fn on_tournaments_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.tournaments.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.tournaments.select_prev(),
            KeyCode::Char('r') => {
                self.state.tournaments.begin_load();
                self.send(Command::LoadTournaments);
            }
            KeyCode::Char('a') => self.state.tournaments.open_form(TournamentForm::blank()),
            KeyCode::Char('e') => {
                let form = self.state.tournaments.selected_item().map(TournamentForm::for_edit);
                if let Some(form) = form {
                    self.state.tournaments.open_form(form);
                }
            }
            KeyCode::Char('d') => {
                let id = self.state.tournaments.selected_item().map(|t| t.id);
                if let Some(id) = id {
                    self.state.tournaments.request_delete(id);
                }
            }
            KeyCode::Enter => {
                let selected = self.state.tournaments.selected_item().cloned();
                if let Some(tournament) = selected {
                    self.open_tournament(tournament);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Dashboard,
            _ => {}
        }
    }

    fn open_tournament(&mut self, tournament: Tournament) {
        let id = tournament.id;
        self.state.screen = Screen::TournamentDetail(id);
        self.state.tournament_detail = TournamentDetailState::default();
        self.state.tournament_detail.tournament = Some(tournament);
        self.state.tournament_detail.registrations.begin_load();
        self.state.tournament_detail.matches.begin_load();
        self.state.tournament_detail.leaderboard.begin_load();
        self.send(Command::OpenTournament(id));
    }

    fn on_teams_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.teams.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.teams.select_prev(),
            KeyCode::Char('r') => {
                self.state.teams.begin_load();
                self.send(Command::LoadTeams);
            }
            KeyCode::Char('a') => self.state.teams.open_form(TeamForm::blank()),
            KeyCode::Char('e') => {
                let form = self.state.teams.selected_item().map(TeamForm::for_edit);
                if let Some(form) = form {
                    self.state.teams.open_form(form);
                }
            }
            KeyCode::Char('d') => {
                let check = self.state.teams.selected_item().map(|t| (t.id, team_delete_block(t)));
                match check {
                    Some((_, Some(reason))) => self.state.teams.set_error(reason),
                    Some((id, None)) => self.state.teams.request_delete(id),
                    None => {}
                }
            }
            KeyCode::Enter => {
                let selected = self.state.teams.selected_item().cloned();
                if let Some(team) = selected {
                    self.open_team(team);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Dashboard,
            _ => {}
        }
    }

    fn open_team(&mut self, team: Team) {
        let id = team.id;
        self.state.screen = Screen::TeamDetail(id);
        self.state.team_detail = TeamDetailState::default();
        self.state.team_detail.team = Some(team);
        self.state.team_detail.members.begin_load();
        self.send(Command::OpenTeam(id));
    }

    fn on_participants_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.participants.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.participants.select_prev(),
            KeyCode::Char('r') => {
                self.state.participants.begin_load();
                self.send(Command::LoadParticipants);
            }
            KeyCode::Char('a') => self.state.participants.open_form(ParticipantForm::blank()),
            KeyCode::Char('e') => {
                let form = self.state.participants.selected_item().map(ParticipantForm::for_edit);
                if let Some(form) = form {
                    self.state.participants.open_form(form);
                }
            }
            KeyCode::Char('d') => {
                let id = self.state.participants.selected_item().map(|p| p.id);
                if let Some(id) = id {
                    self.state.participants.request_delete(id);
                }
            }
            KeyCode::Enter => {
                let id = self.state.participants.selected_item().map(|p| p.id);
                if let Some(participant_id) = id {
                    self.state.membership_view = Some(MembershipView {
                        participant_id,
                        selected: 0,
                        pending_remove: None,
                    });
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Dashboard,
            _ => {}
        }
    }

    fn on_venues_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.venues.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.venues.select_prev(),
            KeyCode::Char('r') => {
                self.state.venues.begin_load();
                self.send(Command::LoadVenues);
            }
            KeyCode::Char('a') => self.state.venues.open_form(VenueForm::blank()),
            KeyCode::Char('e') => {
                let form = self.state.venues.selected_item().map(VenueForm::for_edit);
                if let Some(form) = form {
                    self.state.venues.open_form(form);
                }
            }
            KeyCode::Char('d') => {
                let id = self.state.venues.selected_item().map(|v| v.id);
                if let Some(id) = id {
                    self.state.venues.request_delete(id);
                }
            }
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Dashboard,
            _ => {}
        }
    }

    fn on_tournament_detail_key(&mut self, id: Id, key: KeyEvent) {
        match key.code {
            KeyCode::Tab => {
                self.state.tournament_detail.focus = self.state.tournament_detail.focus.next();
            }
            KeyCode::Char('j') | KeyCode::Down => match self.state.tournament_detail.focus {
                DetailFocus::Registrations => self.state.tournament_detail.registrations.select_next(),
                DetailFocus::Matches => self.state.tournament_detail.matches.select_next(),
                DetailFocus::Leaderboard => self.state.tournament_detail.leaderboard.select_next(),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.state.tournament_detail.focus {
                DetailFocus::Registrations => self.state.tournament_detail.registrations.select_prev(),
                DetailFocus::Matches => self.state.tournament_detail.matches.select_prev(),
                DetailFocus::Leaderboard => self.state.tournament_detail.leaderboard.select_prev(),
            },
            KeyCode::Char('r') => match self.state.tournament_detail.focus {
                DetailFocus::Registrations => {
                    self.state.tournament_detail.registrations.begin_load();
                    self.send(Command::LoadRegistrations(id));
                }
                DetailFocus::Matches => {
                    self.state.tournament_detail.matches.begin_load();
                    self.send(Command::LoadMatches(id));
                }
                DetailFocus::Leaderboard => {
                    self.state.tournament_detail.leaderboard.begin_load();
                    self.send(Command::LoadLeaderboard(id));
                }
            },
            KeyCode::Char('a') => match self.state.tournament_detail.focus {
                DetailFocus::Registrations => self.open_registration_form(),
                DetailFocus::Matches => {
                    let form = MatchForm::blank(self.team_options(), self.venue_options());
                    self.state.tournament_detail.matches.open_form(form);
                }
                DetailFocus::Leaderboard => {}
            },
            KeyCode::Char('e') => match self.state.tournament_detail.focus {
                DetailFocus::Registrations => self.edit_registration(),
                DetailFocus::Matches => {
                    let team_options = self.team_options();
                    let venue_options = self.venue_options();
                    let form = self
                        .state
                        .tournament_detail
                        .matches
                        .selected_item()
                        .map(|m| MatchForm::for_edit(m, team_options, venue_options));
                    if let Some(form) = form {
                        self.state.tournament_detail.matches.open_form(form);
                    }
                }
                DetailFocus::Leaderboard => {}
            },
            KeyCode::Char('d') => match self.state.tournament_detail.focus {
                DetailFocus::Registrations => {
                    // Withdrawal goes by team id, so that is what the confirmation holds.
                    let team_id = self
                        .state
                        .tournament_detail
                        .registrations
                        .selected_item()
                        .map(|r| r.team_id);
                    if let Some(team_id) = team_id {
                        self.state.tournament_detail.registrations.request_delete(team_id);
                    }
                }
                DetailFocus::Matches => {
                    let match_id = self.state.tournament_detail.matches.selected_item().map(|m| m.id);
                    if let Some(match_id) = match_id {
                        self.state.tournament_detail.matches.request_delete(match_id);
                    }
                }
                DetailFocus::Leaderboard => {}
            },
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Tournaments,
            _ => {}
        }
    }

    fn open_registration_form(&mut self) {
        let Some(tournament) = self.state.tournament_detail.tournament.clone() else {
            return;
        };
        if !registration_open(&tournament, Utc::now().naive_utc()) {
            self.state.tournament_detail.registrations.set_error(format!(
                "registration for {} is closed; it has already started",
                tournament.name
            ));
            return;
        }
        let form = RegistrationForm::blank(self.team_options());
        self.state.tournament_detail.registrations.open_form(form);
    }

    fn edit_registration(&mut self) {
        let options = self.team_options();
        let form = self
            .state
            .tournament_detail
            .registrations
            .selected_item()
            .and_then(|r| RegistrationForm::for_edit(r, options));
        match form {
            Some(form) => self.state.tournament_detail.registrations.open_form(form),
            None => {
                if self.state.tournament_detail.registrations.selected_item().is_some() {
                    self.state
                        .tournament_detail
                        .registrations
                        .set_error("this registration has no id and cannot be edited".to_string());
                }
            }
        }
    }

    fn on_team_detail_key(&mut self, id: Id, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.state.team_detail.members.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.team_detail.members.select_prev(),
            KeyCode::Char('r') => {
                let role = self.state.team_detail.role_filter.clone();
                self.state.team_detail.members.begin_load();
                self.send(Command::LoadMembers { team_id: id, role });
            }
            KeyCode::Char('a') => {
                self.state
                    .team_detail
                    .members
                    .open_form(MemberForm::Add(MemberAddForm::blank()));
                self.send(Command::LoadCandidates(id));
            }
            KeyCode::Char('e') => {
                let form = self
                    .state
                    .team_detail
                    .members
                    .selected_item()
                    .map(|m| MemberForm::Edit(MemberEditForm::for_edit(m)));
                if let Some(form) = form {
                    self.state.team_detail.members.open_form(form);
                }
            }
            KeyCode::Char('d') => {
                let member_id = self.state.team_detail.members.selected_item().map(|m| m.id);
                if let Some(member_id) = member_id {
                    self.state.team_detail.members.request_delete(member_id);
                }
            }
            KeyCode::Char('f') => self.cycle_role_filter(id),
            KeyCode::Char('b') | KeyCode::Esc => self.state.screen = Screen::Teams,
            _ => {}
        }
    }

    fn cycle_role_filter(&mut self, team_id: Id) {
        let roles = distinct_roles(&self.state.team_detail.members.items);
        let next = match &self.state.team_detail.role_filter {
            None => roles.first().cloned(),
            Some(current) => match roles.iter().position(|r| r == current) {
                Some(i) if i + 1 < roles.len() => Some(roles[i + 1].clone()),
                _ => None,
            },
        };
        self.state.team_detail.role_filter = next.clone();
        self.state.team_detail.members.begin_load();
        self.send(Command::LoadMembers { team_id, role: next });
    }

    fn on_membership_key(&mut self, key: KeyEvent) {
        let snapshot = {
            let Some(view) = &self.state.membership_view else {
                return;
            };
            let Some(participant) = self
                .state
                .participants
                .items
                .iter()
                .find(|p| p.id == view.participant_id)
            else {
                self.state.membership_view = None;
                return;
            };
            (
                view.participant_id,
                participant.team_memberships.len(),
                participant
                    .team_memberships
                    .get(view.selected)
                    .map(|m| m.team_id),
                view.pending_remove,
            )
        };
        let (participant_id, count, selected_team, pending) = snapshot;

        if let Some(team_id) = pending {
            if key.code == KeyCode::Char('y') {
                if let Some(view) = self.state.membership_view.as_mut() {
                    view.pending_remove = None;
                }
                self.state.participants.begin_load();
                self.send(Command::RemoveMembership {
                    participant_id,
                    team_id,
                });
            } else if let Some(view) = self.state.membership_view.as_mut() {
                view.pending_remove = None;
            }
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(view) = self.state.membership_view.as_mut() {
                    if count > 0 {
                        view.selected = (view.selected + 1).min(count - 1);
                    }
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(view) = self.state.membership_view.as_mut() {
                    view.selected = view.selected.saturating_sub(1);
                }
            }
            KeyCode::Char('d') => {
                if let Some(team_id) = selected_team {
                    if let Some(view) = self.state.membership_view.as_mut() {
                        view.pending_remove = Some(team_id);
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Enter => {
                self.state.membership_view = None;
            }
            _ => {}
        }
    }

    fn on_confirm_key(&mut self, key: KeyEvent) {
        let confirmed = key.code == KeyCode::Char('y');
        match self.state.screen {
            Screen::Tournaments => {
                if confirmed {
                    if let Some(id) = self.state.tournaments.take_confirmed_delete() {
                        self.state.tournaments.begin_load();
                        self.send(Command::DeleteTournament(id));
                    }
                } else {
                    self.state.tournaments.cancel_delete();
                }
            }
            Screen::Teams => {
                if confirmed {
                    if let Some(id) = self.state.teams.take_confirmed_delete() {
                        self.state.teams.begin_load();
                        self.send(Command::DeleteTeam(id));
                    }
                } else {
                    self.state.teams.cancel_delete();
                }
            }
            Screen::Participants => {
                if confirmed {
                    if let Some(id) = self.state.participants.take_confirmed_delete() {
                        self.state.participants.begin_load();
                        self.send(Command::DeleteParticipant(id));
                    }
                } else {
                    self.state.participants.cancel_delete();
                }
            }
            Screen::Venues => {
                if confirmed {
                    if let Some(id) = self.state.venues.take_confirmed_delete() {
                        self.state.venues.begin_load();
                        self.send(Command::DeleteVenue(id));
                    }
                } else {
                    self.state.venues.cancel_delete();
                }
            }
            Screen::TournamentDetail(tournament_id) => {
                if self.state.tournament_detail.registrations.pending_delete.is_some() {
                    if confirmed {
                        if let Some(team_id) =
                            self.state.tournament_detail.registrations.take_confirmed_delete()
                        {
                            self.state.tournament_detail.registrations.begin_load();
                            self.send(Command::WithdrawRegistration {
                                tournament_id,
                                team_id,
                            });
                        }
                    } else {
                        self.state.tournament_detail.registrations.cancel_delete();
                    }
                } else if confirmed {
                    if let Some(match_id) =
                        self.state.tournament_detail.matches.take_confirmed_delete()
                    {
                        self.state.tournament_detail.matches.begin_load();
                        self.send(Command::DeleteMatch {
                            tournament_id,
                            match_id,
                        });
                    }
                } else {
                    self.state.tournament_detail.matches.cancel_delete();
                }
            }
            Screen::TeamDetail(team_id) => {
                if confirmed {
                    if let Some(member_id) = self.state.team_detail.members.take_confirmed_delete() {
                        self.state.team_detail.members.begin_load();
                        self.send(Command::RemoveMember { team_id, member_id });
                    }
                } else {
                    self.state.team_detail.members.cancel_delete();
                }
            }
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        match self.state.screen {
            Screen::Tournaments => self.tournament_form_key(key),
            Screen::Teams => self.team_form_key(key),
            Screen::Participants => self.participant_form_key(key),
            Screen::Venues => self.venue_form_key(key),
            Screen::TournamentDetail(id) => {
                if self.state.tournament_detail.registrations.form.is_some() {
                    self.registration_form_key(id, key);
                } else if self.state.tournament_detail.matches.form.is_some() {
                    self.match_form_key(id, key);
                }
            }
            Screen::TeamDetail(id) => self.member_form_key(id, key),
            _ => {}
        }
    }

    fn tournament_form_key(&mut self, key: KeyEvent) {
        let action = match self.state.tournaments.form.as_mut() {
            Some(form) => form_key(form, key),
            None => return,
        };
        match action {
            FormAction::Cancel => self.state.tournaments.close_form(),
            FormAction::Submit => {
                let result = match &self.state.tournaments.form {
                    Some(form) => form.save_op(),
                    None => return,
                };
                match result {
                    Ok(op) => self.send(Command::SaveTournament(op)),
                    Err(err) => self.state.tournaments.set_error(err.0),
                }
            }
            FormAction::None => {}
        }
    }

    fn team_form_key(&mut self, key: KeyEvent) {
        let action = match self.state.teams.form.as_mut() {
            Some(form) => form_key(form, key),
            None => return,
        };
        match action {
            FormAction::Cancel => self.state.teams.close_form(),
            FormAction::Submit => {
                let result = match &self.state.teams.form {
                    Some(form) => form.save_op(),
                    None => return,
                };
                match result {
                    Ok(op) => self.send(Command::SaveTeam(op)),
                    Err(err) => self.state.teams.set_error(err.0),
                }
            }
            FormAction::None => {}
        }
    }

    fn participant_form_key(&mut self, key: KeyEvent) {
        let action = match self.state.participants.form.as_mut() {
            Some(form) => form_key(form, key),
            None => return,
        };
        match action {
            FormAction::Cancel => self.state.participants.close_form(),
            FormAction::Submit => {
                let result = match &self.state.participants.form {
                    Some(form) => form.save_op(),
                    None => return,
                };
                match result {
                    Ok(op) => self.send(Command::SaveParticipant(op)),
                    Err(err) => self.state.participants.set_error(err.0),
                }
            }
            FormAction::None => {}
        }
    }

    fn venue_form_key(&mut self, key: KeyEvent) {
        let action = match self.state.venues.form.as_mut() {
            Some(form) => form_key(form, key),
            None => return,
        };
        match action {
            FormAction::Cancel => self.state.venues.close_form(),
            FormAction::Submit => {
                let result = match &self.state.venues.form {
                    Some(form) => form.save_op(),
                    None => return,
                };
                match result {
                    Ok(op) => self.send(Command::SaveVenue(op)),
                    Err(err) => self.state.venues.set_error(err.0),
                }
            }
            FormAction::None => {}
        }
    }

    fn registration_form_key(&mut self, tournament_id: Id, key: KeyEvent) {
        let action = match self.state.tournament_detail.registrations.form.as_mut() {
            Some(form) => form_key(form, key),
            None => return,
        };
        match action {
            FormAction::Cancel => self.state.tournament_detail.registrations.close_form(),
            FormAction::Submit => {
                let result = match &self.state.tournament_detail.registrations.form {
                    Some(form) => form.save_op(),
                    None => return,
                };
                match result {
                    Ok(op) => self.send(Command::SaveRegistration { tournament_id, op }),
                    Err(err) => self.state.tournament_detail.registrations.set_error(err.0),
                }
            }
            FormAction::None => {}
        }
    }

    fn match_form_key(&mut self, tournament_id: Id, key: KeyEvent) {
        let action = match self.state.tournament_detail.matches.form.as_mut() {
            Some(form) => form_key(form, key),
            None => return,
        };
        match action {
            FormAction::Cancel => self.state.tournament_detail.matches.close_form(),
            FormAction::Submit => {
                let result = match &self.state.tournament_detail.matches.form {
                    Some(form) => form.save_op(),
                    None => return,
                };
                match result {
                    Ok(op) => self.send(Command::SaveMatch { tournament_id, op }),
                    Err(err) => self.state.tournament_detail.matches.set_error(err.0),
                }
            }
            FormAction::None => {}
        }
    }

    fn member_form_key(&mut self, team_id: Id, key: KeyEvent) {
        let action = match self.state.team_detail.members.form.as_mut() {
            Some(MemberForm::Add(form)) => form_key(form, key),
            Some(MemberForm::Edit(form)) => form_key(form, key),
            None => return,
        };
        self.clamp_member_candidate();
        match action {
            FormAction::Cancel => self.state.team_detail.members.close_form(),
            FormAction::Submit => self.submit_member_form(team_id),
            FormAction::None => {}
        }
    }

    fn clamp_member_candidate(&mut self) {
        let detail = &mut self.state.team_detail;
        if let Some(MemberForm::Add(form)) = detail.members.form.as_mut() {
            let len = filter_candidates(&detail.candidates, &form.query).len();
            form.selected = if len == 0 { 0 } else { form.selected.min(len - 1) };
        }
    }

    fn submit_member_form(&mut self, team_id: Id) {
        let result = match &self.state.team_detail.members.form {
            Some(MemberForm::Add(form)) => {
                let filtered = filter_candidates(&self.state.team_detail.candidates, &form.query);
                form.draft(&filtered).map(|draft| Command::AddMember { team_id, draft })
            }
            Some(MemberForm::Edit(form)) => form.patch().map(|patch| Command::UpdateMember {
                team_id,
                member_id: form.member_id,
                patch,
            }),
            None => return,
        };
        match result {
            Ok(command) => self.send(command),
            Err(err) => self.state.team_detail.members.set_error(err.0),
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = Config::from_env();
    init_logging(&config);
    let session = SessionStore::new(config.session_path.clone());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    worker::spawn_worker(config, session, tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx));
    app.send(Command::RestoreSession);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

// Raw mode owns the screen, so diagnostics go to a file or nowhere.
fn init_logging(config: &Config) {
    let Some(path) = &config.log_path else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_bootstrap();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.screen {
        Screen::Login => render_login(frame, chunks[1], &app.state),
        Screen::Dashboard => render_dashboard(frame, chunks[1], &app.state),
        Screen::Tournaments => render_tournaments(frame, chunks[1], &app.state),
        Screen::Teams => render_teams(frame, chunks[1], &app.state),
        Screen::Participants => render_participants(frame, chunks[1], &app.state),
        Screen::Venues => render_venues(frame, chunks[1], &app.state),
        Screen::TournamentDetail(_) => render_tournament_detail(frame, chunks[1], &app.state),
        Screen::TeamDetail(_) => render_team_detail(frame, chunks[1], &app.state),
    }

    let footer = Paragraph::new(footer_text(&app.state));
    frame.render_widget(footer, chunks[2]);

    render_popups(frame, frame.size(), &app.state);

    if app.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let title = match state.screen {
        Screen::Login => "SIGN IN".to_string(),
        Screen::Dashboard => "DASHBOARD".to_string(),
        Screen::Tournaments => "TOURNAMENTS".to_string(),
        Screen::Teams => "TEAMS".to_string(),
        Screen::Participants => "PARTICIPANTS".to_string(),
        Screen::Venues => "VENUES".to_string(),
        Screen::TournamentDetail(_) => match &state.tournament_detail.tournament {
            Some(t) => format!("TOURNAMENT | {}", t.name),
            None => "TOURNAMENT".to_string(),
        },
        Screen::TeamDetail(_) => match &state.team_detail.team {
            Some(t) => format!("TEAM | {}", t.name),
            None => "TEAM".to_string(),
        },
    };
    let user = state
        .user
        .as_ref()
        .map(|u| format!(" | {} ({})", u.username, u.role.label()))
        .unwrap_or_default();
    let line1 = format!("  ___  TOURNEY DESK | {title}{user}");
    let line2 = " (___)".to_string();
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text(state: &AppState) -> String {
    if let Some(prompt) = confirm_prompt(state) {
        return prompt;
    }
    match state.screen {
        Screen::Login => "Tab/↑/↓ Move | ←/→ Switch | Enter Submit | Esc Quit".to_string(),
        Screen::Dashboard => {
            "2 Tournaments | 3 Teams | 4 Participants | 5 Venues | r Reload | L Logout | ? Help | q Quit"
                .to_string()
        }
        Screen::Tournaments => {
            "j/k Move | Enter Open | a Add | e Edit | d Delete | r Reload | b Back | ? Help | q Quit"
                .to_string()
        }
        Screen::Teams => {
            "j/k Move | Enter Roster | a Add | e Edit | d Delete | r Reload | b Back | ? Help | q Quit"
                .to_string()
        }
        Screen::Participants => {
            "j/k Move | Enter Teams | a Add | e Edit | d Delete | r Reload | b Back | ? Help | q Quit"
                .to_string()
        }
        Screen::Venues => {
            "j/k Move | a Add | e Edit | d Delete | r Reload | b Back | ? Help | q Quit".to_string()
        }
        Screen::TournamentDetail(_) => {
            "Tab Pane | j/k Move | a Add | e Edit | d Delete | r Reload | b Back | ? Help | q Quit"
                .to_string()
        }
        Screen::TeamDetail(_) => {
            "j/k Move | a Add | e Edit | d Remove | f Filter role | r Reload | b Back | ? Help | q Quit"
                .to_string()
        }
    }
}

fn confirm_prompt(state: &AppState) -> Option<String> {
    match state.screen {
        Screen::Tournaments => state.tournaments.pending_delete.map(|id| {
            let name = state
                .tournaments
                .items
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.name.as_str())
                .unwrap_or("tournament");
            format!("Delete tournament '{name}'? y/N")
        }),
        Screen::Teams => state.teams.pending_delete.map(|id| {
            let name = state
                .teams
                .items
                .iter()
                .find(|t| t.id == id)
                .map(|t| t.name.as_str())
                .unwrap_or("team");
            format!("Delete team '{name}'? y/N")
        }),
        Screen::Participants => {
            if let Some(view) = &state.membership_view {
                if let Some(team_id) = view.pending_remove {
                    let team = state
                        .participants
                        .items
                        .iter()
                        .find(|p| p.id == view.participant_id)
                        .and_then(|p| p.team_memberships.iter().find(|m| m.team_id == team_id))
                        .map(|m| m.team_name.as_str())
                        .unwrap_or("team");
                    return Some(format!("Remove from '{team}'? y/N"));
                }
            }
            state.participants.pending_delete.map(|id| {
                let name = state
                    .participants
                    .items
                    .iter()
                    .find(|p| p.id == id)
                    .map(|p| p.full_name())
                    .unwrap_or_else(|| "participant".to_string());
                format!("Delete participant '{name}'? y/N")
            })
        }
        Screen::Venues => state.venues.pending_delete.map(|id| {
            let name = state
                .venues
                .items
                .iter()
                .find(|v| v.id == id)
                .map(|v| v.name.as_str())
                .unwrap_or("venue");
            format!("Delete venue '{name}'? y/N")
        }),
        Screen::TournamentDetail(_) => {
            let detail = &state.tournament_detail;
            if let Some(team_id) = detail.registrations.pending_delete {
                let name = detail
                    .registrations
                    .items
                    .iter()
                    .find(|r| r.team_id == team_id)
                    .map(|r| r.team.name.as_str())
                    .unwrap_or("team");
                return Some(format!("Withdraw '{name}' from the tournament? y/N"));
            }
            detail.matches.pending_delete.map(|id| {
                let name = detail
                    .matches
                    .items
                    .iter()
                    .find(|m| m.id == id)
                    .map(|m| format!("{} vs {}", m.home_team.name, m.away_team.name))
                    .unwrap_or_else(|| "match".to_string());
                format!("Delete match '{name}'? y/N")
            })
        }
        Screen::TeamDetail(_) => state.team_detail.members.pending_delete.map(|id| {
            let name = state
                .team_detail
                .members
                .items
                .iter()
                .find(|m| m.id == id)
                .map(|m| member_display_name(&m.participant_name, m.participant_id))
                .unwrap_or_else(|| "member".to_string());
            format!("Remove '{name}' from the roster? y/N")
        }),
        _ => None,
    }
}

fn member_display_name(name: &str, participant_id: Id) -> String {
    if name.is_empty() {
        format!("Participant {participant_id}")
    } else {
        name.to_string()
    }
}

fn render_login(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup = centered_rect(46, 60, area);
    let block = Block::default().title("Tourney Desk").borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines: Vec<Line> = form_lines(&state.login).into_iter().map(Line::from).collect();
    lines.push(Line::from(""));
    if !state.session_checked {
        lines.push(Line::styled(
            "restoring session...",
            Style::default().fg(Color::DarkGray),
        ));
    }
    if state.login.busy {
        lines.push(Line::styled("working...", Style::default().fg(Color::DarkGray)));
    }
    if let Some(error) = &state.login.error {
        lines.push(Line::styled(
            format!("error: {error}"),
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(notice) = &state.login.notice {
        lines.push(Line::styled(notice.clone(), Style::default().fg(Color::Green)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_dashboard(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25); 4])
        .split(rows[0]);

    render_stat_card(
        frame,
        cards[0],
        "Tournaments",
        state.tournaments.items.len(),
        Some(format!("{} active", active_tournaments(&state.tournaments.items))),
    );
    render_stat_card(frame, cards[1], "Teams", state.teams.items.len(), None);
    render_stat_card(frame, cards[2], "Participants", state.participants.items.len(), None);
    render_stat_card(frame, cards[3], "Venues", state.venues.items.len(), None);

    let max = rows[1].height.saturating_sub(2) as usize;
    let console = Paragraph::new(console_text(state, max))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[1]);
}

fn render_stat_card(frame: &mut Frame, area: Rect, title: &str, count: usize, sub: Option<String>) {
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![Line::styled(
        count.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(sub) = sub {
        lines.push(Line::styled(sub, Style::default().fg(Color::DarkGray)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn console_text(state: &AppState, max: usize) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(max.max(1))
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn tournament_columns() -> [Constraint; 5] {
    [
        Constraint::Min(18),
        Constraint::Length(12),
        Constraint::Length(17),
        Constraint::Length(17),
        Constraint::Length(11),
    ]
}

fn render_tournaments(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let widths = tournament_columns();
    render_table_header(frame, sections[0], &widths, &["Name", "Sport", "Start", "End", "Status"]);
    render_status_line(
        frame,
        sections[1],
        state.tournaments.loading,
        state.tournaments.error.as_deref(),
        state.tournaments.items.len(),
    );

    let list_area = sections[2];
    let items = &state.tournaments.items;
    if items.is_empty() {
        let empty = Paragraph::new("No tournaments yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.tournaments.selected, items.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.tournaments.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let t = &items[idx];
        render_cell_text(frame, cols[0], &t.name, row_style);
        render_cell_text(frame, cols[1], &t.sport_type, row_style);
        render_cell_text(frame, cols[2], &format_datetime(&t.start_date), row_style);
        render_cell_text(frame, cols[3], &format_datetime(&t.end_date), row_style);
        render_cell_text(frame, cols[4], t.status.label(), row_style);
    }
}

fn teams_columns() -> [Constraint; 3] {
    [
        Constraint::Min(20),
        Constraint::Length(14),
        Constraint::Length(8),
    ]
}

fn render_teams(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let widths = teams_columns();
    render_table_header(frame, sections[0], &widths, &["Name", "Category", "Members"]);
    render_status_line(
        frame,
        sections[1],
        state.teams.loading,
        state.teams.error.as_deref(),
        state.teams.items.len(),
    );

    let list_area = sections[2];
    let items = &state.teams.items;
    if items.is_empty() {
        let empty = Paragraph::new("No teams yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.teams.selected, items.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.teams.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let team = &items[idx];
        let members = team
            .member_count
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        render_cell_text(frame, cols[0], &team.name, row_style);
        render_cell_text(frame, cols[1], team.category.label(), row_style);
        render_cell_text(frame, cols[2], &members, row_style);
    }
}

fn participant_columns() -> [Constraint; 4] {
    [
        Constraint::Min(18),
        Constraint::Min(24),
        Constraint::Length(14),
        Constraint::Length(6),
    ]
}

fn render_participants(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let widths = participant_columns();
    render_table_header(frame, sections[0], &widths, &["Name", "Email", "Category", "Teams"]);
    render_status_line(
        frame,
        sections[1],
        state.participants.loading,
        state.participants.error.as_deref(),
        state.participants.items.len(),
    );

    let list_area = sections[2];
    let items = &state.participants.items;
    if items.is_empty() {
        let empty = Paragraph::new("No participants yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.participants.selected, items.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.participants.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let p = &items[idx];
        render_cell_text(frame, cols[0], &p.full_name(), row_style);
        render_cell_text(frame, cols[1], &p.email, row_style);
        render_cell_text(frame, cols[2], p.category.label(), row_style);
        render_cell_text(frame, cols[3], &p.team_memberships.len().to_string(), row_style);
    }
}

fn venue_columns() -> [Constraint; 3] {
    [
        Constraint::Min(20),
        Constraint::Min(20),
        Constraint::Length(9),
    ]
}

fn render_venues(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let widths = venue_columns();
    render_table_header(frame, sections[0], &widths, &["Name", "Address", "Capacity"]);
    render_status_line(
        frame,
        sections[1],
        state.venues.loading,
        state.venues.error.as_deref(),
        state.venues.items.len(),
    );

    let list_area = sections[2];
    let items = &state.venues.items;
    if items.is_empty() {
        let empty = Paragraph::new("No venues yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.venues.selected, items.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.venues.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let venue = &items[idx];
        let address = venue.address.as_deref().unwrap_or("-");
        let capacity = venue
            .capacity
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        render_cell_text(frame, cols[0], &venue.name, row_style);
        render_cell_text(frame, cols[1], address, row_style);
        render_cell_text(frame, cols[2], &capacity, row_style);
    }
}

fn render_tournament_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(1)])
        .split(area);

    let detail = &state.tournament_detail;
    let summary = Paragraph::new(tournament_summary_text(detail))
        .block(Block::default().title("Tournament").borders(Borders::ALL));
    frame.render_widget(summary, rows[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[1]);

    render_detail_pane(
        frame,
        panes[0],
        "Registrations",
        detail.focus == DetailFocus::Registrations,
        detail.registrations.selected,
        detail.registrations.loading,
        detail.registrations.error.as_deref(),
        &registration_lines(&detail.registrations.items),
    );
    render_detail_pane(
        frame,
        panes[1],
        "Matches",
        detail.focus == DetailFocus::Matches,
        detail.matches.selected,
        detail.matches.loading,
        detail.matches.error.as_deref(),
        &match_lines(&detail.matches.items),
    );
    render_detail_pane(
        frame,
        panes[2],
        "Leaderboard",
        detail.focus == DetailFocus::Leaderboard,
        detail.leaderboard.selected,
        detail.leaderboard.loading,
        detail.leaderboard.error.as_deref(),
        &leaderboard_lines(&detail.leaderboard.items),
    );
}

fn tournament_summary_text(detail: &TournamentDetailState) -> String {
    let Some(t) = &detail.tournament else {
        return "Loading tournament".to_string();
    };
    let location = t.location.as_deref().unwrap_or("-");
    let open = if registration_open(t, Utc::now().naive_utc()) {
        "open"
    } else {
        "closed"
    };
    let mut lines = vec![
        format!("{} [{}] {}", t.name, t.status.label(), t.sport_type),
        format!(
            "{} to {} | {} | registration {}",
            format_datetime(&t.start_date),
            format_datetime(&t.end_date),
            location,
            open
        ),
    ];
    if let Some(rules) = &t.rules {
        lines.push(format!("Rules: {rules}"));
    }
    lines.join("\n")
}

fn registration_lines(items: &[Registration]) -> Vec<String> {
    items
        .iter()
        .map(|r| format!("{} [{}]", r.team.name, r.status.label()))
        .collect()
}

fn match_lines(items: &[Match]) -> Vec<String> {
    items
        .iter()
        .map(|m| {
            let score = match (m.home_score, m.away_score) {
                (Some(h), Some(a)) => format!("{h}-{a}"),
                _ => "vs".to_string(),
            };
            format!(
                "{} {score} {} | {} | {}",
                m.home_team.name,
                m.away_team.name,
                m.status.label(),
                format_datetime(&m.scheduled_at)
            )
        })
        .collect()
}

fn leaderboard_lines(items: &[LeaderboardEntry]) -> Vec<String> {
    items
        .iter()
        .enumerate()
        .map(|(i, row)| format!("{:>2}. {} {}W", i + 1, row.team_name, row.wins))
        .collect()
}

fn render_detail_pane(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    focused: bool,
    selected: usize,
    loading: bool,
    error: Option<&str>,
    lines: &[String],
) {
    let title_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let block = Block::default()
        .title(Span::styled(title.to_string(), title_style))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let mut top = 0u16;
    if loading {
        let status = Paragraph::new("loading...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, Rect { height: 1, ..inner });
        top = 1;
    } else if let Some(error) = error {
        let status = Paragraph::new(error.to_string()).style(Style::default().fg(Color::Red));
        frame.render_widget(status, Rect { height: 1, ..inner });
        top = 1;
    }

    let list_area = Rect {
        x: inner.x,
        y: inner.y + top,
        width: inner.width,
        height: inner.height.saturating_sub(top),
    };
    if list_area.height == 0 {
        return;
    }
    if lines.is_empty() {
        let empty = Paragraph::new("No entries").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(selected, lines.len(), visible);
    let text = (start..end)
        .map(|idx| {
            let marker = if idx == selected && focused { "> " } else { "  " };
            format!("{marker}{}", lines[idx])
        })
        .collect::<Vec<_>>()
        .join("\n");
    frame.render_widget(Paragraph::new(text), list_area);
}

fn member_columns() -> [Constraint; 4] {
    [
        Constraint::Min(18),
        Constraint::Length(12),
        Constraint::Length(7),
        Constraint::Min(20),
    ]
}

fn render_team_detail(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(1)])
        .split(area);

    let detail = &state.team_detail;
    let summary = Paragraph::new(team_summary_text(detail))
        .block(Block::default().title("Team").borders(Borders::ALL));
    frame.render_widget(summary, rows[0]);

    let block = Block::default().title("Roster").borders(Borders::ALL);
    let inner = block.inner(rows[1]);
    frame.render_widget(block, rows[1]);
    if inner.height < 3 || inner.width == 0 {
        return;
    }

    let widths = member_columns();
    render_table_header(
        frame,
        Rect { height: 1, ..inner },
        &widths,
        &["Participant", "Role", "Jersey", "Email"],
    );
    render_status_line(
        frame,
        Rect {
            x: inner.x,
            y: inner.y + 1,
            width: inner.width,
            height: 1,
        },
        detail.members.loading,
        detail.members.error.as_deref(),
        detail.members.items.len(),
    );

    let list_area = Rect {
        x: inner.x,
        y: inner.y + 2,
        width: inner.width,
        height: inner.height - 2,
    };
    let items = &detail.members.items;
    if items.is_empty() {
        let empty = Paragraph::new("Roster is empty").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(detail.members.selected, items.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == detail.members.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let member = &items[idx];
        let name = member_display_name(&member.participant_name, member.participant_id);
        let role = member.role.as_deref().unwrap_or("-");
        let jersey = member
            .jersey_number
            .map(|n| format!("#{n}"))
            .unwrap_or_else(|| "-".to_string());
        render_cell_text(frame, cols[0], &name, row_style);
        render_cell_text(frame, cols[1], role, row_style);
        render_cell_text(frame, cols[2], &jersey, row_style);
        render_cell_text(frame, cols[3], &member.participant_email, row_style);
    }
}

fn team_summary_text(detail: &TeamDetailState) -> String {
    let Some(team) = &detail.team else {
        return "Loading team".to_string();
    };
    let members = team
        .member_count
        .map(|c| c.to_string())
        .unwrap_or_else(|| "?".to_string());
    let filter = detail.role_filter.as_deref().unwrap_or("all roles");
    format!(
        "{} [{}]\n{} member(s) | filter: {}",
        team.name,
        team.category.label(),
        members,
        filter
    )
}

fn render_popups(frame: &mut Frame, area: Rect, state: &AppState) {
    match state.screen {
        Screen::Tournaments => {
            if let Some(form) = &state.tournaments.form {
                let title = if form.editing_id.is_some() {
                    "Edit tournament"
                } else {
                    "New tournament"
                };
                render_form_popup(frame, area, title, form, state.tournaments.error.as_deref());
            }
        }
        Screen::Teams => {
            if let Some(form) = &state.teams.form {
                let title = if form.editing_id.is_some() { "Edit team" } else { "New team" };
                render_form_popup(frame, area, title, form, state.teams.error.as_deref());
            }
        }
        Screen::Participants => {
            if let Some(form) = &state.participants.form {
                let title = if form.editing_id.is_some() {
                    "Edit participant"
                } else {
                    "New participant"
                };
                render_form_popup(frame, area, title, form, state.participants.error.as_deref());
            } else if let Some(view) = &state.membership_view {
                render_membership_popup(frame, area, state, view);
            }
        }
        Screen::Venues => {
            if let Some(form) = &state.venues.form {
                let title = if form.editing_id.is_some() { "Edit venue" } else { "New venue" };
                render_form_popup(frame, area, title, form, state.venues.error.as_deref());
            }
        }
        Screen::TournamentDetail(_) => {
            if let Some(form) = &state.tournament_detail.registrations.form {
                let title = if form.editing_id.is_some() {
                    "Edit registration"
                } else {
                    "Invite team"
                };
                render_form_popup(
                    frame,
                    area,
                    title,
                    form,
                    state.tournament_detail.registrations.error.as_deref(),
                );
            } else if let Some(form) = &state.tournament_detail.matches.form {
                let title = if form.editing_id.is_some() {
                    "Edit match"
                } else {
                    "Schedule match"
                };
                render_form_popup(
                    frame,
                    area,
                    title,
                    form,
                    state.tournament_detail.matches.error.as_deref(),
                );
            }
        }
        Screen::TeamDetail(_) => match &state.team_detail.members.form {
            Some(MemberForm::Add(form)) => render_member_add_popup(frame, area, state, form),
            Some(MemberForm::Edit(form)) => render_form_popup(
                frame,
                area,
                "Edit member",
                form,
                state.team_detail.members.error.as_deref(),
            ),
            None => {}
        },
        _ => {}
    }
}

fn form_lines(form: &dyn Form) -> Vec<String> {
    (0..form.field_count())
        .map(|field| {
            let marker = if field == form.focus() { "> " } else { "  " };
            format!("{marker}{:<11} {}", form.label(field), form.display(field))
        })
        .collect()
}

fn render_form_popup(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    form: &dyn Form,
    error: Option<&str>,
) {
    let popup = centered_rect(52, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default().title(title.to_string()).borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines: Vec<Line> = form_lines(form).into_iter().map(Line::from).collect();
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Enter save | Esc cancel | Tab next | ←/→ cycle",
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(error) = error {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_member_add_popup(frame: &mut Frame, area: Rect, state: &AppState, form: &MemberAddForm) {
    let popup = centered_rect(56, 70, area);
    frame.render_widget(Clear, popup);
    let block = Block::default().title("Add member").borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let mut lines: Vec<Line> = form_lines(form).into_iter().map(Line::from).collect();
    lines.push(Line::from(""));

    let filtered = filter_candidates(&state.team_detail.candidates, &form.query);
    if filtered.is_empty() {
        lines.push(Line::styled(
            "No matching participants",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        let selected = form.selected.min(filtered.len() - 1);
        let (start, end) = visible_range(selected, filtered.len(), 6);
        for idx in start..end {
            let candidate = filtered[idx];
            let marker = if idx == selected { "> " } else { "  " };
            lines.push(Line::from(format!(
                "{marker}{} <{}>",
                candidate.full_name(),
                candidate.email
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Enter save | Esc cancel | Tab next | ←/→ pick candidate",
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(error) = state.team_detail.members.error.as_deref() {
        lines.push(Line::styled(error.to_string(), Style::default().fg(Color::Red)));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_membership_popup(frame: &mut Frame, area: Rect, state: &AppState, view: &MembershipView) {
    let Some(participant) = state
        .participants
        .items
        .iter()
        .find(|p| p.id == view.participant_id)
    else {
        return;
    };

    let popup = centered_rect(56, 60, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .title(format!("{} - teams", participant.full_name()))
        .borders(Borders::ALL);
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let memberships = &participant.team_memberships;
    let mut lines: Vec<Line> = Vec::new();
    if memberships.is_empty() {
        lines.push(Line::styled(
            "No team memberships",
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        let selected = view.selected.min(memberships.len() - 1);
        for (idx, membership) in memberships.iter().enumerate() {
            let marker = if idx == selected { "> " } else { "  " };
            let role = membership.role.as_deref().unwrap_or("-");
            let jersey = membership
                .jersey_number
                .map(|n| format!(" #{n}"))
                .unwrap_or_default();
            lines.push(Line::from(format!(
                "{marker}{} | {role}{jersey}",
                membership.team_name
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::styled(
        "j/k move | d remove | Esc close",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(lines), inner);
}

fn render_table_header(frame: &mut Frame, area: Rect, widths: &[Constraint], titles: &[&str]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);
    for (i, title) in titles.iter().enumerate() {
        if let Some(col) = cols.get(i) {
            render_cell_text(frame, *col, title, style);
        }
    }
}

fn render_status_line(
    frame: &mut Frame,
    area: Rect,
    loading: bool,
    error: Option<&str>,
    count: usize,
) {
    let (text, style) = if loading {
        ("loading...".to_string(), Style::default().fg(Color::DarkGray))
    } else if let Some(error) = error {
        (error.to_string(), Style::default().fg(Color::Red))
    } else {
        (format!("{count} row(s)"), Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Tourney Desk - Help",
        "",
        "Global:",
        "  1-5          Dashboard / Tournaments / Teams / Participants / Venues",
        "  j/k or ↑/↓   Move",
        "  r            Reload",
        "  b / Esc      Back",
        "  L            Log out",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Lists:",
        "  Enter        Open (tournament, roster, memberships)",
        "  a / e / d    Add / Edit / Delete (y confirms)",
        "",
        "Tournament view:",
        "  Tab          Switch pane",
        "  d            Withdraw registration or delete match",
        "",
        "Team view:",
        "  f            Cycle role filter",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
