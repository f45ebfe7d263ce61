//! Background worker owning the blocking HTTP client and the session store.
//! Commands are handled strictly in order, so a reload queued after a
//! mutation always observes that mutation.

use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use tracing::{debug, warn};

use crate::api::{ApiClient, ResourceApi};
use crate::config::Config;
use crate::forms::SaveOp;
use crate::http::ApiError;
use crate::model::{
    format_datetime, Id, Match, MatchStatus, NewNotification, NotificationType, RecipientType,
};
use crate::session::SessionStore;
use crate::state::{Command, Delta, PaneKind};

pub fn spawn_worker(
    config: Config,
    mut session: SessionStore,
    tx: Sender<Delta>,
    rx: Receiver<Command>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut api = ApiClient::new(&config);
        api.set_token(session.token().map(str::to_string));
        for command in rx {
            handle_command(&mut api, &mut session, &tx, command);
        }
        debug!("worker channel closed, shutting down");
    })
}

/// Mutate-then-reload in one step so the refreshed list reflects the write.
pub fn save_and_reload<R: ResourceApi>(
    api: &R,
    op: SaveOp<R::Create, R::Patch>,
) -> Result<(R::Entity, Vec<R::Entity>), ApiError> {
    let saved = match op {
        SaveOp::Create(draft) => api.create(&draft)?,
        SaveOp::Update(id, patch) => api.update(id, &patch)?,
    };
    let rows = api.list()?;
    Ok((saved, rows))
}

pub fn delete_and_reload<R: ResourceApi>(api: &R, id: Id) -> Result<Vec<R::Entity>, ApiError> {
    api.delete(id)?;
    api.list()
}

fn handle_command(
    api: &mut ApiClient,
    session: &mut SessionStore,
    tx: &Sender<Delta>,
    command: Command,
) {
    match command {
        Command::RestoreSession => match session.restore() {
            Some(user) => {
                api.set_token(session.token().map(str::to_string));
                let _ = tx.send(Delta::Log(format!(
                    "[INFO] Session restored for {}",
                    user.username
                )));
                let _ = tx.send(Delta::SessionChanged(Some(user)));
            }
            None => {
                let _ = tx.send(Delta::SessionChanged(None));
            }
        },
        Command::Login(request) => match api.login(&request) {
            Ok(response) => match session.login(&response.token) {
                Ok(user) => {
                    api.set_token(session.token().map(str::to_string));
                    let _ = tx.send(Delta::Log(format!("[INFO] Signed in as {}", user.username)));
                    let _ = tx.send(Delta::SessionChanged(Some(user)));
                }
                Err(err) => {
                    warn!(error = %err, "issued token was unusable");
                    let _ = tx.send(Delta::LoginFailed(format!(
                        "server issued an unusable token: {err}"
                    )));
                }
            },
            Err(err) => {
                let _ = tx.send(Delta::LoginFailed(err.user_message()));
            }
        },
        Command::Register(request) => match api.register(&request) {
            Ok(response) => {
                let message = if response.message.is_empty() {
                    "Account created; sign in to continue".to_string()
                } else {
                    response.message
                };
                let _ = tx.send(Delta::RegisterOk(message));
            }
            Err(err) => {
                let _ = tx.send(Delta::RegisterFailed(err.user_message()));
            }
        },
        Command::Logout => {
            session.logout();
            api.set_token(None);
            let _ = tx.send(Delta::Log("[INFO] Signed out".to_string()));
            let _ = tx.send(Delta::SessionChanged(None));
        }
        Command::LoadTournaments => match api.tournaments().list() {
            Ok(rows) => {
                let _ = tx.send(Delta::SetTournaments(rows));
            }
            Err(err) => load_failed(tx, PaneKind::Tournaments, err),
        },
        Command::SaveTournament(op) => match save_and_reload(&api.tournaments(), op) {
            Ok((saved, rows)) => {
                let _ = tx.send(Delta::Saved(PaneKind::Tournaments));
                let _ = tx.send(Delta::Log(format!("[INFO] Tournament '{}' saved", saved.name)));
                let _ = tx.send(Delta::SetTournaments(rows));
            }
            Err(err) => save_failed(tx, PaneKind::Tournaments, err),
        },
        Command::DeleteTournament(id) => match delete_and_reload(&api.tournaments(), id) {
            Ok(rows) => {
                let _ = tx.send(Delta::Log("[INFO] Tournament deleted".to_string()));
                let _ = tx.send(Delta::SetTournaments(rows));
            }
            Err(err) => delete_failed(tx, PaneKind::Tournaments, err),
        },
        Command::LoadTeams => match api.teams().list() {
            Ok(rows) => {
                let _ = tx.send(Delta::SetTeams(rows));
            }
            Err(err) => load_failed(tx, PaneKind::Teams, err),
        },
        Command::SaveTeam(op) => match save_and_reload(&api.teams(), op) {
            Ok((saved, rows)) => {
                let _ = tx.send(Delta::Saved(PaneKind::Teams));
                let _ = tx.send(Delta::Log(format!("[INFO] Team '{}' saved", saved.name)));
                let _ = tx.send(Delta::SetTeams(rows));
            }
            Err(err) => save_failed(tx, PaneKind::Teams, err),
        },
        Command::DeleteTeam(id) => match delete_and_reload(&api.teams(), id) {
            Ok(rows) => {
                let _ = tx.send(Delta::Log("[INFO] Team deleted".to_string()));
                let _ = tx.send(Delta::SetTeams(rows));
            }
            Err(err) => delete_failed(tx, PaneKind::Teams, err),
        },
        Command::LoadParticipants => match api.participants().list() {
            Ok(rows) => {
                let _ = tx.send(Delta::SetParticipants(rows));
            }
            Err(err) => load_failed(tx, PaneKind::Participants, err),
        },
        Command::SaveParticipant(op) => match save_and_reload(&api.participants(), op) {
            Ok((saved, rows)) => {
                let _ = tx.send(Delta::Saved(PaneKind::Participants));
                let _ = tx.send(Delta::Log(format!(
                    "[INFO] Participant '{}' saved",
                    saved.full_name()
                )));
                let _ = tx.send(Delta::SetParticipants(rows));
            }
            Err(err) => save_failed(tx, PaneKind::Participants, err),
        },
        Command::DeleteParticipant(id) => match delete_and_reload(&api.participants(), id) {
            Ok(rows) => {
                let _ = tx.send(Delta::Log("[INFO] Participant deleted".to_string()));
                let _ = tx.send(Delta::SetParticipants(rows));
            }
            Err(err) => delete_failed(tx, PaneKind::Participants, err),
        },
        Command::LoadVenues => match api.venues().list() {
            Ok(rows) => {
                let _ = tx.send(Delta::SetVenues(rows));
            }
            Err(err) => load_failed(tx, PaneKind::Venues, err),
        },
        Command::SaveVenue(op) => match save_and_reload(&api.venues(), op) {
            Ok((saved, rows)) => {
                let _ = tx.send(Delta::Saved(PaneKind::Venues));
                let _ = tx.send(Delta::Log(format!("[INFO] Venue '{}' saved", saved.name)));
                let _ = tx.send(Delta::SetVenues(rows));
            }
            Err(err) => save_failed(tx, PaneKind::Venues, err),
        },
        Command::DeleteVenue(id) => match delete_and_reload(&api.venues(), id) {
            Ok(rows) => {
                let _ = tx.send(Delta::Log("[INFO] Venue deleted".to_string()));
                let _ = tx.send(Delta::SetVenues(rows));
            }
            Err(err) => delete_failed(tx, PaneKind::Venues, err),
        },
        Command::OpenTournament(id) => {
            match api.tournaments().get(id) {
                Ok(tournament) => {
                    let _ = tx.send(Delta::SetTournament(tournament));
                }
                Err(err) => load_failed(tx, PaneKind::Tournaments, err),
            }
            send_registrations(api, tx, id);
            send_matches(api, tx, id);
            send_leaderboard(api, tx, id);
            // Selector options for the match and registration editors.
            match api.teams().list() {
                Ok(rows) => {
                    let _ = tx.send(Delta::SetTeams(rows));
                }
                Err(err) => debug!(error = %err, "team option refresh failed"),
            }
            match api.venues().list() {
                Ok(rows) => {
                    let _ = tx.send(Delta::SetVenues(rows));
                }
                Err(err) => debug!(error = %err, "venue option refresh failed"),
            }
        }
        Command::LoadRegistrations(tournament_id) => send_registrations(api, tx, tournament_id),
        Command::SaveRegistration { tournament_id, op } => {
            let registrations = api.registrations(tournament_id);
            let result = match op {
                SaveOp::Create(draft) => registrations.invite(&draft),
                SaveOp::Update(id, draft) => registrations.update(id, &draft),
            };
            match result {
                Ok(saved) => {
                    let _ = tx.send(Delta::Saved(PaneKind::Registrations));
                    notify_team(
                        api,
                        tx,
                        saved.team_id,
                        NotificationType::Update,
                        format!("Registration update: {}", saved.status.label()),
                        Some(tournament_id),
                        None,
                    );
                    send_registrations(api, tx, tournament_id);
                    send_leaderboard(api, tx, tournament_id);
                }
                Err(err) => save_failed(tx, PaneKind::Registrations, err),
            }
        }
        Command::WithdrawRegistration {
            tournament_id,
            team_id,
        } => match api.registrations(tournament_id).withdraw(team_id) {
            Ok(()) => {
                let _ = tx.send(Delta::Log("[INFO] Registration withdrawn".to_string()));
                notify_team(
                    api,
                    tx,
                    team_id,
                    NotificationType::Update,
                    "Registration withdrawn".to_string(),
                    Some(tournament_id),
                    None,
                );
                send_registrations(api, tx, tournament_id);
                send_leaderboard(api, tx, tournament_id);
            }
            Err(err) => delete_failed(tx, PaneKind::Registrations, err),
        },
        Command::LoadMatches(tournament_id) => send_matches(api, tx, tournament_id),
        Command::SaveMatch { tournament_id, op } => {
            let was_create = matches!(op, SaveOp::Create(_));
            match save_and_reload(&api.matches(tournament_id), op) {
                Ok((saved, rows)) => {
                    let _ = tx.send(Delta::Saved(PaneKind::Matches));
                    announce_match(api, tx, &saved, was_create);
                    let _ = tx.send(Delta::SetMatches {
                        tournament_id,
                        rows,
                    });
                    send_leaderboard(api, tx, tournament_id);
                }
                Err(err) => save_failed(tx, PaneKind::Matches, err),
            }
        }
        Command::DeleteMatch {
            tournament_id,
            match_id,
        } => match delete_and_reload(&api.matches(tournament_id), match_id) {
            Ok(rows) => {
                let _ = tx.send(Delta::Log("[INFO] Match deleted".to_string()));
                let _ = tx.send(Delta::SetMatches {
                    tournament_id,
                    rows,
                });
                send_leaderboard(api, tx, tournament_id);
            }
            Err(err) => delete_failed(tx, PaneKind::Matches, err),
        },
        Command::LoadLeaderboard(tournament_id) => send_leaderboard(api, tx, tournament_id),
        Command::OpenTeam(id) => {
            match api.teams().get(id) {
                Ok(team) => {
                    let _ = tx.send(Delta::SetTeam(team));
                }
                Err(err) => load_failed(tx, PaneKind::Teams, err),
            }
            send_members(api, tx, id, None);
        }
        Command::LoadMembers { team_id, role } => {
            send_members(api, tx, team_id, role.as_deref());
        }
        Command::AddMember { team_id, draft } => match api.members(team_id).create(&draft) {
            Ok(member) => {
                let _ = tx.send(Delta::Saved(PaneKind::Members));
                let who = if member.participant_name.is_empty() {
                    format!("Participant {}", member.participant_id)
                } else {
                    member.participant_name.clone()
                };
                let _ = tx.send(Delta::Log(format!("[INFO] {who} added to roster")));
                send_members(api, tx, team_id, None);
                refresh_team(api, tx, team_id);
            }
            Err(err) => save_failed(tx, PaneKind::Members, err),
        },
        Command::UpdateMember {
            team_id,
            member_id,
            patch,
        } => match api.members(team_id).update(member_id, &patch) {
            Ok(_) => {
                let _ = tx.send(Delta::Saved(PaneKind::Members));
                send_members(api, tx, team_id, None);
            }
            Err(err) => save_failed(tx, PaneKind::Members, err),
        },
        Command::RemoveMember { team_id, member_id } => {
            match api.members(team_id).delete(member_id) {
                Ok(()) => {
                    let _ = tx.send(Delta::Log("[INFO] Member removed".to_string()));
                    send_members(api, tx, team_id, None);
                    refresh_team(api, tx, team_id);
                }
                Err(err) => delete_failed(tx, PaneKind::Members, err),
            }
        }
        Command::RemoveMembership {
            participant_id,
            team_id,
        } => match api.members(team_id).remove_by_participant(participant_id) {
            Ok(()) => {
                let _ = tx.send(Delta::Log("[INFO] Membership removed".to_string()));
                match api.participants().list() {
                    Ok(rows) => {
                        let _ = tx.send(Delta::SetParticipants(rows));
                    }
                    Err(err) => load_failed(tx, PaneKind::Participants, err),
                }
            }
            Err(err) => delete_failed(tx, PaneKind::Participants, err),
        },
        Command::LoadCandidates(team_id) => match api.members(team_id).available_participants() {
            Ok(rows) => {
                let _ = tx.send(Delta::SetCandidates { team_id, rows });
            }
            Err(err) => load_failed(tx, PaneKind::Candidates, err),
        },
    }
}

fn send_registrations(api: &ApiClient, tx: &Sender<Delta>, tournament_id: Id) {
    match api.registrations(tournament_id).list() {
        Ok(rows) => {
            let _ = tx.send(Delta::SetRegistrations {
                tournament_id,
                rows,
            });
        }
        Err(err) => load_failed(tx, PaneKind::Registrations, err),
    }
}

fn send_matches(api: &ApiClient, tx: &Sender<Delta>, tournament_id: Id) {
    match api.matches(tournament_id).list() {
        Ok(rows) => {
            let _ = tx.send(Delta::SetMatches {
                tournament_id,
                rows,
            });
        }
        Err(err) => load_failed(tx, PaneKind::Matches, err),
    }
}

fn send_leaderboard(api: &ApiClient, tx: &Sender<Delta>, tournament_id: Id) {
    match api.leaderboard(tournament_id) {
        Ok(rows) => {
            let _ = tx.send(Delta::SetLeaderboard {
                tournament_id,
                rows,
            });
        }
        Err(err) => load_failed(tx, PaneKind::Leaderboard, err),
    }
}

fn send_members(api: &ApiClient, tx: &Sender<Delta>, team_id: Id, role: Option<&str>) {
    let members = api.members(team_id);
    let result = match role {
        Some(role) => members.list_by_role(role),
        None => members.list(),
    };
    match result {
        Ok(rows) => {
            let _ = tx.send(Delta::SetMembers { team_id, rows });
        }
        Err(err) => load_failed(tx, PaneKind::Members, err),
    }
}

// member_count is derived by the backend, so refetch rather than guess.
fn refresh_team(api: &ApiClient, tx: &Sender<Delta>, team_id: Id) {
    match api.teams().get(team_id) {
        Ok(team) => {
            let _ = tx.send(Delta::SetTeam(team));
        }
        Err(err) => debug!(error = %err, team_id, "team refresh failed"),
    }
}

fn announce_match(api: &ApiClient, tx: &Sender<Delta>, fixture: &Match, was_create: bool) {
    let (kind, message) = if was_create {
        (
            NotificationType::Schedule,
            format!(
                "{} vs {} scheduled for {}",
                fixture.home_team.name,
                fixture.away_team.name,
                format_datetime(&fixture.scheduled_at)
            ),
        )
    } else if fixture.status == MatchStatus::Completed {
        (
            NotificationType::Result,
            format!(
                "Final: {} {} - {} {}",
                fixture.home_team.name,
                fixture.home_score.unwrap_or(0),
                fixture.away_score.unwrap_or(0),
                fixture.away_team.name
            ),
        )
    } else {
        (
            NotificationType::Update,
            format!(
                "{} vs {} updated ({})",
                fixture.home_team.name,
                fixture.away_team.name,
                fixture.status.label()
            ),
        )
    };
    for team_id in [fixture.home_team.id, fixture.away_team.id] {
        notify_team(
            api,
            tx,
            team_id,
            kind,
            message.clone(),
            Some(fixture.tournament_id),
            Some(fixture.id),
        );
    }
}

/// Notifications are best-effort; a failure never blocks the save.
fn notify_team(
    api: &ApiClient,
    tx: &Sender<Delta>,
    team_id: Id,
    kind: NotificationType,
    message: String,
    tournament_id: Option<Id>,
    match_id: Option<Id>,
) {
    let draft = NewNotification {
        recipient_type: RecipientType::Team,
        recipient_id: team_id,
        kind,
        message,
        tournament_id,
        match_id,
    };
    if let Err(err) = api.send_notification(&draft) {
        debug!(error = %err, team_id, "notification not delivered");
        let _ = tx.send(Delta::Log("[WARN] Notification not delivered".to_string()));
    }
}

fn load_failed(tx: &Sender<Delta>, pane: PaneKind, err: ApiError) {
    let message = err.user_message();
    warn!(?pane, error = %err, "load failed");
    let _ = tx.send(Delta::Log(format!("[WARN] Load failed: {message}")));
    let _ = tx.send(Delta::LoadFailed { pane, message });
}

fn save_failed(tx: &Sender<Delta>, pane: PaneKind, err: ApiError) {
    let message = err.user_message();
    warn!(?pane, error = %err, "save failed");
    let _ = tx.send(Delta::Log(format!("[WARN] Save failed: {message}")));
    let _ = tx.send(Delta::SaveFailed { pane, message });
}

fn delete_failed(tx: &Sender<Delta>, pane: PaneKind, err: ApiError) {
    let message = err.user_message();
    warn!(?pane, error = %err, "delete failed");
    let _ = tx.send(Delta::Log(format!("[WARN] Delete failed: {message}")));
    let _ = tx.send(Delta::DeleteFailed { pane, message });
}
