use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::http::{ApiError, Transport};
use crate::model::{
    Id, LeaderboardEntry, LoginRequest, LoginResponse, Match, MatchPatch, NewMatch,
    NewNotification, NewParticipant, NewRegistration, NewTeam, NewTeamMember, NewTournament,
    NewVenue, Participant, ParticipantPatch, RegisterRequest, RegisterResponse, Registration,
    Team, TeamMember, TeamMemberPatch, TeamPatch, Tournament, TournamentPatch, Venue, VenuePatch,
};

/// Uniform CRUD surface per entity type. One generic implementation talks
/// REST; tests substitute in-memory fakes.
pub trait ResourceApi {
    type Entity;
    type Create;
    type Patch;

    fn list(&self) -> Result<Vec<Self::Entity>, ApiError>;
    fn get(&self, id: Id) -> Result<Self::Entity, ApiError>;
    fn create(&self, draft: &Self::Create) -> Result<Self::Entity, ApiError>;
    fn update(&self, id: Id, patch: &Self::Patch) -> Result<Self::Entity, ApiError>;
    fn delete(&self, id: Id) -> Result<(), ApiError>;
}

pub struct RestResource<'a, E, C, P> {
    transport: &'a Transport,
    base: String,
    _marker: PhantomData<(E, C, P)>,
}

impl<'a, E, C, P> RestResource<'a, E, C, P> {
    fn new(transport: &'a Transport, base: impl Into<String>) -> Self {
        Self {
            transport,
            base: base.into(),
            _marker: PhantomData,
        }
    }
}

impl<E, C, P> ResourceApi for RestResource<'_, E, C, P>
where
    E: DeserializeOwned,
    C: Serialize,
    P: Serialize,
{
    type Entity = E;
    type Create = C;
    type Patch = P;

    fn list(&self) -> Result<Vec<E>, ApiError> {
        self.transport.get_json(&self.base)
    }

    fn get(&self, id: Id) -> Result<E, ApiError> {
        self.transport.get_json(&format!("{}/{id}", self.base))
    }

    fn create(&self, draft: &C) -> Result<E, ApiError> {
        self.transport.post_json(&self.base, draft)
    }

    fn update(&self, id: Id, patch: &P) -> Result<E, ApiError> {
        self.transport.put_json(&format!("{}/{id}", self.base), patch)
    }

    fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.transport.delete(&format!("{}/{id}", self.base))
    }
}

/// Member endpoints wrap payloads in a `{success, data, message}` envelope on
/// most backends, and older ones do not serve the member routes at all.
pub struct TeamMembersApi<'a> {
    transport: &'a Transport,
    base: String,
}

impl<'a> TeamMembersApi<'a> {
    fn new(transport: &'a Transport, team_id: Id) -> Self {
        Self {
            transport,
            base: format!("/teams/{team_id}/members"),
        }
    }

    pub fn list_by_role(&self, role: &str) -> Result<Vec<TeamMember>, ApiError> {
        match self.transport.get_value(&format!("{}/role/{role}", self.base)) {
            Ok(value) => member_rows_from_value(value),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    pub fn remove_by_participant(&self, participant_id: Id) -> Result<(), ApiError> {
        self.transport
            .delete(&format!("{}/participant/{participant_id}", self.base))
    }

    /// Candidates for "add to team": same category, not already members.
    pub fn available_participants(&self) -> Result<Vec<Participant>, ApiError> {
        let value = self.transport.get_value(&format!("{}/available", self.base))?;
        match unwrap_envelope(value) {
            Value::Array(rows) => Ok(serde_json::from_value(Value::Array(rows))?),
            Value::Null => Ok(Vec::new()),
            _ => Ok(Vec::new()),
        }
    }
}

impl ResourceApi for TeamMembersApi<'_> {
    type Entity = TeamMember;
    type Create = NewTeamMember;
    type Patch = TeamMemberPatch;

    fn list(&self) -> Result<Vec<TeamMember>, ApiError> {
        match self.transport.get_value(&self.base) {
            Ok(value) => member_rows_from_value(value),
            // Member routes may not exist yet; treat as an empty roster.
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    fn get(&self, id: Id) -> Result<TeamMember, ApiError> {
        let value = self.transport.get_value(&format!("{}/{id}", self.base))?;
        member_from_value(value)
    }

    fn create(&self, draft: &NewTeamMember) -> Result<TeamMember, ApiError> {
        let value = self.transport.post_value(&self.base, draft)?;
        member_from_value(value)
    }

    fn update(&self, id: Id, patch: &TeamMemberPatch) -> Result<TeamMember, ApiError> {
        let value = self
            .transport
            .put_value(&format!("{}/{id}", self.base), patch)?;
        member_from_value(value)
    }

    fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.transport.delete(&format!("{}/{id}", self.base))
    }
}

pub struct MatchesApi<'a> {
    transport: &'a Transport,
    base: String,
}

impl<'a> MatchesApi<'a> {
    fn new(transport: &'a Transport, tournament_id: Id) -> Self {
        Self {
            transport,
            base: format!("/tournaments/{tournament_id}/matches"),
        }
    }
}

impl ResourceApi for MatchesApi<'_> {
    type Entity = Match;
    type Create = NewMatch;
    type Patch = MatchPatch;

    fn list(&self) -> Result<Vec<Match>, ApiError> {
        self.transport.get_json(&self.base)
    }

    fn get(&self, id: Id) -> Result<Match, ApiError> {
        self.transport.get_json(&format!("{}/{id}", self.base))
    }

    fn create(&self, draft: &NewMatch) -> Result<Match, ApiError> {
        self.transport.post_json(&self.base, draft)
    }

    fn update(&self, id: Id, patch: &MatchPatch) -> Result<Match, ApiError> {
        self.transport.put_json(&format!("{}/{id}", self.base), patch)
    }

    // Deletion is not tournament-scoped on the backend.
    fn delete(&self, id: Id) -> Result<(), ApiError> {
        self.transport.delete(&format!("/matches/{id}"))
    }
}

/// Registrations break the uniform id contract: updates go by registration
/// id, withdrawal by team id.
pub struct RegistrationsApi<'a> {
    transport: &'a Transport,
    base: String,
}

impl<'a> RegistrationsApi<'a> {
    fn new(transport: &'a Transport, tournament_id: Id) -> Self {
        Self {
            transport,
            base: format!("/tournaments/{tournament_id}/registrations"),
        }
    }

    pub fn list(&self) -> Result<Vec<Registration>, ApiError> {
        self.transport.get_json(&self.base)
    }

    pub fn invite(&self, draft: &NewRegistration) -> Result<Registration, ApiError> {
        self.transport.post_json(&self.base, draft)
    }

    pub fn update(
        &self,
        registration_id: Id,
        draft: &NewRegistration,
    ) -> Result<Registration, ApiError> {
        self.transport
            .put_json(&format!("{}/{registration_id}", self.base), draft)
    }

    pub fn withdraw(&self, team_id: Id) -> Result<(), ApiError> {
        self.transport.delete(&format!("{}/{team_id}", self.base))
    }
}

pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            transport: Transport::new(config.base_url.clone(), config.request_timeout),
        }
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.transport.set_token(token);
    }

    pub fn tournaments(&self) -> RestResource<'_, Tournament, NewTournament, TournamentPatch> {
        RestResource::new(&self.transport, "/tournaments")
    }

    pub fn teams(&self) -> RestResource<'_, Team, NewTeam, TeamPatch> {
        RestResource::new(&self.transport, "/teams")
    }

    pub fn participants(&self) -> RestResource<'_, Participant, NewParticipant, ParticipantPatch> {
        RestResource::new(&self.transport, "/participants")
    }

    pub fn venues(&self) -> RestResource<'_, Venue, NewVenue, VenuePatch> {
        RestResource::new(&self.transport, "/venues")
    }

    pub fn members(&self, team_id: Id) -> TeamMembersApi<'_> {
        TeamMembersApi::new(&self.transport, team_id)
    }

    pub fn matches(&self, tournament_id: Id) -> MatchesApi<'_> {
        MatchesApi::new(&self.transport, tournament_id)
    }

    pub fn registrations(&self, tournament_id: Id) -> RegistrationsApi<'_> {
        RegistrationsApi::new(&self.transport, tournament_id)
    }

    pub fn leaderboard(&self, tournament_id: Id) -> Result<Vec<LeaderboardEntry>, ApiError> {
        self.transport
            .get_json(&format!("/tournaments/{tournament_id}/leaderboard"))
    }

    /// Fire-and-forget: callers only care whether the request went through.
    pub fn send_notification(&self, draft: &NewNotification) -> Result<(), ApiError> {
        self.transport.post_value("/notifications", draft)?;
        Ok(())
    }

    pub fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        self.transport.post_json("/auth/login", request)
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.transport.post_json("/auth/register", request)
    }
}

/// Strips `{success, data, message}` wrappers, including the doubled
/// `data.data` form some backends produce.
pub fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(inner) => unwrap_envelope(inner),
            None => Value::Object(map),
        },
        other => other,
    }
}

pub fn member_rows_from_value(value: Value) -> Result<Vec<TeamMember>, ApiError> {
    match unwrap_envelope(value) {
        Value::Array(rows) => Ok(serde_json::from_value(Value::Array(rows))?),
        Value::Null => Ok(Vec::new()),
        _ => Ok(Vec::new()),
    }
}

pub fn member_from_value(value: Value) -> Result<TeamMember, ApiError> {
    Ok(serde_json::from_value(unwrap_envelope(value))?)
}
