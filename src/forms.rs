use crate::model::{
    Id, LoginRequest, Match, MatchPatch, MatchStatus, NewMatch, NewParticipant, NewRegistration,
    NewTeam, NewTeamMember, NewTournament, NewVenue, Participant, ParticipantPatch,
    RegisterRequest, Registration, RegistrationStatus, Team, TeamCategory, TeamMember,
    TeamMemberPatch, TeamPatch, Tournament, TournamentPatch, TournamentStatus, UserRole, Venue,
    VenuePatch, parse_datetime,
};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

/// What a submitted form turns into: a fresh entity or a patch against an
/// existing id. The worker picks the endpoint from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOp<C, P> {
    Create(C),
    Update(Id, P),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub id: Id,
    pub label: String,
}

/// Shared editing surface so one key handler drives every popup. Fields are
/// addressed by index; `cycle` is for enum and selector fields.
pub trait Form {
    fn field_count(&self) -> usize;
    fn focus(&self) -> usize;
    fn focus_mut(&mut self) -> &mut usize;
    fn label(&self, field: usize) -> &'static str;
    fn display(&self, field: usize) -> String;
    fn insert_char(&mut self, c: char);
    fn backspace(&mut self);
    fn cycle(&mut self, step: i8);

    fn next_field(&mut self) {
        let count = self.field_count();
        let focus = self.focus_mut();
        *focus = (*focus + 1) % count;
    }

    fn prev_field(&mut self) {
        let count = self.field_count();
        let focus = self.focus_mut();
        *focus = (*focus + count - 1) % count;
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn required(value: &str, field: &str) -> Result<String, ValidationError> {
    non_empty(value).ok_or_else(|| ValidationError(format!("{field} is required")))
}

fn required_date(value: &str, field: &str) -> Result<String, ValidationError> {
    let trimmed = required(value, field)?;
    if parse_datetime(&trimmed).is_none() {
        return Err(ValidationError(format!(
            "{field} is not a recognized date (try 2026-06-01T18:00)"
        )));
    }
    Ok(trimmed)
}

fn required_email(value: &str, field: &str) -> Result<String, ValidationError> {
    let trimmed = required(value, field)?;
    if !trimmed.contains('@') {
        return Err(ValidationError(format!("{field} does not look like an email")));
    }
    Ok(trimmed)
}

fn optional_number(value: &str, field: &str) -> Result<Option<u32>, ValidationError> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ValidationError(format!("{field} must be a number"))),
    }
}

fn cycle_choice<T: Copy + PartialEq>(all: &[T], current: T, step: i8) -> T {
    let len = all.len() as isize;
    let pos = all.iter().position(|v| *v == current).unwrap_or(0) as isize;
    all[(pos + step as isize).rem_euclid(len) as usize]
}

fn cycle_selection(current: Option<usize>, len: usize, step: i8) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match current {
        None => Some(if step >= 0 { 0 } else { len - 1 }),
        Some(idx) => Some((idx as isize + step as isize).rem_euclid(len as isize) as usize),
    }
}

fn selected_id(options: &[SelectOption], index: Option<usize>) -> Option<Id> {
    index.and_then(|i| options.get(i)).map(|o| o.id)
}

fn selection_label(options: &[SelectOption], index: Option<usize>) -> String {
    match index.and_then(|i| options.get(i)) {
        Some(option) => format!("< {} >", option.label),
        None => "< select >".to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TournamentForm {
    pub editing_id: Option<Id>,
    pub focus: usize,
    pub name: String,
    pub sport_type: String,
    pub start_date: String,
    pub end_date: String,
    pub location: String,
    pub status: TournamentStatus,
    pub rules: String,
}

impl TournamentForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn for_edit(tournament: &Tournament) -> Self {
        Self {
            editing_id: Some(tournament.id),
            focus: 0,
            name: tournament.name.clone(),
            sport_type: tournament.sport_type.clone(),
            start_date: tournament.start_date.clone(),
            end_date: tournament.end_date.clone(),
            location: tournament.location.clone().unwrap_or_default(),
            status: tournament.status,
            rules: tournament.rules.clone().unwrap_or_default(),
        }
    }

    pub fn save_op(&self) -> Result<SaveOp<NewTournament, TournamentPatch>, ValidationError> {
        let name = required(&self.name, "name")?;
        let sport_type = required(&self.sport_type, "sport type")?;
        let start_date = required_date(&self.start_date, "start date")?;
        let end_date = required_date(&self.end_date, "end date")?;
        let location = non_empty(&self.location);
        let rules = non_empty(&self.rules);
        Ok(match self.editing_id {
            None => SaveOp::Create(NewTournament {
                name,
                sport_type,
                start_date,
                end_date,
                location,
                status: self.status,
                rules,
            }),
            Some(id) => SaveOp::Update(
                id,
                TournamentPatch {
                    name: Some(name),
                    sport_type: Some(sport_type),
                    start_date: Some(start_date),
                    end_date: Some(end_date),
                    location,
                    status: Some(self.status),
                    rules,
                },
            ),
        })
    }
}

impl Form for TournamentForm {
    fn field_count(&self) -> usize {
        7
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Name",
            1 => "Sport",
            2 => "Start",
            3 => "End",
            4 => "Location",
            5 => "Status",
            6 => "Rules",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 => self.name.clone(),
            1 => self.sport_type.clone(),
            2 => self.start_date.clone(),
            3 => self.end_date.clone(),
            4 => self.location.clone(),
            5 => format!("< {} >", self.status.label()),
            6 => self.rules.clone(),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        match self.focus {
            0 => self.name.push(c),
            1 => self.sport_type.push(c),
            2 => self.start_date.push(c),
            3 => self.end_date.push(c),
            4 => self.location.push(c),
            6 => self.rules.push(c),
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            0 => {
                self.name.pop();
            }
            1 => {
                self.sport_type.pop();
            }
            2 => {
                self.start_date.pop();
            }
            3 => {
                self.end_date.pop();
            }
            4 => {
                self.location.pop();
            }
            6 => {
                self.rules.pop();
            }
            _ => {}
        }
    }

    fn cycle(&mut self, step: i8) {
        if self.focus == 5 {
            self.status = cycle_choice(&TournamentStatus::ALL, self.status, step);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeamForm {
    pub editing_id: Option<Id>,
    pub focus: usize,
    pub name: String,
    pub category: TeamCategory,
}

impl TeamForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn for_edit(team: &Team) -> Self {
        Self {
            editing_id: Some(team.id),
            focus: 0,
            name: team.name.clone(),
            category: team.category,
        }
    }

    pub fn save_op(&self) -> Result<SaveOp<NewTeam, TeamPatch>, ValidationError> {
        let name = required(&self.name, "name")?;
        Ok(match self.editing_id {
            None => SaveOp::Create(NewTeam {
                name,
                category: self.category,
            }),
            Some(id) => SaveOp::Update(
                id,
                TeamPatch {
                    name: Some(name),
                    category: Some(self.category),
                },
            ),
        })
    }
}

impl Form for TeamForm {
    fn field_count(&self) -> usize {
        2
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Name",
            1 => "Category",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 => self.name.clone(),
            1 => format!("< {} >", self.category.label()),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        if self.focus == 0 {
            self.name.push(c);
        }
    }

    fn backspace(&mut self) {
        if self.focus == 0 {
            self.name.pop();
        }
    }

    fn cycle(&mut self, step: i8) {
        if self.focus == 1 {
            self.category = cycle_choice(&TeamCategory::ALL, self.category, step);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParticipantForm {
    pub editing_id: Option<Id>,
    pub focus: usize,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub category: TeamCategory,
}

impl ParticipantForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn for_edit(participant: &Participant) -> Self {
        Self {
            editing_id: Some(participant.id),
            focus: 0,
            first_name: participant.first_name.clone(),
            last_name: participant.last_name.clone(),
            email: participant.email.clone(),
            category: participant.category,
        }
    }

    pub fn save_op(&self) -> Result<SaveOp<NewParticipant, ParticipantPatch>, ValidationError> {
        let first_name = required(&self.first_name, "first name")?;
        let last_name = required(&self.last_name, "last name")?;
        let email = required_email(&self.email, "email")?;
        Ok(match self.editing_id {
            None => SaveOp::Create(NewParticipant {
                first_name,
                last_name,
                email,
                category: self.category,
            }),
            Some(id) => SaveOp::Update(
                id,
                ParticipantPatch {
                    first_name: Some(first_name),
                    last_name: Some(last_name),
                    email: Some(email),
                    category: Some(self.category),
                },
            ),
        })
    }
}

impl Form for ParticipantForm {
    fn field_count(&self) -> usize {
        4
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "First name",
            1 => "Last name",
            2 => "Email",
            3 => "Category",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 => self.first_name.clone(),
            1 => self.last_name.clone(),
            2 => self.email.clone(),
            3 => format!("< {} >", self.category.label()),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        match self.focus {
            0 => self.first_name.push(c),
            1 => self.last_name.push(c),
            2 => self.email.push(c),
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            0 => {
                self.first_name.pop();
            }
            1 => {
                self.last_name.pop();
            }
            2 => {
                self.email.pop();
            }
            _ => {}
        }
    }

    fn cycle(&mut self, step: i8) {
        if self.focus == 3 {
            self.category = cycle_choice(&TeamCategory::ALL, self.category, step);
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VenueForm {
    pub editing_id: Option<Id>,
    pub focus: usize,
    pub name: String,
    pub address: String,
    pub capacity: String,
}

impl VenueForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn for_edit(venue: &Venue) -> Self {
        Self {
            editing_id: Some(venue.id),
            focus: 0,
            name: venue.name.clone(),
            address: venue.address.clone().unwrap_or_default(),
            capacity: venue.capacity.map(|c| c.to_string()).unwrap_or_default(),
        }
    }

    pub fn save_op(&self) -> Result<SaveOp<NewVenue, VenuePatch>, ValidationError> {
        let name = required(&self.name, "name")?;
        let address = non_empty(&self.address);
        let capacity = optional_number(&self.capacity, "capacity")?;
        Ok(match self.editing_id {
            None => SaveOp::Create(NewVenue {
                name,
                address,
                capacity,
            }),
            Some(id) => SaveOp::Update(
                id,
                VenuePatch {
                    name: Some(name),
                    address,
                    capacity,
                },
            ),
        })
    }
}

impl Form for VenueForm {
    fn field_count(&self) -> usize {
        3
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Name",
            1 => "Address",
            2 => "Capacity",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 => self.name.clone(),
            1 => self.address.clone(),
            2 => self.capacity.clone(),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        match self.focus {
            0 => self.name.push(c),
            1 => self.address.push(c),
            2 => {
                if c.is_ascii_digit() {
                    self.capacity.push(c);
                }
            }
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            0 => {
                self.name.pop();
            }
            1 => {
                self.address.pop();
            }
            2 => {
                self.capacity.pop();
            }
            _ => {}
        }
    }

    fn cycle(&mut self, _step: i8) {}
}

/// Match editing has asymmetric rules: creating picks the pairing but not
/// scores, editing adjusts scores and status but the pairing is fixed.
#[derive(Debug, Clone, Default)]
pub struct MatchForm {
    pub editing_id: Option<Id>,
    pub focus: usize,
    pub team_options: Vec<SelectOption>,
    pub venue_options: Vec<SelectOption>,
    pub home: Option<usize>,
    pub away: Option<usize>,
    pub venue: Option<usize>,
    pub scheduled_at: String,
    pub status: MatchStatus,
    pub home_score: String,
    pub away_score: String,
}

impl MatchForm {
    pub fn blank(team_options: Vec<SelectOption>, venue_options: Vec<SelectOption>) -> Self {
        Self {
            team_options,
            venue_options,
            ..Self::default()
        }
    }

    pub fn for_edit(
        fixture: &Match,
        team_options: Vec<SelectOption>,
        venue_options: Vec<SelectOption>,
    ) -> Self {
        let home = team_options.iter().position(|o| o.id == fixture.home_team.id);
        let away = team_options.iter().position(|o| o.id == fixture.away_team.id);
        let venue = venue_options.iter().position(|o| o.id == fixture.venue.id);
        Self {
            editing_id: Some(fixture.id),
            focus: 0,
            team_options,
            venue_options,
            home,
            away,
            venue,
            scheduled_at: fixture.scheduled_at.clone(),
            status: fixture.status,
            home_score: fixture.home_score.map(|s| s.to_string()).unwrap_or_default(),
            away_score: fixture.away_score.map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    pub fn locked(&self, field: usize) -> bool {
        match field {
            0 | 1 | 2 => self.editing_id.is_some(),
            5 | 6 => self.editing_id.is_none(),
            _ => false,
        }
    }

    pub fn save_op(&self) -> Result<SaveOp<NewMatch, MatchPatch>, ValidationError> {
        let home = selected_id(&self.team_options, self.home);
        let away = selected_id(&self.team_options, self.away);
        let venue = selected_id(&self.venue_options, self.venue);
        let when = non_empty(&self.scheduled_at);

        let mut missing = Vec::new();
        if home.is_none() {
            missing.push("home team");
        }
        if away.is_none() {
            missing.push("away team");
        }
        if venue.is_none() {
            missing.push("venue");
        }
        if when.is_none() {
            missing.push("kickoff time");
        }
        if !missing.is_empty() {
            return Err(ValidationError(format!("missing {}", missing.join(", "))));
        }
        let (Some(home), Some(away), Some(venue), Some(when)) = (home, away, venue, when) else {
            return Err(ValidationError("missing required fields".into()));
        };
        if home == away {
            return Err(ValidationError("home and away team must differ".into()));
        }
        if parse_datetime(&when).is_none() {
            return Err(ValidationError(
                "kickoff time is not a recognized date (try 2026-06-01T18:00)".into(),
            ));
        }

        Ok(match self.editing_id {
            None => SaveOp::Create(NewMatch {
                home_team_id: home,
                away_team_id: away,
                venue_id: venue,
                scheduled_at: when,
                status: self.status,
            }),
            Some(id) => SaveOp::Update(
                id,
                MatchPatch {
                    home_team_id: None,
                    away_team_id: None,
                    venue_id: None,
                    scheduled_at: Some(when),
                    status: Some(self.status),
                    home_score: optional_number(&self.home_score, "home score")?,
                    away_score: optional_number(&self.away_score, "away score")?,
                },
            ),
        })
    }
}

impl Form for MatchForm {
    fn field_count(&self) -> usize {
        7
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Home team",
            1 => "Away team",
            2 => "Venue",
            3 => "Kickoff",
            4 => "Status",
            5 => "Home score",
            6 => "Away score",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        let plain = |options: &[SelectOption], index: Option<usize>| {
            index
                .and_then(|i| options.get(i))
                .map(|o| o.label.clone())
                .unwrap_or_else(|| "-".to_string())
        };
        match field {
            0 if self.locked(0) => plain(&self.team_options, self.home),
            0 => selection_label(&self.team_options, self.home),
            1 if self.locked(1) => plain(&self.team_options, self.away),
            1 => selection_label(&self.team_options, self.away),
            2 if self.locked(2) => plain(&self.venue_options, self.venue),
            2 => selection_label(&self.venue_options, self.venue),
            3 => self.scheduled_at.clone(),
            4 => format!("< {} >", self.status.label()),
            5 if self.locked(5) => "-".to_string(),
            5 => self.home_score.clone(),
            6 if self.locked(6) => "-".to_string(),
            6 => self.away_score.clone(),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        if self.locked(self.focus) {
            return;
        }
        match self.focus {
            3 => self.scheduled_at.push(c),
            5 => {
                if c.is_ascii_digit() {
                    self.home_score.push(c);
                }
            }
            6 => {
                if c.is_ascii_digit() {
                    self.away_score.push(c);
                }
            }
            _ => {}
        }
    }

    fn backspace(&mut self) {
        if self.locked(self.focus) {
            return;
        }
        match self.focus {
            3 => {
                self.scheduled_at.pop();
            }
            5 => {
                self.home_score.pop();
            }
            6 => {
                self.away_score.pop();
            }
            _ => {}
        }
    }

    fn cycle(&mut self, step: i8) {
        if self.locked(self.focus) {
            return;
        }
        match self.focus {
            0 => self.home = cycle_selection(self.home, self.team_options.len(), step),
            1 => self.away = cycle_selection(self.away, self.team_options.len(), step),
            2 => self.venue = cycle_selection(self.venue, self.venue_options.len(), step),
            4 => self.status = cycle_choice(&MatchStatus::ALL, self.status, step),
            _ => {}
        }
    }
}

/// Registration updates go by registration id while the payload stays the
/// create shape, so both `SaveOp` arms carry `NewRegistration`.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub editing_id: Option<Id>,
    pub focus: usize,
    pub team_options: Vec<SelectOption>,
    pub team: Option<usize>,
    pub status: RegistrationStatus,
}

impl RegistrationForm {
    pub fn blank(team_options: Vec<SelectOption>) -> Self {
        Self {
            team_options,
            ..Self::default()
        }
    }

    /// Registrations created by older backends arrive without an id and
    /// cannot be edited in place.
    pub fn for_edit(registration: &Registration, team_options: Vec<SelectOption>) -> Option<Self> {
        let editing_id = registration.id?;
        let team = team_options
            .iter()
            .position(|o| o.id == registration.team_id);
        Some(Self {
            editing_id: Some(editing_id),
            focus: 0,
            team_options,
            team,
            status: registration.status,
        })
    }

    pub fn locked(&self, field: usize) -> bool {
        field == 0 && self.editing_id.is_some()
    }

    pub fn save_op(&self) -> Result<SaveOp<NewRegistration, NewRegistration>, ValidationError> {
        let Some(team_id) = selected_id(&self.team_options, self.team) else {
            return Err(ValidationError("select a team".into()));
        };
        let draft = NewRegistration {
            team_id,
            status: self.status,
        };
        Ok(match self.editing_id {
            None => SaveOp::Create(draft),
            Some(id) => SaveOp::Update(id, draft),
        })
    }
}

impl Form for RegistrationForm {
    fn field_count(&self) -> usize {
        2
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Team",
            1 => "Status",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 if self.locked(0) => self
                .team
                .and_then(|i| self.team_options.get(i))
                .map(|o| o.label.clone())
                .unwrap_or_else(|| "-".to_string()),
            0 => selection_label(&self.team_options, self.team),
            1 => format!("< {} >", self.status.label()),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, _c: char) {}

    fn backspace(&mut self) {}

    fn cycle(&mut self, step: i8) {
        if self.locked(self.focus) {
            return;
        }
        match self.focus {
            0 => self.team = cycle_selection(self.team, self.team_options.len(), step),
            1 => self.status = cycle_choice(&RegistrationStatus::ALL, self.status, step),
            _ => {}
        }
    }
}

/// Add-to-roster popup: a search box narrows the candidate list, the
/// selection cycles within whatever currently matches.
#[derive(Debug, Clone, Default)]
pub struct MemberAddForm {
    pub focus: usize,
    pub query: String,
    pub selected: usize,
    pub role: String,
    pub jersey: String,
}

impl MemberAddForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn draft(&self, filtered: &[&Participant]) -> Result<NewTeamMember, ValidationError> {
        if filtered.is_empty() {
            return Err(ValidationError("no matching participant".into()));
        }
        let candidate = filtered[self.selected.min(filtered.len() - 1)];
        Ok(NewTeamMember {
            participant_id: candidate.id,
            role: non_empty(&self.role),
            jersey_number: optional_number(&self.jersey, "jersey number")?,
        })
    }
}

impl Form for MemberAddForm {
    fn field_count(&self) -> usize {
        4
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Search",
            1 => "Candidate",
            2 => "Role",
            3 => "Jersey",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 => self.query.clone(),
            2 => self.role.clone(),
            3 => self.jersey.clone(),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        match self.focus {
            0 => {
                self.query.push(c);
                self.selected = 0;
            }
            2 => self.role.push(c),
            3 => {
                if c.is_ascii_digit() {
                    self.jersey.push(c);
                }
            }
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            0 => {
                self.query.pop();
                self.selected = 0;
            }
            2 => {
                self.role.pop();
            }
            3 => {
                self.jersey.pop();
            }
            _ => {}
        }
    }

    // The candidate list length lives outside the form; the caller clamps.
    fn cycle(&mut self, step: i8) {
        if self.focus == 1 {
            if step >= 0 {
                self.selected = self.selected.saturating_add(1);
            } else {
                self.selected = self.selected.saturating_sub(1);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberEditForm {
    pub member_id: Id,
    pub focus: usize,
    pub role: String,
    pub jersey: String,
}

impl MemberEditForm {
    pub fn for_edit(member: &TeamMember) -> Self {
        Self {
            member_id: member.id,
            focus: 0,
            role: member.role.clone().unwrap_or_default(),
            jersey: member.jersey_number.map(|n| n.to_string()).unwrap_or_default(),
        }
    }

    pub fn patch(&self) -> Result<TeamMemberPatch, ValidationError> {
        Ok(TeamMemberPatch {
            role: non_empty(&self.role),
            jersey_number: optional_number(&self.jersey, "jersey number")?,
        })
    }
}

impl Form for MemberEditForm {
    fn field_count(&self) -> usize {
        2
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match field {
            0 => "Role",
            1 => "Jersey",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match field {
            0 => self.role.clone(),
            1 => self.jersey.clone(),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        match self.focus {
            0 => self.role.push(c),
            1 => {
                if c.is_ascii_digit() {
                    self.jersey.push(c);
                }
            }
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match self.focus {
            0 => {
                self.role.pop();
            }
            1 => {
                self.jersey.pop();
            }
            _ => {}
        }
    }

    fn cycle(&mut self, _step: i8) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

/// Sign-in screen with two tabs sharing one focus order; field 0 is the tab
/// switch itself.
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub tab: AuthTab,
    pub focus: usize,
    pub email: String,
    pub password: String,
    pub reg_name: String,
    pub reg_email: String,
    pub reg_password: String,
    pub reg_role: UserRole,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub busy: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn login_request(&self) -> Result<LoginRequest, ValidationError> {
        let email = required_email(&self.email, "email")?;
        if self.password.is_empty() {
            return Err(ValidationError("password is required".into()));
        }
        Ok(LoginRequest {
            email,
            password: self.password.clone(),
        })
    }

    pub fn register_request(&self) -> Result<RegisterRequest, ValidationError> {
        let name = required(&self.reg_name, "name")?;
        let email = required_email(&self.reg_email, "email")?;
        if self.reg_password.is_empty() {
            return Err(ValidationError("password is required".into()));
        }
        Ok(RegisterRequest {
            name,
            email,
            password: self.reg_password.clone(),
            role: self.reg_role,
        })
    }
}

fn masked(value: &str) -> String {
    "*".repeat(value.chars().count())
}

impl Form for LoginForm {
    fn field_count(&self) -> usize {
        match self.tab {
            AuthTab::Login => 3,
            AuthTab::Register => 5,
        }
    }

    fn focus(&self) -> usize {
        self.focus
    }

    fn focus_mut(&mut self) -> &mut usize {
        &mut self.focus
    }

    fn label(&self, field: usize) -> &'static str {
        match (self.tab, field) {
            (_, 0) => "Mode",
            (AuthTab::Login, 1) => "Email",
            (AuthTab::Login, 2) => "Password",
            (AuthTab::Register, 1) => "Name",
            (AuthTab::Register, 2) => "Email",
            (AuthTab::Register, 3) => "Password",
            (AuthTab::Register, 4) => "Role",
            _ => "",
        }
    }

    fn display(&self, field: usize) -> String {
        match (self.tab, field) {
            (AuthTab::Login, 0) => "< sign in >".to_string(),
            (AuthTab::Register, 0) => "< register >".to_string(),
            (AuthTab::Login, 1) => self.email.clone(),
            (AuthTab::Login, 2) => masked(&self.password),
            (AuthTab::Register, 1) => self.reg_name.clone(),
            (AuthTab::Register, 2) => self.reg_email.clone(),
            (AuthTab::Register, 3) => masked(&self.reg_password),
            (AuthTab::Register, 4) => format!("< {} >", self.reg_role.label()),
            _ => String::new(),
        }
    }

    fn insert_char(&mut self, c: char) {
        match (self.tab, self.focus) {
            (AuthTab::Login, 1) => self.email.push(c),
            (AuthTab::Login, 2) => self.password.push(c),
            (AuthTab::Register, 1) => self.reg_name.push(c),
            (AuthTab::Register, 2) => self.reg_email.push(c),
            (AuthTab::Register, 3) => self.reg_password.push(c),
            _ => {}
        }
    }

    fn backspace(&mut self) {
        match (self.tab, self.focus) {
            (AuthTab::Login, 1) => {
                self.email.pop();
            }
            (AuthTab::Login, 2) => {
                self.password.pop();
            }
            (AuthTab::Register, 1) => {
                self.reg_name.pop();
            }
            (AuthTab::Register, 2) => {
                self.reg_email.pop();
            }
            (AuthTab::Register, 3) => {
                self.reg_password.pop();
            }
            _ => {}
        }
    }

    fn cycle(&mut self, step: i8) {
        match (self.tab, self.focus) {
            (_, 0) => {
                self.tab = match self.tab {
                    AuthTab::Login => AuthTab::Register,
                    AuthTab::Register => AuthTab::Login,
                };
                self.error = None;
            }
            (AuthTab::Register, 4) => {
                self.reg_role = cycle_choice(&UserRole::ALL, self.reg_role, step);
            }
            _ => {}
        }
    }
}
