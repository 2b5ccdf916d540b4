//! Turn state machine.
//!
//! A `Session` owns one match: the board, four player accounts, the
//! development deck and the active `Phase`. Every command goes through
//! `Session::apply`, which hands it to the current phase. A rejected command
//! leaves the session exactly as it was.

use crate::actions::{Command, Event, Outbound};
use crate::board::{Award, Board, Piece, PlayerId, Resource, Stage};
use crate::hex::{TileCoord, VertexCoord};
use crate::player::{DevelopmentCard, Player, ResourceHand};
use crate::roads;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Seats in a match
pub const PLAYER_COUNT: usize = 4;

/// Victory points needed to win
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Hands above this size lose half on a 7
pub const DISCARD_LIMIT: u32 = 7;

/// Free roads granted by Road Building
const FREE_ROADS: u32 = 2;

/// Why a command was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Not your turn")]
    OutOfTurn,

    #[error("Invalid placement location")]
    InvalidPlacement,

    #[error("Not enough resources or pieces")]
    InsufficientResources,

    #[error("No development cards left in deck")]
    EmptyDeck,

    #[error("Cannot play that card now")]
    InvalidCardPlay,

    #[error("Invalid trade offer")]
    InvalidOffer,

    #[error("Invalid trade confirmation")]
    InvalidConfirm,

    #[error("Invalid discard")]
    InvalidDiscard,

    #[error("Invalid robber move")]
    InvalidRobberMove,

    #[error("Invalid steal target")]
    InvalidSteal,

    #[error("Command not recognized in this phase")]
    UnknownCommand,

    #[error("Game is over")]
    GameOver,
}

impl GameError {
    /// Short reason sent to the client in an `error` event
    pub fn reason(&self) -> &'static str {
        match self {
            GameError::OutOfTurn => "turn",
            GameError::InvalidPlacement | GameError::InsufficientResources => "build",
            GameError::EmptyDeck | GameError::InvalidCardPlay => "card",
            GameError::InvalidOffer => "offer",
            GameError::InvalidConfirm => "confirm",
            GameError::InvalidDiscard => "discard",
            GameError::InvalidRobberMove => "robber",
            GameError::InvalidSteal => "steal",
            GameError::UnknownCommand => "message",
            GameError::GameOver => "ended",
        }
    }
}

/// Direction of the opening snake draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Forward,
    Reverse,
}

/// Opening placement progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetupState {
    pub pass: Pass,
    /// Town, then the road that must touch it
    pub placing: Piece,
    /// The town just placed
    pub anchor: Option<VertexCoord>,
}

impl SetupState {
    fn start_of(pass: Pass) -> Self {
        Self {
            pass,
            placing: Piece::Town,
            anchor: None,
        }
    }
}

/// Per-turn bookkeeping, kept across trade and robber interludes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnState {
    /// A non-VP development card was played this turn
    pub card_played: bool,
    /// Roads left from Road Building
    pub free_roads: u32,
}

/// Robber interlude progress
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RobberState {
    /// Cards each over-limit player still owes
    pub discards: BTreeMap<PlayerId, u32>,
    pub moved: bool,
    /// Steal candidates around the robber's new tile
    pub targets: Vec<PlayerId>,
    pub stolen: bool,
}

impl RobberState {
    fn new(discards: BTreeMap<PlayerId, u32>) -> Self {
        Self {
            discards,
            ..Self::default()
        }
    }

    fn is_resolved(&self) -> bool {
        self.discards.is_empty() && self.moved && self.stolen
    }
}

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Opening placements in snake order
    Setup(SetupState),
    /// Main loop for the player whose turn it is
    Play(TurnState),
    /// Trade suspended over play; any player may put up an offer
    Trade {
        turn: TurnState,
        offers: BTreeMap<PlayerId, ResourceHand>,
    },
    /// Discards, robber move and steal, suspended over play
    Robber { turn: TurnState, robber: RobberState },
    /// Terminal
    Victory { winner: PlayerId },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Setup(_) => "setup",
            Phase::Play(_) => "play",
            Phase::Trade { .. } => "trade",
            Phase::Robber { .. } => "robber",
            Phase::Victory { .. } => "victory",
        }
    }
}

/// Result of a phase accepting a command
struct Transition {
    events: Vec<Outbound>,
    next: Phase,
}

impl Transition {
    fn new(events: Vec<Outbound>, next: Phase) -> Self {
        Self { events, next }
    }
}

/// One match
#[derive(Debug, Clone)]
pub struct Session {
    board: Board,
    players: Vec<Player>,
    turn: PlayerId,
    /// Seat that won the opening roll
    first: PlayerId,
    phase: Phase,
    deck: Vec<DevelopmentCard>,
    dice: Option<[u8; 2]>,
    rng: StdRng,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a match seeded from OS entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a reproducible match
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(mut rng: StdRng) -> Self {
        let board = Board::generate(&mut rng);
        let deck = DevelopmentCard::shuffled_deck(&mut rng);
        let first = opening_roll(&mut rng);
        info!(first, "match created");

        Self {
            board,
            players: (0..PLAYER_COUNT as PlayerId).map(Player::new).collect(),
            turn: first,
            first,
            phase: Phase::Setup(SetupState::start_of(Pass::Forward)),
            deck,
            dice: None,
            rng,
        }
    }

    // ==================== Accessors ====================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(usize::from(id))
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Whose turn it is
    pub fn turn(&self) -> PlayerId {
        self.turn
    }

    /// Seat that opened the setup round
    pub fn first(&self) -> PlayerId {
        self.first
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The most recent roll
    pub fn dice(&self) -> Option<[u8; 2]> {
        self.dice
    }

    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    pub fn winner(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::Victory { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }

    /// Towns, cities, VP cards (pending included) and both bonuses
    pub fn victory_points(&self, player: PlayerId) -> u32 {
        let Some(account) = self.player(player) else {
            return 0;
        };
        let bonus = |award: Award| if award.owner == Some(player) { 2 } else { 0 };
        self.board.building_points(player)
            + account.victory_cards()
            + bonus(self.board.longest_road())
            + bonus(self.board.largest_army())
    }

    /// Messages every seat receives when the match opens
    pub fn start_messages(&self) -> Vec<Outbound> {
        let board = self.board.snapshot();
        let mut messages: Vec<Outbound> = (0..PLAYER_COUNT as PlayerId)
            .map(|player| {
                Outbound::to(
                    player,
                    Event::Start {
                        board: board.clone(),
                        player,
                    },
                )
            })
            .collect();
        messages.push(Outbound::all(Event::Turn {
            player: self.turn,
            dice: None,
            setup_complete: false,
        }));
        messages.extend(self.all_resources());
        messages
    }

    // ==================== Command Dispatch ====================

    /// Apply a command, folding any rejection into an `error` event for the
    /// sender.
    pub fn handle(&mut self, player: PlayerId, command: Command) -> Vec<Outbound> {
        self.apply(player, command)
            .unwrap_or_else(|err| vec![Outbound::to(player, Event::error(&err))])
    }

    /// Parse and apply a JSON command
    pub fn handle_json(&mut self, player: PlayerId, text: &str) -> Vec<Outbound> {
        match Command::from_json(text) {
            Ok(command) => self.handle(player, command),
            Err(err) => vec![Outbound::to(player, Event::error(&err))],
        }
    }

    /// Apply a command from `player`.
    ///
    /// On success returns the events to deliver. On failure nothing about the
    /// session has changed.
    pub fn apply(&mut self, player: PlayerId, command: Command) -> Result<Vec<Outbound>, GameError> {
        if usize::from(player) >= self.players.len() {
            return Err(GameError::OutOfTurn);
        }
        let kind = command.kind();

        let result = match self.phase.clone() {
            Phase::Setup(state) => self.handle_setup(state, player, command),
            Phase::Play(turn) => self.handle_play(turn, player, command),
            Phase::Trade { turn, offers } => self.handle_trade(turn, offers, player, command),
            Phase::Robber { turn, robber } => self.handle_robber(turn, robber, player, command),
            Phase::Victory { .. } => Err(GameError::GameOver),
        };

        match result {
            Ok(Transition { mut events, next }) => {
                debug!(player, kind, "command accepted");
                if next.name() != self.phase.name() {
                    debug!(from = self.phase.name(), to = next.name(), "phase change");
                }
                self.phase = next;
                events.extend(self.check_victory());
                Ok(events)
            }
            Err(err) => {
                debug!(player, kind, %err, "command rejected");
                Err(err)
            }
        }
    }

    fn require_turn(&self, player: PlayerId) -> Result<(), GameError> {
        if player == self.turn {
            Ok(())
        } else {
            Err(GameError::OutOfTurn)
        }
    }

    // ==================== Setup ====================

    fn handle_setup(
        &mut self,
        state: SetupState,
        player: PlayerId,
        command: Command,
    ) -> Result<Transition, GameError> {
        self.require_turn(player)?;
        let Command::Build { piece, x, y, d } = command else {
            return Err(GameError::UnknownCommand);
        };
        if piece != state.placing {
            return Err(GameError::InvalidPlacement);
        }

        let stage = Stage::Setup {
            anchor: state.anchor,
        };
        self.board.build(piece, x, y, d, player, stage)?;
        self.players[usize::from(player)].take_piece(piece);

        let mut events = vec![
            Outbound::all(Event::Build {
                piece,
                x,
                y,
                d,
                player,
            }),
            self.resources_for(player),
        ];

        if piece == Piece::Town {
            let next = SetupState {
                placing: Piece::Road,
                anchor: VertexCoord::from_parts(x, y, d),
                ..state
            };
            return Ok(Transition::new(events, Phase::Setup(next)));
        }

        // Road placed: hand the draft on
        let next = match state.pass {
            Pass::Forward => {
                let following = next_seat(player);
                if following == self.first {
                    // Last seat places again to open the reverse pass
                    Some(SetupState::start_of(Pass::Reverse))
                } else {
                    self.turn = following;
                    Some(SetupState::start_of(Pass::Forward))
                }
            }
            Pass::Reverse if player == self.first => None,
            Pass::Reverse => {
                self.turn = previous_seat(player);
                Some(SetupState::start_of(Pass::Reverse))
            }
        };

        match next {
            Some(state) => {
                events.push(Outbound::all(Event::Turn {
                    player: self.turn,
                    dice: None,
                    setup_complete: false,
                }));
                Ok(Transition::new(events, Phase::Setup(state)))
            }
            None => {
                events.extend(self.finish_setup());
                let (turn_events, next) = self.begin_turn(self.first);
                events.extend(turn_events);
                Ok(Transition::new(events, next))
            }
        }
    }

    /// Pay each player for the tiles around their opening towns
    fn finish_setup(&mut self) -> Vec<Outbound> {
        for account in &mut self.players {
            let payout = self.board.setup_yield(account.id);
            account.gain_resources(&payout);
        }
        info!(first = self.first, "setup complete");
        self.all_resources()
    }

    // ==================== Turns ====================

    /// Roll for `player` and start their turn
    fn begin_turn(&mut self, player: PlayerId) -> (Vec<Outbound>, Phase) {
        let dice = [self.rng.gen_range(1..=6), self.rng.gen_range(1..=6)];
        self.start_turn_with_roll(player, dice)
    }

    fn start_turn_with_roll(&mut self, player: PlayerId, dice: [u8; 2]) -> (Vec<Outbound>, Phase) {
        self.turn = player;
        self.dice = Some(dice);
        let roll = dice[0] + dice[1];

        for (owner, produced) in self.board.production(roll) {
            if let Some(account) = self.players.get_mut(usize::from(owner)) {
                account.gain_resources(&produced);
            }
        }

        let mut events = vec![Outbound::all(Event::Turn {
            player,
            dice: Some(dice),
            setup_complete: true,
        })];
        events.extend(self.all_resources());

        if roll != 7 {
            return (events, Phase::Play(TurnState::default()));
        }

        let discards: BTreeMap<PlayerId, u32> = self
            .players
            .iter()
            .filter(|p| p.resources.total() > DISCARD_LIMIT)
            .map(|p| (p.id, p.resources.total() / 2))
            .collect();
        debug!(?discards, "seven rolled");
        (
            events,
            Phase::Robber {
                turn: TurnState::default(),
                robber: RobberState::new(discards),
            },
        )
    }

    // ==================== Play ====================

    fn handle_play(
        &mut self,
        mut turn: TurnState,
        player: PlayerId,
        command: Command,
    ) -> Result<Transition, GameError> {
        self.require_turn(player)?;

        match command {
            Command::Build { piece, x, y, d } => {
                let events = self.build(&mut turn, player, piece, x, y, d)?;
                Ok(Transition::new(events, Phase::Play(turn)))
            }

            Command::BuyDevelopCard => {
                let idx = usize::from(player);
                if !self.players[idx].can_buy_card() {
                    return Err(GameError::InsufficientResources);
                }
                let card = self.deck.pop().ok_or(GameError::EmptyDeck)?;
                self.players[idx].buy_card(card);
                let events = vec![
                    Outbound::all(Event::CardBought { player }),
                    self.resources_for(player),
                ];
                Ok(Transition::new(events, Phase::Play(turn)))
            }

            Command::PlayDevelopCard {
                card,
                resources,
                resource,
            } => self.play_card(turn, player, card, resources, resource),

            Command::EndTurn => {
                self.players[usize::from(player)].end_turn();
                let (events, next) = self.begin_turn(next_seat(player));
                Ok(Transition::new(events, next))
            }

            Command::OfferTrade { offer } => {
                self.validate_offer(player, &offer)?;
                let offers = BTreeMap::from([(player, offer)]);
                let events = vec![Outbound::all(Event::TradeOffer { offer, player })];
                Ok(Transition::new(events, Phase::Trade { turn, offers }))
            }

            _ => Err(GameError::UnknownCommand),
        }
    }

    fn build(
        &mut self,
        turn: &mut TurnState,
        player: PlayerId,
        piece: Piece,
        x: i32,
        y: i32,
        d: u8,
    ) -> Result<Vec<Outbound>, GameError> {
        let idx = usize::from(player);
        let free = piece == Piece::Road && turn.free_roads > 0;
        let affordable = if free {
            self.players[idx].pieces.roads > 0
        } else {
            self.players[idx].can_afford(piece)
        };
        if !affordable {
            return Err(GameError::InsufficientResources);
        }

        self.board.build(piece, x, y, d, player, Stage::Play)?;

        if free {
            self.players[idx].take_piece(Piece::Road);
            turn.free_roads -= 1;
        } else {
            self.players[idx].build(piece);
        }

        let mut events = vec![
            Outbound::all(Event::Build {
                piece,
                x,
                y,
                d,
                player,
            }),
            self.resources_for(player),
        ];
        // A new town can cut through an opponent's road
        if piece != Piece::City {
            events.extend(self.refresh_longest_road());
        }
        Ok(events)
    }

    fn play_card(
        &mut self,
        mut turn: TurnState,
        player: PlayerId,
        card: DevelopmentCard,
        resources: Option<ResourceHand>,
        resource: Option<Resource>,
    ) -> Result<Transition, GameError> {
        let idx = usize::from(player);
        let account = &self.players[idx];
        if turn.card_played || !card.is_playable() || account.cards.get(card) == 0 {
            return Err(GameError::InvalidCardPlay);
        }
        let payload_ok = match card {
            DevelopmentCard::YearOfPlenty => resources.is_some_and(|hand| hand.total() == 2),
            DevelopmentCard::Monopoly => resource.is_some(),
            DevelopmentCard::RoadBuilding => account.pieces.roads > 0,
            DevelopmentCard::Knight | DevelopmentCard::VictoryPoint => true,
        };
        if !payload_ok {
            return Err(GameError::InvalidCardPlay);
        }

        self.players[idx].play_card(card);
        turn.card_played = true;
        let mut events = vec![Outbound::all(Event::CardPlayed { player, card })];

        let next = match (card, resources, resource) {
            (DevelopmentCard::Knight, _, _) => {
                events.extend(self.refresh_largest_army(player));
                Phase::Robber {
                    turn,
                    robber: RobberState::default(),
                }
            }
            (DevelopmentCard::RoadBuilding, _, _) => {
                turn.free_roads = FREE_ROADS.min(self.players[idx].pieces.roads);
                Phase::Play(turn)
            }
            (DevelopmentCard::YearOfPlenty, Some(hand), _) => {
                self.players[idx].gain_resources(&hand);
                events.push(self.resources_for(player));
                Phase::Play(turn)
            }
            (DevelopmentCard::Monopoly, _, Some(resource)) => {
                let mut taken = 0;
                for other in 0..self.players.len() {
                    if other == idx {
                        continue;
                    }
                    let count = self.players[other].resources.take_all(resource);
                    if count > 0 {
                        taken += count;
                        events.push(self.resources_for(other as PlayerId));
                    }
                }
                self.players[idx].resources.add(resource, taken);
                debug!(player, ?resource, taken, "monopoly");
                events.push(self.resources_for(player));
                Phase::Play(turn)
            }
            _ => Phase::Play(turn),
        };

        Ok(Transition::new(events, next))
    }

    // ==================== Trade ====================

    fn validate_offer(&self, player: PlayerId, offer: &ResourceHand) -> Result<(), GameError> {
        if offer.is_empty() || !self.players[usize::from(player)].has_resources(offer) {
            return Err(GameError::InvalidOffer);
        }
        Ok(())
    }

    fn handle_trade(
        &mut self,
        turn: TurnState,
        mut offers: BTreeMap<PlayerId, ResourceHand>,
        player: PlayerId,
        command: Command,
    ) -> Result<Transition, GameError> {
        match command {
            Command::OfferTrade { offer } => {
                self.validate_offer(player, &offer)?;
                offers.insert(player, offer);
                let events = vec![Outbound::all(Event::TradeOffer { offer, player })];
                Ok(Transition::new(events, Phase::Trade { turn, offers }))
            }

            _ if player != self.turn => Err(GameError::OutOfTurn),

            Command::ConfirmTrade { with_player } => {
                let (Some(mine), Some(theirs)) =
                    (offers.get(&player).copied(), offers.get(&with_player).copied())
                else {
                    return Err(GameError::InvalidConfirm);
                };
                let partner = usize::from(with_player);
                let idx = usize::from(player);
                if with_player == player
                    || !self.players[idx].has_resources(&mine)
                    || !self.players[partner].has_resources(&theirs)
                {
                    return Err(GameError::InvalidConfirm);
                }

                self.players[idx].spend_resources(&mine);
                self.players[idx].gain_resources(&theirs);
                self.players[partner].spend_resources(&theirs);
                self.players[partner].gain_resources(&mine);

                let events = vec![
                    self.resources_for(player),
                    self.resources_for(with_player),
                    Outbound::all(Event::TradeResolved {
                        with_player: Some(with_player),
                    }),
                ];
                Ok(Transition::new(events, Phase::Play(turn)))
            }

            Command::CancelTrade => {
                let events = vec![Outbound::all(Event::TradeResolved { with_player: None })];
                Ok(Transition::new(events, Phase::Play(turn)))
            }

            _ => Err(GameError::UnknownCommand),
        }
    }

    // ==================== Robber ====================

    fn handle_robber(
        &mut self,
        turn: TurnState,
        mut robber: RobberState,
        player: PlayerId,
        command: Command,
    ) -> Result<Transition, GameError> {
        let idx = usize::from(player);
        let mut events = Vec::new();

        match command {
            Command::Discard { resources } => {
                let owed = robber
                    .discards
                    .get(&player)
                    .copied()
                    .ok_or(GameError::InvalidDiscard)?;
                if resources.total() != owed || !self.players[idx].has_resources(&resources) {
                    return Err(GameError::InvalidDiscard);
                }
                self.players[idx].spend_resources(&resources);
                robber.discards.remove(&player);
                events.push(Outbound::to(player, Event::DiscardAck));
                events.push(self.resources_for(player));
            }

            _ if player != self.turn => return Err(GameError::OutOfTurn),

            Command::MoveRobber { x, y } => {
                if robber.moved || !robber.discards.is_empty() {
                    return Err(GameError::InvalidRobberMove);
                }
                let tile = TileCoord::new(x, y);
                self.board.move_robber(tile)?;

                let players = &self.players;
                let targets = self.board.robber_targets(tile, player, |p| {
                    players
                        .get(usize::from(p))
                        .is_some_and(|account| !account.resources.is_empty())
                });
                robber.moved = true;
                robber.stolen = targets.is_empty();
                events.push(Outbound::all(Event::RobberMoved { x, y }));
                if !targets.is_empty() {
                    events.push(Outbound::to(
                        player,
                        Event::StealTargets {
                            targets: targets.clone(),
                        },
                    ));
                }
                robber.targets = targets;
            }

            Command::Steal { target_player } => {
                if !robber.moved || robber.stolen || !robber.targets.contains(&target_player) {
                    return Err(GameError::InvalidSteal);
                }
                let victim = usize::from(target_player);
                let resource = self.players[victim]
                    .resources
                    .steal_random(&mut self.rng)
                    .ok_or(GameError::InvalidSteal)?;
                self.players[idx].resources.add(resource, 1);
                robber.stolen = true;
                events.push(Outbound::all(Event::ResourceStolen {
                    thief: player,
                    victim: target_player,
                }));
                events.push(self.resources_for(player));
                events.push(self.resources_for(target_player));
            }

            _ => return Err(GameError::UnknownCommand),
        }

        let next = if robber.is_resolved() {
            Phase::Play(turn)
        } else {
            Phase::Robber { turn, robber }
        };
        Ok(Transition::new(events, next))
    }

    // ==================== Scoring ====================

    fn refresh_longest_road(&mut self) -> Option<Outbound> {
        roads::update_longest_road(&mut self.board, 0..PLAYER_COUNT as PlayerId).map(|award| {
            Outbound::all(Event::LongestRoad {
                player: award.owner,
                length: award.size,
            })
        })
    }

    /// The holder's army keeps growing; anyone else must strictly exceed it
    fn refresh_largest_army(&mut self, player: PlayerId) -> Option<Outbound> {
        let knights = self.players[usize::from(player)].knights;
        let current = self.board.largest_army();
        let holds = current.owner == Some(player);
        if !holds && knights <= current.size {
            return None;
        }
        let next = Award {
            size: knights,
            owner: Some(player),
        };
        if next == current {
            return None;
        }
        debug!(?current, ?next, "largest army changed");
        self.board.set_largest_army(next);
        Some(Outbound::all(Event::LargestArmy {
            player: next.owner,
            size: next.size,
        }))
    }

    /// Enter `Victory` if anyone has reached the target, checking the active
    /// player first
    fn check_victory(&mut self) -> Option<Outbound> {
        if matches!(self.phase, Phase::Victory { .. }) {
            return None;
        }
        let winner = (0..PLAYER_COUNT)
            .map(|offset| ((usize::from(self.turn) + offset) % PLAYER_COUNT) as PlayerId)
            .find(|p| self.victory_points(*p) >= VICTORY_POINTS_TO_WIN)?;
        info!(winner, points = self.victory_points(winner), "game over");
        self.phase = Phase::Victory { winner };
        Some(Outbound::all(Event::GameEnded { winner }))
    }

    // ==================== Helpers ====================

    fn resources_for(&self, player: PlayerId) -> Outbound {
        let account = &self.players[usize::from(player)];
        Outbound::to(
            player,
            Event::Resources {
                resources: account.resources,
                pieces: account.pieces,
                cards: account.cards,
                pending: account.pending,
            },
        )
    }

    fn all_resources(&self) -> Vec<Outbound> {
        (0..PLAYER_COUNT as PlayerId)
            .map(|p| self.resources_for(p))
            .collect()
    }
}

fn next_seat(player: PlayerId) -> PlayerId {
    ((usize::from(player) + 1) % PLAYER_COUNT) as PlayerId
}

fn previous_seat(player: PlayerId) -> PlayerId {
    ((usize::from(player) + PLAYER_COUNT - 1) % PLAYER_COUNT) as PlayerId
}

/// Everyone rolls two dice; the highest total leads, ties going to the
/// earlier seat
fn opening_roll(rng: &mut StdRng) -> PlayerId {
    let mut leader = 0;
    let mut best = 0;
    for seat in 0..PLAYER_COUNT as PlayerId {
        let roll: u8 = rng.gen_range(1..=6) + rng.gen_range(1..=6);
        if roll > best {
            best = roll;
            leader = seat;
        }
    }
    leader
}
