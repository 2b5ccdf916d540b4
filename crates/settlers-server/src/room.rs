//! Match rooms: four seated connections around one `Session`.

use settlers_core::{Outbound, PlayerId, Recipient, Session, PLAYER_COUNT};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::protocol::{LobbyMessage, ServerMessage};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("A match needs exactly four players, got {0}")]
    WrongPlayerCount(usize),

    #[error("Connection is not seated in this match")]
    NotSeated,
}

/// A seat in a match.
#[derive(Debug, Clone)]
pub struct Seat {
    pub connection: Uuid,
    pub connected: bool,
}

/// A message bound for one connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub to: Uuid,
    pub message: ServerMessage,
}

/// A running match.
pub struct GameRoom {
    pub id: Uuid,
    /// Indexed by seat
    seats: Vec<Seat>,
    session: Session,
}

impl GameRoom {
    /// Seat `connections` in arrival order around a fresh session
    pub fn new(id: Uuid, connections: Vec<Uuid>) -> Result<Self, RoomError> {
        Self::with_session(id, connections, Session::new())
    }

    pub fn with_session(
        id: Uuid,
        connections: Vec<Uuid>,
        session: Session,
    ) -> Result<Self, RoomError> {
        if connections.len() != PLAYER_COUNT {
            return Err(RoomError::WrongPlayerCount(connections.len()));
        }
        let seats = connections
            .into_iter()
            .map(|connection| Seat {
                connection,
                connected: true,
            })
            .collect();
        info!(room = %id, "match created");
        Ok(Self { id, seats, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connections(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.seats.iter().map(|s| s.connection)
    }

    pub fn seat_of(&self, connection: Uuid) -> Option<PlayerId> {
        self.seats
            .iter()
            .position(|s| s.connection == connection)
            .map(|i| i as PlayerId)
    }

    /// Opening messages for every seat
    pub fn start(&self) -> Vec<Delivery> {
        self.route(self.session.start_messages())
    }

    /// Run one JSON command from `connection` through the session
    pub fn handle_text(&mut self, connection: Uuid, text: &str) -> Result<Vec<Delivery>, RoomError> {
        let seat = self.seat_of(connection).ok_or(RoomError::NotSeated)?;
        debug!(room = %self.id, seat, "command received");
        let outbound = self.session.handle_json(seat, text);
        Ok(self.route(outbound))
    }

    /// Mark a seat disconnected and tell the others
    pub fn disconnect(&mut self, connection: Uuid) -> Result<Vec<Delivery>, RoomError> {
        let seat = self.seat_of(connection).ok_or(RoomError::NotSeated)?;
        self.seats[usize::from(seat)].connected = false;
        info!(room = %self.id, seat, "seat disconnected");

        let notice: ServerMessage = LobbyMessage::PlayerDisconnected { player: seat }.into();
        Ok(self
            .live_seats()
            .map(|s| Delivery {
                to: s.connection,
                message: notice.clone(),
            })
            .collect())
    }

    /// Every seat has gone
    pub fn is_abandoned(&self) -> bool {
        self.seats.iter().all(|s| !s.connected)
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    fn live_seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(|s| s.connected)
    }

    /// Address engine events to connections, skipping dropped seats
    fn route(&self, outbound: Vec<Outbound>) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        for Outbound { to, event } in outbound {
            let message = ServerMessage::Game(event);
            match to {
                Recipient::All => {
                    deliveries.extend(self.live_seats().map(|s| Delivery {
                        to: s.connection,
                        message: message.clone(),
                    }));
                }
                Recipient::Player(seat) => {
                    if let Some(s) = self.seats.get(usize::from(seat)).filter(|s| s.connected) {
                        deliveries.push(Delivery {
                            to: s.connection,
                            message,
                        });
                    }
                }
            }
        }
        deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settlers_core::Event;

    fn room() -> (GameRoom, Vec<Uuid>) {
        let connections: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let room =
            GameRoom::with_session(Uuid::new_v4(), connections.clone(), Session::with_seed(9))
                .unwrap();
        (room, connections)
    }

    fn count_for(deliveries: &[Delivery], connection: Uuid) -> usize {
        deliveries.iter().filter(|d| d.to == connection).count()
    }

    #[test]
    fn test_needs_four_players() {
        let err = GameRoom::new(Uuid::new_v4(), vec![Uuid::new_v4(); 3]).err();
        assert_eq!(err, Some(RoomError::WrongPlayerCount(3)));
    }

    #[test]
    fn test_seats_follow_arrival_order() {
        let (room, connections) = room();
        for (seat, connection) in connections.iter().enumerate() {
            assert_eq!(room.seat_of(*connection), Some(seat as PlayerId));
        }
        assert_eq!(room.seat_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_start_routes_private_messages() {
        let (room, connections) = room();
        let deliveries = room.start();

        // Own start, the broadcast turn and own resources
        for connection in &connections {
            assert_eq!(count_for(&deliveries, *connection), 3);
        }
        for (seat, connection) in connections.iter().enumerate() {
            assert!(deliveries.iter().any(|d| d.to == *connection
                && matches!(
                    &d.message,
                    ServerMessage::Game(Event::Start { player, .. }) if usize::from(*player) == seat
                )));
        }
    }

    #[test]
    fn test_rejection_goes_to_sender_only() {
        let (mut room, connections) = room();
        let first = usize::from(room.session().first());
        let other = connections[(first + 1) % 4];

        let deliveries = room.handle_text(other, r#"{"kind":"endTurn"}"#).unwrap();
        assert_eq!(
            deliveries,
            vec![Delivery {
                to: other,
                message: ServerMessage::Game(Event::Error {
                    reason: "turn".to_string()
                }),
            }]
        );
    }

    #[test]
    fn test_accepted_command_broadcasts() {
        let (mut room, connections) = room();
        let first = usize::from(room.session().first());
        let deliveries = room
            .handle_text(
                connections[first],
                r#"{"kind":"build","type":"town","x":3,"y":3,"d":0}"#,
            )
            .unwrap();

        // Build to everyone, resources to the builder
        for (seat, connection) in connections.iter().enumerate() {
            let expected = if seat == first { 2 } else { 1 };
            assert_eq!(count_for(&deliveries, *connection), expected);
        }
    }

    #[test]
    fn test_unknown_connection() {
        let (mut room, _) = room();
        assert_eq!(
            room.handle_text(Uuid::new_v4(), "{}").err(),
            Some(RoomError::NotSeated)
        );
    }

    #[test]
    fn test_disconnect_and_abandon() {
        let (mut room, connections) = room();
        let notices = room.disconnect(connections[0]).unwrap();
        assert_eq!(notices.len(), 3);
        assert!(notices.iter().all(|d| d.to != connections[0]));

        // The dropped seat no longer receives broadcasts
        assert_eq!(count_for(&room.start(), connections[0]), 0);
        assert!(!room.is_abandoned());

        for connection in &connections[1..] {
            room.disconnect(*connection).unwrap();
        }
        assert!(room.is_abandoned());
        assert!(!room.is_finished());
    }
}
