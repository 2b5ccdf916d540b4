//! Integration tests for the settlers engine.
//!
//! These drive whole matches through the public `Session` API: the opening
//! snake draft, dice turns, robber interludes and building.

use pretty_assertions::assert_eq;
use settlers_core::game::{Pass, RobberState, SetupState};
use settlers_core::*;
use std::collections::BTreeSet;

fn build(piece: Piece, x: i32, y: i32, d: u8) -> Command {
    Command::Build { piece, x, y, d }
}

/// Every vertex and edge on or around a land tile, in a fixed order
fn land_features(board: &Board) -> (Vec<VertexCoord>, Vec<EdgeCoord>) {
    let mut vertices = BTreeSet::new();
    let mut edges = BTreeSet::new();
    for (coord, _) in board.land_tiles() {
        vertices.extend(coord.corner_vertices());
        edges.extend(coord.border_edges());
    }
    (vertices.into_iter().collect(), edges.into_iter().collect())
}

/// Play the opening draft with the first legal spots, returning the seat
/// order in which towns were placed
fn complete_setup(session: &mut Session) -> Vec<PlayerId> {
    let mut order = Vec::new();
    let mut iterations = 0;

    while let Phase::Setup(SetupState { placing, .. }) = session.phase().clone() {
        assert_eq!(placing, Piece::Town);
        let player = session.turn();
        let (vertices, _) = land_features(session.board());
        let town = vertices
            .into_iter()
            .find(|v| {
                session
                    .board()
                    .valid_town(*v, player, Stage::Setup { anchor: None })
            })
            .expect("a legal opening town");
        session
            .apply(player, build(Piece::Town, town.x, town.y, town.side.into()))
            .unwrap();

        let road = town
            .protruding_edges()
            .into_iter()
            .find(|e| {
                session
                    .board()
                    .valid_road(*e, player, Stage::Setup { anchor: Some(town) })
            })
            .expect("a legal opening road");
        session
            .apply(player, build(Piece::Road, road.x, road.y, road.side.into()))
            .unwrap();

        order.push(player);
        iterations += 1;
        assert!(iterations <= 8, "setup should take eight placements");
    }
    order
}

/// Pay discards, move the robber and steal until the interlude ends
fn resolve_robber(session: &mut Session) {
    let Phase::Robber { robber, .. } = session.phase().clone() else {
        return;
    };
    let RobberState {
        discards, moved, ..
    } = robber;

    for (seat, owed) in discards {
        let held = session.player(seat).unwrap().resources;
        let mut discard = ResourceHand::new();
        let mut remaining = owed;
        for r in Resource::ALL {
            let take = held.get(r).min(remaining);
            discard.add(r, take);
            remaining -= take;
        }
        session
            .apply(seat, Command::Discard { resources: discard })
            .unwrap();
    }

    let active = session.turn();
    if !moved {
        let robber = session.board().robber();
        let mut land: Vec<TileCoord> = session.board().land_tiles().map(|(c, _)| *c).collect();
        land.sort();
        let tile = land.into_iter().find(|t| *t != robber).unwrap();
        session
            .apply(active, Command::MoveRobber { x: tile.x, y: tile.y })
            .unwrap();
    }

    if let Phase::Robber { robber, .. } = session.phase().clone() {
        let target = robber.targets[0];
        session
            .apply(active, Command::Steal { target_player: target })
            .unwrap();
    }
    assert!(matches!(
        session.phase(),
        Phase::Play(_) | Phase::Victory { .. }
    ));
}

/// Spend on whatever the active player can legally afford
fn build_what_we_can(session: &mut Session) {
    let player = session.turn();
    let (vertices, edges) = land_features(session.board());

    let candidates: Vec<Command> = vertices
        .iter()
        .filter(|v| session.board().valid_city(**v, player))
        .map(|v| build(Piece::City, v.x, v.y, v.side.into()))
        .chain(
            vertices
                .iter()
                .filter(|v| session.board().valid_town(**v, player, Stage::Play))
                .map(|v| build(Piece::Town, v.x, v.y, v.side.into())),
        )
        .chain(
            edges
                .iter()
                .filter(|e| session.board().valid_road(**e, player, Stage::Play))
                .map(|e| build(Piece::Road, e.x, e.y, e.side.into())),
        )
        .collect();

    for command in candidates {
        let Command::Build { piece, .. } = command else {
            continue;
        };
        if !session.player(player).unwrap().can_afford(piece) {
            continue;
        }
        // Earlier builds this turn may have taken the spot
        let _ = session.apply(player, command);
        if session.is_finished() {
            return;
        }
    }
}

fn assert_supply_matches_board(session: &Session) {
    for account in session.players() {
        let board = session.board();
        let roads = board.roads_of(account.id).count() as u32;
        let (towns, cities) = board
            .buildings()
            .filter(|(_, b)| b.owner == account.id)
            .fold((0, 0), |(t, c), (_, b)| match b.kind {
                board::BuildingKind::Town => (t + 1, c),
                board::BuildingKind::City => (t, c + 1),
            });
        assert_eq!(account.pieces.roads + roads, 15, "roads of {}", account.id);
        assert_eq!(account.pieces.towns + towns, 5, "towns of {}", account.id);
        assert_eq!(account.pieces.cities + cities, 4, "cities of {}", account.id);
    }
}

#[test]
fn test_setup_snake_order() {
    let mut session = Session::with_seed(42);
    let first = session.first();
    let order = complete_setup(&mut session);

    let seat = |offset: u8| (first + offset) % 4;
    assert_eq!(
        order,
        vec![
            seat(0),
            seat(1),
            seat(2),
            seat(3),
            seat(3),
            seat(2),
            seat(1),
            seat(0)
        ]
    );
    assert_eq!(session.turn(), first);
    assert!(session.dice().is_some());
}

#[test]
fn test_setup_pays_opening_towns() {
    let mut session = Session::with_seed(11);
    complete_setup(&mut session);

    let dice = session.dice().unwrap();
    let roll = dice[0] + dice[1];
    let produced = session.board().production(roll);

    for account in session.players() {
        assert_eq!(account.pieces.towns, 3);
        assert_eq!(account.pieces.roads, 13);

        let mut expected = session.board().setup_yield(account.id);
        if let Some(hand) = produced.get(&account.id) {
            expected.add_hand(hand);
        }
        assert_eq!(account.resources, expected, "hand of {}", account.id);
    }
    assert_supply_matches_board(&session);
}

#[test]
fn test_setup_phase_rejects_play_commands() {
    let mut session = Session::with_seed(3);
    let first = session.first();
    assert_eq!(
        session.phase(),
        &Phase::Setup(SetupState {
            pass: Pass::Forward,
            placing: Piece::Town,
            anchor: None
        })
    );
    assert_eq!(
        session.apply(first, Command::BuyDevelopCard),
        Err(GameError::UnknownCommand)
    );
    assert_eq!(
        session.apply((first + 1) % 4, Command::EndTurn),
        Err(GameError::OutOfTurn)
    );
}

#[test]
fn test_many_turns_keep_invariants() {
    let mut session = Session::with_seed(2024);
    complete_setup(&mut session);

    for _ in 0..200 {
        resolve_robber(&mut session);
        if session.is_finished() {
            break;
        }
        build_what_we_can(&mut session);
        if session.is_finished() {
            break;
        }
        assert_supply_matches_board(&session);

        let active = session.turn();
        let events = session.apply(active, Command::EndTurn).unwrap();
        assert!(matches!(
            events[0].event,
            Event::Turn {
                dice: Some(_),
                setup_complete: true,
                ..
            }
        ));
        assert_eq!(session.turn(), (active + 1) % 4);
    }

    assert_supply_matches_board(&session);
    if let Some(winner) = session.winner() {
        assert!(session.victory_points(winner) >= VICTORY_POINTS_TO_WIN);
        assert_eq!(
            session.apply(winner, Command::EndTurn),
            Err(GameError::GameOver)
        );
    }
}

#[test]
fn test_json_commands() {
    let mut session = Session::with_seed(8);
    let first = session.first();

    let out = session.handle_json(first, r#"{"kind":"build","type":"town","x":3,"y":3,"d":0}"#);
    assert!(out.iter().any(|o| matches!(
        o.event,
        Event::Build {
            piece: Piece::Town,
            x: 3,
            y: 3,
            d: 0,
            ..
        }
    )));

    let out = session.handle_json(first, r#"{"kind":"build","type":"road","x":6,"y":6,"d":1}"#);
    assert_eq!(
        out,
        vec![Outbound::to(
            first,
            Event::Error {
                reason: "build".to_string()
            }
        )]
    );

    let out = session.handle_json(first, "{");
    assert_eq!(
        out,
        vec![Outbound::to(
            first,
            Event::Error {
                reason: "message".to_string()
            }
        )]
    );
}

#[test]
fn test_start_messages_serialize() {
    let session = Session::with_seed(1);
    for message in session.start_messages() {
        let value = serde_json::to_value(&message.event).unwrap();
        assert!(value.get("kind").is_some());
        if let Event::Start { player, .. } = message.event {
            assert!(message.reaches(player));
            assert_eq!(value["board"]["tiles"].as_array().unwrap().len(), 37);
        }
    }
}
