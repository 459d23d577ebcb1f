pub mod clock;
pub mod game_trait;
pub mod negotiation;
pub mod protocol;
pub mod result;
pub mod room;
pub mod seat;
pub mod sequence;
pub mod side;
pub mod snapshot;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{ActionContext, BoardGame, Outcome};
    use crate::protocol::GameAction;
    use crate::seat::Seat;

    /// Context for a sender holding `seats` in a running, fully seated room.
    pub fn ctx<S: Seat>(seats: &[S]) -> ActionContext<S> {
        ActionContext {
            seats: seats.to_vec(),
            game_over: false,
            any_seat_empty: false,
            now_ms: 0,
        }
    }

    /// Context for a connection that holds every seat.
    pub fn hot_seat<S: Seat>() -> ActionContext<S> {
        ctx(S::ALL)
    }

    pub fn mv(from: &str, to: &str) -> GameAction {
        GameAction::Move {
            from: from.to_string(),
            to: to.to_string(),
            promotion: None,
        }
    }

    /// Play `from`-`to` as whoever is to move. Returns the engine outcome.
    pub fn play<G: BoardGame>(
        game: &mut G,
        from: &str,
        to: &str,
    ) -> Outcome<G::Seat, G::Winner> {
        let side = game.side_to_move();
        game.apply(&ctx(&[side]), mv(from, to))
    }

    /// Play a sequence of moves, panicking on the first one the engine rejects.
    pub fn play_all<G: BoardGame>(game: &mut G, moves: &[(&str, &str)]) {
        for &(from, to) in moves {
            let outcome = play(game, from, to);
            assert!(
                matches!(outcome, Outcome::Moved { .. }),
                "move {from}-{to} was rejected: {outcome:?}"
            );
        }
    }

    /// The engine's view rendered as JSON.
    pub fn view_json<G: BoardGame>(game: &G) -> serde_json::Value {
        serde_json::to_value(game.view()).expect("view must serialize")
    }
}
