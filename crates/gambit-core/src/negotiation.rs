use serde::{Deserialize, Serialize};

use crate::side::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawAction {
    Offer,
    Accept,
    Decline,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RematchAction {
    Request,
    Decline,
    Cancel,
}

/// Result of feeding a draw or rematch action through [`Negotiation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not applicable in the current state; nothing changed.
    Ignored,
    /// Offer or flag state changed.
    Changed,
    /// Both sides agreed. Flags have already been cleared.
    Agreed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RematchFlags {
    pub w: bool,
    pub b: bool,
}

impl RematchFlags {
    fn get(&self, side: Side) -> bool {
        match side {
            Side::W => self.w,
            Side::B => self.b,
        }
    }

    fn set(&mut self, side: Side, value: bool) {
        match side {
            Side::W => self.w = value,
            Side::B => self.b = value,
        }
    }
}

/// Draw-offer and rematch state shared by the two-player chess games.
///
/// Offers are one-sided proposals that persist until answered, cancelled,
/// or superseded by the next move. There is no timeout on either protocol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Negotiation {
    pub draw_offer_from: Option<Side>,
    pub rematch: RematchFlags,
}

impl Negotiation {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Any move withdraws a pending draw offer.
    pub fn on_move(&mut self) {
        self.draw_offer_from = None;
    }

    /// Apply a draw action from a connection holding `held` seats.
    /// Offering while the opponent's offer is pending counts as accepting it.
    pub fn draw(&mut self, held: &[Side], action: DrawAction, game_over: bool) -> Verdict {
        if game_over || held.is_empty() {
            return Verdict::Ignored;
        }
        let answers_pending = self
            .draw_offer_from
            .is_some_and(|from| held.contains(&from.opponent()));
        match action {
            DrawAction::Offer | DrawAction::Accept if answers_pending => {
                self.draw_offer_from = None;
                Verdict::Agreed
            },
            DrawAction::Offer if self.draw_offer_from.is_none() => {
                self.draw_offer_from = Some(held[0]);
                Verdict::Changed
            },
            DrawAction::Decline if answers_pending => {
                self.draw_offer_from = None;
                Verdict::Changed
            },
            DrawAction::Cancel if self.draw_offer_from.is_some_and(|from| held.contains(&from)) => {
                self.draw_offer_from = None;
                Verdict::Changed
            },
            _ => Verdict::Ignored,
        }
    }

    /// Apply a rematch action. Only meaningful once the game is over; the
    /// caller restarts the game on [`Verdict::Agreed`].
    pub fn rematch(&mut self, held: &[Side], action: RematchAction, game_over: bool) -> Verdict {
        if !game_over {
            return Verdict::Ignored;
        }
        match action {
            RematchAction::Request => {
                let Some(&side) = held.iter().find(|&&s| !self.rematch.get(s)) else {
                    return Verdict::Ignored;
                };
                self.rematch.set(side, true);
                if self.rematch.w && self.rematch.b {
                    self.rematch = RematchFlags::default();
                    Verdict::Agreed
                } else {
                    Verdict::Changed
                }
            },
            RematchAction::Cancel => match held.iter().find(|&&s| self.rematch.get(s)) {
                Some(&side) => {
                    self.rematch.set(side, false);
                    Verdict::Changed
                },
                None => Verdict::Ignored,
            },
            RematchAction::Decline => match held.iter().find(|&&s| self.rematch.get(s.opponent())) {
                Some(&side) => {
                    self.rematch.set(side.opponent(), false);
                    Verdict::Changed
                },
                None => Verdict::Ignored,
            },
        }
    }
}
