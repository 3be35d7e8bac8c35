//! Per-viewer redaction and the result summary.
//!
//! Both functions are pure: the same snapshot and viewer always give the
//! same output.

use cardroom_protocol::{Card, PlayerId, Seat, TableState};

/// Derives the copy of `state` that `viewer` is allowed to see.
///
/// - Other seats' hole cards are removed unless the hand ended in a
///   showdown between two or more seats and that seat was one of them.
/// - While a concluded hand is on display, other seats' chips-in-pot are
///   hidden.
/// - The active seat is trimmed to id, chips, and chips-in-pot.
pub fn redact(state: &TableState, viewer: &PlayerId) -> TableState {
    let done = state.status.is_done();
    let showdown = state.result.as_ref().filter(|r| r.is_showdown());

    let seats = state
        .seats
        .iter()
        .map(|seat| {
            if &seat.id == viewer {
                return seat.clone();
            }
            let revealed = showdown.is_some_and(|r| r.is_contestant(&seat.id));
            Seat {
                id: seat.id.clone(),
                chips: seat.chips,
                chips_in_pot: if done { 0 } else { seat.chips_in_pot },
                cards: if revealed { seat.cards.clone() } else { Vec::new() },
                flags: seat.flags,
            }
        })
        .collect();

    let active = state.active.as_ref().map(|a| Seat {
        id: a.id.clone(),
        chips: a.chips,
        chips_in_pot: a.chips_in_pot,
        ..Seat::default()
    });

    TableState {
        seats,
        active,
        cards: state.cards.clone(),
        pot: state.pot,
        status: state.status,
        result: state.result.clone(),
    }
}

/// One-line summary of a concluded hand, or `None` if there is no result.
///
/// `describe` names the best hand made from a winner's hole cards plus the
/// board.
pub fn summarize<F>(state: &TableState, describe: F) -> Option<String>
where
    F: Fn(&[Card]) -> String,
{
    let result = state.result.as_ref()?;
    let first = result.winners.first()?;

    if !result.is_showdown() {
        return Some(format!("{} wins.", first.id));
    }

    let hands: Vec<String> = result
        .winners
        .iter()
        .map(|w| {
            let mut cards = w.cards.clone();
            cards.extend_from_slice(&result.table_cards);
            describe(&cards)
        })
        .collect();

    if result.winners.len() == 1 {
        return Some(format!("{} wins with {}", first.id, hands[0]));
    }

    let names: Vec<&str> = result.winners.iter().map(|w| w.id.as_str()).collect();
    Some(format!(
        "{} split the pot with {} respectively.",
        names.join(", "),
        hands.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use cardroom_protocol::{HandResult, Rank, Suit, TableStatus};

    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId::from(s)
    }

    fn seat(id: &str, cards: Vec<Card>) -> Seat {
        Seat {
            id: pid(id),
            chips: 1000,
            chips_in_pot: 40,
            cards,
            ..Seat::default()
        }
    }

    fn hole(a: Rank, b: Rank) -> Vec<Card> {
        vec![Card::new(a, Suit::Spades), Card::new(b, Suit::Hearts)]
    }

    fn mid_hand() -> TableState {
        let a = seat("a", hole(Rank::Ace, Rank::King));
        let b = seat("b", hole(Rank::Two, Rank::Seven));
        TableState {
            seats: vec![a, b.clone()],
            active: Some(b),
            pot: 80,
            status: TableStatus::Flop,
            ..TableState::default()
        }
    }

    fn showdown(contestants: &[&str], winners: &[&str]) -> TableState {
        let mut state = mid_hand();
        state.status = TableStatus::Done;
        state.active = None;
        let pick = |ids: &[&str]| -> Vec<Seat> {
            state
                .seats
                .iter()
                .filter(|s| ids.contains(&s.id.as_str()))
                .cloned()
                .collect()
        };
        state.result = Some(HandResult {
            winners: pick(winners),
            contestants: pick(contestants),
            table_cards: vec![Card::new(Rank::Queen, Suit::Clubs)],
        });
        state
    }

    #[test]
    fn test_viewer_keeps_own_cards_only() {
        let view = redact(&mid_hand(), &pid("a"));
        assert_eq!(view.seat(&pid("a")).unwrap().cards.len(), 2);
        assert!(view.seat(&pid("b")).unwrap().cards.is_empty());
    }

    #[test]
    fn test_active_seat_is_trimmed() {
        let view = redact(&mid_hand(), &pid("a"));
        let active = view.active.unwrap();
        assert_eq!(active.id, pid("b"));
        assert_eq!(active.chips, 1000);
        assert_eq!(active.chips_in_pot, 40);
        assert!(active.cards.is_empty());

        // Even the active player's own view of the active record is trimmed.
        let own = redact(&mid_hand(), &pid("b")).active.unwrap();
        assert!(own.cards.is_empty());
    }

    #[test]
    fn test_chips_in_pot_visible_mid_hand() {
        let view = redact(&mid_hand(), &pid("a"));
        assert_eq!(view.seat(&pid("b")).unwrap().chips_in_pot, 40);
    }

    #[test]
    fn test_chips_in_pot_hidden_once_done() {
        let view = redact(&showdown(&["a", "b"], &["a"]), &pid("a"));
        assert_eq!(view.seat(&pid("b")).unwrap().chips_in_pot, 0);
        assert_eq!(view.seat(&pid("a")).unwrap().chips_in_pot, 40);
    }

    #[test]
    fn test_contestants_revealed_at_showdown() {
        let view = redact(&showdown(&["a", "b"], &["a"]), &pid("a"));
        assert_eq!(view.seat(&pid("b")).unwrap().cards.len(), 2);
    }

    #[test]
    fn test_no_reveal_when_everyone_else_folded() {
        let view = redact(&showdown(&["b"], &["b"]), &pid("a"));
        assert!(view.seat(&pid("b")).unwrap().cards.is_empty());
    }

    #[test]
    fn test_non_contestant_stays_hidden_at_showdown() {
        let mut state = showdown(&["a", "b"], &["a"]);
        state.seats.push(seat("c", hole(Rank::Nine, Rank::Nine)));
        let view = redact(&state, &pid("a"));
        assert!(view.seat(&pid("c")).unwrap().cards.is_empty());
    }

    #[test]
    fn test_redact_is_pure() {
        let state = showdown(&["a", "b"], &["b"]);
        assert_eq!(redact(&state, &pid("a")), redact(&state, &pid("a")));
    }

    fn describe(cards: &[Card]) -> String {
        format!("{} cards", cards.len())
    }

    #[test]
    fn test_summary_absent_without_result() {
        assert_eq!(summarize(&mid_hand(), describe), None);
    }

    #[test]
    fn test_summary_uncontested() {
        assert_eq!(
            summarize(&showdown(&["b"], &["b"]), describe).as_deref(),
            Some("b wins.")
        );
    }

    #[test]
    fn test_summary_single_winner() {
        assert_eq!(
            summarize(&showdown(&["a", "b"], &["a"]), describe).as_deref(),
            Some("a wins with 3 cards")
        );
    }

    #[test]
    fn test_summary_split_pot_names_everyone() {
        assert_eq!(
            summarize(&showdown(&["a", "b"], &["a", "b"]), describe).as_deref(),
            Some("a, b split the pot with 3 cards, 3 cards respectively.")
        );
    }
}
