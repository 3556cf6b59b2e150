use core::time::Duration;

use bevy::prelude::*;

use crate::GameState;

/// Fixed delay between revealed characters.
const CHAR_DELAY: f32 = 0.025;

/// Fired once per revealed visible character; drives the typing tick sound.
#[derive(Event, Clone, Copy, Debug)]
pub struct TypedChar;

/// Reveals the attached `Text` one character at a time. Spaces ride along
/// for free so the pacing follows the words, not the whitespace.
#[derive(Component)]
pub struct Typewriter {
    text: String,
    revealed: usize,
    timer: Timer,
}

impl Typewriter {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            text,
            revealed: 0,
            timer: Timer::from_seconds(CHAR_DELAY, TimerMode::Repeating),
        }
    }

    /// Paces the reveal so the whole text takes `total` to appear,
    /// regardless of its length.
    pub fn paced(text: impl Into<String>, total: Duration) -> Self {
        let text = text.into();
        let chars = text.chars().count().max(1);
        let delay = total.div_f64(chars as f64);
        Self {
            text,
            revealed: 0,
            timer: Timer::new(delay, TimerMode::Repeating),
        }
    }

    pub fn is_done(&self) -> bool {
        self.revealed >= self.text.chars().count()
    }
}

// True when the reveal actually uncovered a visible character, false when it
// only consumed trailing whitespace.
fn ends_on_visible(text: &str, revealed: usize) -> bool {
    revealed
        .checked_sub(1)
        .and_then(|index| text.chars().nth(index))
        .is_some_and(|character| character != ' ')
}

// One tick reveals any pending spaces plus exactly one visible character.
fn advance(text: &str, revealed: usize) -> usize {
    let mut new_revealed = revealed;
    for character in text.chars().skip(revealed) {
        new_revealed += 1;
        if character != ' ' {
            break;
        }
    }
    new_revealed
}

fn type_out(
    time: Res<Time>,
    mut query: Query<(&mut Typewriter, &mut Text)>,
    mut typed: EventWriter<TypedChar>,
) {
    for (mut typewriter, mut text) in &mut query {
        if typewriter.is_done() {
            continue;
        }
        typewriter.timer.tick(time.delta());
        if !typewriter.timer.just_finished() {
            continue;
        }

        let revealed = advance(&typewriter.text, typewriter.revealed);
        if revealed > typewriter.revealed {
            typewriter.revealed = revealed;
            text.0 = typewriter.text.chars().take(revealed).collect();
            // Trailing whitespace makes no sound
            if ends_on_visible(&typewriter.text, revealed) {
                typed.send(TypedChar);
            }
        }
    }
}

pub struct TypewriterPlugin;

impl Plugin for TypewriterPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TypedChar>()
            .add_systems(Update, type_out.run_if(in_state(GameState::Init)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_reveals_one_visible_character() {
        assert_eq!(advance("abc", 0), 1);
        assert_eq!(advance("abc", 1), 2);
    }

    #[test]
    fn advance_skips_spaces_for_free() {
        // Revealing past "a" pulls the space and the "b" in one tick
        assert_eq!(advance("a b", 1), 3);
        assert_eq!(advance("a  b", 1), 4);
    }

    #[test]
    fn advance_stops_at_the_end() {
        assert_eq!(advance("ab", 2), 2);
        assert_eq!(advance("", 0), 0);
        assert_eq!(advance("a ", 1), 2);
    }

    #[test]
    fn trailing_spaces_are_silent() {
        // The reveal that swallows a trailing space uncovers nothing visible
        let revealed = advance("a ", 1);
        assert_eq!(revealed, 2);
        assert!(!ends_on_visible("a ", revealed));

        assert!(ends_on_visible("a b", advance("a b", 1)));
        assert!(ends_on_visible("ab", 1));
        assert!(!ends_on_visible("", 0));
    }

    #[test]
    fn paced_reveal_finishes_on_schedule() {
        let typewriter = Typewriter::paced("four", Duration::from_secs(2));
        assert_eq!(typewriter.timer.duration(), Duration::from_millis(500));

        let empty = Typewriter::paced("", Duration::from_secs(2));
        assert!(empty.is_done());
    }
}
