use bevy::prelude::*;
use leafwing_input_manager::prelude::*;

use crate::GameState;
use crate::grid::{DEFAULT_SHUFFLE_AMOUNT, Direction, GridCommand, GridCommands};
use crate::resolution::CycleResolution;

// This is the list of "things in the game I want to be able to do based on input"
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Select,
    Shuffle,
    ResolutionDown,
    ResolutionUp,
    Quit,
}

pub fn create_input_map() -> InputMap<Action> {
    let mut input_map = InputMap::default();

    input_map.insert(Action::MoveUp, KeyCode::ArrowUp);
    input_map.insert(Action::MoveUp, GamepadButton::DPadUp);
    input_map.insert(Action::MoveDown, KeyCode::ArrowDown);
    input_map.insert(Action::MoveDown, GamepadButton::DPadDown);
    input_map.insert(Action::MoveLeft, KeyCode::ArrowLeft);
    input_map.insert(Action::MoveLeft, GamepadButton::DPadLeft);
    input_map.insert(Action::MoveRight, KeyCode::ArrowRight);
    input_map.insert(Action::MoveRight, GamepadButton::DPadRight);

    input_map.insert(Action::Select, KeyCode::Space);
    input_map.insert(Action::Select, KeyCode::Enter);
    input_map.insert(Action::Select, GamepadButton::South);

    input_map.insert(Action::Shuffle, KeyCode::KeyS);
    input_map.insert(Action::Shuffle, GamepadButton::North);

    input_map.insert(Action::ResolutionDown, KeyCode::KeyQ);
    input_map.insert(Action::ResolutionDown, GamepadButton::LeftTrigger);
    input_map.insert(Action::ResolutionUp, KeyCode::KeyE);
    input_map.insert(Action::ResolutionUp, GamepadButton::RightTrigger);

    input_map.insert(Action::Quit, KeyCode::Escape);

    input_map
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<Action>::default())
            .add_systems(Startup, setup)
            .add_systems(Update, dispatch.run_if(in_state(GameState::Game)));
    }
}

fn setup(mut commands: Commands) {
    commands.spawn(InputManagerBundle::<Action> {
        input_map: create_input_map(),
        ..default()
    });
}

const NAVIGATION_ACTIONS: [(Action, Direction); 4] = [
    (Action::MoveUp, Direction::Up),
    (Action::MoveDown, Direction::Down),
    (Action::MoveLeft, Direction::Left),
    (Action::MoveRight, Direction::Right),
];

fn dispatch(
    query: Query<&ActionState<Action>>,
    touch_input: Res<Touches>,
    mut grid_commands: ResMut<GridCommands>,
    mut cycle_events: EventWriter<CycleResolution>,
    mut exit_events: EventWriter<AppExit>,
) {
    let Ok(action_state) = query.get_single() else {
        return;
    };

    for (action, direction) in NAVIGATION_ACTIONS {
        if action_state.just_pressed(&action) {
            if let Err(err) = grid_commands.push(GridCommand::Navigate(direction)) {
                warn!("dropping navigate: {err}");
            }
        }
    }

    // Leafwing Input Manager doesn't support touch input, so a tap doubles as select
    if action_state.just_pressed(&Action::Select) || touch_input.any_just_pressed() {
        if let Err(err) = grid_commands.push(GridCommand::Select) {
            warn!("dropping select: {err}");
        }
    }

    if action_state.just_pressed(&Action::Shuffle) {
        if let Err(err) = grid_commands.push(GridCommand::Shuffle {
            amount: DEFAULT_SHUFFLE_AMOUNT,
        }) {
            warn!("dropping shuffle: {err}");
        }
    }

    if action_state.just_pressed(&Action::ResolutionDown) {
        cycle_events.send(CycleResolution { raise: false });
    }
    if action_state.just_pressed(&Action::ResolutionUp) {
        cycle_events.send(CycleResolution { raise: true });
    }

    if action_state.just_pressed(&Action::Quit) {
        exit_events.send(AppExit::Success);
    }
}
