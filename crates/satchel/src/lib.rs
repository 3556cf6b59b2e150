use bevy::prelude::*;
use game_helpers::FONT;
use game_helpers::input::just_pressed_screen_position;
use game_helpers::welcome_screen::{
    WelcomeScreenElement, despawn_welcome_screen, spawn_welcome_screen,
};
use leafwing_input_manager::prelude::ActionState;

pub mod audio;
pub mod grid;
pub mod input;
pub mod items;
pub mod resolution;
pub mod typewriter;
pub mod view;

const HELP_TEXT: &str =
    "Arrows move the cursor. Space picks up and puts down. S shuffles the satchel. Q and E change resolution.";

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum GameState {
    #[default]
    Init,
    Game,
}

pub fn run() {
    game_helpers::get_default_app(env!("CARGO_PKG_NAME"))
        .init_state::<GameState>()
        .init_resource::<items::ItemCatalog>()
        .add_plugins((
            grid::GridPlugin,
            input::InputPlugin,
            view::ViewPlugin,
            audio::GameAudioPlugin,
            resolution::ResolutionPlugin,
            typewriter::TypewriterPlugin,
        ))
        .add_systems(Startup, setup)
        .add_systems(OnEnter(GameState::Init), spawn_welcome)
        .add_systems(Update, start_game.run_if(in_state(GameState::Init)))
        .add_systems(OnExit(GameState::Init), despawn_welcome_screen)
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn spawn_welcome(mut commands: Commands, asset_server: Res<AssetServer>) {
    spawn_welcome_screen(&mut commands, &asset_server, "Satchel");

    // Help text types itself out while the welcome screen is up
    commands.spawn((
        Text::new(""),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::WHITE),
        TextLayout::new_with_justify(JustifyText::Center),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(45.0),
            width: Val::Percent(100.0),
            align_items: AlignItems::Center,
            ..default()
        },
        typewriter::Typewriter::new(HELP_TEXT),
        WelcomeScreenElement,
    ));
}

fn start_game(
    windows: Query<&Window>,
    mouse_button_input: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    action_query: Query<&ActionState<input::Action>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let tapped =
        just_pressed_screen_position(&mouse_button_input, &touch_input, &windows).is_some();
    let selected = action_query
        .get_single()
        .is_ok_and(|actions| actions.just_pressed(&input::Action::Select));

    if tapped || selected {
        next_state.set(GameState::Game);
    }
}
