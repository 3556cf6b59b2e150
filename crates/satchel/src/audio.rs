use bevy::prelude::*;
use bevy_asset_loader::prelude::*;
// Explicit imports: bevy's own prelude also exports an `AudioPlugin` and
// `AudioSource`
use bevy_kira_audio::prelude::{Audio, AudioControl, AudioPlugin, AudioSource};

use crate::grid::{GridEvent, ItemId};
use crate::items::{ClipParams, ItemCatalog, ItemDef};
use crate::resolution::ResolutionChanged;
use crate::typewriter::TypedChar;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Default, States)]
enum AssetState {
    #[default]
    Loading,
    Loaded,
}

#[derive(AssetCollection, Resource)]
struct AudioAssets {
    #[asset(path = "audio/pickup.ogg")]
    pickup: Handle<AudioSource>,
    #[asset(path = "audio/put_down.ogg")]
    put_down: Handle<AudioSource>,
    #[asset(path = "audio/shuffle.ogg")]
    shuffle: Handle<AudioSource>,
    #[asset(path = "audio/tick.ogg")]
    tick: Handle<AudioSource>,
    #[asset(path = "audio/type.ogg")]
    typing: Handle<AudioSource>,
}

pub struct GameAudioPlugin;

impl Plugin for GameAudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(AudioPlugin)
            .init_state::<AssetState>()
            .add_loading_state(
                LoadingState::new(AssetState::Loading)
                    .continue_to_state(AssetState::Loaded)
                    .load_collection::<AudioAssets>(),
            )
            .add_systems(
                Update,
                (grid_audio, resolution_audio, typing_audio).run_if(in_state(AssetState::Loaded)),
            );
    }
}

fn play_clip(audio: &Audio, handle: &Handle<AudioSource>, params: ClipParams) {
    audio
        .play(handle.clone_weak())
        .with_volume(params.volume.sample())
        .with_playback_rate(params.pitch.sample());
}

// Items without their own clip parameters fall back to the defaults.
fn item_params(
    catalog: &ItemCatalog,
    item: ItemId,
    pick: fn(&ItemDef) -> Option<ClipParams>,
) -> ClipParams {
    match catalog.get(item) {
        Ok(def) => pick(def).unwrap_or_default(),
        Err(err) => {
            warn!("{err}");
            ClipParams::default()
        }
    }
}

fn grid_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    catalog: Res<ItemCatalog>,
    mut grid_events: EventReader<GridEvent>,
) {
    for event in grid_events.read() {
        match *event {
            GridEvent::ItemPicked { item, .. } => {
                let params = item_params(&catalog, item, |def| def.pickup);
                play_clip(&audio, &audio_assets.pickup, params);
            }
            GridEvent::ItemPlaced { item, .. } => {
                let params = item_params(&catalog, item, |def| def.put_down);
                play_clip(&audio, &audio_assets.put_down, params);
            }
            GridEvent::Shuffled { .. } => {
                play_clip(&audio, &audio_assets.shuffle, ClipParams::default());
            }
            GridEvent::CursorMoved { .. } | GridEvent::SlotChanged { .. } => {}
        }
    }
}

fn resolution_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut changed_events: EventReader<ResolutionChanged>,
) {
    for event in changed_events.read() {
        // Raising pitches up, lowering pitches down
        let rate = if event.raised { 1.1 } else { 0.9 };
        audio
            .play(audio_assets.tick.clone_weak())
            .with_playback_rate(rate);
    }
}

fn typing_audio(
    audio_assets: Res<AudioAssets>,
    audio: Res<Audio>,
    mut typed_events: EventReader<TypedChar>,
) {
    for _event in typed_events.read() {
        play_clip(&audio, &audio_assets.typing, ClipParams::default());
    }
}
