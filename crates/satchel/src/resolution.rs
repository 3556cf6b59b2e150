use bevy::prelude::*;
use strum::EnumIter;
#[cfg(not(target_arch = "wasm32"))]
use strum::IntoEnumIterator;

/// Fixed preset list the player can cycle through. Order matters: cycling
/// steps through the variants and clamps at both ends.
#[derive(EnumIter, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionPreset {
    Hd,
    FullHd,
    UltraHd,
}

impl ResolutionPreset {
    pub const fn size(self) -> (f32, f32) {
        match self {
            Self::Hd => (1280.0, 720.0),
            Self::FullHd => (1920.0, 1080.0),
            Self::UltraHd => (3840.0, 2160.0),
        }
    }
}

/// Request from the input layer to step the preset list.
#[derive(Event, Clone, Copy, Debug)]
pub struct CycleResolution {
    pub raise: bool,
}

/// Fired after the window actually changed, so audio can play the matching
/// tick.
#[derive(Event, Clone, Copy, Debug)]
pub struct ResolutionChanged {
    pub raised: bool,
}

/// The startup window matches no preset, so the index stays unset until the
/// player cycles for the first time.
#[derive(Resource, Default)]
struct CurrentResolution {
    index: Option<usize>,
}

const fn step(index: usize, last: usize, raise: bool) -> usize {
    if raise {
        if index < last { index + 1 } else { index }
    } else {
        index.saturating_sub(1)
    }
}

// The first cycle from an unset index lands on the smallest preset; after
// that, stepping clamps at both ends and a clamped step applies nothing.
const fn next_index(current: Option<usize>, last: usize, raise: bool) -> Option<usize> {
    match current {
        None => Some(0),
        Some(index) => {
            let stepped = step(index, last, raise);
            if stepped == index { None } else { Some(stepped) }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn handle_cycle(
    mut cycle_events: EventReader<CycleResolution>,
    mut current: ResMut<CurrentResolution>,
    mut windows: Query<&mut Window, With<bevy::window::PrimaryWindow>>,
    mut changed: EventWriter<ResolutionChanged>,
) {
    for event in cycle_events.read() {
        let presets: Vec<ResolutionPreset> = ResolutionPreset::iter().collect();
        let last = presets.len().saturating_sub(1);
        let Some(target) = next_index(current.index, last, event.raise) else {
            // Already at the end of the preset list
            continue;
        };
        current.index = Some(target);

        let Some(preset) = presets.get(target) else {
            continue;
        };
        let (width, height) = preset.size();
        for mut window in &mut windows {
            window.resolution.set(width, height);
        }
        info!("setting resolution to {preset:?} ({width}x{height})");
        changed.send(ResolutionChanged {
            raised: event.raise,
        });
    }
}

pub struct ResolutionPlugin;

impl Plugin for ResolutionPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<CycleResolution>()
            .add_event::<ResolutionChanged>()
            .init_resource::<CurrentResolution>();

        // On wasm the browser owns the canvas size
        #[cfg(not(target_arch = "wasm32"))]
        app.add_systems(Update, handle_cycle);
    }
}
