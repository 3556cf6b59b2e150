use bevy::color::palettes::css::GOLD;
use bevy::prelude::*;
use game_helpers::floating_label::{animate_floating_labels, spawn_floating_label};

use crate::GameState;
use crate::grid::{GRID_WIDTH, GridEvent, InventoryGrid, SLOT_COUNT};
use crate::items::ItemCatalog;

const SLOT_SIZE: f32 = 44.0;
const SLOT_OFFSET: f32 = 52.0;
const ITEM_SIZE: f32 = 36.0;
const MARKER_SIZE: f32 = 50.0;
const FRAME_PADDING: f32 = 16.0;

const MARKER_SPEED: f32 = 520.0;
const WOBBLE_SPEED: f32 = 6.0;
const WOBBLE_ANGLE: f32 = 0.35;

/// Per-slot sprite showing the item stored there, hidden when empty.
#[derive(Component)]
struct ItemVisual {
    slot: usize,
}

#[derive(Component)]
struct MarkerVisual;

#[derive(Component)]
struct MoveTo(Vec2);

#[derive(Component, Default)]
struct Wobble {
    phase: f32,
}

#[derive(Component)]
struct ScaleIn {
    delay: Timer,
    timer: Timer,
}

fn grid_rows() -> usize {
    SLOT_COUNT.div_ceil(GRID_WIDTH)
}

/// Wobble changes an event asks of the slot visuals. The held item rides the
/// cursor slot, so its wobble has to move with it.
#[derive(Debug, PartialEq, Eq, Default)]
struct WobbleUpdate {
    stop: Option<usize>,
    start: Option<usize>,
    stop_all: bool,
}

// `held_slot` mirrors the grid's pickup state on the view side so the wobble
// can follow the cursor without waiting a frame for deferred commands.
fn wobble_update(held_slot: &mut Option<usize>, event: &GridEvent) -> WobbleUpdate {
    match *event {
        GridEvent::ItemPicked { slot, .. } => {
            *held_slot = Some(slot);
            WobbleUpdate {
                start: Some(slot),
                ..Default::default()
            }
        }
        GridEvent::CursorMoved { slot } => match *held_slot {
            Some(previous) => {
                *held_slot = Some(slot);
                WobbleUpdate {
                    stop: Some(previous),
                    start: Some(slot),
                    stop_all: false,
                }
            }
            None => WobbleUpdate::default(),
        },
        GridEvent::ItemPlaced { slot, .. } => {
            *held_slot = None;
            WobbleUpdate {
                stop: Some(slot),
                ..Default::default()
            }
        }
        GridEvent::Shuffled { .. } => {
            *held_slot = None;
            WobbleUpdate {
                stop_all: true,
                ..Default::default()
            }
        }
        GridEvent::SlotChanged { .. } => WobbleUpdate::default(),
    }
}

pub fn slot_position(index: usize) -> Vec2 {
    let col = index % GRID_WIDTH;
    let row = index / GRID_WIDTH;
    let origin_x = -SLOT_OFFSET * (GRID_WIDTH as f32 - 1.0) / 2.0;
    let origin_y = SLOT_OFFSET * (grid_rows() as f32 - 1.0) / 2.0;
    Vec2::new(
        (col as f32).mul_add(SLOT_OFFSET, origin_x),
        (-(row as f32)).mul_add(SLOT_OFFSET, origin_y),
    )
}

fn setup(mut commands: Commands, grid: Res<InventoryGrid>) {
    let frame_size = Vec2::new(
        (GRID_WIDTH as f32).mul_add(SLOT_OFFSET, FRAME_PADDING),
        (grid_rows() as f32).mul_add(SLOT_OFFSET, FRAME_PADDING),
    );

    // Frame
    commands
        .spawn((
            Sprite::from_color(Color::WHITE, frame_size),
            Transform::from_xyz(0.0, 0.0, -10.0),
        ))
        .with_child((
            Sprite::from_color(Color::BLACK, frame_size - Vec2::splat(8.0)),
            Transform::from_xyz(0.0, 0.0, 5.0),
        ));

    // Slot backgrounds and item sprites
    for index in 0..SLOT_COUNT {
        let position = slot_position(index);
        commands.spawn((
            Sprite::from_color(Color::srgb(0.15, 0.15, 0.15), Vec2::splat(SLOT_SIZE)),
            Transform::from_translation(position.extend(0.0)),
        ));
        commands.spawn((
            Sprite {
                custom_size: Some(Vec2::splat(ITEM_SIZE)),
                ..default()
            },
            Visibility::Hidden,
            ItemVisual { slot: index },
            Transform::from_translation(position.extend(1.0)),
        ));
    }

    // Cursor marker
    commands.spawn((
        Sprite::from_color(Color::srgba(1.0, 0.9, 0.3, 0.35), Vec2::splat(MARKER_SIZE)),
        MarkerVisual,
        Transform::from_translation(slot_position(grid.cursor()).extend(2.0)),
    ));
}

fn consume_events(
    mut commands: Commands,
    mut events: EventReader<GridEvent>,
    catalog: Res<ItemCatalog>,
    asset_server: Res<AssetServer>,
    marker: Query<Entity, With<MarkerVisual>>,
    mut item_visuals: Query<(
        Entity,
        &ItemVisual,
        &mut Sprite,
        &mut Visibility,
        &mut Transform,
    )>,
    mut held_slot: Local<Option<usize>>,
) {
    let mut shuffled = false;
    for event in events.read() {
        let wobble = wobble_update(&mut held_slot, event);
        for (entity, visual, _, _, mut transform) in &mut item_visuals {
            if wobble.stop_all || wobble.stop == Some(visual.slot) {
                commands.entity(entity).remove::<Wobble>();
                transform.rotation = Quat::IDENTITY;
            }
            if wobble.start == Some(visual.slot) {
                commands.entity(entity).insert(Wobble::default());
            }
        }

        match *event {
            GridEvent::CursorMoved { slot } => {
                for entity in &marker {
                    commands.entity(entity).insert(MoveTo(slot_position(slot)));
                }
            }
            GridEvent::SlotChanged { slot, item } => {
                for (_, visual, mut sprite, mut visibility, _) in &mut item_visuals {
                    if visual.slot != slot {
                        continue;
                    }
                    match item {
                        Some(id) => match catalog.get(id) {
                            Ok(def) => {
                                sprite.image = asset_server.load(def.sprite);
                                *visibility = Visibility::Visible;
                            }
                            Err(err) => {
                                warn!("{err}");
                                *visibility = Visibility::Hidden;
                            }
                        },
                        None => *visibility = Visibility::Hidden,
                    }
                }
            }
            GridEvent::ItemPicked { .. } => {}
            GridEvent::ItemPlaced { slot, item } => {
                match catalog.get(item) {
                    Ok(def) => spawn_floating_label(
                        &mut commands,
                        slot_position(slot),
                        def.name,
                        GOLD,
                        &asset_server,
                    ),
                    Err(err) => warn!("{err}"),
                }
            }
            GridEvent::Shuffled { filled } => {
                shuffled = true;
                info!("shuffled {filled} items into the satchel");
            }
        }
    }

    if shuffled {
        for (entity, _, _, visibility, mut transform) in &mut item_visuals {
            if *visibility == Visibility::Visible {
                transform.scale = Vec3::splat(0.01);
                commands.entity(entity).insert(ScaleIn {
                    delay: Timer::from_seconds(fastrand::f32() * 0.15, TimerMode::Once),
                    timer: Timer::from_seconds(0.6, TimerMode::Once),
                });
            }
        }
    }
}

fn move_marker(
    mut commands: Commands,
    time: Res<Time>,
    mut moves: Query<(Entity, &mut Transform, &MoveTo)>,
) {
    for (entity, mut transform, MoveTo(target)) in &mut moves {
        let current = transform.translation.truncate();
        if current.distance(*target) < 0.5 {
            transform.translation = target.extend(transform.translation.z);
            commands.entity(entity).remove::<MoveTo>();
        } else {
            let mut movement = *target - current;
            movement = (movement.normalize_or_zero() * time.delta_secs() * MARKER_SPEED)
                .clamp_length_max(movement.length());
            transform.translation += movement.extend(0.0);
        }
    }
}

fn scale_in(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut ScaleIn)>,
) {
    for (entity, mut transform, mut animation) in &mut query {
        if !animation.delay.finished() {
            animation.delay.tick(time.delta());
            continue;
        }
        animation.timer.tick(time.delta());

        // Ease out with a small overshoot, like an elastic pop
        let progress = animation.timer.fraction();
        let overshoot: f32 = 1.70158;
        let t = progress - 1.0;
        let eased = (overshoot + 1.0).mul_add(t * t * t, overshoot.mul_add(t * t, 1.0));
        transform.scale = Vec3::splat(eased.max(0.01));

        if animation.timer.finished() {
            transform.scale = Vec3::ONE;
            commands.entity(entity).remove::<ScaleIn>();
        }
    }
}

fn wobble(time: Res<Time>, mut query: Query<(&mut Transform, &mut Wobble)>) {
    for (mut transform, mut wobble) in &mut query {
        wobble.phase += time.delta_secs() * WOBBLE_SPEED;
        transform.rotation = Quat::from_rotation_z(wobble.phase.sin() * WOBBLE_ANGLE);
    }
}

pub struct ViewPlugin;

impl Plugin for ViewPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(GameState::Game), setup).add_systems(
            Update,
            (
                consume_events,
                move_marker,
                scale_in,
                wobble,
                animate_floating_labels,
            )
                .run_if(in_state(GameState::Game)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::ItemId;

    #[test]
    fn wobble_follows_the_held_item_through_a_move() {
        let mut held = None;
        let picked = wobble_update(&mut held, &GridEvent::ItemPicked {
            slot: 0,
            item: ItemId(0),
        });
        assert_eq!(picked.start, Some(0));
        assert_eq!(held, Some(0));

        // Navigating while holding moves the wobble to the cursor slot
        let moved = wobble_update(&mut held, &GridEvent::CursorMoved { slot: 1 });
        assert_eq!(moved.stop, Some(0), "origin slot must stop wobbling");
        assert_eq!(moved.start, Some(1), "held item must wobble at the cursor");

        let placed = wobble_update(&mut held, &GridEvent::ItemPlaced {
            slot: 1,
            item: ItemId(0),
        });
        assert_eq!(placed.stop, Some(1));
        assert_eq!(held, None, "placement must end the pickup");
    }

    #[test]
    fn cursor_moves_without_a_pickup_leave_wobbles_alone() {
        let mut held = None;
        let update = wobble_update(&mut held, &GridEvent::CursorMoved { slot: 3 });
        assert_eq!(update, WobbleUpdate::default());
        assert_eq!(held, None);
    }

    #[test]
    fn slot_changes_never_touch_the_wobble() {
        let mut held = Some(2);
        let update = wobble_update(&mut held, &GridEvent::SlotChanged {
            slot: 2,
            item: Some(ItemId(1)),
        });
        assert_eq!(update, WobbleUpdate::default());
        assert_eq!(held, Some(2));
    }

    #[test]
    fn shuffle_stops_every_wobble() {
        let mut held = Some(4);
        let update = wobble_update(&mut held, &GridEvent::Shuffled { filled: 5 });
        assert!(update.stop_all, "shuffle must clear stale wobbles");
        assert_eq!(held, None);
    }

    #[test]
    fn slot_positions_are_row_major_and_centered() {
        let first = slot_position(0);
        let last_in_row = slot_position(GRID_WIDTH - 1);
        assert!((first.x + last_in_row.x).abs() < f32::EPSILON, "row must be centered");
        assert!((first.y - last_in_row.y).abs() < f32::EPSILON, "same row, same height");

        let below = slot_position(GRID_WIDTH);
        assert!((below.x - first.x).abs() < f32::EPSILON, "same column, same x");
        assert!(below.y < first.y, "second row sits below the first");
    }
}
