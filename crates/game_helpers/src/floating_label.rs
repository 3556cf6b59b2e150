use core::time::Duration;

use bevy::prelude::*;

use crate::FONT;

#[derive(Component)]
pub struct FloatingLabel {
    timer: Timer,
    origin: Vec2,
}

pub fn spawn_floating_label(
    commands: &mut Commands,
    position: Vec2,
    text: &str,
    color: Srgba,
    asset_server: &Res<AssetServer>,
) {
    commands.spawn((
        Text2d::new(text),
        TextFont {
            font: asset_server.load(FONT),
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::Srgba(color)),
        Transform::from_translation(position.extend(20.0)),
        FloatingLabel {
            timer: Timer::new(Duration::from_secs(1), TimerMode::Once),
            origin: position,
        },
    ));
}

pub fn animate_floating_labels(
    mut commands: Commands,
    time: Res<Time>,
    mut query: Query<(Entity, &mut Transform, &mut TextColor, &mut FloatingLabel)>,
) {
    for (entity, mut transform, mut color, mut label) in &mut query {
        label.timer.tick(time.delta());
        let progress = label.timer.fraction();

        // Drift upwards and fade out
        transform.translation.y = 40.0f32.mul_add(progress, label.origin.y);
        color.0.set_alpha(1.0 - progress);

        if label.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}
