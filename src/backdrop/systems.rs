use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

use super::entities::{BackdropStats, UserToggles, WaveBackdrop};
use super::BackdropOptions;
use crate::engine::policy::{PerformancePolicy, RunGate, decide};
use crate::engine::scheduler::{FrameCallbacks, FrameScheduler, FrameTick};
use crate::engine::surface::{BackdropStyle, DisplayList, render_frame};
use crate::engine::tiling::HexTiling;
use crate::engine::viewport::{ResizeAction, ViewportAdapter, ViewportState};
use crate::engine::wave::{WaveField, WaveStrategy};
use crate::math::canvas_to_world;

type MountedQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut WaveBackdrop,
        &'static mut FrameScheduler,
        &'static mut ViewportAdapter,
        &'static mut WaveStrategy,
        &'static mut BackdropStats,
    ),
    Added<WaveBackdrop>,
>;

type FrameQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static WaveBackdrop,
        &'static mut FrameScheduler,
        &'static ViewportAdapter,
        &'static WaveStrategy,
        &'static BackdropStyle,
        &'static mut DisplayList,
        &'static mut BackdropStats,
    ),
>;

/// Components of one backdrop instance built from `options`.
///
/// Spawning the bundle mounts the backdrop; the lifecycle systems pick it up
/// on the next update.
pub fn backdrop_bundle(options: &BackdropOptions) -> impl Bundle {
    (
        Name::new(format!("Backdrop ({})", options.variant.name())),
        WaveBackdrop {
            gate: RunGate {
                enabled: options.enabled,
                heavy_animations: true,
                gated: options.gated,
                low_battery_threshold: options.low_battery_threshold,
            },
            orientation: options.orientation,
            sizing: options.sizing,
        },
        FrameScheduler::new(options.min_frame_interval, options.clock, options.speed),
        ViewportAdapter::new(options.resize_debounce),
        WaveStrategy::new(options.variant, options.envelope()),
        BackdropStyle {
            color: options.stroke_color(),
            vertex_markers: options.vertex_markers,
            ..default()
        },
        DisplayList::default(),
        BackdropStats::default(),
    )
}

pub(super) fn spawn_camera(mut commands: Commands) {
    commands.spawn((Name::new("Camera"), Camera2d));
}

/// Starts newly mounted backdrops against the primary window.
///
/// A backdrop mounted without a window stays idle.
pub(super) fn start_backdrops(
    mut host: ResMut<FrameCallbacks>,
    policy: Res<PerformancePolicy>,
    toggles: Res<UserToggles>,
    window: Query<&Window, With<PrimaryWindow>>,
    mut added: MountedQuery,
) {
    let window = window.single().ok();
    for (mut backdrop, mut scheduler, mut adapter, mut field, mut stats) in &mut added {
        let Some(window) = window else {
            debug!("backdrop mounted without a window, staying idle");
            continue;
        };
        let viewport = ViewportState::new(window.width(), window.height());
        adapter.attach(viewport);
        field.set_origin(viewport.center());

        backdrop.gate.heavy_animations = toggles.heavy_animations;
        let decision = decide(&policy, &backdrop.gate);
        let state = scheduler.start(&mut *host, decision, true);
        stats.decision = Some(decision);
        info!(
            "backdrop started: {} at {}x{}, {state:?}",
            field.variant().name(),
            viewport.width,
            viewport.height
        );
    }
}

/// Re-runs the reducer for every backdrop after a policy or toggle change.
pub(super) fn reevaluate_backdrops(
    mut host: ResMut<FrameCallbacks>,
    policy: Res<PerformancePolicy>,
    toggles: Res<UserToggles>,
    mut backdrops: Query<(&mut WaveBackdrop, &mut FrameScheduler, &mut BackdropStats)>,
) {
    for (mut backdrop, mut scheduler, mut stats) in &mut backdrops {
        backdrop.gate.heavy_animations = toggles.heavy_animations;
        let decision = decide(&policy, &backdrop.gate);
        let before = scheduler.state();
        let after = scheduler.apply(&mut *host, decision);
        if before != after {
            info!("backdrop {before:?} -> {after:?}");
        }
        stats.decision = Some(decision);
    }
}

/// Feeds primary-window resizes to each adapter and applies settled sizes.
pub(super) fn track_viewports(
    mut resized: MessageReader<WindowResized>,
    primary: Query<Entity, With<PrimaryWindow>>,
    time: Res<Time<Real>>,
    mut backdrops: Query<(&mut ViewportAdapter, &mut WaveStrategy)>,
) {
    let now = time.elapsed();
    let primary = primary.single().ok();
    let latest = resized
        .read()
        .filter(|e| Some(e.window) == primary)
        .last()
        .map(|e| (e.width, e.height));

    for (mut adapter, mut field) in &mut backdrops {
        let action = match latest.map(|(w, h)| adapter.handle_resize_at(w, h, now)) {
            Some(applied @ ResizeAction::Applied(_)) => applied,
            _ => adapter.tick_at(now),
        };
        if let ResizeAction::Applied(state) = action {
            debug!("viewport now {}x{}", state.width, state.height);
            field.set_origin(state.center());
        }
    }
}

/// Delivers due frame callbacks and redraws the display lists of executed
/// frames.
pub(super) fn drive_frames(
    mut host: ResMut<FrameCallbacks>,
    time: Res<Time<Real>>,
    mut backdrops: FrameQuery,
) {
    let now = time.elapsed();
    for (backdrop, mut scheduler, adapter, field, style, mut list, mut stats) in &mut backdrops {
        let Some(handle) = scheduler.pending_frame() else {
            continue;
        };
        if !host.take(handle) {
            continue;
        }
        if let FrameTick::Render { phase } = scheduler.on_frame(&mut *host, handle, now) {
            let tiling = HexTiling::adaptive(adapter.state(), &backdrop.sizing, backdrop.orientation);
            stats.last_frame = render_frame(&mut *list, &tiling, field, phase, style);
        }
    }
}

/// Replays every display list through gizmos, in world space.
pub(super) fn draw_display_lists(
    mut gizmos: Gizmos,
    lists: Query<(&DisplayList, &ViewportAdapter)>,
) {
    for (list, adapter) in &lists {
        let size = adapter.state().size();
        for stroke in list.strokes() {
            let outline = stroke
                .points
                .iter()
                .chain(stroke.points.first())
                .map(|p| canvas_to_world(*p, size));
            gizmos.linestrip_2d(outline, stroke.color);
        }
        for marker in list.markers() {
            let at = canvas_to_world(marker.at, size);
            gizmos.circle_2d(Isometry2d::from_translation(at), marker.radius, marker.color);
        }
    }
}

/// V: switch every backdrop to the next wave variant.
pub(super) fn cycle_variant(
    keys: Res<ButtonInput<KeyCode>>,
    options: Res<BackdropOptions>,
    mut backdrops: Query<(&mut WaveStrategy, &ViewportAdapter, &mut Name)>,
) {
    if !keys.just_pressed(KeyCode::KeyV) {
        return;
    }
    for (mut field, adapter, mut name) in &mut backdrops {
        let next = field.variant().next();
        *field = WaveStrategy::new(next, options.envelope());
        field.set_origin(adapter.state().center());
        name.set(format!("Backdrop ({})", next.name()));
        info!("wave variant: {}", next.name());
    }
}

/// Unmounts every backdrop: cancels its frame request, stops listening for
/// resizes and despawns it.
pub fn unmount_backdrops(
    mut commands: Commands,
    mut host: ResMut<FrameCallbacks>,
    mut backdrops: Query<(Entity, &mut FrameScheduler, &mut ViewportAdapter), With<WaveBackdrop>>,
) {
    for (entity, mut scheduler, mut adapter) in &mut backdrops {
        scheduler.stop(&mut *host);
        adapter.detach();
        commands.entity(entity).despawn();
        info!("backdrop unmounted");
    }
}
