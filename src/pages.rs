//! Dashboard pages that host a backdrop.
//!
//! Entering a page mounts a fresh backdrop and leaving it unmounts the old
//! one. An egui strip along the top switches pages; a status line shows what
//! each mounted backdrop is doing.

use bevy::prelude::*;
use bevy_egui::{EguiContext, EguiPrimaryContextPass, egui};

use crate::backdrop::{BackdropOptions, BackdropStats, backdrop_bundle, unmount_backdrops};
use crate::engine::policy::RunDecision;
use crate::engine::scheduler::FrameScheduler;
use crate::engine::wave::{WaveStrategy, WaveVariant};

/// Which dashboard page is showing.
#[derive(States, Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Page {
    /// Landing page.
    #[default]
    Dashboard,
    /// Proposals and voting.
    Dao,
    /// Balances.
    Wallet,
    /// Account.
    Profile,
    /// World map.
    Globe,
}

impl Page {
    /// Navigation order.
    pub const ALL: [Page; 5] = [
        Page::Dashboard,
        Page::Dao,
        Page::Wallet,
        Page::Profile,
        Page::Globe,
    ];

    /// Tab label.
    pub fn title(self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Dao => "DAO",
            Page::Wallet => "Wallet",
            Page::Profile => "Profile",
            Page::Globe => "Globe",
        }
    }

    /// Parses a page id such as `"dao"`.
    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.to_ascii_lowercase();
        Self::ALL.into_iter().find(|p| p.title().to_ascii_lowercase() == id)
    }

    /// Next page in navigation order, wrapping.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Wave variant of this page's backdrop; pages without their own use
    /// `configured`.
    pub fn variant(self, configured: WaveVariant) -> WaveVariant {
        match self {
            Page::Dao => WaveVariant::OceanSwell,
            Page::Globe => WaveVariant::NoiseDrift,
            Page::Dashboard | Page::Wallet | Page::Profile => configured,
        }
    }
}

/// Page navigation with one backdrop per page visit.
///
/// The field is the page shown first.
pub struct PagesPlugin(pub Page);

impl Plugin for PagesPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Page>().insert_state(self.0);
        for page in Page::ALL {
            app.add_systems(OnEnter(page), mount_backdrop)
                .add_systems(OnExit(page), unmount_backdrops);
        }
        app.add_systems(Update, next_page_on_tab)
            .add_systems(EguiPrimaryContextPass, draw_hud);
    }
}

fn mount_backdrop(mut commands: Commands, options: Res<BackdropOptions>, page: Res<State<Page>>) {
    let page = *page.get();
    let options = BackdropOptions {
        variant: page.variant(options.variant),
        ..options.clone()
    };
    commands.spawn(backdrop_bundle(&options));
    info!("page {} mounted", page.title());
}

fn next_page_on_tab(
    keys: Res<ButtonInput<KeyCode>>,
    page: Res<State<Page>>,
    mut next: ResMut<NextState<Page>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        next.set(page.get().next());
    }
}

fn draw_hud(
    mut egui_ctx: Query<&mut EguiContext>,
    page: Res<State<Page>>,
    mut next: ResMut<NextState<Page>>,
    backdrops: Query<(&FrameScheduler, &WaveStrategy, &BackdropStats)>,
) {
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let ctx = ctx.get_mut();
    let current = *page.get();

    egui::Area::new(egui::Id::new("page-nav"))
        .anchor(egui::Align2::LEFT_TOP, [12.0, 12.0])
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                for p in Page::ALL {
                    if ui.selectable_label(p == current, p.title()).clicked() && p != current {
                        next.set(p);
                    }
                }
            });
        });

    egui::Area::new(egui::Id::new("backdrop-status"))
        .anchor(egui::Align2::LEFT_BOTTOM, [12.0, -12.0])
        .show(ctx, |ui| {
            for (scheduler, field, stats) in &backdrops {
                let reason = match stats.decision {
                    Some(RunDecision::Suspend(reason)) => format!(" ({reason:?})"),
                    _ => String::new(),
                };
                ui.label(
                    egui::RichText::new(format!(
                        "{} | {:?}{reason} | frames {} / throttled {} | cells {}",
                        field.variant().name(),
                        scheduler.state(),
                        scheduler.executed_frames(),
                        scheduler.throttled_frames(),
                        stats.last_frame.cells,
                    ))
                    .color(egui::Color32::from_gray(200))
                    .small(),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use bevy::state::app::StatesPlugin;

    use super::*;
    use crate::backdrop::UserToggles;
    use crate::engine::scheduler::FrameCallbacks;

    fn mounted_variants(app: &mut App) -> Vec<WaveVariant> {
        let mut q = app.world_mut().query::<&WaveStrategy>();
        q.iter(app.world()).map(|s| s.variant()).collect()
    }

    // ── navigation ──────────────────────────────────────────────────

    #[test]
    fn pages_cycle_and_parse() {
        assert_eq!(Page::Globe.next(), Page::Dashboard);
        assert_eq!(Page::from_id("DAO"), Some(Page::Dao));
        assert_eq!(Page::from_id("settings"), None);
    }

    #[test]
    fn page_variants_fall_back_to_configured() {
        assert_eq!(Page::Wallet.variant(WaveVariant::NoiseDrift), WaveVariant::NoiseDrift);
        assert_eq!(Page::Dao.variant(WaveVariant::RadialPulse), WaveVariant::OceanSwell);
    }

    // ── mounting ────────────────────────────────────────────────────

    #[test]
    fn each_page_visit_owns_exactly_one_backdrop() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<FrameCallbacks>()
            .init_resource::<UserToggles>()
            .insert_resource(BackdropOptions::default())
            .add_plugins(PagesPlugin(Page::Dashboard));

        app.update();
        assert_eq!(mounted_variants(&mut app), vec![WaveVariant::RadialPulse]);

        app.world_mut().resource_mut::<NextState<Page>>().set(Page::Dao);
        app.update();
        assert_eq!(mounted_variants(&mut app), vec![WaveVariant::OceanSwell]);

        app.world_mut().resource_mut::<NextState<Page>>().set(Page::Globe);
        app.update();
        assert_eq!(mounted_variants(&mut app), vec![WaveVariant::NoiseDrift]);
        assert_eq!(app.world().resource::<FrameCallbacks>().pending_len(), 0);
    }
}
