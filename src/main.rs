//! VODeco dashboard shell with the animated hexagon backdrop.
//!
//! Tab cycles pages, V cycles the wave variant, H toggles heavy animations,
//! M toggles reduced motion, F1 opens the inspector and Esc quits.

use bevy::app::AppExit;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

use vodeco_backdrop::backdrop::{BackdropOptions, BackdropPlugin};
use vodeco_backdrop::environment::{EnvironmentConfig, EnvironmentPlugin};
use vodeco_backdrop::pages::{Page, PagesPlugin};

/// Debug overlay visibility (F1 to toggle).
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
enum DebugOverlay {
    #[default]
    Hidden,
    Inspector,
}

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;

    use vodeco_backdrop::backdrop::BackdropOptions;
    use vodeco_backdrop::engine::clock::ClockMode;
    use vodeco_backdrop::engine::policy::ConnectionType;
    use vodeco_backdrop::engine::wave::WaveVariant;
    use vodeco_backdrop::environment::EnvironmentConfig;
    use vodeco_backdrop::pages::Page;

    #[derive(Parser, Debug)]
    #[command(name = "vodeco-backdrop", version, about)]
    pub struct Cli {
        /// Wave variant: radial, ocean or noise.
        #[arg(long, value_parser = variant)]
        variant: Option<WaveVariant>,

        /// Stroke color as `#rrggbb`.
        #[arg(long)]
        color: Option<String>,

        /// Floor of the opacity range.
        #[arg(long)]
        base_opacity: Option<f32>,

        /// Ceiling of the opacity range.
        #[arg(long)]
        pulse_opacity: Option<f32>,

        /// Animation speed multiplier.
        #[arg(long)]
        speed: Option<f32>,

        /// Mount the backdrop switched off.
        #[arg(long)]
        disabled: bool,

        /// Start with the reduced-motion preference set.
        #[arg(long)]
        reduced_motion: bool,

        /// Pretend to be on this connection (slow-2g, 2g, 3g, 4g, wifi, ethernet).
        #[arg(long, value_parser = connection)]
        connection: Option<ConnectionType>,

        /// Ignore device, visibility, battery and the heavy-animations toggle.
        #[arg(long)]
        ungated: bool,

        /// Use the seamless 30-second loop instead of the stepped clock.
        #[arg(long)]
        cyclic: bool,

        /// Page shown first.
        #[arg(long, value_parser = page)]
        page: Option<Page>,
    }

    fn variant(s: &str) -> Result<WaveVariant, String> {
        WaveVariant::from_id(s).ok_or_else(|| format!("unknown variant {s:?} (radial, ocean, noise)"))
    }

    fn connection(s: &str) -> Result<ConnectionType, String> {
        ConnectionType::from_id(s).ok_or_else(|| format!("unknown connection type {s:?}"))
    }

    fn page(s: &str) -> Result<Page, String> {
        Page::from_id(s).ok_or_else(|| format!("unknown page {s:?}"))
    }

    impl Cli {
        pub fn into_settings(self) -> (BackdropOptions, EnvironmentConfig, Page) {
            let defaults = BackdropOptions::default();
            let options = BackdropOptions {
                variant: self.variant.unwrap_or(defaults.variant),
                color: self.color.unwrap_or_else(|| defaults.color.clone()),
                base_opacity: self.base_opacity.unwrap_or(defaults.base_opacity),
                pulse_opacity: self.pulse_opacity.unwrap_or(defaults.pulse_opacity),
                speed: self.speed.unwrap_or(defaults.speed),
                enabled: !self.disabled,
                gated: !self.ungated,
                clock: if self.cyclic {
                    ClockMode::thirty_second_loop()
                } else {
                    defaults.clock
                },
                ..defaults
            };
            let environment = EnvironmentConfig {
                prefers_reduced_motion: self.reduced_motion,
                connection: self.connection,
                ..Default::default()
            };
            (options, environment, self.page.unwrap_or_default())
        }
    }

}

fn settings() -> (BackdropOptions, EnvironmentConfig, Page) {
    #[cfg(feature = "native")]
    {
        <cli::Cli as clap::Parser>::parse().into_settings()
    }
    #[cfg(not(feature = "native"))]
    {
        (BackdropOptions::default(), EnvironmentConfig::default(), Page::default())
    }
}

fn main() {
    let (options, environment, page) = settings();
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "VODeco".into(),
                    canvas: Some("#vodeco-backdrop".into()),
                    fit_canvas_to_parent: true,
                    ..default()
                }),
                ..default()
            })
            .set(LogPlugin {
                filter: "wgpu=error,naga=warn,vodeco_backdrop=debug".into(),
                ..default()
            }),
    )
    .register_type::<DebugOverlay>()
    .init_state::<DebugOverlay>()
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(BackdropPlugin(options))
    .add_plugins(EnvironmentPlugin(environment))
    .add_plugins(PagesPlugin(page))
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(DebugOverlay::Inspector)));

    #[cfg(feature = "native")]
    app.add_plugins(bevy::remote::RemotePlugin::default())
        .add_plugins(bevy::remote::http::RemoteHttpPlugin::default());

    app.run();
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<DebugOverlay>>,
    mut next: ResMut<NextState<DebugOverlay>>,
) {
    if keys.just_pressed(KeyCode::F1) {
        next.set(match state.get() {
            DebugOverlay::Hidden => DebugOverlay::Inspector,
            DebugOverlay::Inspector => DebugOverlay::Hidden,
        });
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
