#![cfg(not(target_arch = "wasm32"))]

use std::backtrace::Backtrace;
use std::fs::File;
use std::io::Write;
use std::panic;

use anyhow::Context as _;
use log::{error, info, LevelFilter};

use slop_scene::components::{
    Border, Figure, Fill, MouseHitbox, Position, Size, Text, TextAlign, TextSettings,
};
use slop_scene::gui::TextDebugUi;
use slop_scene::input_system::{ButtonAction, InputManager, Key, MouseButton};
use slop_scene::item::Item;
use slop_scene::renderer::RecordingRenderer;
use slop_scene::resource_manager::ResourceManager;
use slop_scene::{Color, Engine, EngineConfig, Folder, RefObj, Root, Severity};

fn main() {
    setup_diagnostics();
    info!("Starting slop_scene demo (headless)...");

    if let Err(e) = run() {
        error!("Demo failed: {:#}", e);
        std::process::exit(1);
    }
}

/// Sets up logging and crash dumping
fn setup_diagnostics() {
    env_logger::Builder::new()
        .filter_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Warn
        })
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env()
        .init();

    panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();

        let msg = match panic_info.payload().downcast_ref::<&'static str>() {
            Some(s) => *s,
            None => match panic_info.payload().downcast_ref::<String>() {
                Some(s) => &s[..],
                None => "Box<dyn Any>",
            },
        };

        let location = panic_info.location().map_or("Unknown location".to_string(), |loc| {
            format!("{}:{}", loc.file(), loc.line())
        });

        let crash_msg = format!(
            "=== SCENE CRASH ===\nReason: {}\nLocation: {}\n\nStack Trace:\n{}",
            msg, location, backtrace
        );
        eprintln!("\x1b[31;1m{}\x1b[0m", crash_msg);

        if let Ok(mut file) = File::create("scene_crash.log") {
            let _ = file.write_all(crash_msg.as_bytes());
            eprintln!("Crash report saved to scene_crash.log");
        }
    }));
}

/// Raw input fed to the demo, one event per frame.
enum Scripted {
    Move(f32, f32),
    Mouse(MouseButton, ButtonAction),
    Key(Key, ButtonAction),
}

impl Scripted {
    fn apply(&self, input: &mut InputManager) {
        match *self {
            Scripted::Move(x, y) => input.raw_pointer_move(x, y),
            Scripted::Mouse(button, action) => input.raw_mouse_event(button, action),
            Scripted::Key(key, action) => input.raw_key_event(key, action),
        }
    }
}

fn load_config() -> anyhow::Result<EngineConfig> {
    match std::env::args().nth(1) {
        Some(path) => EngineConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {}", path)),
        None => Ok(EngineConfig::default()),
    }
}

fn run() -> anyhow::Result<()> {
    let config = load_config()?;

    let mut resources = ResourceManager::new();
    let font = resources.font("fonts/mono.ttf");

    let play = Item::new("PlayButton")
        .with(Position::new(40.0, 60.0))
        .with(Size::new(120.0, 40.0))
        .with(Figure::rounded(0.4))
        .with(Fill::new(Color::BLUE))
        .with(Border::new(2.0, Color::WHITE))
        .with(MouseHitbox::new())
        .with(
            Text::new("Play", font.clone(), 20.0, Color::WHITE).with_settings(
                TextSettings::new()
                    .align_x(TextAlign::Center)
                    .align_y(TextAlign::Center),
            ),
        );

    let intro = Item::new("Intro")
        .with(Position::new(40.0, 120.0))
        .with(Size::new(160.0, 80.0))
        .with(
            Text::new(
                "A tiny scene engine with phased updates and greedy word wrap",
                font.clone(),
                16.0,
                Color::GREEN,
            )
            .with_settings(TextSettings::new().wrap(true).line_spacing(2.0)),
        );

    // Missing Position/Size/Figure get defaults with warnings.
    let ball = Item::new("Ball")
        .with(Fill::new(Color::RED))
        .with(MouseHitbox::new());

    let status = RefObj::new(String::from("frame 0"));
    let hud = Item::new("Status")
        .with(Position::new(4.0, 4.0))
        .with(Size::new(200.0, 20.0))
        .with(Text::new(status.clone(), font.clone(), 12.0, Color::WHITE));

    let root = Root::new(vec![
        Folder::scene("Menu").startup().with_item(play.clone()).with_item(intro),
        Folder::scene("Game").with_item(ball),
        Folder::persistent("Hud").with_item(hud),
    ]);

    let mut engine = Engine::new(config, root).with_resources(resources);
    let mut renderer = RecordingRenderer::new();
    let mut input = InputManager::new();

    engine.init(&mut renderer, &input)?;

    let script = [
        Scripted::Move(100.0, 80.0),
        Scripted::Mouse(MouseButton::Left, ButtonAction::Pressed),
        Scripted::Mouse(MouseButton::Left, ButtonAction::Released),
        Scripted::Key(Key::F3, ButtonAction::Pressed),
        Scripted::Key(Key::PageUp, ButtonAction::Pressed),
        Scripted::Key(Key::PageUp, ButtonAction::Released),
    ];

    for (frame, step) in script.iter().enumerate() {
        step.apply(&mut input);
        input.update();
        let scene = engine.root().current_scene_name().unwrap_or("-");
        status.set(format!("frame {} | scene {}", frame, scene));

        engine.frame(&mut renderer, &input)?;

        let Some(hitbox) = play.get::<MouseHitbox>() else {
            continue;
        };
        let clicked = hitbox.borrow().click(MouseButton::Left);
        if clicked {
            info!("Play clicked");
            engine.change_scene("Game", &mut renderer, &input)?;
        }

        let calls = renderer.take_calls();
        info!("frame {}: {} draw calls", frame, calls.len());
    }

    // Refused: Hud is persistent.
    if let Err(e) = engine.change_scene("Hud", &mut renderer, &input) {
        info!("Refused as expected: {}", e);
    }

    let mut ui = TextDebugUi::new();
    engine.debug_ui(&mut ui);
    println!("{}", ui.render());

    for severity in Severity::ALL {
        println!("{:>11}: {}", severity, engine.diagnostics().count(severity));
    }

    engine.shutdown(&mut renderer, &input);
    info!("Done after {} frames.", engine.frame_count());
    Ok(())
}
