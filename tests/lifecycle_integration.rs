//! Integration tests for engine lifecycle sequencing: init, frames, tools,
//! configuration persistence on shutdown, and quit handling.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use emberengine::engine::{Common, ENGINE_VERSION, Engine};
use emberengine::resources::cvars::CVarRegistry;
use emberengine::resources::enginestate::{EngineState, EngineStates};
use emberengine::resources::frametime::FrameTime;
use emberengine::resources::tools::{ToolFlag, ToolState};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "emberengine_lifecycle_{}_{}",
        std::process::id(),
        name
    ))
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[test]
fn init_brings_the_engine_to_running() {
    let config = temp_path("running.ini");
    let mut engine = Engine::new(&config);
    assert!(!engine.is_initialized());

    engine.init(&[]).unwrap();
    assert!(engine.is_initialized());
    {
        let state = engine.world().resource::<EngineState>();
        assert_eq!(state.get(), &EngineStates::Running);
        let cvars = engine.world().resource::<CVarRegistry>();
        assert_eq!(cvars.get_text("version"), ENGINE_VERSION);
        assert!(!cvars.in_startup_phase());
    }

    // init is idempotent once complete
    engine.init(&strings(&["+set", "developer", "1"])).unwrap();
    assert!(!engine.world().resource::<CVarRegistry>().get_bool("developer"));

    engine.shutdown();
    assert!(!engine.is_initialized());
    assert_eq!(
        engine.world().resource::<EngineState>().get(),
        &EngineStates::None
    );
    // shutdown is idempotent too
    engine.shutdown();

    std::fs::remove_file(&config).ok();
}

#[test]
fn frame_before_init_is_a_recoverable_error() {
    let mut engine = Engine::new(temp_path("early.ini"));
    let err = engine.frame().unwrap_err();
    assert!(!err.is_fatal());
}

#[test]
fn frames_advance_frame_time() {
    let config = temp_path("frames.ini");
    let mut engine = Engine::new(&config);
    engine.init(&[]).unwrap();

    engine.frame().unwrap();
    engine.frame().unwrap();
    engine.frame().unwrap();
    {
        let time = engine.world().resource::<FrameTime>();
        assert_eq!(time.frame_count, 3);
        // The second and third frames carry real wall-clock deltas.
        assert!(time.elapsed > 0.0);
    }

    engine.shutdown();
    std::fs::remove_file(&config).ok();
}

#[test]
fn quit_request_reaches_the_main_loop() {
    let config = temp_path("quit.ini");
    let mut engine = Engine::new(&config);
    engine.init(&[]).unwrap();
    assert!(!engine.is_quitting());

    engine.quit();
    assert!(engine.is_quitting());

    engine.shutdown();
    std::fs::remove_file(&config).ok();
}

#[test]
fn quit_console_command_applies_during_a_frame() {
    let config = temp_path("quitcmd.ini");
    let mut engine = Engine::new(&config);
    engine.init(&[]).unwrap();

    engine.queue_command("quit").unwrap();
    assert!(!engine.is_quitting());
    engine.frame().unwrap();
    assert!(engine.is_quitting());

    engine.shutdown();
    std::fs::remove_file(&config).ok();
}

#[test]
fn gui_frame_executes_commands_only_when_asked() {
    let config = temp_path("guiframe.ini");
    let mut engine = Engine::new(&config);
    engine.init(&[]).unwrap();

    engine.queue_command("set tool_knob 5").unwrap();
    engine.gui_frame(false);
    assert_eq!(
        engine.world().resource::<CVarRegistry>().get_text("tool_knob"),
        ""
    );

    engine.gui_frame(true);
    assert_eq!(
        engine.world().resource::<CVarRegistry>().get_text("tool_knob"),
        "5"
    );

    engine.shutdown();
    std::fs::remove_file(&config).ok();
}

#[test]
fn shutdown_writes_modified_archive_cvars() {
    let config = temp_path("persist.ini");
    std::fs::remove_file(&config).ok();

    let mut engine = Engine::new(&config);
    engine
        .init(&strings(&["+set", "time_scale", "2.5"]))
        .unwrap();
    engine.shutdown();

    let written = std::fs::read_to_string(&config).expect("config written on shutdown");
    assert!(written.contains("time_scale"));
    assert!(written.contains("2.5"));

    // A second run picks the value back up without any command line.
    let mut engine = Engine::new(&config);
    engine.init(&[]).unwrap();
    assert!(
        (engine
            .world()
            .resource::<CVarRegistry>()
            .get_float("time_scale")
            - 2.5)
            .abs()
            < 1e-9
    );
    engine.shutdown();

    std::fs::remove_file(&config).ok();
}

#[test]
fn tools_register_and_toggle_focus() {
    let config = temp_path("tools.ini");
    let mut engine = Engine::new(&config);
    engine.init(&[]).unwrap();

    let mut args = FxHashMap::default();
    args.insert("map".to_string(), "hangar".to_string());
    engine.init_tool(ToolFlag::LevelEditor, &args);
    engine.activate_tool(true);
    {
        let tools = engine.world().resource::<ToolState>();
        assert!(tools.active_tools().contains(ToolFlag::LevelEditor));
        assert!(!tools.active_tools().contains(ToolFlag::Debugger));
        assert!(tools.has_focus());
        assert_eq!(
            tools
                .tool_args(ToolFlag::LevelEditor)
                .and_then(|a| a.get("map"))
                .map(String::as_str),
            Some("hangar")
        );
    }

    engine.activate_tool(false);
    assert!(!engine.world().resource::<ToolState>().has_focus());

    engine.shutdown();
    std::fs::remove_file(&config).ok();
}

#[test]
fn language_dict_loads_from_the_lang_cvar() {
    let config = temp_path("lang.ini");
    let strings_path = temp_path("strings.json");
    std::fs::write(
        &strings_path,
        r##"{"#str_00001": "Loading...", "#str_00002": "Press any key"}"##,
    )
    .unwrap();

    let mut engine = Engine::new(&config);
    let lang_arg = strings_path.to_string_lossy().to_string();
    engine
        .init(&strings(&["+set", "lang", lang_arg.as_str()]))
        .unwrap();

    let dict = engine.language_dict();
    assert_eq!(dict.get("#str_00001"), "Loading...");
    assert_eq!(dict.get("#str_unknown"), "#str_unknown");
    assert_eq!(dict.get("plain text"), "plain text");

    engine.shutdown();
    std::fs::remove_file(&config).ok();
    std::fs::remove_file(&strings_path).ok();
}

#[test]
fn startup_variable_applies_exact_matches_first() {
    let config = temp_path("startup.ini");
    let mut engine = Engine::new(&config);

    // init applies the early developer override before registering the
    // remaining builtins, then everything else afterwards.
    engine
        .init(&strings(&[
            "+set",
            "developer",
            "1",
            "+set",
            "show_fps",
            "1",
        ]))
        .unwrap();
    {
        let cvars = engine.world().resource::<CVarRegistry>();
        assert!(cvars.get_bool("developer"));
        assert!(cvars.get_bool("show_fps"));
        assert_eq!(cvars.pending_set_count(), 0);
    }

    engine.shutdown();
    std::fs::remove_file(&config).ok();
}
