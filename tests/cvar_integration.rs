//! Integration tests for cvar registration, startup handling, and INI
//! persistence.

use std::path::PathBuf;

use configparser::ini::Ini;

use emberengine::engine::{Common, Engine};
use emberengine::resources::cvars::{CVAR_SECTION, CVarFlags, CVarKind, CVarRegistry};

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("emberengine_cvar_{}_{}", std::process::id(), name))
}

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[test]
fn archive_cvars_persist_through_ini() {
    let path = temp_path("archive.ini");

    let mut registry = CVarRegistry::new();
    registry.register(
        "time_scale",
        "1.0",
        CVarKind::Float,
        CVarFlags::ARCHIVE,
        "",
    );
    registry.register("show_fps", "0", CVarKind::Bool, CVarFlags::ARCHIVE, "");
    registry.register("speeds", "0", CVarKind::Bool, CVarFlags::NONE, "");
    registry.set("time_scale", "2.5").unwrap();
    registry.set("show_fps", "1").unwrap();
    registry.set("speeds", "1").unwrap();
    registry.write_config_to_file(&path).unwrap();

    let mut loaded = CVarRegistry::new();
    loaded.register(
        "time_scale",
        "1.0",
        CVarKind::Float,
        CVarFlags::ARCHIVE,
        "",
    );
    loaded.register("show_fps", "0", CVarKind::Bool, CVarFlags::ARCHIVE, "");
    loaded.register("speeds", "0", CVarKind::Bool, CVarFlags::NONE, "");
    let mut rejected = Vec::new();
    let applied = loaded.exec_config_file(&path, &mut rejected).unwrap();

    // The non-archive cvar never reached the file.
    assert_eq!(applied, 2);
    assert!(rejected.is_empty());
    assert!((loaded.get_float("time_scale") - 2.5).abs() < 1e-9);
    assert!(loaded.get_bool("show_fps"));
    assert!(!loaded.get_bool("speeds"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn write_flagged_selects_by_flag_intersection() {
    let path = temp_path("flagged.ini");

    let mut registry = CVarRegistry::new();
    registry.register("version", "Ember 0.1", CVarKind::Text, CVarFlags::ROM, "");
    registry.register("machine_spec", "2", CVarKind::Int, CVarFlags::INIT, "");
    registry.register("time_scale", "1.0", CVarKind::Float, CVarFlags::ARCHIVE, "");
    registry
        .write_flagged_to_file(&path, CVarFlags::ROM | CVarFlags::INIT, "startup")
        .unwrap();

    let mut ini = Ini::new();
    let map = ini.load(&path).unwrap();
    let section = map.get("startup").expect("section written");
    assert_eq!(section.len(), 2);
    assert!(section.contains_key("version"));
    assert!(section.contains_key("machine_spec"));
    assert!(!section.contains_key("time_scale"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn command_line_overrides_archived_config() {
    let config = temp_path("override.ini");
    {
        let mut seed = CVarRegistry::new();
        seed.register("time_scale", "1.0", CVarKind::Float, CVarFlags::ARCHIVE, "");
        seed.set("time_scale", "2.0").unwrap();
        seed.write_config_to_file(&config).unwrap();
    }

    let mut engine = Engine::new(&config);
    engine
        .init(&strings(&["+set", "time_scale", "4.0"]))
        .unwrap();
    {
        let cvars = engine.world().resource::<CVarRegistry>();
        assert!((cvars.get_float("time_scale") - 4.0).abs() < 1e-9);
    }
    engine.shutdown();

    std::fs::remove_file(&config).ok();
}

#[test]
fn config_file_may_reference_unregistered_cvars() {
    let path = temp_path("placeholder.ini");
    {
        let mut ini = Ini::new();
        ini.set(CVAR_SECTION, "later_subsystem_knob", Some("37".to_string()));
        ini.write(&path).unwrap();
    }

    let mut registry = CVarRegistry::new();
    let mut rejected = Vec::new();
    registry.exec_config_file(&path, &mut rejected).unwrap();
    assert!(rejected.is_empty());
    assert_eq!(registry.get_text("later_subsystem_knob"), "37");

    // The owning subsystem registers afterwards and keeps the loaded value.
    registry.register(
        "later_subsystem_knob",
        "10",
        CVarKind::Int,
        CVarFlags::ARCHIVE,
        "",
    );
    assert_eq!(registry.get_int("later_subsystem_knob"), 37);

    std::fs::remove_file(&path).ok();
}

#[test]
fn console_disabled_discards_injected_commands() {
    let config = temp_path("noconsole.ini");

    let mut engine = Engine::new(&config);
    engine
        .init(&strings(&["+set", "allow_console", "0"]))
        .unwrap();
    engine.queue_command("set smuggled 1").unwrap();
    engine.frame().unwrap();
    {
        let cvars = engine.world().resource::<CVarRegistry>();
        assert_eq!(cvars.get_text("smuggled"), "");
    }
    engine.shutdown();

    std::fs::remove_file(&config).ok();
}
