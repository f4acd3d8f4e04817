//! Engine coordinator.
//!
//! [`Common`] is the contract the rest of an engine programs against:
//! lifecycle sequencing, the foreground frame, the background 60 Hz
//! cadence, configuration persistence, console output, and the two-severity
//! fatal path. [`Engine`] is the concrete implementation; it owns the ECS
//! [`World`] holding every coordinator resource and the schedules that
//! advance them.
//!
//! # Main Loop
//!
//! 1. [`Common::init`] wires resources, applies the startup command line
//!    over the archived configuration, and spawns the tic thread last
//! 2. The driver calls [`Common::frame`] until [`Engine::is_quitting`]
//! 3. Recoverable errors abort a frame back to the driver; fatal errors end
//!    the run
//! 4. [`Common::shutdown`] persists modified archive cvars and joins the
//!    tic thread

use crate::error::EngineError;
use crate::events::asynctick::AsyncMessage;
use crate::events::enginestate::{EngineStateChangedEvent, observe_enginestate_change_event};
use crate::resources::asynctick::{AsyncBridge, AsyncStats, shutdown_async, spawn_async};
use crate::resources::commandqueue::CommandQueue;
use crate::resources::console::{Console, FlushFn};
use crate::resources::cvars::{CVarFlags, CVarKind, CVarRegistry};
use crate::resources::enginestate::{
    EngineState, EngineStates, NextEngineState, NextEngineStates,
};
use crate::resources::frametime::{FrameSpeeds, FrameTime};
use crate::resources::langdict::LangDict;
use crate::resources::tools::{ToolFlag, ToolState};
use crate::resources::warnings::{WarningQueue, print_warnings};
use crate::systems::asynctick::{
    poll_async_messages, update_async_stats, update_bevy_async_messages,
};
use crate::systems::commands::execute_pending_commands;
use crate::systems::cvars::apply_cvar_changes;
use crate::systems::enginestate::{check_pending_state, state_is_running};
use crate::systems::frametime::{report_frame_stats, update_frame_time};
use bevy_ecs::observer::Observer;
use bevy_ecs::prelude::*;
use log::{error, info, warn};
use rustc_hash::FxHashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Engine name and crate version, also the value of the `version` cvar.
pub const ENGINE_VERSION: &str = concat!("Ember Engine ", env!("CARGO_PKG_VERSION"));

/// Configuration file used when the driver does not name one.
pub const DEFAULT_CONFIG_PATH: &str = "./engine.ini";

/// Longest the foreground frame will wait for the tic counter to advance.
/// Bounds the damage if the tic thread dies.
const MAX_TIC_WAIT: Duration = Duration::from_millis(100);

/// Central coordinator contract.
///
/// Everything the surrounding engine modules are allowed to ask of the
/// coordinator goes through this trait, so alternative hosts (dedicated
/// server, tool harness) can substitute their own implementation.
pub trait Common {
    /// Initialize everything. `args` is the command line without the
    /// executable name; `+set name value` constructs are consumed here.
    fn init(&mut self, args: &[String]) -> Result<(), EngineError>;

    /// Shuts down everything. Safe to call more than once.
    fn shutdown(&mut self);

    /// Request an orderly exit; the main loop observes the state change.
    fn quit(&mut self);

    /// Returns true if initialization is complete.
    fn is_initialized(&self) -> bool;

    /// Called repeatedly as the foreground for one frame of engine work.
    fn frame(&mut self) -> Result<(), EngineError>;

    /// Called repeatedly by blocking function calls with tool interactivity.
    /// Pumps cadence messages; executes queued commands when `exec_cmd`.
    fn gui_frame(&mut self, exec_cmd: bool);

    /// One 60 Hz background tic. Driven by the tic thread after `init` has
    /// completed; a direct call steps the cadence once.
    fn async_tick(&self);

    /// Applies command line `+set var value` constructs. If `name` is None,
    /// all captured set commands are applied, otherwise only a set with the
    /// exact name. Only used during startup.
    fn startup_variable(&mut self, name: Option<&str>);

    /// Initializes a tool with the given launch arguments.
    fn init_tool(&mut self, tool: ToolFlag, args: &FxHashMap<String, String>);

    /// Activates or deactivates tool focus.
    fn activate_tool(&mut self, active: bool);

    /// Writes the user's configuration (all ARCHIVE cvars) to a file.
    fn write_config_to_file(&mut self, path: &Path) -> Result<(), String>;

    /// Writes cvars with the given flags to a file under an INI section.
    fn write_flagged_cvars_to_file(
        &mut self,
        path: &Path,
        flags: CVarFlags,
        section: &str,
    ) -> Result<(), String>;

    /// Begins redirection of console output into a bounded buffer.
    fn begin_redirect(&mut self, capacity: usize, flush: FlushFn);

    /// Stops redirection of console output.
    fn end_redirect(&mut self);

    /// Update the screen with every message printed.
    fn set_refresh_on_print(&mut self, set: bool);

    /// Prints a message to the console, which may cause a screen update if
    /// refresh-on-print is set.
    fn print(&mut self, msg: &str);

    /// Same as `print` with deferred formatting; `print` pipes through
    /// here-equivalent formatting at the call site.
    fn print_args(&mut self, args: fmt::Arguments<'_>);

    /// Prints a message that only shows up if the `developer` cvar is set,
    /// and never forces a screen update.
    fn print_dev(&mut self, msg: &str);

    /// Prints WARNING: message and adds it to a queue for printing later.
    fn warning(&mut self, msg: &str);

    /// Prints WARNING: message that only shows up if the `developer` cvar
    /// is set. Not queued.
    fn warning_dev(&mut self, msg: &str);

    /// Prints all queued warnings.
    fn print_warnings(&mut self);

    /// Removes all queued warnings and names the phase gathered from now on.
    fn clear_warnings(&mut self, reason: &str);

    /// Raise a recoverable error: appropriate for media or dynamic logic
    /// problems. Returns the value to propagate; the main loop drops back
    /// to the frame loop.
    fn error(&mut self, msg: &str) -> EngineError;

    /// Raise a fatal error: appropriate for static internal errors or cases
    /// where engine state may be corrupted. The main loop quits.
    fn fatal_error(&mut self, msg: &str) -> EngineError;

    /// Returns the dictionary with language specific strings.
    fn language_dict(&self) -> &LangDict;
}

/// The engine coordinator.
pub struct Engine {
    world: World,
    update: Schedule,
    gui: Schedule,
    exec: Schedule,
    config_path: PathBuf,
    initialized: bool,
    error_depth: u32,
    last_frame: Option<Instant>,
    last_sync_tic: u32,
}

impl Engine {
    /// Create an engine with its resources in place but nothing running.
    /// Call [`Common::init`] before driving frames.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let mut world = World::new();
        world.insert_resource(CVarRegistry::new());
        world.insert_resource(Console::new());
        world.insert_resource(WarningQueue::new());
        world.insert_resource(CommandQueue::new());
        world.insert_resource(FrameTime::default().with_time_scale(1.0));
        world.insert_resource(FrameSpeeds::default());
        world.insert_resource(AsyncStats::default());
        world.insert_resource(ToolState::new());
        world.insert_resource(LangDict::default());
        world.insert_resource(EngineState::new());
        world.insert_resource(NextEngineState::new());
        world.insert_resource(Messages::<AsyncMessage>::default());

        world.spawn(Observer::new(observe_enginestate_change_event));
        // Ensure the observer is registered before anything triggers events.
        world.flush();

        let mut update = Schedule::default();
        // Must run early to apply cvar changes before other systems
        update.add_systems(apply_cvar_changes.run_if(state_is_running));
        update.add_systems(execute_pending_commands);
        update.add_systems(check_pending_state.after(execute_pending_commands));
        update.add_systems(
            // cadence systems must be together
            (
                poll_async_messages,
                update_bevy_async_messages,
                update_async_stats,
            )
                .chain(),
        );
        update.add_systems(report_frame_stats.after(update_async_stats));

        let mut gui = Schedule::default();
        gui.add_systems(
            (
                poll_async_messages,
                update_bevy_async_messages,
                update_async_stats,
            )
                .chain(),
        );

        let mut exec = Schedule::default();
        exec.add_systems((execute_pending_commands, check_pending_state).chain());

        Engine {
            world,
            update,
            gui,
            exec,
            config_path: config_path.into(),
            initialized: false,
            error_depth: 0,
            last_frame: None,
            last_sync_tic: 0,
        }
    }

    /// Read access to the coordinator world, mainly for tests and tools.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Write access to the coordinator world, mainly for tests and tools.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Current background tic count, 0 before the cadence starts.
    pub fn tic_number(&self) -> u32 {
        self.world
            .get_resource::<AsyncBridge>()
            .map(|bridge| bridge.core.tic_number())
            .unwrap_or(0)
    }

    /// True once an orderly exit has been requested or applied.
    pub fn is_quitting(&self) -> bool {
        let current = self.world.resource::<EngineState>();
        if matches!(current.get(), EngineStates::Quitting) {
            return true;
        }
        let next = self.world.resource::<NextEngineState>();
        matches!(next.get(), NextEngineStates::Pending(EngineStates::Quitting))
    }

    /// Queue one line of console command text for deferred execution.
    pub fn queue_command(&mut self, text: &str) -> Result<(), String> {
        self.world.resource_mut::<CommandQueue>().queue_text(text)
    }

    fn request_state(&mut self, state: EngineStates) {
        self.world.resource_mut::<NextEngineState>().set(state);
        self.world.trigger(EngineStateChangedEvent {});
        self.world.flush();
    }

    fn register_builtin_cvars(&mut self) {
        let mut cvars = self.world.resource_mut::<CVarRegistry>();
        cvars.register(
            "version",
            ENGINE_VERSION,
            CVarKind::Text,
            CVarFlags::ROM,
            "engine version",
        );
        cvars.register(
            "developer",
            "0",
            CVarKind::Bool,
            CVarFlags::NONE,
            "print developer output",
        );
        cvars.register(
            "allow_console",
            "1",
            CVarKind::Bool,
            CVarFlags::INIT,
            "permit externally injected console commands",
        );
        cvars.register(
            "speeds",
            "0",
            CVarKind::Bool,
            CVarFlags::NONE,
            "print frame phase timings",
        );
        cvars.register(
            "show_fps",
            "0",
            CVarKind::Bool,
            CVarFlags::ARCHIVE,
            "print the averaged frame rate",
        );
        cvars.register(
            "show_async_stats",
            "0",
            CVarKind::Bool,
            CVarFlags::NONE,
            "print background cadence counters",
        );
        cvars.register(
            "async_input",
            "0",
            CVarKind::Bool,
            CVarFlags::ARCHIVE,
            "sample input on the background tic thread",
        );
        cvars.register(
            "async_sound",
            "1",
            CVarKind::Bool,
            CVarFlags::ARCHIVE,
            "produce sound mix pulses on the background tic thread",
        );
        cvars.register(
            "time_scale",
            "1.0",
            CVarKind::Float,
            CVarFlags::ARCHIVE,
            "simulation speed multiplier",
        );
        cvars.register(
            "lang",
            "strings/english.json",
            CVarKind::Text,
            CVarFlags::ARCHIVE,
            "language dictionary file",
        );
    }

    fn exec_startup_config(&mut self) {
        let path = self.config_path.clone();
        if !path.exists() {
            let note = format!("no configuration file at {}", path.display());
            self.print_dev(&note);
            return;
        }
        let mut rejected = Vec::new();
        let result = self
            .world
            .resource_mut::<CVarRegistry>()
            .exec_config_file(&path, &mut rejected);
        if let Err(e) = result {
            self.warning(&e);
        }
        for message in rejected {
            self.warning(&message);
        }
    }

    fn load_language_dict(&mut self) {
        let path_text = self
            .world
            .resource::<CVarRegistry>()
            .get_text("lang")
            .to_string();
        if path_text.is_empty() {
            return;
        }
        match LangDict::load_from_file(&PathBuf::from(&path_text)) {
            Ok(dict) => {
                self.world.insert_resource(dict);
            }
            Err(e) => self.warning(&e),
        }
    }

    /// Hold the foreground to the background cadence: wait until at least
    /// one tic has elapsed since the previous frame, bounded by
    /// [`MAX_TIC_WAIT`].
    fn sync_to_tics(&mut self) {
        let Some(bridge) = self.world.get_resource::<AsyncBridge>() else {
            return;
        };
        let core = Arc::clone(&bridge.core);
        let deadline = Instant::now() + MAX_TIC_WAIT;
        while core.tic_number() <= self.last_sync_tic {
            if Instant::now() >= deadline {
                warn!("tic counter stalled at {}", self.last_sync_tic);
                break;
            }
            std::thread::sleep(Duration::from_micros(500));
        }
        self.last_sync_tic = core.tic_number();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(DEFAULT_CONFIG_PATH)
    }
}

impl Common for Engine {
    fn init(&mut self, args: &[String]) -> Result<(), EngineError> {
        if self.initialized {
            return Ok(());
        }
        info!("{} initializing", ENGINE_VERSION);
        self.request_state(EngineStates::Setup);

        let capture_warnings = self
            .world
            .resource_mut::<CVarRegistry>()
            .capture_startup_sets(args);
        for message in capture_warnings {
            self.warning(&message);
        }

        // Early override so developer prints already work during init.
        self.startup_variable(Some("developer"));
        self.register_builtin_cvars();

        // Archived configuration first, the rest of the command line on top.
        self.exec_startup_config();
        self.startup_variable(None);
        self.world.resource_mut::<CVarRegistry>().end_startup();

        self.load_language_dict();

        if let Err(e) = self.update.initialize(&mut self.world) {
            return Err(self.fatal_error(&format!("failed to build the update schedule: {:?}", e)));
        }

        // The cadence must not start before everything above is ready.
        spawn_async(&mut self.world);
        {
            let cvars = self.world.resource::<CVarRegistry>();
            let input = cvars.get_bool("async_input");
            let sound = cvars.get_bool("async_sound");
            let bridge = self.world.resource::<AsyncBridge>();
            bridge.core.set_input_enabled(input);
            bridge.core.set_sound_enabled(sound);
        }

        self.request_state(EngineStates::Running);
        self.initialized = true;
        let banner = format!("{} initialized", ENGINE_VERSION);
        self.print(&banner);
        Ok(())
    }

    fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        info!("{} shutting down", ENGINE_VERSION);
        self.end_redirect();

        if self.world.resource::<CVarRegistry>().modified_archive() {
            let path = self.config_path.clone();
            if let Err(e) = self.write_config_to_file(&path) {
                warn!("{}", e);
            }
        }

        shutdown_async(&mut self.world);
        self.clear_warnings("shutdown");
        self.world
            .resource_mut::<EngineState>()
            .set(EngineStates::None);
        self.world.resource_mut::<NextEngineState>().reset();
        self.last_frame = None;
        self.last_sync_tic = 0;
        self.initialized = false;
    }

    fn quit(&mut self) {
        if !self.initialized {
            return;
        }
        self.request_state(EngineStates::Quitting);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn frame(&mut self) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::Recoverable(
                "frame called before init".to_string(),
            ));
        }
        self.sync_to_tics();

        let frame_start = Instant::now();
        let raw_dt = self
            .last_frame
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(frame_start);

        update_frame_time(&mut self.world, raw_dt);

        let update_start = Instant::now();
        self.update.run(&mut self.world);
        let update_ms = update_start.elapsed().as_secs_f32() * 1000.0;

        self.world.clear_trackers(); // Clear changed resources for next frame

        let mut speeds = self.world.resource_mut::<FrameSpeeds>();
        speeds.frame_ms = frame_start.elapsed().as_secs_f32() * 1000.0;
        speeds.update_ms = update_ms;

        // A completed frame ends any in-flight error recovery.
        self.error_depth = 0;
        Ok(())
    }

    fn gui_frame(&mut self, exec_cmd: bool) {
        if !self.initialized {
            return;
        }
        self.gui.run(&mut self.world);
        if exec_cmd {
            self.exec.run(&mut self.world);
        }
    }

    fn async_tick(&self) {
        if let Some(bridge) = self.world.get_resource::<AsyncBridge>() {
            bridge.core.step();
        }
    }

    fn startup_variable(&mut self, name: Option<&str>) {
        let warnings = self
            .world
            .resource_mut::<CVarRegistry>()
            .startup_variable(name);
        for message in warnings {
            self.warning(&message);
        }
    }

    fn init_tool(&mut self, tool: ToolFlag, args: &FxHashMap<String, String>) {
        self.world.resource_mut::<ToolState>().init_tool(tool, args);
        let note = format!("initialized tool {:?}", tool);
        self.print_dev(&note);
    }

    fn activate_tool(&mut self, active: bool) {
        self.world.resource_mut::<ToolState>().activate(active);
        let note = format!("tool focus {}", if active { "gained" } else { "lost" });
        self.print_dev(&note);
    }

    fn write_config_to_file(&mut self, path: &Path) -> Result<(), String> {
        let line = format!("writing {}", path.display());
        self.print(&line);
        self.world
            .resource::<CVarRegistry>()
            .write_config_to_file(path)?;
        // Written values are no longer pending.
        let mut cvars = self.world.resource_mut::<CVarRegistry>();
        let written: Vec<String> = cvars
            .iter()
            .filter(|c| c.flags.contains(CVarFlags::ARCHIVE) && c.modified)
            .map(|c| c.name.clone())
            .collect();
        for name in &written {
            cvars.clear_modified(name);
        }
        Ok(())
    }

    fn write_flagged_cvars_to_file(
        &mut self,
        path: &Path,
        flags: CVarFlags,
        section: &str,
    ) -> Result<(), String> {
        let line = format!("writing {}", path.display());
        self.print(&line);
        self.world
            .resource::<CVarRegistry>()
            .write_flagged_to_file(path, flags, section)
    }

    fn begin_redirect(&mut self, capacity: usize, flush: FlushFn) {
        self.world
            .resource_mut::<Console>()
            .begin_redirect(capacity, flush);
    }

    fn end_redirect(&mut self) {
        self.world.resource_mut::<Console>().end_redirect();
    }

    fn set_refresh_on_print(&mut self, set: bool) {
        self.world.resource_mut::<Console>().set_refresh_on_print(set);
    }

    fn print(&mut self, msg: &str) {
        self.world.resource_mut::<Console>().write(msg);
    }

    fn print_args(&mut self, args: fmt::Arguments<'_>) {
        let text = fmt::format(args);
        self.print(&text);
    }

    fn print_dev(&mut self, msg: &str) {
        if self.world.resource::<CVarRegistry>().get_bool("developer") {
            self.print(msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        let line = format!("WARNING: {}", msg);
        self.world.resource_mut::<Console>().write(&line);
        self.world.resource_mut::<WarningQueue>().push_unique(msg);
    }

    fn warning_dev(&mut self, msg: &str) {
        if self.world.resource::<CVarRegistry>().get_bool("developer") {
            let line = format!("WARNING: {}", msg);
            self.world.resource_mut::<Console>().write(&line);
        }
    }

    fn print_warnings(&mut self) {
        self.world.resource_scope(|world, mut console: Mut<Console>| {
            let queue = world.resource::<WarningQueue>();
            print_warnings(&mut console, queue);
        });
    }

    fn clear_warnings(&mut self, reason: &str) {
        self.world.resource_mut::<WarningQueue>().clear(reason);
    }

    fn error(&mut self, msg: &str) -> EngineError {
        self.error_depth += 1;
        if self.error_depth > 1 {
            // A second error before recovery finished; assume the first
            // recovery path is itself broken.
            return self.fatal_error(&format!("recursive error after: {}", msg));
        }
        self.end_redirect();
        error!("{}", msg);
        self.print("********************");
        let line = format!("ERROR: {}", msg);
        self.print(&line);
        self.print("********************");
        EngineError::Recoverable(msg.to_string())
    }

    fn fatal_error(&mut self, msg: &str) -> EngineError {
        self.end_redirect();
        error!("{}", msg);
        self.print("********************");
        let line = format!("FATAL ERROR: {}", msg);
        self.print(&line);
        self.print("********************");
        EngineError::Fatal(msg.to_string())
    }

    fn language_dict(&self) -> &LangDict {
        self.world.resource::<LangDict>()
    }
}
