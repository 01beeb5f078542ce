use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Result;
use scroll_feeder::{
    axis::{movement_parameters::MoveParams, state::MotionState, Axis},
    config::AppConfig,
    coordinator::{
        config::{CoordinatorConfig, Mode},
        Coordinator,
    },
    geometry::MotionProfile,
    runner::MotionRunner,
    sim::simulated_pair,
    socket_server::SocketServer,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Move(MoveParams),
    Halt,
}

/// Axis whose flag and reached readings follow a script; once the script
/// runs out the last value repeats.
struct ScriptedAxis {
    name: String,
    flags: Mutex<VecDeque<bool>>,
    reached: Mutex<VecDeque<bool>>,
    calls: Mutex<Vec<Call>>,
    fail_moves: bool,
    offline: bool,
}

impl ScriptedAxis {
    fn new(name: &str, flags: &[bool], reached: &[bool]) -> Self {
        Self {
            name: name.to_string(),
            flags: Mutex::new(flags.iter().copied().collect()),
            reached: Mutex::new(reached.iter().copied().collect()),
            calls: Mutex::new(Vec::new()),
            fail_moves: false,
            offline: false,
        }
    }

    fn failing(mut self) -> Self {
        self.fail_moves = true;
        self
    }

    /// Every call fails, as with a controller that is powered off.
    fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    fn check_online(&self) -> Result<()> {
        if self.offline {
            anyhow::bail!("controller {} unreachable", self.name);
        }
        Ok(())
    }

    fn moves(&self) -> Vec<MoveParams> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                Call::Move(p) => Some(*p),
                Call::Halt => None,
            })
            .collect()
    }

    fn last_call(&self) -> Option<Call> {
        self.calls.lock().unwrap().last().cloned()
    }
}

fn next(script: &Mutex<VecDeque<bool>>) -> bool {
    let mut script = script.lock().unwrap();
    if script.len() > 1 {
        script.pop_front().unwrap_or(true)
    } else {
        script.front().copied().unwrap_or(true)
    }
}

#[async_trait::async_trait]
impl Axis for ScriptedAxis {
    fn name(&self) -> &str {
        &self.name
    }

    async fn move_relative(&self, params: MoveParams) -> Result<()> {
        self.check_online()?;
        if self.fail_moves {
            anyhow::bail!("controller {} unreachable", self.name);
        }
        self.calls.lock().unwrap().push(Call::Move(params));
        Ok(())
    }

    async fn halt(&self) -> Result<()> {
        self.check_online()?;
        self.calls.lock().unwrap().push(Call::Halt);
        Ok(())
    }

    async fn check_reached(&self) -> Result<bool> {
        self.check_online()?;
        Ok(next(&self.reached))
    }

    async fn check_flag(&self) -> Result<bool> {
        self.check_online()?;
        Ok(next(&self.flags))
    }
}

fn coordinator(mode: Mode) -> Coordinator {
    let config = AppConfig::default();
    Coordinator::new(
        mode,
        MotionProfile::from_config(&config),
        MoveParams::new(config.repeat.velocity, config.repeat.steps),
    )
}

fn loop_config() -> CoordinatorConfig {
    CoordinatorConfig {
        tick_interval: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn button_cycle_moves_feed_then_take() {
    // Feed flag per tick: released, pressed, released...
    let feed = Arc::new(ScriptedAxis::new(
        "feed",
        &[true, false, true],
        &[false, false, false, false, true],
    ));
    // Take flag per tick: taut, taut, slack, slack, taut...
    let take = Arc::new(ScriptedAxis::new(
        "take",
        &[true, true, true, false, false, true],
        &[false],
    ));

    let coordinator = coordinator(Mode::Continuous);
    let profile = coordinator.profile().clone();
    let (mut runner, _control) = MotionRunner::new(
        coordinator,
        loop_config(),
        feed.clone(),
        take.clone(),
    );

    for _ in 0..6 {
        runner.tick().await.unwrap();
    }

    assert_eq!(runner.state().count, 6);
    assert_eq!(feed.moves(), vec![profile.feed_move(12.0)]);
    assert_eq!(take.moves(), vec![profile.take_move(12.0)]);
    assert_eq!(runner.state().take_state(), MotionState::WaitingForSlack);
    assert_eq!(take.last_call(), Some(Call::Halt));
}

#[tokio::test]
async fn driver_failure_ends_the_loop() {
    let feed = Arc::new(ScriptedAxis::new("feed", &[false, true], &[false]).failing());
    let take = Arc::new(ScriptedAxis::new("take", &[true], &[false]));

    let (mut runner, _control) = MotionRunner::new(
        coordinator(Mode::Continuous),
        loop_config(),
        feed,
        take,
    );
    let (_shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);

    let err = runner.run(shutdown_rx).await.unwrap_err();
    assert!(err.to_string().contains("unreachable"));
}

#[tokio::test]
async fn control_handle_reports_and_halts() {
    let feed = Arc::new(ScriptedAxis::new("feed", &[false], &[false]));
    let take = Arc::new(ScriptedAxis::new("take", &[true], &[false]));

    let (mut runner, control) = MotionRunner::new(
        coordinator(Mode::Continuous),
        loop_config(),
        feed.clone(),
        take.clone(),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    let state = control.get_state().await.unwrap();
    assert_eq!(state.feed_state(), MotionState::Armed);

    let halted = control.halt().await.unwrap();
    assert!(halted.is_idle());

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
    assert_eq!(feed.last_call(), Some(Call::Halt));
    assert_eq!(take.last_call(), Some(Call::Halt));
}

#[tokio::test]
async fn shutdown_halts_both_axes() {
    let feed = Arc::new(ScriptedAxis::new("feed", &[true], &[false]));
    let take = Arc::new(ScriptedAxis::new("take", &[true], &[false]));

    let (mut runner, _control) = MotionRunner::new(
        coordinator(Mode::Ticked),
        loop_config(),
        feed.clone(),
        take.clone(),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    shutdown_tx.send(()).unwrap();

    runner.run(shutdown_rx).await.unwrap();
    assert_eq!(runner.state().count, 1);
    assert!(runner.state().is_idle());
    assert_eq!(feed.last_call(), Some(Call::Halt));
}

#[tokio::test]
async fn repeat_mode_runs_without_feed_controller() {
    let feed = Arc::new(ScriptedAxis::new("feed", &[true], &[false]).offline());
    // Take flag per tick: slack, slack, slack, taut, slack...
    let take = Arc::new(ScriptedAxis::new(
        "take",
        &[false, false, false, true, false],
        &[false, true, false],
    ));

    let config = AppConfig::default();
    let repeat_move = MoveParams::new(config.repeat.velocity, config.repeat.steps);
    let (mut runner, _control) = MotionRunner::new(
        coordinator(Mode::Repeat),
        loop_config(),
        feed.clone(),
        take.clone(),
    );

    runner.initialize().await.unwrap();
    for _ in 0..5 {
        runner.tick().await.unwrap();
    }
    runner.halt().await.unwrap();

    assert_eq!(take.moves(), vec![repeat_move; 3]);
    assert_eq!(take.last_call(), Some(Call::Halt));
    assert!(feed.last_call().is_none());
}

#[tokio::test]
async fn repeat_mode_resumes_over_the_socket() {
    let feed = Arc::new(ScriptedAxis::new("feed", &[true], &[false]).offline());
    let take = Arc::new(ScriptedAxis::new("take", &[false], &[false]));

    let (mut runner, control) = MotionRunner::new(
        coordinator(Mode::Repeat),
        loop_config(),
        feed,
        take.clone(),
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    let response = SocketServer::process_command(r#"{"type":"halt"}"#, &control).await;
    assert!(response.is_success());
    let moves_after_halt = take.moves().len();

    let held = control.get_state().await.unwrap();
    assert!(held.is_idle());
    assert_eq!(take.moves().len(), moves_after_halt);

    let response = SocketServer::process_command(r#"{"type":"resume","id":"r"}"#, &control).await;
    assert!(response.is_success());
    let mut moving = control.get_state().await.unwrap();
    for _ in 0..100 {
        if moving.take_state() == MotionState::Moving {
            break;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
        moving = control.get_state().await.unwrap();
    }
    assert_eq!(moving.take_state(), MotionState::Moving);
    assert!(take.moves().len() > moves_after_halt);

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn simulated_ticked_run_completes_a_cycle() {
    let mut config = AppConfig::default();
    config.mode = Mode::Ticked;
    config.sim.press_interval_ticks = 1_000;
    config.sim.ticks_per_poll = 2_000;

    let (feed, take) = simulated_pair(&config);
    let (mut runner, _control) = MotionRunner::new(
        coordinator(Mode::Ticked),
        loop_config(),
        feed,
        take,
    );
    runner.initialize().await.unwrap();

    let mut left_idle = false;
    for _ in 0..500 {
        runner.tick().await.unwrap();
        if !runner.state().is_idle() {
            left_idle = true;
        } else if left_idle {
            break;
        }
    }

    assert!(left_idle);
    assert!(runner.state().is_idle());
    assert_eq!(runner.state().move_left(), Some(0.0));
}

#[tokio::test]
async fn socket_commands_reach_the_loop() {
    let feed = Arc::new(ScriptedAxis::new("feed", &[true], &[false]));
    let take = Arc::new(ScriptedAxis::new("take", &[true], &[false]));
    let (mut runner, control) = MotionRunner::new(
        coordinator(Mode::Continuous),
        loop_config(),
        feed,
        take,
    );
    let (shutdown_tx, shutdown_rx) = tokio::sync::broadcast::channel(1);
    let handle = tokio::spawn(async move { runner.run(shutdown_rx).await });

    let response = SocketServer::process_command(r#"{"type":"ping","id":"p"}"#, &control).await;
    assert!(response.is_success());

    let response = SocketServer::process_command(r#"{"type":"get_state"}"#, &control).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["state"]["phase"]["mode"], "continuous");
    assert_eq!(json["data"]["state"]["phase"]["feed"], "idle");

    let response = SocketServer::process_command("not json", &control).await;
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["code"], "parse_error");

    shutdown_tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    let response = SocketServer::process_command(r#"{"type":"halt"}"#, &control).await;
    assert!(!response.is_success());
}
