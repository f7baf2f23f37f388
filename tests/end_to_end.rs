//! End-to-end turns over real HTTP workers.
//!
//! Every test binds its worker servers on ephemeral ports, wires a
//! coordinator to them (directly or through a TOML file) and checks the
//! action, the trace and the telemetry that come back.

use std::io::Write;
use std::sync::Arc;

use trio::config::{WorkerConfig, WorkersConfig};
use trio::{SystemConfig, build_coordinator};
use trio_coord::{Coordinator, CoordinatorConfig, StageDeadlines, Workers};
use trio_game::{Board, Game, Mark, Position, RulesEngine};
use trio_protocol::{
    CoordinationMode, DurationMs, ErrorKind, Stage, Substitution, TelemetryEvent, TelemetrySink,
    TransportKind, WorkerClient, WorkerRole,
};
use trio_telemetry::MemorySink;
use trio_transport::{RemoteClient, WorkerServer};
use trio_worker::endpoint_for;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

const MODES: [CoordinationMode; 2] = [CoordinationMode::Sequential, CoordinationMode::Parallel];

/// Scout, Strategist and Executor servers, in that order.
struct Trio {
    servers: Vec<WorkerServer>,
}

impl Trio {
    async fn start(telemetry: Arc<dyn TelemetrySink>) -> Self {
        let mut servers = Vec::new();
        for role in WorkerRole::ALL {
            let endpoint = Arc::new(endpoint_for(role, telemetry.clone()).unwrap());
            servers.push(WorkerServer::bind("127.0.0.1:0", endpoint).await.unwrap());
        }
        Self { servers }
    }

    fn url(&self, role: WorkerRole) -> String {
        let index = WorkerRole::ALL.iter().position(|r| *r == role).unwrap();
        self.servers[index].url()
    }

    fn workers_config(&self) -> WorkersConfig {
        WorkersConfig {
            scout: WorkerConfig::remote(self.url(WorkerRole::Scout)),
            strategist: WorkerConfig::remote(self.url(WorkerRole::Strategist)),
            executor: WorkerConfig::remote(self.url(WorkerRole::Executor)),
        }
    }

    async fn shutdown(self) {
        for server in self.servers {
            server.shutdown().await.unwrap();
        }
    }
}

fn remote(role: WorkerRole, url: String) -> Arc<dyn WorkerClient> {
    Arc::new(RemoteClient::new(role, url))
}

async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/mcp")
}

fn config(mode: CoordinationMode) -> CoordinatorConfig {
    let d = DurationMs::from_secs(2);
    CoordinatorConfig {
        mode,
        deadlines: StageDeadlines::uniform(d, d),
    }
}

fn blocking_board() -> Board {
    Board::from_rows(["XX.", ".O.", "..."])
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Healthy workers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn remote_workers_block_the_open_line() {
    let sink = Arc::new(MemorySink::new());
    let trio = Trio::start(sink.clone()).await;

    for mode in MODES {
        let workers = Workers::new(
            remote(WorkerRole::Scout, trio.url(WorkerRole::Scout)),
            remote(WorkerRole::Strategist, trio.url(WorkerRole::Strategist)),
            remote(WorkerRole::Executor, trio.url(WorkerRole::Executor)),
        );
        let coordinator = Coordinator::new(workers, config(mode), sink.clone());
        let report = coordinator
            .process_turn(&blocking_board(), Mark::O)
            .await
            .unwrap();

        assert_eq!(report.action.position, Position::new(0, 2), "{mode}");
        assert_eq!(report.action.player, Mark::O);
        assert_eq!(report.recovered_failures, 0, "{mode}: {:?}", report.trace);
        assert!(report.failure(Stage::Observe).is_none());

        let status = coordinator.status();
        for role in WorkerRole::ALL {
            assert!(status.health(role).unwrap().is_healthy(), "{mode} {role}");
        }
    }

    trio.shutdown().await;
}

#[tokio::test]
async fn remote_and_local_agree() {
    let trio = Trio::start(Arc::new(MemorySink::new())).await;
    let board = Board::from_rows(["X..", ".O.", "..X"]);

    let remote_config = SystemConfig {
        coordinator: config(CoordinationMode::Sequential),
        workers: trio.workers_config(),
    };
    let local_config = SystemConfig {
        coordinator: config(CoordinationMode::Sequential),
        workers: WorkersConfig::default(),
    };

    let sink: Arc<dyn TelemetrySink> = Arc::new(MemorySink::new());
    let over_http = build_coordinator(&remote_config, sink.clone())
        .unwrap()
        .process_turn(&board, Mark::O)
        .await
        .unwrap();
    let in_process = build_coordinator(&local_config, sink)
        .unwrap()
        .process_turn(&board, Mark::O)
        .await
        .unwrap();

    assert_eq!(over_http.action, in_process.action);
    assert_eq!(
        over_http.decision.map(|d| d.position),
        in_process.decision.map(|d| d.position)
    );

    trio.shutdown().await;
}

#[tokio::test]
async fn server_side_telemetry_sees_every_call() {
    let server_sink = Arc::new(MemorySink::new());
    let trio = Trio::start(server_sink.clone()).await;

    let coordinator_sink = Arc::new(MemorySink::new());
    let config = SystemConfig {
        coordinator: config(CoordinationMode::Sequential),
        workers: trio.workers_config(),
    };
    build_coordinator(&config, coordinator_sink.clone())
        .unwrap()
        .process_turn(&Board::new(), Mark::X)
        .await
        .unwrap();

    let invoked: Vec<(WorkerRole, String)> = server_sink
        .snapshot()
        .into_iter()
        .filter_map(|e| match e {
            TelemetryEvent::Invocation {
                role, capability, ..
            } => Some((role, capability)),
            _ => None,
        })
        .collect();
    assert_eq!(
        invoked,
        vec![
            (WorkerRole::Scout, "analyze".to_string()),
            (WorkerRole::Strategist, "decide".to_string()),
            (WorkerRole::Executor, "act".to_string()),
        ]
    );

    let events = coordinator_sink.snapshot();
    assert!(matches!(events.last(), Some(TelemetryEvent::Turn { .. })));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, TelemetryEvent::Invocation { .. })),
        "remote invocations are recorded by the worker, not the coordinator"
    );

    trio.shutdown().await;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Failures over the wire
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn stopped_workers_fall_back_to_center() {
    let trio = Trio::start(Arc::new(MemorySink::new())).await;
    let workers = trio.workers_config();
    trio.shutdown().await;

    for mode in MODES {
        let config = SystemConfig {
            coordinator: config(mode),
            workers: workers.clone(),
        };
        let sink = Arc::new(MemorySink::new());
        let coordinator = build_coordinator(&config, sink.clone()).unwrap();
        let report = coordinator
            .process_turn(&Board::new(), Mark::X)
            .await
            .unwrap();

        assert_eq!(report.action.position, Position::CENTER, "{mode}");
        assert_eq!(report.recovered_failures, 3, "{mode}");
        assert_eq!(report.failure(Stage::Observe), Some(ErrorKind::TransportError));
        assert_eq!(report.failure(Stage::Decide), Some(ErrorKind::TransportError));
        assert_eq!(report.failure(Stage::Act), Some(ErrorKind::TransportError));
        assert!(!coordinator.status().health(WorkerRole::Scout).unwrap().is_healthy());
    }
}

#[tokio::test]
async fn mixed_transports_recover_from_a_dead_executor() {
    let trio = Trio::start(Arc::new(MemorySink::new())).await;
    let config = SystemConfig {
        coordinator: config(CoordinationMode::Sequential),
        workers: WorkersConfig {
            scout: WorkerConfig::local(),
            strategist: WorkerConfig::remote(trio.url(WorkerRole::Strategist)),
            executor: WorkerConfig::remote(dead_url().await),
        },
    };

    let coordinator = build_coordinator(&config, Arc::new(MemorySink::new())).unwrap();
    let report = coordinator
        .process_turn(&blocking_board(), Mark::O)
        .await
        .unwrap();

    assert_eq!(report.action.position, Position::new(0, 2));
    assert_eq!(report.failure(Stage::Observe), None);
    assert_eq!(report.failure(Stage::Decide), None);
    assert_eq!(report.failure(Stage::Act), Some(ErrorKind::TransportError));
    assert!(report.substituted(Stage::Act, Substitution::DecisionMove));
    assert_eq!(report.recovered_failures, 1);

    let status = coordinator.status();
    assert_eq!(status.workers[0].identity.transport, TransportKind::Local);
    assert!(status.health(WorkerRole::Strategist).unwrap().is_healthy());
    assert!(!status.health(WorkerRole::Executor).unwrap().is_healthy());

    trio.shutdown().await;
}

#[tokio::test]
async fn full_board_fails_without_calling_anyone() {
    let server_sink = Arc::new(MemorySink::new());
    let trio = Trio::start(server_sink.clone()).await;
    let config = SystemConfig {
        coordinator: config(CoordinationMode::Parallel),
        workers: trio.workers_config(),
    };

    let board = Board::from_rows(["XOX", "XOO", "OXX"]);
    let err = build_coordinator(&config, Arc::new(MemorySink::new()))
        .unwrap()
        .process_turn(&board, Mark::X)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoLegalMove);
    assert!(server_sink.is_empty());

    trio.shutdown().await;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config-driven games
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[tokio::test]
async fn game_from_a_toml_file() {
    let trio = Trio::start(Arc::new(MemorySink::new())).await;

    for mode in ["sequential", "parallel"] {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[coordinator]
mode = "{mode}"

[coordinator.deadlines]
analyze = 2000
decide = 2000
act = 2000
total = 3000

[workers.scout]
transport = "remote"
url = "{scout}"

[workers.strategist]
transport = "remote"
url = "{strategist}"

[workers.executor]
transport = "local"
"#,
            scout = trio.url(WorkerRole::Scout),
            strategist = trio.url(WorkerRole::Strategist),
        )
        .unwrap();

        let config = SystemConfig::load(file.path()).unwrap();
        let sink = Arc::new(MemorySink::new());
        let coordinator = build_coordinator(&config, sink.clone()).unwrap();

        let mut game = Game::new();
        let mut turns = 0;
        loop {
            let (report, outcome) = coordinator.play_turn(&mut game).await.unwrap();
            turns += 1;
            assert_eq!(report.move_number, turns, "{mode}");
            if outcome.is_decided() {
                break;
            }
        }

        assert!(game.outcome().is_decided());
        assert_eq!(game.history().len(), turns as usize);
        assert!((5..=9).contains(&turns), "{mode}: {turns} turns");

        let turn_events = sink
            .snapshot()
            .into_iter()
            .filter(|e| matches!(e, TelemetryEvent::Turn { .. }))
            .count();
        assert_eq!(turn_events, turns as usize);

        let err = coordinator.play_turn(&mut game).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoLegalMove);
    }

    trio.shutdown().await;
}

#[tokio::test]
async fn probe_reports_remote_discovery() {
    let trio = Trio::start(Arc::new(MemorySink::new())).await;
    let config = SystemConfig {
        coordinator: CoordinatorConfig::default(),
        workers: trio.workers_config(),
    };
    let coordinator = build_coordinator(&config, Arc::new(MemorySink::new())).unwrap();

    let status = coordinator.probe(DurationMs::from_secs(2)).await;
    assert_eq!(status.mode, CoordinationMode::Sequential);
    for worker in &status.workers {
        assert!(worker.health.is_healthy(), "{}", worker.identity);
        assert_eq!(worker.identity.transport, TransportKind::Remote);
    }

    trio.shutdown().await;
}
