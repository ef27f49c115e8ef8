use std::sync::Arc;
use std::time::Duration;

use igt_core::app::{ExportStatus, SessionBuilder};
use igt_core::domain::{Action, SessionConfig, TrialType};
use igt_core::impls::{ChannelInput, MemoryExporter, RecordingPresenter};
use igt_core::ports::{Input, Screen};

fn config(practice_trials: u32, main_trials: u32) -> SessionConfig {
    SessionConfig {
        practice_trials,
        main_trials,
        seed: Some(11),
        ..SessionConfig::sampled()
    }
}

#[tokio::test(start_paused = true)]
async fn scripted_session_runs_to_completion() {
    let exporter = Arc::new(MemoryExporter::new());
    let presenter = RecordingPresenter::new();
    let runner = SessionBuilder::new(config(2, 3), presenter.clone(), Arc::clone(&exporter))
        .with_participant("p-01", "Ada")
        .build_runner()
        .unwrap();

    let (tx, mut input) = ChannelInput::new();
    tx.send(Input::Continue).unwrap();
    for _ in 0..20 {
        tx.send(Input::Play).unwrap();
        tx.send(Input::Continue).unwrap();
    }

    let summary = runner.run(&mut input).await.unwrap();

    assert_eq!(summary.records.len(), 4);
    assert!(summary.records[..3].iter().all(|r| r.action == Action::Play));
    assert_eq!(summary.records[3].trial_type, TrialType::Final);
    assert_eq!(summary.records[3].net_worth, summary.final_net_worth);
    assert!(matches!(summary.export, ExportStatus::Exported(ref r) if r.rows == 4));
    assert_eq!(exporter.batches()[0].records, summary.records);
    assert_eq!(
        presenter.screens(),
        vec![
            Screen::Welcome {
                deadline_ms: 4000,
                initial_stake: 2000
            },
            Screen::PracticeBriefing { trials: 2 },
            Screen::MainBriefing { trials: 3 },
            Screen::Ended {
                final_net_worth: summary.final_net_worth
            },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn silent_participant_times_out_as_pass() {
    let runner = SessionBuilder::new(config(0, 1), RecordingPresenter::new(), MemoryExporter::new())
        .with_participant("p-01", "Ada")
        .build_runner()
        .unwrap();

    let (tx, mut input) = ChannelInput::new();
    for _ in 0..3 {
        tx.send(Input::Continue).unwrap();
    }

    let driver = async {
        tokio::time::sleep(Duration::from_millis(4100)).await;
        tx.send(Input::Play).unwrap();
        tx.send(Input::Continue).unwrap();
    };
    let (summary, ()) = tokio::join!(runner.run(&mut input), driver);
    let summary = summary.unwrap();

    assert_eq!(summary.records.len(), 2);
    let timed_out = &summary.records[0];
    assert_eq!(timed_out.action, Action::Pass);
    assert_eq!(timed_out.outcome, 0);
    assert_eq!(timed_out.net_worth, 2000);
    assert_eq!(timed_out.response_ms, None);
    assert_eq!(summary.final_net_worth, 2000);
}

#[tokio::test(start_paused = true)]
async fn play_before_deadline_wins() {
    let runner = SessionBuilder::new(config(0, 1), RecordingPresenter::new(), MemoryExporter::new())
        .with_participant("p-01", "Ada")
        .build_runner()
        .unwrap();

    let (tx, mut input) = ChannelInput::new();
    for _ in 0..3 {
        tx.send(Input::Continue).unwrap();
    }

    let driver = async {
        tokio::time::sleep(Duration::from_millis(3900)).await;
        tx.send(Input::Play).unwrap();
        // well past the original deadline
        tokio::time::sleep(Duration::from_secs(10)).await;
        tx.send(Input::Continue).unwrap();
    };
    let (summary, ()) = tokio::join!(runner.run(&mut input), driver);
    let summary = summary.unwrap();

    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.records[0].action, Action::Play);
    assert!(summary.records[0].response_ms.is_some());
    assert_eq!(summary.records[0].net_worth, summary.final_net_worth);
}

#[tokio::test(start_paused = true)]
async fn closed_input_ends_session() {
    let exporter = Arc::new(MemoryExporter::new());
    let runner = SessionBuilder::new(config(0, 5), RecordingPresenter::new(), Arc::clone(&exporter))
        .with_participant("p-01", "Ada")
        .build_runner()
        .unwrap();

    let (tx, mut input) = ChannelInput::new();
    for _ in 0..3 {
        tx.send(Input::Continue).unwrap();
    }
    tx.send(Input::Pass).unwrap();
    drop(tx);

    let summary = runner.run(&mut input).await.unwrap();

    assert_eq!(summary.records.len(), 2);
    assert_eq!(summary.records[1].trial_type, TrialType::Final);
    assert_eq!(exporter.batches().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn registration_retries_until_valid() {
    let runner = SessionBuilder::new(config(0, 1), RecordingPresenter::new(), MemoryExporter::new())
        .build_runner()
        .unwrap();

    let (tx, mut input) = ChannelInput::new();
    tx.send(Input::Register {
        id: "p-07".into(),
        name: "".into(),
    })
    .unwrap();
    tx.send(Input::Register {
        id: "p-07".into(),
        name: "Grace".into(),
    })
    .unwrap();
    tx.send(Input::Quit).unwrap();

    let summary = runner.run(&mut input).await.unwrap();

    assert_eq!(summary.participant.map(|p| p.name), Some("Grace".to_string()));
    assert!(summary.records.is_empty());
    assert_eq!(summary.export, ExportStatus::NotAttempted);
}
