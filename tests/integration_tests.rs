use smartbath_panel::{
    dispatch::{DebitPolicy, Dispatcher, PipeProperty},
    state::{ApplicationState, PipeName, PipeState, StateStore},
    util::io::{
        broker::{ConnectionManager, CONNECTION_LOST_EVENT},
        bus::{app_event_topic, BusMessage, BusReceiver, MessageBus},
    },
};
use std::sync::Arc;
use std::time::Duration;

const STATUS_TOPIC: &str = "screen";
const COMMAND_TOPIC: &str = "bathtub/commands";

fn panel(bus: &MessageBus, publish_topic: &str) -> Dispatcher {
    let manager = ConnectionManager::local(bus.clone());
    Dispatcher::new(
        StateStore::default(),
        manager.publisher(),
        publish_topic.to_string(),
        DebitPolicy::DeriveOnOff,
    )
}

/// Stand-in device: answers every `setPipe` command with the matching `pipe` report.
fn spawn_device(bus: MessageBus) {
    let mut commands = bus.subscribe(COMMAND_TOPIC);
    tokio::spawn(async move {
        while let Some(msg) = commands.recv().await {
            let parts: Vec<&str> = msg.payload.split('/').collect();
            let report = match parts.as_slice() {
                ["setPipe", name, "off"] => format!("pipe/{}/off", name),
                ["setPipe", name, "on", debit] => format!("pipe/{}/on/{}/20", name, debit),
                ["setPipe", name, "on", debit, temp] => format!("pipe/{}/on/{}/{}", name, debit, temp),
                _ => continue,
            };
            let _ = bus.publish(BusMessage::new(STATUS_TOPIC.to_string(), report, "device".to_string()));
        }
    });
}

async fn next(rx: &mut BusReceiver) -> BusMessage {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for bus message")
        .expect("bus closed")
}

#[tokio::test]
async fn test_commands_loop_back_on_shared_topic() {
    let bus = MessageBus::new();
    let mut screen = bus.subscribe(STATUS_TOPIC);
    let dispatcher = panel(&bus, STATUS_TOPIC);

    dispatcher.toggle_pipe(PipeName::Bath).unwrap();
    let echo = next(&mut screen).await;
    assert_eq!(echo.payload, "setPipe/bath/on/0.025");

    // The panel hears its own command and ignores it
    let before = dispatcher.store().get();
    assert!(dispatcher.apply_message(&echo.payload).is_err());
    assert!(Arc::ptr_eq(&before, &dispatcher.store().get()));
}

#[tokio::test]
async fn test_device_reports_reconcile_optimistic_state() {
    let bus = MessageBus::new();
    let mut screen = bus.subscribe(STATUS_TOPIC);
    spawn_device(bus.clone());
    let dispatcher = panel(&bus, COMMAND_TOPIC);

    dispatcher.toggle_pipe(PipeName::Shower).unwrap();
    dispatcher.set_pipe_property(PipeName::Shower, PipeProperty::Temperature, "39").unwrap();

    for _ in 0..2 {
        let report = next(&mut screen).await;
        dispatcher.apply_message(&report.payload).unwrap();
    }

    let shower = dispatcher.store().get().shower;
    assert!(shower.is_on);
    assert_eq!(shower.temperature, Some(39.0));
    assert!((shower.debit.unwrap() - 0.02).abs() < 1e-12);
    assert_eq!(dispatcher.store().get().bath, PipeState::default());
}

#[tokio::test]
async fn test_device_off_report_keeps_temperature() {
    let bus = MessageBus::new();
    let mut screen = bus.subscribe(STATUS_TOPIC);
    spawn_device(bus.clone());
    let dispatcher = panel(&bus, COMMAND_TOPIC);

    dispatcher.set_pipe_property(PipeName::Bath, PipeProperty::Temperature, "30").unwrap();
    dispatcher.set_pipe_property(PipeName::Bath, PipeProperty::Debit, "0.1").unwrap();
    dispatcher.toggle_pipe(PipeName::Bath).unwrap();

    let mut last = None;
    for _ in 0..3 {
        let report = next(&mut screen).await;
        dispatcher.apply_message(&report.payload).unwrap();
        last = Some(report.payload);
    }

    assert_eq!(last.as_deref(), Some("pipe/bath/off"));
    assert_eq!(
        dispatcher.store().get().bath,
        PipeState { is_on: false, debit: Some(0.0), temperature: Some(30.0) }
    );
}

#[tokio::test]
async fn test_readouts_and_snapshot_isolation() {
    let bus = MessageBus::new();
    let dispatcher = panel(&bus, COMMAND_TOPIC);
    let initial = dispatcher.store().get();

    for payload in ["currentVolume/42.5", "waterQuality/0", "pipe/bath/on/0.2/41"] {
        dispatcher.apply_message(payload).unwrap();
    }
    let middle = dispatcher.store().get();
    dispatcher.apply_message("waterQuality/1").unwrap();

    assert_eq!(*initial, ApplicationState::default());
    assert!(middle.bad_water_quality);
    assert_eq!(middle.current_volume, 42.5);

    let now = dispatcher.store().get();
    assert!(!now.bad_water_quality);
    assert_eq!(now.bath.temperature, Some(41.0));
}

#[tokio::test]
async fn test_store_subscribers_wake_on_inbound() {
    let bus = MessageBus::new();
    let dispatcher = panel(&bus, COMMAND_TOPIC);
    let mut changes = dispatcher.store().subscribe();

    dispatcher.apply_message("currentVolume/7").unwrap();

    tokio::time::timeout(Duration::from_secs(1), changes.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(changes.borrow().current_volume, 7.0);
}

#[tokio::test]
async fn test_connection_lost_is_published_as_app_event() {
    let bus = MessageBus::new();
    let mut lost = bus.subscribe(app_event_topic(CONNECTION_LOST_EVENT));

    bus.publish_app_event(CONNECTION_LOST_EVENT, "connection reset").unwrap();

    let msg = next(&mut lost).await;
    assert_eq!(msg.topic, "app.event.connection_lost");
    assert_eq!(msg.payload, "connection reset");
}
