use can_trace::j1939::CanId;
use can_trace::trace::{FirstCandidate, KeyKind, NoResolver, PreferredKeys};
use can_trace::{
    AggregatorConfig, FrameId, RawFrame, ResolveError, SessionClock, TraceAggregator, TraceError, TraceSelection,
    from_dbc_str,
};
use chrono::NaiveDateTime;

const SCHEMA: &str = r#"VERSION ""

BS_:

BU_: EMS TCU

BO_ 2364539904 EEC1: 8 EMS
 SG_ EngineSpeed : 24|16@1+ (0.125,0) [0|8031.875] "rpm" TCU

BO_ 2348810494 TSC1: 8 TCU
 SG_ RequestedSpeed : 8|16@1+ (0.125,0) [0|8031.875] "rpm" EMS

BO_ 1024 Legacy: 2 Vector__XXX
 SG_ Counter : 0|8@1- (1,0) [-128|127] "" Vector__XXX
"#;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn eec1(speed_rpm: f64) -> Vec<u8> {
    let raw: u16 = (speed_rpm / 0.125) as u16;
    let [lo, hi] = raw.to_le_bytes();
    vec![0, 0, 0, lo, hi, 0, 0, 0]
}

fn can(id: u32, channel: u8, timestamp: f64, data: Vec<u8>) -> RawFrame {
    RawFrame {
        timestamp,
        data,
        id: FrameId::Can(CanId::Extended(id)),
        channel,
    }
}

#[test]
fn two_logs_on_one_time_axis() {
    init_logger();
    let db = from_dbc_str(SCHEMA).unwrap();
    let mut agg = TraceAggregator::new(&db, AggregatorConfig::default());

    let mut clock = SessionClock::new();
    let first: NaiveDateTime = "2025-08-05T10:00:00".parse().unwrap();
    let second: NaiveDateTime = "2025-08-05T10:00:30".parse().unwrap();

    // one log per channel, the second started 30 s later
    let mut session = agg.begin_session();
    for (i, rpm) in [800.0, 900.0].into_iter().enumerate() {
        session.ingest(can(0x0CF00400, 1, clock.relative(first, i as f64), eec1(rpm)));
    }
    session.ingest(can(0x0CF00400, 2, clock.relative(second, 0.5), eec1(1500.0)));
    drop(session);

    let eec1_msg = agg.get_message("EEC1").unwrap().clone();
    let speed = eec1_msg.get_signal("EngineSpeed").unwrap();

    let mut prefs = PreferredKeys {
        channel: Some(2),
        ..Default::default()
    };
    let trace = agg.get_trace("EEC1", None, &mut prefs).unwrap();
    assert_eq!(trace.to_title(), "(CAN:2)");
    let series = trace.signal_series(speed);
    assert_eq!(series.times, vec![30.5]);
    assert_eq!(series.values, vec![1500.0]);

    let trace = agg.get_trace("EEC1", None, &mut FirstCandidate).unwrap();
    assert_eq!(trace.signal_series(speed).values, vec![800.0, 900.0]);
}

#[test]
fn destination_and_source_selection() {
    init_logger();
    let db = from_dbc_str(SCHEMA).unwrap();
    let mut agg = TraceAggregator::new(&db, AggregatorConfig::default());
    agg.ingest_all([
        can(0x0C000003, 1, 0.00, vec![0; 8]),
        can(0x0C000003, 1, 0.01, vec![0; 8]),
        can(0x0C00000B, 1, 0.02, vec![0; 8]),
        can(0x0C001703, 1, 0.03, vec![0; 8]),
    ]);
    let log = agg.message_log("TSC1").unwrap();
    assert!(log.is_destination_specific());

    let mut asked: Vec<(KeyKind, Vec<u8>)> = Vec::new();
    let mut record = |kind: KeyKind, _: &str, candidates: &[u8]| -> Result<u8, ResolveError> {
        asked.push((kind, candidates.to_vec()));
        candidates.first().copied().ok_or(ResolveError::NoCandidates)
    };
    let trace = agg.get_trace("TSC1", None, &mut record).unwrap();
    assert_eq!(trace.len(), 2);
    assert_eq!(
        trace.selection,
        TraceSelection {
            source: Some(0x03),
            destination: Some(0x00),
            channel: None,
        }
    );
    assert_eq!(
        asked,
        vec![(KeyKind::Destination, vec![0x00, 0x17]), (KeyKind::Source, vec![0x03, 0x0B])]
    );

    // a stored selection replays without asking again
    let replay = agg.get_trace("TSC1", Some(&trace.selection), &mut NoResolver).unwrap();
    assert_eq!(replay, trace);
}

#[test]
fn standard_ids_and_unknown_traffic() {
    init_logger();
    let db = from_dbc_str(SCHEMA).unwrap();
    let mut agg = TraceAggregator::new(&db, AggregatorConfig::default().with_channel_filter(vec![1]));

    let mut session = agg.begin_session();
    session.ingest(RawFrame {
        timestamp: 0.0,
        data: vec![0xFE],
        id: FrameId::Can(CanId::Standard(1024)),
        channel: 1,
    });
    for i in 0..5 {
        session.ingest(can(0x18FEEE00, 1, i as f64, vec![0; 8]));
    }
    session.ingest(can(0x0CF00400, 3, 0.0, eec1(600.0)));
    let unknown: Vec<u32> = session.unknown_pgns().collect();
    drop(session);

    assert_eq!(unknown, vec![0x18FEEE]);
    let stats = agg.stats();
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.unknown, 5);
    assert_eq!(stats.filtered, 1);
    assert_eq!(stats.catalogue_scans, 2);

    let legacy = agg.get_trace("Legacy", None, &mut NoResolver).unwrap();
    let counter = db.get_message("Legacy").unwrap().get_signal("Counter").unwrap();
    assert_eq!(legacy.signal_series(counter).values, vec![-2.0]);

    assert_eq!(
        agg.get_trace("EEC1", None, &mut NoResolver),
        Err(TraceError::NoFrames { message: "EEC1".into() })
    );
    let names: Vec<&str> = agg.non_empty_messages().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Legacy"]);
}
