//! Absolute sensor positions recorded during construction.

use approx::assert_relative_eq;
use nalgebra::Vector3;

use tplane_core::assembly::{PlaneConfig, Toggles, TrackingPlane};
use tplane_core::provider::{BoardSpec, ModuleGeometry, SensorBoard, SensorPosition};
use tplane_core::sink::PlacementLog;
use tplane_core::tracker::{AbsolutePositionTracker, AbsoluteSensorPosition};

#[test]
fn test_single_record_example() {
    let mut tracker = AbsolutePositionTracker::new();
    tracker.record(
        2,
        &[SensorPosition {
            id: 5,
            position: Vector3::new(1.0, 2.0, 3.0),
        }],
        Vector3::new(10.0, 20.0, 30.0),
    )
    .unwrap();

    let entry = tracker.dump().next().unwrap();
    assert_eq!(
        *entry,
        AbsoluteSensorPosition {
            id: 2005,
            position: Vector3::new(11.0, 22.0, 33.0),
        }
    );
}

#[test]
fn test_construction_records_every_sensor_of_every_module() {
    let board = SensorBoard::new(BoardSpec::default()).unwrap();
    let locals = board.sensor_positions().to_vec();
    let mut plane = TrackingPlane::new(PlaneConfig::default(), board);
    let mut sink = PlacementLog::new();
    plane.construct(&mut sink, &mut Vec::<String>::new()).unwrap();

    let entries: Vec<_> = plane.tracker().dump().copied().collect();
    assert_eq!(entries.len(), 4 * locals.len());

    // Module copies 1..=4 in placement order, sensors in board order.
    for (placement, chunk) in sink.modules().zip(entries.chunks(locals.len())) {
        for (local, entry) in locals.iter().zip(chunk) {
            assert_eq!(entry.id, placement.copy_index as u32 * 1000 + local.id);
            let expected = placement.position + local.position;
            assert_relative_eq!(entry.position, expected);
        }
    }

    // Every sensor of a module shares that module's layer z.
    let module_z = plane.module_z().unwrap();
    for entry in &entries {
        assert_relative_eq!(entry.position.z, module_z - 0.15);
    }
}

#[test]
fn test_dump_lines_go_to_diagnostics_only_when_enabled() {
    let config = PlaneConfig {
        toggles: Toggles {
            sensor_positions: true,
            ..Default::default()
        },
        ..Default::default()
    };
    let mut plane = TrackingPlane::new(config, SensorBoard::new(BoardSpec::default()).unwrap());
    let mut lines: Vec<String> = Vec::new();
    plane.construct(&mut PlacementLog::new(), &mut lines).unwrap();

    let first_sensor = lines
        .iter()
        .find(|l| l.starts_with("ID number:"))
        .unwrap();
    assert!(first_sensor.starts_with("ID number: 1000, position: "), "{}", first_sensor);
    assert_eq!(lines.iter().filter(|l| l.starts_with("ID number:")).count(), 256);
}

#[test]
fn test_entries_serialise_as_json() {
    let entry = AbsoluteSensorPosition {
        id: 3012,
        position: Vector3::new(1.5, -2.0, 0.25),
    };
    let json = serde_json::to_string(&entry).unwrap();
    assert_eq!(json, r#"{"id":3012,"position":[1.5,-2.0,0.25]}"#);
}
