//! Flat-text arena files.
//!
//! One entity per line: `Kind,X,Y,Radius`. Numbers use Rust's
//! locale-independent shortest round-trip formatting, so a save followed by
//! a load reproduces positions and radii bit for bit. Speed and heading are
//! not stored.

use crate::entity::Entity;
use crate::error::ArenaError;
use crate::factory;
use crate::kind::EntityKind;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Result of reading an arena file.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Entities built from well-formed records, in file order
    pub entities: Vec<Entity>,

    /// Records that were skipped, with the reason
    pub skipped: Vec<ArenaError>,
}

/// Renders entities as arena-file text.
pub fn to_records<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> String {
    let mut out = String::new();
    for entity in entities {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{},{},{},{}",
            entity.kind().tag(),
            entity.position.x,
            entity.position.y,
            entity.radius()
        );
    }
    out
}

/// Writes entities to `path`.
///
/// The file is written in one call; a failure part-way is not rolled back.
pub fn save<'a>(
    entities: impl IntoIterator<Item = &'a Entity>,
    path: impl AsRef<Path>,
) -> Result<usize, ArenaError> {
    let path = path.as_ref();
    let text = to_records(entities);
    let count = text.lines().count();
    fs::write(path, text).map_err(|e| ArenaError::io(path, e))?;
    info!("Saved {} entities to {}", count, path.display());
    Ok(count)
}

/// Parses arena-file text, skipping bad records.
pub fn parse_records(text: &str) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        match parse_record(line, trimmed) {
            Ok(entity) => report.entities.push(entity),
            Err(e) => {
                warn!("Skipping record: {}", e);
                report.skipped.push(e);
            }
        }
    }
    report
}

/// Reads an arena file.
///
/// Only an unreadable file is an error; bad lines end up in
/// [`LoadReport::skipped`].
pub fn load(path: impl AsRef<Path>) -> Result<LoadReport, ArenaError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| ArenaError::io(path, e))?;
    let report = parse_records(&text);
    info!(
        "Loaded {} entities from {} ({} skipped)",
        report.entities.len(),
        path.display(),
        report.skipped.len()
    );
    Ok(report)
}

fn parse_record(line: usize, text: &str) -> Result<Entity, ArenaError> {
    let fields: Vec<&str> = text.split(',').map(str::trim).collect();
    if fields.len() != 4 {
        return Err(ArenaError::malformed(
            line,
            format!("expected 4 fields, found {}", fields.len()),
        ));
    }

    let x = parse_number(line, "x", fields[1])?;
    let y = parse_number(line, "y", fields[2])?;
    let radius = parse_number(line, "radius", fields[3])?;
    if radius <= 0.0 {
        return Err(ArenaError::malformed(line, format!("radius must be positive, got {}", radius)));
    }

    let kind = EntityKind::from_tag(fields[0]).ok_or_else(|| ArenaError::UnknownKind {
        line,
        kind: fields[0].to_string(),
    })?;
    Ok(factory::from_record(kind, x, y, radius))
}

fn parse_number(line: usize, field: &str, text: &str) -> Result<f64, ArenaError> {
    let value: f64 = text
        .parse()
        .map_err(|_| ArenaError::malformed(line, format!("{} is not a number: '{}'", field, text)))?;
    if !value.is_finite() {
        return Err(ArenaError::malformed(line, format!("{} is not finite", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Sensor;
    use nalgebra::Vector2;
    use proptest::prelude::*;

    fn sample() -> Vec<Entity> {
        vec![
            Entity::robot(Sensor::Bump, Vector2::new(10.5, 20.25), 15.0, 3.0, 90.0),
            Entity::robot(Sensor::Whisker, Vector2::new(100.0, 0.1), 15.0, 4.0, 12.0),
            Entity::robot(Sensor::Beam, Vector2::new(1.0 / 3.0, 499.0), 10.0, 5.0, 300.0),
            Entity::robot(Sensor::Manual, Vector2::new(250.0, 250.0), 15.0, 2.0, 0.0),
            Entity::obstacle(Vector2::new(300.0, 300.0), 20.0),
            Entity::teleport_pad(Vector2::new(50.0, 450.0), 15.0),
            Entity::black_hole(Vector2::new(450.0, 50.0), 20.0),
        ]
    }

    fn tuple(e: &Entity) -> (EntityKind, f64, f64, f64) {
        (e.kind(), e.position.x, e.position.y, e.radius())
    }

    #[test]
    fn test_record_format() {
        let text = to_records(&[Entity::obstacle(Vector2::new(300.0, 12.5), 20.0)]);
        assert_eq!(text, "Obstacle,300,12.5,20\n");
    }

    #[test]
    fn test_round_trip_through_file() {
        let entities = sample();
        let path = std::env::temp_dir().join(format!("robot_arena_rt_{}.txt", std::process::id()));

        assert_eq!(save(&entities, &path).unwrap(), entities.len());
        let report = load(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert!(report.skipped.is_empty());
        let saved: Vec<_> = entities.iter().map(tuple).collect();
        let loaded: Vec<_> = report.entities.iter().map(tuple).collect();
        assert_eq!(saved, loaded);

        for entity in &report.entities {
            if let Some(agent) = entity.agent() {
                assert_eq!(agent.speed, 2.0);
                assert_eq!(agent.heading, 0.0);
            }
        }
    }

    #[test]
    fn test_bad_records_are_skipped() {
        let text = "\
Obstacle,1,2,3
Obstacle,1,2
Spaceship,1,2,3
WhiskerRobot,abc,2,3
BlackHole,1,2,-5

TeleportPad,4,5,6
";
        let report = parse_records(text);

        assert_eq!(report.entities.len(), 2);
        assert_eq!(report.skipped.len(), 4);
        assert!(matches!(report.skipped[0], ArenaError::MalformedRecord { line: 2, .. }));
        assert!(matches!(
            &report.skipped[1],
            ArenaError::UnknownKind { line: 3, kind } if kind == "Spaceship"
        ));
        assert!(matches!(report.skipped[2], ArenaError::MalformedRecord { line: 4, .. }));
        assert!(matches!(report.skipped[3], ArenaError::MalformedRecord { line: 5, .. }));
        assert!(report.skipped.iter().all(ArenaError::is_record_error));
    }

    #[test]
    fn test_only_exact_tags_load() {
        let report = parse_records("robot,1,2,3\nobstacle,4,5,6\nmanual,7,8,9\nObstacle,4,5,6\n");

        assert_eq!(report.entities.len(), 1);
        assert_eq!(report.entities[0].kind(), EntityKind::Obstacle);
        assert_eq!(report.skipped.len(), 3);
        assert!(matches!(
            &report.skipped[0],
            ArenaError::UnknownKind { line: 1, kind } if kind == "robot"
        ));
        assert!(report
            .skipped
            .iter()
            .all(|e| matches!(e, ArenaError::UnknownKind { .. })));
    }

    #[test]
    fn test_tolerates_crlf() {
        let report = parse_records("BlackHole,1,2,3\r\nObstacle, 4, 5, 6\r\n");
        assert_eq!(report.entities.len(), 2);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load("/nonexistent/dir/arena.txt").unwrap_err();
        assert!(matches!(err, ArenaError::Io { .. }));
        assert!(!err.is_record_error());
    }

    proptest! {
        #[test]
        fn prop_records_round_trip(
            x in -1.0e6..1.0e6f64,
            y in -1.0e6..1.0e6f64,
            radius in 1.0e-3..1.0e3f64,
            kind_index in 0usize..7,
        ) {
            let kind = EntityKind::all()[kind_index];
            let entity = factory::from_record(kind, x, y, radius);

            let report = parse_records(&to_records([&entity]));

            prop_assert!(report.skipped.is_empty());
            prop_assert_eq!(report.entities.len(), 1);
            prop_assert_eq!(tuple(&report.entities[0]), (kind, x, y, radius));
        }
    }
}
