//! Test helpers for writing CLI fixtures and recording outcomes.

use camino::{Utf8Path, Utf8PathBuf};
use geo::Coord;
use tempfile::TempDir;
use wayfarer_core::{DayPlan, PointOfInterest, ScheduledStop};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write fixture");
}

/// A temporary working directory with UTF-8 paths.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

/// Points strung north-east through Cebu City, one per id.
pub(super) fn cebu_points(count: u64) -> Vec<PointOfInterest> {
    (1..=count)
        .map(|id| {
            let step = f64::from(u32::try_from(id).expect("small id"));
            PointOfInterest::new(
                id,
                format!("spot-{id}"),
                Coord {
                    x: 123.89 + step * 0.004,
                    y: 10.29 + step * 0.008,
                },
            )
        })
        .collect()
}

/// A single undated day visiting `count` unscheduled points.
pub(super) fn itinerary(count: u64) -> Vec<DayPlan> {
    let stops = cebu_points(count)
        .into_iter()
        .map(ScheduledStop::unscheduled)
        .collect();
    vec![DayPlan::new(0, stops)]
}
