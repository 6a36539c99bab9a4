#![no_main]

use chem_econ::output::Output;
use chem_econ::reference_data::{multipliers_from_csv, ProjectDataTable};
use chem_econ::{run_project, ReferenceData};
use libfuzzer_sys::fuzz_target;
use std::io;
use std::io::{BufReader, Cursor, Write};
use std::sync::LazyLock;

static REFERENCE_DATA: LazyLock<ReferenceData> = LazyLock::new(|| {
    ReferenceData::new(
        ProjectDataTable::from_csv(include_str!("../../test_data/project_data.csv").as_bytes())
            .unwrap(),
        multipliers_from_csv(include_str!("../../test_data/sectorwise_multipliers.csv").as_bytes())
            .unwrap(),
    )
});

fuzz_target!(|data: &[u8]| {
    let _run = run_project(
        BufReader::new(Cursor::new(data)),
        SinkOutput::default(),
        &REFERENCE_DATA,
    );
});

/// An output that goes to nowhere/ a "sink"/ /dev/null.
#[derive(Debug, Default)]
pub struct SinkOutput;

impl Output for SinkOutput {
    fn writer_for_location_key(&self, _location_key: &str) -> anyhow::Result<impl Write> {
        Ok(io::sink())
    }

    fn is_noop(&self) -> bool {
        // make the output pretend it's not a no-op so fuzzing exercises the CSV writing
        false
    }
}
