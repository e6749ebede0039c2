// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSV and JSON export of detection results

use crate::error::Result;
use crate::types::{ClassifiedSegment, CourtDetection};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CSV_HEADER: &str = "class,origin_x,origin_y,destination_x,destination_y";

/// One row per segment under [`CSV_HEADER`].
pub fn write_csv<W: Write>(writer: &mut W, segments: &[ClassifiedSegment]) -> Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for segment in segments {
        writeln!(
            writer,
            "{},{},{},{},{}",
            segment.class,
            segment.origin.x,
            segment.origin.y,
            segment.destination.x,
            segment.destination.y
        )?;
    }
    Ok(())
}

pub fn save_csv<P: AsRef<Path>>(path: P, segments: &[ClassifiedSegment]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_csv(&mut writer, segments)?;
    writer.flush()?;
    Ok(())
}

/// Pretty-printed JSON of the full detection, internal segments included.
pub fn write_json<W: Write>(writer: W, detection: &CourtDetection) -> Result<()> {
    serde_json::to_writer_pretty(writer, detection)?;
    Ok(())
}

pub fn save_json<P: AsRef<Path>>(path: P, detection: &CourtDetection) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_json(&mut writer, detection)?;
    writer.flush()?;
    Ok(())
}
