//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod ephemeris {
    use std::io::{self, Write};
    use std::path::Path;

    use super::writer_for_path;

    const HEADER: &str =
        "time_s,segment,phase,reference_body,x_m,y_m,z_m,vx_m_s,vy_m_s,vz_m_s";

    /// Write the ephemeris CSV header.
    pub fn write_header(writer: &mut dyn Write) -> io::Result<()> {
        writeln!(writer, "{}", HEADER)
    }

    /// One sampled state of a flight plan, relative to the segment's reference body.
    #[derive(Debug, Clone)]
    pub struct Record<'a> {
        pub time_s: f64,
        pub segment: usize,
        pub phase: &'a str,
        pub reference_body: &'a str,
        pub position_m: [f64; 3],
        pub velocity_m_s: [f64; 3],
    }

    impl<'a> Record<'a> {
        /// Serialize the record to CSV, matching the header ordering.
        pub fn write_to(&self, writer: &mut dyn Write) -> io::Result<()> {
            let [x, y, z] = self.position_m;
            let [vx, vy, vz] = self.velocity_m_s;
            writeln!(
                writer,
                "{:.3},{},{},{},{:.3},{:.3},{:.3},{:.6},{:.6},{:.6}",
                self.time_s,
                self.segment,
                self.phase,
                self.reference_body,
                x,
                y,
                z,
                vx,
                vy,
                vz,
            )
        }
    }

    /// Write a full ephemeris (header plus rows) to `path`, or stdout for `-`.
    pub fn write_records(path: &Path, records: &[Record<'_>]) -> io::Result<()> {
        let mut writer = writer_for_path(path)?;
        write_header(writer.as_mut())?;
        for record in records {
            record.write_to(writer.as_mut())?;
        }
        writer.flush()
    }
}

pub mod summary {
    use serde::Serialize;
    use serde_json::to_writer_pretty;
    use std::io::{self, Write};
    use std::path::Path;

    use super::writer_for_path;

    /// Impulsive burn reported in a plan summary.
    #[derive(Debug, Clone, Serialize)]
    pub struct BurnSummary {
        pub name: String,
        pub time_s: f64,
        pub delta_v_m_s: f64,
    }

    /// One segment of a flight plan.
    #[derive(Debug, Clone, Serialize)]
    pub struct SegmentSummary {
        pub index: usize,
        pub phase: String,
        pub kind: String,
        pub reference_body: String,
        pub start_time_s: f64,
        pub end_time_s: f64,
        pub exit_condition: String,
        pub next_body: Option<String>,
        pub semi_major_axis_m: Option<f64>,
        pub eccentricity: Option<f64>,
    }

    /// Envelope of a synthesised planet-to-moon plan.
    #[derive(Debug, Clone, Serialize)]
    pub struct PlanSummary {
        pub origin: String,
        pub destination: String,
        pub request_time_s: f64,
        pub launch_time_s: f64,
        pub soi_entry_time_s: f64,
        pub periapsis_time_s: f64,
        pub end_time_s: f64,
        pub transfer_apogee_m: f64,
        pub apogee_search_converged: bool,
        pub phase_angle_rad: f64,
        pub capture_sense: String,
        pub capture_periapsis_m: f64,
        pub v_infinity_m_s: f64,
        pub burns: Vec<BurnSummary>,
        pub total_delta_v_m_s: f64,
        pub segments: Vec<SegmentSummary>,
    }

    /// Pretty-print the summary as JSON to `path`, or stdout for `-`.
    pub fn write_summary(path: &Path, summary: &PlanSummary) -> io::Result<()> {
        let mut writer = writer_for_path(path)?;
        to_writer_pretty(&mut writer, summary)?;
        writeln!(writer)?;
        writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time_s: f64) -> ephemeris::Record<'static> {
        ephemeris::Record {
            time_s,
            segment: 1,
            phase: "Transfer",
            reference_body: "EARTH",
            position_m: [1.0, 2.0, 3.0],
            velocity_m_s: [4.0, 5.0, 6.0],
        }
    }

    #[test]
    fn ephemeris_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.csv");
        ephemeris::write_records(&path, &[record(0.0), record(60.0)]).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("time_s,segment,phase,reference_body"));
        assert_eq!(
            lines[2],
            "60.000,1,Transfer,EARTH,1.000,2.000,3.000,4.000000,5.000000,6.000000"
        );
    }

    #[test]
    fn summary_round_trips_through_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        let summary = summary::PlanSummary {
            origin: "EARTH".into(),
            destination: "MOON".into(),
            request_time_s: 0.0,
            launch_time_s: 600.0,
            soi_entry_time_s: 4.0e5,
            periapsis_time_s: 4.4e5,
            end_time_s: 1.0e6,
            transfer_apogee_m: 3.9e8,
            apogee_search_converged: true,
            phase_angle_rad: 0.17,
            capture_sense: "prograde".into(),
            capture_periapsis_m: 2.2e6,
            v_infinity_m_s: 800.0,
            burns: vec![summary::BurnSummary {
                name: "injection".into(),
                time_s: 600.0,
                delta_v_m_s: 3100.0,
            }],
            total_delta_v_m_s: 3100.0,
            segments: Vec::new(),
        };
        summary::write_summary(&path, &summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["destination"], "MOON");
        assert_eq!(value["burns"][0]["name"], "injection");
        assert_eq!(value["apogee_search_converged"], true);
    }
}
