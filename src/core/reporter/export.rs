//! CSV and JSON export of focal-length results.

use super::FocalReport;
use crate::core::analysis::{FocalAnalysis, FocalLengthTable};
use std::io::Write;

/// Write the table as CSV
///
/// Columns: focal_length_mm, count
pub fn export_csv<W: Write>(table: &FocalLengthTable, mut writer: W) -> std::io::Result<()> {
    writeln!(writer, "focal_length_mm,count")?;
    for (focal_length, count) in table.iter() {
        writeln!(writer, "{},{}", focal_length.mm(), count)?;
    }
    Ok(())
}

/// Write a [`FocalReport`] as pretty JSON
pub fn export_json<W: Write>(analysis: &FocalAnalysis, mut writer: W) -> std::io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &FocalReport::from_analysis(analysis))?;
    writeln!(writer)?;
    Ok(())
}

/// "N images, M with focal length, K unique"
pub fn summary_line(analysis: &FocalAnalysis) -> String {
    format!(
        "{} images, {} with focal length, {} unique",
        analysis.total_images,
        analysis.images_with_focal_length,
        analysis.unique_focal_lengths()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metadata::{FocalLength, MetadataRecord};
    use std::path::PathBuf;

    fn analysis() -> FocalAnalysis {
        let mut analysis = FocalAnalysis::default();
        for (i, mm) in [18.5, 50.0, 50.0].iter().enumerate() {
            let record = MetadataRecord {
                path: PathBuf::from(format!("/photos/{}.jpg", i)),
                focal_length: FocalLength::from_mm(*mm),
                ..Default::default()
            };
            analysis.table.record(record.focal_length.unwrap());
            analysis.records.insert(record.path.clone(), record);
        }
        analysis.total_images = 4;
        analysis.images_with_focal_length = 3;
        analysis
    }

    #[test]
    fn csv_lists_each_focal_length() {
        let mut buffer = Vec::new();
        export_csv(&analysis().table, &mut buffer).unwrap();

        let csv = String::from_utf8(buffer).unwrap();
        assert_eq!(csv, "focal_length_mm,count\n18.5,1\n50,2\n");
    }

    #[test]
    fn json_contains_totals_and_table() {
        let mut buffer = Vec::new();
        export_json(&analysis(), &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        assert_eq!(value["total_images"], 4);
        assert_eq!(value["unique_focal_lengths"], 2);
        assert_eq!(value["focal_lengths"][1]["focal_length_mm"], 50.0);
        assert_eq!(value["focal_lengths"][1]["count"], 2);
    }

    #[test]
    fn summary_line_counts() {
        assert_eq!(
            summary_line(&analysis()),
            "4 images, 3 with focal length, 2 unique"
        );
    }
}
