//! Export serializer: renders a dataset back to the ingestion schema plus
//! the two derived completeness columns. Absent values map to empty cells,
//! so load → merge → export → load round-trips to the same logical dataset.

use csv::WriterBuilder;
use std::io::Write;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::schema;

pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);

    wtr.write_record(schema::EXPORT_COLUMNS)?;

    for record in dataset.iter() {
        let cost = record
            .monthly_cost
            .map(|c| c.to_string())
            .unwrap_or_default();
        let score = record.tag_completeness_score.to_string();
        let pct = record.tag_completeness_pct.to_string();

        wtr.write_record([
            record.resource_id.as_str(),
            record.service.as_deref().unwrap_or(""),
            record.region.as_deref().unwrap_or(""),
            cost.as_str(),
            record.tagged.as_deref().unwrap_or(""),
            record.department.as_deref().unwrap_or(""),
            record.project.as_deref().unwrap_or(""),
            record.environment.as_deref().unwrap_or(""),
            record.owner.as_deref().unwrap_or(""),
            record.cost_center.as_deref().unwrap_or(""),
            score.as_str(),
            pct.as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(dataset: &Dataset) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(dataset, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
