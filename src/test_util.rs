use std::sync::Arc;

use parquet::{
    data_type::{Int32Type, Int64Type},
    file::{properties::WriterProperties, writer::SerializedFileWriter},
    schema::parser::parse_message_type,
};

const SCHEMA: &str = "
message schema {
    REQUIRED INT32 id;
    REQUIRED INT64 value;
}
";

/// Write an in-memory Parquet file with one row group per slice of ids.
pub(crate) fn write_parquet(row_groups: &[&[i32]]) -> eyre::Result<Vec<u8>> {
    let schema = Arc::new(parse_message_type(SCHEMA)?);
    let props = Arc::new(WriterProperties::builder().build());

    let mut out = Vec::new();
    let mut writer = SerializedFileWriter::new(&mut out, schema, props)?;
    for ids in row_groups {
        let mut row_group = writer.next_row_group()?;
        if let Some(mut column) = row_group.next_column()? {
            column.typed::<Int32Type>().write_batch(ids, None, None)?;
            column.close()?;
        }
        if let Some(mut column) = row_group.next_column()? {
            let values: Vec<i64> = ids.iter().map(|id| i64::from(*id) * 10).collect();
            column
                .typed::<Int64Type>()
                .write_batch(&values, None, None)?;
            column.close()?;
        }
        row_group.close()?;
    }
    writer.close()?;
    Ok(out)
}

pub(crate) fn three_row_groups() -> eyre::Result<Vec<u8>> {
    write_parquet(&[&[1, 2, 3], &[4, 5, 6, 7], &[8, 9]])
}
