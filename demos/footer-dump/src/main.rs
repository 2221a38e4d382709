use std::io;

use parquet_stream::{
    decoder::row_group_start, read_footer_with, FooterLocator, ParquetMetadataDecoder,
    RowGroupFilter, StreamBuffer,
};
use pico_args::Arguments;

fn parse_range(s: &str) -> eyre::Result<RowGroupFilter> {
    let (start, end) = s
        .split_once("..")
        .ok_or_else(|| eyre::eyre!("expected START..END, got {s}"))?;
    Ok(RowGroupFilter::range(start.parse()?, end.parse()?))
}

fn main() -> eyre::Result<()> {
    env_logger::init();

    let mut args = Arguments::from_env();
    let header = args.contains("--header");
    let skip = args.contains("--skip-row-groups");
    let range = args.opt_value_from_fn("--range", parse_range)?;
    let name: Option<String> = args.opt_value_from_str("--name")?;
    let rest = args.finish();
    if !rest.is_empty() {
        eyre::bail!("unexpected arguments: {rest:?}");
    }

    let filter = match (skip, range) {
        (true, _) => RowGroupFilter::SkipRowGroups,
        (false, Some(range)) => range,
        (false, None) => RowGroupFilter::NoFilter,
    };

    let mut buffer = StreamBuffer::new(io::stdin().lock())?
        .with_name(name.unwrap_or_else(|| "<stdin>".to_string()));
    let locator = FooterLocator::new().require_header_magic(header);
    let metadata = read_footer_with(&mut buffer, &locator, &ParquetMetadataDecoder, &filter)?;

    let file = metadata.file_metadata();
    println!("bytes\t{}", buffer.len());
    println!("version\t{}", file.version());
    if let Some(created_by) = file.created_by() {
        println!("created_by\t{created_by}");
    }
    println!("rows\t{}", file.num_rows());
    for column in file.schema_descr().columns() {
        println!(
            "column\t{}\t{}",
            column.path().string(),
            column.physical_type()
        );
    }
    for (i, row_group) in metadata.row_groups().iter().enumerate() {
        println!(
            "row_group\t{i}\tstart={}\trows={}\tcompressed={}",
            row_group_start(row_group),
            row_group.num_rows(),
            row_group.compressed_size()
        );
    }
    Ok(())
}
